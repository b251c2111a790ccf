//! Benchmark programs for the evaluation binaries, assembled from machine
//! word builders

use mipsim::instruction::encode;
use mipsim::instruction::Op;

/// A tight counting loop: one backward branch, taken on every iteration
/// but the last
pub fn counting_loop(iterations: u16) -> Vec<u32> {
    vec![
        encode::i_type(Op::Addi, 9, 0, iterations), // $t1 = limit
        encode::i_type(Op::Addi, 8, 0, 0),          // $t0 = 0
        encode::i_type(Op::Addi, 8, 8, 1),
        encode::branch(Op::Bne, 8, 9, -2),
    ]
}

/// A loop whose inner branch alternates taken/not-taken, defeating purely
/// per-pc counters but not history-based predictors
pub fn alternating_branch(iterations: u16) -> Vec<u32> {
    vec![
        encode::i_type(Op::Addi, 9, 0, iterations), // $t1 = limit
        encode::i_type(Op::Addi, 8, 0, 0),          // $t0 = 0
        encode::i_type(Op::Andi, 10, 8, 1),         // $t2 = $t0 & 1
        encode::branch(Op::Beq, 10, 0, 1),          // skip the odd-path work
        encode::i_type(Op::Addi, 11, 11, 1),        // $t3 += 1
        encode::i_type(Op::Addi, 8, 8, 1),
        encode::branch(Op::Bne, 8, 9, -5),
    ]
}

/// Two nested counting loops; the inner exit branch retrains on every
/// outer iteration
pub fn nested_loops(outer: u16, inner: u16) -> Vec<u32> {
    vec![
        encode::i_type(Op::Addi, 11, 0, inner), // $t3 = inner limit
        encode::i_type(Op::Addi, 9, 0, outer),  // $t1 = outer limit
        encode::i_type(Op::Addi, 8, 0, 0),      // $t0 = 0
        encode::i_type(Op::Addi, 10, 0, 0),     // $t2 = 0
        encode::i_type(Op::Addi, 10, 10, 1),
        encode::branch(Op::Bne, 10, 11, -2),
        encode::i_type(Op::Addi, 8, 8, 1),
        encode::branch(Op::Bne, 8, 9, -5),
    ]
}

/// The benchmark set used by both evaluation binaries
pub fn benchmarks() -> Vec<(&'static str, Vec<u32>)> {
    vec![
        ("counting-loop", counting_loop(64)),
        ("alternating", alternating_branch(64)),
        ("nested-loops", nested_loops(16, 8)),
    ]
}
