//! MIPS-I core: owns the register file, memory, pipeline, branch predictor
//! and program counter, and exposes the stepping API.

use std::fmt::Write as _;
use std::ops::Range;

use crate::error::ExecutionError;
use crate::error::LoadError;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::instruction::REG_NAMES;
use crate::loader;
use crate::memory::Memory;
use crate::memory::DEFAULT_MEMORY_BYTES;
use crate::pipelined::hazard::HazardStats;
use crate::pipelined::Pipeline;
use crate::predictor;
use crate::predictor::BranchPredictor;
use crate::predictor::BranchStats;
use crate::predictor::PredictorKind;
use crate::single_cycle;

/// Default safety cap for `run`
pub const DEFAULT_MAX_CYCLES: u64 = 1_000_000;

/// Conventional text segment base
pub const TEXT_BASE: u32 = 0x0040_0000;

/// Core configuration, fixed at construction and preserved across resets
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Size of the flat memory in bytes
    pub memory_bytes: usize,
    /// Address the program image is loaded at; PC resets here
    pub base_address: u32,
    pub pipeline_enabled: bool,
    pub predictor: PredictorKind,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_bytes: DEFAULT_MEMORY_BYTES,
            base_address: 0,
            pipeline_enabled: true,
            predictor: PredictorKind::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Conventional MIPS layout: code at 0x00400000, memory sized to cover it
    pub fn text_segment() -> Self {
        Self { memory_bytes: 8 << 20, base_address: TEXT_BASE, ..Self::default() }
    }

    /// Stack pointer reset value: the top word of memory
    fn sp_init(&self) -> u32 {
        (self.memory_bytes as u32).saturating_sub(4)
    }

    /// Global pointer reset value: the middle of memory, where static data
    /// conventionally sits
    fn gp_init(&self) -> u32 {
        (self.memory_bytes / 2) as u32
    }
}

/// Register file simulation: 32 words, index 0 hard-wired to zero
pub struct RegisterFile {
    regs: [u32; 32],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads the register; index 0 always reads 0, out-of-range reads 0
    pub fn read(&self, index: u8) -> u32 {
        self.regs.get(index as usize).copied().unwrap_or(0)
    }

    /// Writes the register; writes to index 0 are silently discarded
    pub fn write(&mut self, index: u8, value: u32) {
        if index != 0 && (index as usize) < self.regs.len() {
            self.regs[index as usize] = value;
        }
    }

    /// Whole-state snapshot for inspection
    pub fn snapshot(&self) -> [u32; 32] {
        self.regs
    }

    pub fn clear(&mut self) {
        self.regs = [0; 32];
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution counters
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    /// Incremented once per tick
    pub cycles: u64,
    /// Incremented on WB retirement of a non-bubble
    pub retired: u64,
    /// Unknown words that passed through decode
    pub decode_anomalies: u64,
}

/// Result of one `step`
#[derive(Clone, Copy, Debug)]
pub struct StepResult {
    pub halted: bool,
    pub cycles: u64,
    pub pc: u32,
}

/// Result of a completed `run`
#[derive(Clone, Copy, Debug)]
pub struct RunResult {
    pub halted: bool,
    pub cycles: u64,
    pub retired: u64,
    pub pc: u32,
}

/// Aggregated statistics for inspection
#[derive(Clone, Copy, Debug)]
pub struct SimStats {
    pub cycles: u64,
    pub retired: u64,
    /// Cycles per retired instruction, 0.0 before anything retired
    pub cpi: f64,
    pub branch: BranchStats,
    pub hazard: HazardStats,
    pub decode_anomalies: u64,
    pub out_of_range_accesses: u64,
}

/// The top-level simulator core
pub struct Core {
    config: Config,
    regs: RegisterFile,
    mem: Memory,
    pipeline: Pipeline,
    predictor: Box<dyn BranchPredictor>,
    pc: u32,
    /// The loaded image, kept so reset can re-install it
    program: Vec<u32>,
    counters: Counters,
    halted: bool,
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("pc", &self.pc)
            .field("halted", &self.halted)
            .field("counters", &self.counters)
            .finish()
    }
}

impl Core {
    pub fn new(config: Config) -> SimulatorResult<Self> {
        if config.base_address % 4 != 0 {
            return Err(SimulatorError::ConfigError(format!(
                "base address {:#010x} is not word-aligned",
                config.base_address
            )));
        }
        if config.base_address as usize >= config.memory_bytes {
            return Err(SimulatorError::ConfigError(format!(
                "base address {:#010x} lies outside memory of {:#x} bytes",
                config.base_address, config.memory_bytes
            )));
        }

        let mut core = Self {
            config,
            regs: RegisterFile::new(),
            mem: Memory::new(config.memory_bytes),
            pipeline: Pipeline::new(),
            predictor: predictor::build(config.predictor),
            pc: config.base_address,
            program: Vec::new(),
            counters: Counters::default(),
            halted: true,
        };
        core.reset();
        Ok(core)
    }

    /// Loads pre-assembled machine words at the base address and resets
    pub fn load_words(&mut self, words: &[u32]) -> SimulatorResult<()> {
        let base = self.config.base_address as usize;
        let end = base + words.len() * 4;
        if end > self.config.memory_bytes {
            self.program.clear();
            self.reset();
            return Err(LoadError::ImageTooLarge {
                words: words.len(),
                base: self.config.base_address,
                memory_bytes: self.config.memory_bytes,
            }
            .into());
        }

        self.program = words.to_vec();
        self.reset();
        Ok(())
    }

    /// Loads a textual program image (one hex word per line)
    pub fn load_image(&mut self, text: &str) -> SimulatorResult<()> {
        match loader::parse_image(text) {
            Ok(words) => self.load_words(&words),
            Err(e) => {
                self.program.clear();
                self.reset();
                Err(e.into())
            }
        }
    }

    /// Loads raw big-endian machine code bytes
    pub fn load_program_image(&mut self, bytes: &[u8]) -> SimulatorResult<()> {
        if bytes.len() % 4 != 0 {
            self.program.clear();
            self.reset();
            return Err(LoadError::RaggedImage(bytes.len()).into());
        }
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        self.load_words(&words)
    }

    /// Returns to the initial post-load state, preserving configuration
    pub fn reset(&mut self) {
        self.regs.clear();
        self.regs.write(29, self.config.sp_init()); // $sp
        self.regs.write(28, self.config.gp_init()); // $gp

        self.mem.clear();
        self.mem.reset_counters();
        let mut addr = self.config.base_address;
        for &word in &self.program {
            self.mem.write_word(addr, word);
            addr += 4;
        }

        self.pc = self.config.base_address;
        self.counters = Counters::default();
        self.pipeline.reset();
        self.predictor.reset();
        self.halted = self.program.is_empty();
    }

    /// Advances exactly one cycle
    pub fn step(&mut self) -> StepResult {
        if !self.halted {
            self.counters.cycles += 1;

            if self.config.pipeline_enabled {
                let text = self.text_range();
                let verbose = self.config.verbose;
                let result = self.pipeline.tick(
                    &mut self.pc,
                    &mut self.regs,
                    &mut self.mem,
                    self.predictor.as_mut(),
                    text,
                    verbose,
                );
                if result.retired {
                    self.counters.retired += 1;
                }
                if result.anomaly {
                    self.counters.decode_anomalies += 1;
                }

                let past_image =
                    self.pipeline.halt_seen() || !self.text_range().contains(&self.pc);
                self.halted = past_image && self.pipeline.state.drained();
            } else {
                let verbose = self.config.verbose;
                let outcome = single_cycle::step(
                    &mut self.pc,
                    &mut self.regs,
                    &mut self.mem,
                    self.predictor.as_mut(),
                    verbose,
                );
                if outcome.retired {
                    self.counters.retired += 1;
                }
                if outcome.anomaly {
                    self.counters.decode_anomalies += 1;
                }
                self.halted = outcome.halt || !self.text_range().contains(&self.pc);
            }
        }

        StepResult { halted: self.halted, cycles: self.counters.cycles, pc: self.pc }
    }

    /// Steps until halt; errs with `SafetyCapReached` after `max_cycles`
    /// cycles, leaving the state valid for inspection
    pub fn run(&mut self, max_cycles: u64) -> SimulatorResult<RunResult> {
        let mut executed = 0u64;
        while !self.halted {
            if executed >= max_cycles {
                return Err(ExecutionError::SafetyCapReached(max_cycles).into());
            }
            self.step();
            executed += 1;
        }
        Ok(RunResult {
            halted: true,
            cycles: self.counters.cycles,
            retired: self.counters.retired,
            pc: self.pc,
        })
    }

    /// Switches between the pipelined and single-cycle paths; clears any
    /// in-flight pipeline state
    pub fn enable_pipeline(&mut self, enabled: bool) {
        self.config.pipeline_enabled = enabled;
        self.pipeline.reset();
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn get_register(&self, index: u8) -> u32 {
        self.regs.read(index)
    }

    /// Debug poke; writes to $zero are discarded
    pub fn set_register(&mut self, index: u8, value: u32) {
        self.regs.write(index, value);
    }

    pub fn get_memory_word(&self, address: u32) -> u32 {
        self.mem.peek_word(address)
    }

    pub fn set_memory_word(&mut self, address: u32, value: u32) {
        self.mem.write_word(address, value);
    }

    pub fn get_memory_byte(&self, address: u32) -> u8 {
        self.mem.peek_byte(address)
    }

    pub fn registers(&self) -> [u32; 32] {
        self.regs.snapshot()
    }

    pub fn stats(&self) -> SimStats {
        let cycles = self.counters.cycles;
        let retired = self.counters.retired;
        SimStats {
            cycles,
            retired,
            cpi: if retired == 0 { 0.0 } else { cycles as f64 / retired as f64 },
            branch: self.predictor.stats(),
            hazard: self.pipeline.hazards.stats,
            decode_anomalies: self.counters.decode_anomalies,
            out_of_range_accesses: self.mem.out_of_range_count(),
        }
    }

    /// Formats the register file with names, hex and decimal values
    pub fn register_dump(&self) -> String {
        let mut out = String::new();
        for (i, name) in REG_NAMES.iter().enumerate() {
            let value = self.regs.read(i as u8);
            let _ = writeln!(out, "{}: {:#010x} ({})", name, value, value);
        }
        let _ = writeln!(out, "PC: {:#010x}", self.pc);
        out
    }

    /// Formats the pipeline latch occupancy
    pub fn pipeline_dump(&self) -> String {
        if self.config.pipeline_enabled {
            self.pipeline.dump()
        } else {
            "Pipeline disabled\n".to_string()
        }
    }

    /// Formats the branch predictor statistics block
    pub fn branch_stats_dump(&self) -> String {
        let stats = self.predictor.stats();
        let mut out = String::from("Branch Predictor Statistics:\n");
        let _ = writeln!(out, "Total Branches: {}", stats.total);
        let _ = writeln!(out, "Correct Predictions: {}", stats.correct);
        let _ = writeln!(out, "Mispredictions: {}", stats.mispredicted);
        let _ = writeln!(out, "Accuracy: {:.2}%", stats.accuracy() * 100.0);
        out
    }

    /// Formats the hazard statistics block
    pub fn hazard_stats_dump(&self) -> String {
        let stats = self.pipeline.hazards.stats;
        let mut out = String::from("Hazard Detection Statistics:\n");
        let _ = writeln!(out, "Data Hazards: {}", stats.data_hazards);
        let _ = writeln!(out, "Control Hazards: {}", stats.control_hazards);
        let _ = writeln!(out, "Forwarding Events: {}", stats.forwards);
        let _ = writeln!(out, "Stalls Inserted: {}", stats.stalls);
        let _ = writeln!(out, "Flushes Performed: {}", stats.flushes);
        out
    }

    fn text_range(&self) -> Range<u32> {
        let base = self.config.base_address;
        base..base + (self.program.len() as u32) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::encode;
    use crate::instruction::Op;

    const HALT_WORD: u32 = 0xffff_ffff;

    fn core_with(config: Config) -> Core {
        Core::new(config).unwrap()
    }

    fn pipelined() -> Core {
        core_with(Config::default())
    }

    /// addi $t1, 10; addi $t0, 0; loop: addi $t0, 1; bne $t0, $t1, loop
    fn counting_loop() -> Vec<u32> {
        vec![
            encode::i_type(Op::Addi, 9, 0, 10),
            encode::i_type(Op::Addi, 8, 0, 0),
            encode::i_type(Op::Addi, 8, 8, 1),
            encode::branch(Op::Bne, 8, 9, -2),
        ]
    }

    #[test]
    fn test_s1_single_add() {
        let mut core = pipelined();
        core.load_words(&[0x2002_0005, 0x2003_0003, 0x0062_2020]).unwrap();
        core.run(100).unwrap();

        assert_eq!(core.get_register(2), 5); // $v0
        assert_eq!(core.get_register(3), 3); // $v1
        assert_eq!(core.get_register(4), 8); // $a0

        let stats = core.stats();
        assert_eq!(stats.retired, 3);
        // Forwarding avoids all stalls: 5 cycles for the first instruction,
        // one more for each of the other two
        assert_eq!(stats.cycles, 7);
        assert_eq!(stats.hazard.stalls, 0);
        assert!(stats.hazard.forwards >= 2);
    }

    #[test]
    fn test_s2_load_use_stall() {
        let mut core = pipelined();
        core.load_words(&[0xac09_0000, 0x8c08_0000, 0x0109_4020]).unwrap();
        core.set_register(9, 7); // $t1

        core.run(100).unwrap();
        assert_eq!(core.get_register(8), 14); // $t0 = loaded 7 + 7
        assert_eq!(core.stats().hazard.stalls, 1);
    }

    #[test]
    fn test_s3_btfn_backward_loop() {
        let mut core =
            core_with(Config { predictor: PredictorKind::Btfn, ..Config::default() });
        core.load_words(&counting_loop()).unwrap();
        core.run(1000).unwrap();

        assert_eq!(core.get_register(8), 10);
        let branch = core.stats().branch;
        assert_eq!(branch.total, 10);
        // BTFN predicts every backward iteration; only the exit mispredicts
        assert_eq!(branch.mispredicted, 1);
        assert_eq!(branch.correct, 9);
    }

    #[test]
    fn test_s5_jal_jr_round_trip() {
        let mut core = pipelined();
        core.load_words(&[
            encode::j_type(Op::Jal, 0x10), // 0x00: jal leaf
            0,                             // 0x04: never reached ($ra is pc+8)
            encode::i_type(Op::Addi, 2, 0, 7), // 0x08: runs on return
            HALT_WORD,                     // 0x0c
            encode::i_type(Op::Addi, 3, 0, 3), // 0x10: leaf body
            encode::reg_jump(Op::Jr, 0, 31),   // 0x14: jr $ra
        ])
        .unwrap();
        core.run(100).unwrap();

        assert_eq!(core.get_register(31), 0x08); // $ra = pc_of_jal + 8
        assert_eq!(core.get_register(3), 3); // leaf ran
        assert_eq!(core.get_register(2), 7); // caller resumed at $ra
    }

    #[test]
    fn test_s6_store_load_big_endian() {
        let mut core = pipelined();
        core.load_words(&[
            encode::i_type(Op::Lui, 8, 0, 0x1122),  // $t0 = 0x11220000
            encode::i_type(Op::Ori, 8, 8, 0x3344),  // $t0 = 0x11223344
            encode::mem(Op::Sw, 8, 0x0100, 0),      // mem[0x100] = $t0
        ])
        .unwrap();
        core.run(100).unwrap();

        assert_eq!(core.get_memory_word(0x0100), 0x1122_3344);
        // Byte order in memory is big-endian
        assert_eq!(core.get_memory_byte(0x0100), 0x11);
        assert_eq!(core.get_memory_byte(0x0101), 0x22);
        assert_eq!(core.get_memory_byte(0x0102), 0x33);
        assert_eq!(core.get_memory_byte(0x0103), 0x44);
    }

    #[test]
    fn test_pipeline_matches_single_cycle() {
        let program = counting_loop();

        let mut piped = pipelined();
        piped.load_words(&program).unwrap();
        piped.run(10_000).unwrap();

        let mut simple = core_with(Config { pipeline_enabled: false, ..Config::default() });
        simple.load_words(&program).unwrap();
        simple.run(10_000).unwrap();

        assert_eq!(piped.registers(), simple.registers());
        // The single-cycle path retires one instruction per cycle
        let stats = simple.stats();
        assert_eq!(stats.cycles, stats.retired);
        assert!(piped.stats().cycles > piped.stats().retired);
    }

    #[test]
    fn test_mispredict_penalty_is_two_bubbles() {
        // beq $zero, $zero, +1 (always taken), a skipped filler, a target
        let program = vec![
            encode::branch(Op::Beq, 0, 0, 1),
            encode::i_type(Op::Addi, 8, 8, 1),
            encode::i_type(Op::Addi, 9, 0, 5),
        ];

        let mut not_taken =
            core_with(Config { predictor: PredictorKind::StaticNotTaken, ..Config::default() });
        not_taken.load_words(&program).unwrap();
        not_taken.run(100).unwrap();

        let mut taken =
            core_with(Config { predictor: PredictorKind::StaticTaken, ..Config::default() });
        taken.load_words(&program).unwrap();
        taken.run(100).unwrap();

        // Same architectural outcome
        assert_eq!(not_taken.get_register(8), 0);
        assert_eq!(taken.get_register(8), 0);
        assert_eq!(not_taken.get_register(9), 5);
        assert_eq!(taken.get_register(9), 5);

        // The misprediction costs exactly two bubble cycles
        assert_eq!(not_taken.stats().cycles, taken.stats().cycles + 2);
        assert_eq!(not_taken.stats().branch.mispredicted, 1);
        assert_eq!(taken.stats().branch.mispredicted, 0);
    }

    #[test]
    fn test_jump_costs_one_bubble() {
        // j +2 skips one instruction; compare against straight-line code of
        // the same retired length
        let jumped = vec![
            encode::j_type(Op::J, 0x08),
            encode::i_type(Op::Addi, 8, 8, 1), // skipped
            encode::i_type(Op::Addi, 9, 0, 5),
        ];
        let straight = vec![
            encode::i_type(Op::Addi, 10, 0, 1),
            encode::i_type(Op::Addi, 9, 0, 5),
        ];

        let mut with_jump = pipelined();
        with_jump.load_words(&jumped).unwrap();
        with_jump.run(100).unwrap();

        let mut linear = pipelined();
        linear.load_words(&straight).unwrap();
        linear.run(100).unwrap();

        assert_eq!(with_jump.get_register(8), 0);
        assert_eq!(with_jump.get_register(9), 5);
        // Two retired instructions each; the jump adds exactly one bubble
        assert_eq!(with_jump.stats().retired, linear.stats().retired);
        assert_eq!(with_jump.stats().cycles, linear.stats().cycles + 1);
    }

    #[test]
    fn test_zero_register_is_immutable() {
        let mut core = pipelined();
        // addi $zero, $zero, 5 then add $zero, $t0, $t0
        core.load_words(&[
            encode::i_type(Op::Addi, 0, 0, 5),
            encode::i_type(Op::Addi, 8, 0, 3),
            encode::r_type(Op::Add, 0, 8, 8),
        ])
        .unwrap();
        core.run(100).unwrap();

        assert_eq!(core.get_register(0), 0);
        core.set_register(0, 42);
        assert_eq!(core.get_register(0), 0);
    }

    #[test]
    fn test_retirement_grows_by_at_most_one() {
        let mut core = pipelined();
        core.load_words(&counting_loop()).unwrap();

        let mut last_retired = 0;
        let mut last_cycles = 0;
        loop {
            let result = core.step();
            let stats = core.stats();
            assert!(stats.retired == last_retired || stats.retired == last_retired + 1);
            assert!(stats.cycles >= last_cycles);
            assert!(stats.retired <= stats.cycles);
            last_retired = stats.retired;
            last_cycles = stats.cycles;
            if result.halted {
                break;
            }
        }
    }

    #[test]
    fn test_halt_pseudo_instruction() {
        let mut core = pipelined();
        core.load_words(&[
            encode::i_type(Op::Addi, 8, 0, 1),
            HALT_WORD,
            encode::i_type(Op::Addi, 8, 8, 1), // never fetched into execution
        ])
        .unwrap();
        core.run(100).unwrap();

        assert!(core.halted());
        assert_eq!(core.get_register(8), 1);
    }

    #[test]
    fn test_safety_cap() {
        let mut core = pipelined();
        // j 0: spins forever
        core.load_words(&[encode::j_type(Op::J, 0)]).unwrap();

        let err = core.run(50).unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::ExecutionError(ExecutionError::SafetyCapReached(50))
        ));
        // State stays valid for inspection
        assert!(!core.halted());
        assert_eq!(core.stats().cycles, 50);
    }

    #[test]
    fn test_decode_anomaly_is_counted_not_fatal() {
        let mut core = pipelined();
        core.load_words(&[
            0x0000_003e, // unmapped funct
            encode::i_type(Op::Addi, 8, 0, 9),
        ])
        .unwrap();
        core.run(100).unwrap();

        assert_eq!(core.stats().decode_anomalies, 1);
        assert_eq!(core.get_register(8), 9);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut core = pipelined();
        core.load_words(&counting_loop()).unwrap();
        core.run(1000).unwrap();
        let first_run = core.stats().cycles;
        assert_ne!(core.get_register(8), 0);

        core.reset();
        assert_eq!(core.get_register(8), 0);
        assert_eq!(core.stats().cycles, 0);
        assert_eq!(core.pc(), 0);
        assert_eq!(core.get_register(29), Config::default().sp_init());

        core.run(1000).unwrap();
        assert_eq!(core.stats().cycles, first_run);
        assert_eq!(core.get_register(8), 10);
    }

    #[test]
    fn test_text_segment_layout() {
        let mut core = core_with(Config::text_segment());
        core.load_words(&[0x2002_0005, 0x2003_0003, 0x0062_2020]).unwrap();
        assert_eq!(core.pc(), TEXT_BASE);
        core.run(100).unwrap();
        assert_eq!(core.get_register(4), 8);
    }

    #[test]
    fn test_misaligned_base_is_rejected() {
        let err = Core::new(Config { base_address: 2, ..Config::default() }).unwrap_err();
        assert!(matches!(err, SimulatorError::ConfigError(_)));
    }

    #[test]
    fn test_image_too_large() {
        let mut core = core_with(Config {
            memory_bytes: 16,
            base_address: 0,
            ..Config::default()
        });
        let err = core.load_words(&[0; 5]).unwrap_err();
        assert!(matches!(
            err,
            SimulatorError::LoadError(LoadError::ImageTooLarge { words: 5, .. })
        ));
        // State is left reset
        assert!(core.halted());
    }

    #[test]
    fn test_forwarding_from_producer_to_consumer() {
        // Each consumer within three instructions of its producer must see
        // the produced value, not the stale register
        let mut core = pipelined();
        core.load_words(&[
            encode::i_type(Op::Addi, 8, 0, 11),   // $t0 = 11
            encode::r_type(Op::Add, 9, 8, 8),     // $t1 = 22 (EX/MEM forward)
            encode::r_type(Op::Add, 10, 8, 9),    // $t2 = 33 (MEM/WB + EX/MEM)
            encode::r_type(Op::Add, 11, 8, 10),   // $t3 = 44 (regfile + EX/MEM)
        ])
        .unwrap();
        core.run(100).unwrap();

        assert_eq!(core.get_register(9), 22);
        assert_eq!(core.get_register(10), 33);
        assert_eq!(core.get_register(11), 44);
    }

    #[test]
    fn test_store_uses_forwarded_value() {
        let mut core = pipelined();
        core.load_words(&[
            encode::i_type(Op::Addi, 8, 0, 0x55), // $t0 = 0x55
            encode::mem(Op::Sw, 8, 0x40, 0),      // needs $t0 forwarded
        ])
        .unwrap();
        core.run(100).unwrap();
        assert_eq!(core.get_memory_word(0x40), 0x55);
    }

    #[test]
    fn test_two_bit_predictor_learns_loop() {
        let mut core = core_with(Config {
            predictor: PredictorKind::TwoBitSat { index_bits: 10 },
            ..Config::default()
        });
        core.load_words(&counting_loop()).unwrap();
        core.run(1000).unwrap();

        let branch = core.stats().branch;
        assert_eq!(branch.total, 10);
        // One warmup mispredict out of weakly-not-taken, one at the exit
        assert_eq!(branch.correct, 8);
    }

    #[test]
    fn test_stats_cpi() {
        let mut core = pipelined();
        core.load_words(&[0x2002_0005, 0x2003_0003, 0x0062_2020]).unwrap();
        core.run(100).unwrap();
        let stats = core.stats();
        assert!((stats.cpi - stats.cycles as f64 / stats.retired as f64).abs() < 1e-12);
    }
}
