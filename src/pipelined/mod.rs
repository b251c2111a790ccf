//! Pipelined implementation: a classic five-stage in-order pipeline with
//! operand forwarding, load-use stalling and speculative fetch.
//!
//! Each tick updates the latches in reverse stage order (WB, MEM, EX, ID,
//! IF) against a copy of the previous cycle's state, so every stage reads
//! the outputs of the cycle before. Running WB before ID gives the register
//! file its write-before-read behaviour within a cycle.

use std::fmt::Write as _;
use std::ops::Range;

use crate::cpu::RegisterFile;
use crate::instruction::Instruction;
use crate::instruction::Op;
use crate::memory::Memory;
use crate::predictor::BranchPredictor;

pub mod hazard;
pub mod pipeline;
pub mod stages;

use hazard::HazardUnit;
use pipeline::IdExLatch;
use pipeline::IfIdLatch;
use pipeline::PipelineState;

/// What one tick produced
#[derive(Clone, Copy, Debug, Default)]
pub struct TickResult {
    /// A non-bubble retired from MEM/WB
    pub retired: bool,
    /// An unknown word passed through decode
    pub anomaly: bool,
}

/// The pipeline proper: four latches plus the hazard unit
#[derive(Default)]
pub struct Pipeline {
    pub state: PipelineState,
    pub hazards: HazardUnit,
    /// Set when the halt pseudo-instruction reaches decode; fetch stops and
    /// the instructions already in flight drain out
    halt_seen: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the latches and the hazard statistics
    pub fn reset(&mut self) {
        self.state = PipelineState::default();
        self.hazards.reset();
        self.halt_seen = false;
    }

    /// The halt pseudo-instruction has been decoded
    pub fn halt_seen(&self) -> bool {
        self.halt_seen
    }

    /// Advances the pipeline by exactly one cycle. `text` is the address
    /// range holding program words; fetches outside it produce bubbles so
    /// the pipeline drains past the image end.
    pub fn tick(
        &mut self,
        pc: &mut u32,
        regs: &mut RegisterFile,
        mem: &mut Memory,
        predictor: &mut dyn BranchPredictor,
        text: Range<u32>,
        verbose: bool,
    ) -> TickResult {
        let cur = self.state;
        let mut next = PipelineState::default();

        // WB first: decode below must observe this cycle's write-back
        let retired = stages::write_back(&cur, regs);
        stages::memory_access(&cur, &mut next, mem);
        let redirect = stages::execute(&cur, &mut next, &mut self.hazards, predictor, verbose);

        let mut anomaly = false;
        let mut stalled = false;
        let mut jump_target = None;

        // When EX just caught a misprediction, everything in IF/ID is
        // wrong-path: it gets flushed below and must not decode, stall,
        // halt or count anything this cycle
        if redirect.is_none() && cur.if_id.valid {
            let inst = Instruction::decode(cur.if_id.raw, cur.if_id.pc);
            if inst.op == Op::Unknown {
                anomaly = true;
            }

            if inst.op == Op::Halt {
                // Stop fetching; what is already in flight completes
                self.halt_seen = true;
            } else if self.hazards.check_load_use(&cur, &inst) {
                // Freeze PC and IF/ID; the bubble goes into ID/EX
                next.if_id = cur.if_id;
                stalled = true;
                if verbose {
                    eprintln!("[VERBOSE] Inserting bubble due to load-use hazard");
                }
            } else {
                jump_target = stages::decode(&inst, &cur, &mut next, regs);
            }
        }

        if redirect.is_none() && !stalled && !self.halt_seen {
            if let Some(target) = jump_target {
                // Direct jumps resolve at decode: skip this fetch slot
                // (one bubble) and steer PC at the target
                self.hazards.note_control_hazard();
                self.hazards.note_flush();
                if verbose {
                    eprintln!("[VERBOSE] Jump redirect to {:#010x}", target);
                }
                *pc = target;
            } else if text.contains(pc) {
                *pc = stages::fetch(*pc, mem, &*predictor, &mut next);
            }
        }

        // A misprediction discovered in EX kills both younger instructions
        // and overrides whatever IF just did
        if let Some(target) = redirect {
            next.if_id = IfIdLatch::default();
            next.id_ex = IdExLatch::default();
            self.hazards.note_flush();
            if verbose {
                eprintln!("[VERBOSE] Flushing, redirect to {:#010x}", target);
            }
            *pc = target;
        }

        self.state = next;
        TickResult { retired, anomaly }
    }

    /// Formats the latch occupancy, stage by stage
    pub fn dump(&self) -> String {
        let mut out = String::from("Pipeline State:\n");
        let _ = writeln!(out, "IF/ID:  {}", Self::slot_if_id(&self.state.if_id));
        let _ = writeln!(
            out,
            "ID/EX:  {}",
            Self::slot(self.state.id_ex.valid, &self.state.id_ex.inst)
        );
        let _ = writeln!(
            out,
            "EX/MEM: {}",
            Self::slot(self.state.ex_mem.valid, &self.state.ex_mem.inst)
        );
        let _ = writeln!(
            out,
            "MEM/WB: {}",
            Self::slot(self.state.mem_wb.valid, &self.state.mem_wb.inst)
        );
        out
    }

    fn slot_if_id(latch: &IfIdLatch) -> String {
        if latch.valid {
            Instruction::decode(latch.raw, latch.pc).to_string()
        } else {
            "empty".to_string()
        }
    }

    fn slot(valid: bool, inst: &Instruction) -> String {
        if valid {
            inst.to_string()
        } else {
            "empty".to_string()
        }
    }
}
