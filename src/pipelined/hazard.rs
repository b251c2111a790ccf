//! Hazard detection and forwarding decisions

use super::pipeline::PipelineState;
use crate::instruction::Instruction;

/// Where an ALU operand should be sourced from this cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Forward {
    /// The register file value latched at decode
    None,
    /// The execution result one stage ahead
    ExMem,
    /// The write-back value two stages ahead
    MemWb,
}

/// Hazard statistics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HazardStats {
    pub data_hazards: u64,
    pub control_hazards: u64,
    pub forwards: u64,
    pub stalls: u64,
    pub flushes: u64,
}

/// Observes the latches each cycle and decides forwarding, stalling and
/// flushing. Forwarding priority is EX/MEM over MEM/WB over the register
/// file; the younger result is always the correct one.
#[derive(Default)]
pub struct HazardUnit {
    pub stats: HazardStats,
}

impl HazardUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarding source for ALU operand 1 (rs)
    pub fn forward_a(&mut self, state: &PipelineState) -> Forward {
        if state.ex_forward_a() {
            self.note_forward();
            Forward::ExMem
        } else if state.mem_forward_a() {
            self.note_forward();
            Forward::MemWb
        } else {
            Forward::None
        }
    }

    /// Forwarding source for ALU operand 2 (rt)
    pub fn forward_b(&mut self, state: &PipelineState) -> Forward {
        if state.ex_forward_b() {
            self.note_forward();
            Forward::ExMem
        } else if state.mem_forward_b() {
            self.note_forward();
            Forward::MemWb
        } else {
            Forward::None
        }
    }

    /// Load-use check for the instruction about to enter decode; a hit
    /// costs one stall cycle
    pub fn check_load_use(&mut self, state: &PipelineState, fetched: &Instruction) -> bool {
        if state.load_use_hazard(fetched) {
            self.stats.data_hazards += 1;
            self.stats.stalls += 1;
            true
        } else {
            false
        }
    }

    /// A branch or jump reached its resolution stage
    pub fn note_control_hazard(&mut self) {
        self.stats.control_hazards += 1;
    }

    /// Wrong-path instructions were turned into bubbles
    pub fn note_flush(&mut self) {
        self.stats.flushes += 1;
    }

    fn note_forward(&mut self) {
        self.stats.data_hazards += 1;
        self.stats.forwards += 1;
    }

    pub fn reset(&mut self) {
        self.stats = HazardStats::default();
    }
}
