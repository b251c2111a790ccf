//! Pipeline state: the four inter-stage latches

use crate::instruction::Instruction;

/// Pipeline state = 4 pipeline latches
#[derive(Clone, Copy, Default)]
pub struct PipelineState {
    pub if_id: IfIdLatch,
    pub id_ex: IdExLatch,
    pub ex_mem: ExMemLatch,
    pub mem_wb: MemWbLatch,
}

impl PipelineState {
    /// All latches are bubbles
    pub fn drained(&self) -> bool {
        !self.if_id.valid && !self.id_ex.valid && !self.ex_mem.valid && !self.mem_wb.valid
    }

    /// Operand 1 can be forwarded from the previous execution result.
    /// See P&H p. 300
    pub fn ex_forward_a(&self) -> bool {
        self.id_ex.valid
            && self.id_ex.inst.flags.reads_rs
            && self.writes_through_ex_mem(self.id_ex.inst.rs)
    }

    /// Operand 2 can be forwarded from the previous execution result
    pub fn ex_forward_b(&self) -> bool {
        self.id_ex.valid
            && self.id_ex.inst.flags.reads_rt
            && self.writes_through_ex_mem(self.id_ex.inst.rt)
    }

    /// Operand 1 can be forwarded from the previous memory access result.
    /// Precondition: ex_forward_a is false. See P&H p. 301
    pub fn mem_forward_a(&self) -> bool {
        self.id_ex.valid
            && self.id_ex.inst.flags.reads_rs
            && self.writes_through_mem_wb(self.id_ex.inst.rs)
    }

    /// Operand 2 can be forwarded from the previous memory access result.
    /// Precondition: ex_forward_b is false
    pub fn mem_forward_b(&self) -> bool {
        self.id_ex.valid
            && self.id_ex.inst.flags.reads_rt
            && self.writes_through_mem_wb(self.id_ex.inst.rt)
    }

    fn writes_through_ex_mem(&self, reg: u8) -> bool {
        self.ex_mem.valid
            && self.ex_mem.inst.ctrl.reg_write
            && self.ex_mem.write_reg != 0
            && self.ex_mem.write_reg == reg
    }

    fn writes_through_mem_wb(&self, reg: u8) -> bool {
        self.mem_wb.valid
            && self.mem_wb.inst.ctrl.reg_write
            && self.mem_wb.write_reg != 0
            && self.mem_wb.write_reg == reg
    }

    /// Load-use hazard between the load in ID/EX and the instruction about
    /// to be decoded: the load's value only exists after MEM, so one stall
    /// cycle is unavoidable even with forwarding
    pub fn load_use_hazard(&self, fetched: &Instruction) -> bool {
        if !self.id_ex.valid || !self.id_ex.inst.ctrl.mem_read {
            return false;
        }
        let load_dest = self.id_ex.inst.rt;
        load_dest != 0
            && ((fetched.flags.reads_rs && fetched.rs == load_dest)
                || (fetched.flags.reads_rt && fetched.rt == load_dest))
    }

    /// Value the MEM/WB latch is about to write back
    pub fn wb_value(&self) -> u32 {
        if self.mem_wb.mem_to_reg {
            self.mem_wb.mem_data
        } else {
            self.mem_wb.alu_result
        }
    }
}

/// IF/ID latch
#[derive(Clone, Copy, Default)]
pub struct IfIdLatch {
    pub valid: bool,
    /// Fetch address
    pub pc: u32,
    /// Raw instruction word
    pub raw: u32,
    /// What the predictor said at fetch time
    pub predicted_taken: bool,
}

/// ID/EX latch
#[derive(Clone, Copy, Default)]
pub struct IdExLatch {
    pub valid: bool,
    pub pc: u32,
    /// Decoded instruction (carries the control signals)
    pub inst: Instruction,
    /// Operand 1, read from the register file
    pub rs_value: u32,
    /// Operand 2, read from the register file
    pub rt_value: u32,
    /// Sign-extended immediate
    pub imm: i32,
    /// Destination register, 0 when none
    pub write_reg: u8,
    pub predicted_taken: bool,
}

/// EX/MEM latch
#[derive(Clone, Copy, Default)]
pub struct ExMemLatch {
    pub valid: bool,
    pub pc: u32,
    pub inst: Instruction,
    /// Execution result (memory address for loads and stores)
    pub alu_result: u32,
    /// Forwarding-resolved rt value, kept for stores
    pub rt_value: u32,
    pub write_reg: u8,
    /// ALU zero flag
    pub zero: bool,
}

/// MEM/WB latch
#[derive(Clone, Copy, Default)]
pub struct MemWbLatch {
    pub valid: bool,
    pub pc: u32,
    pub inst: Instruction,
    pub alu_result: u32,
    /// Data loaded from memory
    pub mem_data: u32,
    pub write_reg: u8,
    /// Select mem_data over alu_result at write-back
    pub mem_to_reg: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::encode;
    use crate::instruction::Op;

    fn decoded(word: u32) -> Instruction {
        Instruction::decode(word, 0)
    }

    #[test]
    fn test_load_use_hazard_detection() {
        let mut state = PipelineState::default();
        // lw $t0, 0($zero) sitting in ID/EX
        state.id_ex.valid = true;
        state.id_ex.inst = decoded(encode::mem(Op::Lw, 8, 0, 0));

        // add $t0, $t0, $t1 about to decode
        let consumer = decoded(encode::r_type(Op::Add, 8, 8, 9));
        assert!(state.load_use_hazard(&consumer));

        // An independent instruction does not stall
        let other = decoded(encode::r_type(Op::Add, 10, 11, 12));
        assert!(!state.load_use_hazard(&other));

        // A non-load producer does not stall either
        state.id_ex.inst = decoded(encode::r_type(Op::Add, 8, 9, 10));
        assert!(!state.load_use_hazard(&consumer));
    }

    #[test]
    fn test_forward_predicates_respect_zero() {
        let mut state = PipelineState::default();
        // Producer "writing" $zero must not forward
        state.ex_mem.valid = true;
        state.ex_mem.inst = decoded(encode::r_type(Op::Add, 0, 1, 2));
        state.ex_mem.write_reg = 0;

        state.id_ex.valid = true;
        state.id_ex.inst = decoded(encode::r_type(Op::Add, 3, 0, 0));
        assert!(!state.ex_forward_a());
        assert!(!state.ex_forward_b());
    }

    #[test]
    fn test_forward_priority_sources() {
        let mut state = PipelineState::default();
        state.id_ex.valid = true;
        state.id_ex.inst = decoded(encode::r_type(Op::Add, 4, 8, 9));

        state.ex_mem.valid = true;
        state.ex_mem.inst = decoded(encode::i_type(Op::Addi, 8, 0, 1));
        state.ex_mem.write_reg = 8;

        state.mem_wb.valid = true;
        state.mem_wb.inst = decoded(encode::i_type(Op::Addi, 9, 0, 2));
        state.mem_wb.write_reg = 9;

        // rs comes from EX/MEM, rt from MEM/WB
        assert!(state.ex_forward_a() && !state.ex_forward_b());
        assert!(state.mem_forward_b() && !state.mem_forward_a());
    }

    #[test]
    fn test_drained() {
        let mut state = PipelineState::default();
        assert!(state.drained());
        state.ex_mem.valid = true;
        assert!(!state.drained());
    }
}
