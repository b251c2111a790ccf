//! The five stages adapted for pipelined execution

use super::hazard::Forward;
use super::hazard::HazardUnit;
use super::pipeline::ExMemLatch;
use super::pipeline::IdExLatch;
use super::pipeline::IfIdLatch;
use super::pipeline::MemWbLatch;
use super::pipeline::PipelineState;
use crate::alu;
use crate::alu::AluResult;
use crate::alu::AluSrc;
use crate::cpu::RegisterFile;
use crate::instruction::Instruction;
use crate::instruction::Op;
use crate::memory::Memory;
use crate::predictor::BranchPredictor;

/// WB stage: retire MEM/WB, writing the selected value to the register file.
/// Runs first in the tick so decode observes this cycle's write-back.
pub fn write_back(cur: &PipelineState, regs: &mut RegisterFile) -> bool {
    if !cur.mem_wb.valid {
        return false;
    }
    if cur.mem_wb.inst.ctrl.reg_write {
        regs.write(cur.mem_wb.write_reg, cur.wb_value());
    }
    true
}

/// MEM stage: perform the load or store at the ALU-computed address
pub fn memory_access(cur: &PipelineState, next: &mut PipelineState, mem: &mut Memory) {
    if !cur.ex_mem.valid {
        return;
    }
    let latch = cur.ex_mem;
    let inst = latch.inst;

    let mut mem_data = 0;
    if inst.ctrl.mem_read {
        mem_data = load_data(mem, inst.op, latch.alu_result);
    } else if inst.ctrl.mem_write {
        store_data(mem, inst.op, latch.alu_result, latch.rt_value);
    }

    next.mem_wb = MemWbLatch {
        valid: true,
        pc: latch.pc,
        inst,
        alu_result: latch.alu_result,
        mem_data,
        write_reg: latch.write_reg,
        mem_to_reg: inst.ctrl.mem_read,
    };
}

/// EX stage: resolve forwarded operands, run the ALU, and resolve branches.
/// Returns a redirect PC when the speculative fetch went the wrong way.
pub fn execute(
    cur: &PipelineState,
    next: &mut PipelineState,
    hazards: &mut HazardUnit,
    predictor: &mut dyn BranchPredictor,
    verbose: bool,
) -> Option<u32> {
    if !cur.id_ex.valid {
        return None;
    }
    let latch = cur.id_ex;
    let inst = latch.inst;

    // EX hazard -> MEM hazard -> value latched at decode
    let op1 = match hazards.forward_a(cur) {
        Forward::ExMem => cur.ex_mem.alu_result,
        Forward::MemWb => cur.wb_value(),
        Forward::None => latch.rs_value,
    };
    let op2_reg = match hazards.forward_b(cur) {
        Forward::ExMem => cur.ex_mem.alu_result,
        Forward::MemWb => cur.wb_value(),
        Forward::None => latch.rt_value,
    };

    let result = run_alu(&inst, op1, op2_reg, latch.imm);

    if verbose {
        eprintln!("[VERBOSE] EX {:#010x}: {} -> {:#010x}", latch.pc, inst, result.value);
    }

    next.ex_mem = ExMemLatch {
        valid: true,
        pc: latch.pc,
        inst,
        alu_result: result.value,
        rt_value: op2_reg,
        write_reg: latch.write_reg,
        zero: result.zero,
    };

    // Branch resolution happens here; the fetch stage already guessed
    if inst.flags.is_branch {
        hazards.note_control_hazard();
        let taken = inst.branch_taken(op1, op2_reg);
        let target = inst.branch_target();
        predictor.update(latch.pc, taken, target);

        if taken != latch.predicted_taken {
            return Some(if taken { target } else { latch.pc.wrapping_add(4) });
        }
    } else if matches!(inst.op, Op::Jr | Op::Jalr) {
        // Register jumps carry their target in rs
        hazards.note_control_hazard();
        return Some(op1);
    }

    None
}

/// ID stage: latch register reads and the decoded instruction into ID/EX.
/// Returns the jump target when the instruction is a direct jump, which
/// resolves right here.
pub fn decode(
    inst: &Instruction,
    cur: &PipelineState,
    next: &mut PipelineState,
    regs: &RegisterFile,
) -> Option<u32> {
    let latch = cur.if_id;

    next.id_ex = IdExLatch {
        valid: true,
        pc: latch.pc,
        inst: *inst,
        rs_value: regs.read(inst.rs),
        rt_value: regs.read(inst.rt),
        imm: inst.imm_signed(),
        write_reg: inst.write_reg().unwrap_or(0),
        predicted_taken: latch.predicted_taken,
    };

    match inst.op {
        Op::J | Op::Jal => Some(inst.jump_target()),
        _ => None,
    }
}

/// IF stage: fetch the word at PC and compute the speculative next PC,
/// consulting the branch predictor on decoded branches
pub fn fetch(
    pc: u32,
    mem: &mut Memory,
    predictor: &dyn BranchPredictor,
    next: &mut PipelineState,
) -> u32 {
    let raw = mem.read_word(pc);
    let fetched = Instruction::decode(raw, pc);

    let mut next_pc = pc.wrapping_add(4);
    let mut predicted_taken = false;
    if fetched.flags.is_branch {
        let target = fetched.branch_target();
        predicted_taken = predictor.predict(pc, target);
        if predicted_taken {
            next_pc = target;
        }
    }

    next.if_id = IfIdLatch { valid: true, pc, raw, predicted_taken };
    next_pc
}

/// ALU portion of the EX stage, shared with the single-cycle path: selects
/// the second operand, then runs the operation the control signals name
pub fn run_alu(inst: &Instruction, op1: u32, op2_reg: u32, imm_signed: i32) -> AluResult {
    // Logical immediates are zero-extended, everything else sign-extended
    let imm_operand = match inst.op {
        Op::Andi | Op::Ori | Op::Xori => inst.imm as u32,
        _ => imm_signed as u32,
    };
    let op2 = match inst.ctrl.alu_src {
        AluSrc::Reg => op2_reg,
        AluSrc::Imm => imm_operand,
    };

    match inst.op {
        Op::Lui => AluResult::of((inst.imm as u32) << 16),
        // The link value travels down the pipeline as the ALU result
        Op::Jal | Op::Jalr => AluResult::of(inst.addr.wrapping_add(8)),
        Op::Sll | Op::Srl | Op::Sra => {
            alu::execute_shift(op2_reg, inst.shamt as u32, inst.ctrl.alu_op)
        }
        _ => alu::execute(op1, op2, inst.ctrl.alu_op),
    }
}

/// Memory load with the width and extension of the given operation
pub fn load_data(mem: &mut Memory, op: Op, address: u32) -> u32 {
    match op {
        Op::Lw => mem.read_word(address),
        Op::Lh => mem.read_half(address) as i16 as i32 as u32,
        Op::Lhu => mem.read_half(address) as u32,
        Op::Lb => mem.read_byte(address) as i8 as i32 as u32,
        Op::Lbu => mem.read_byte(address) as u32,
        _ => 0,
    }
}

/// Memory store with the width of the given operation
pub fn store_data(mem: &mut Memory, op: Op, address: u32, value: u32) {
    match op {
        Op::Sw => mem.write_word(address, value),
        Op::Sh => mem.write_half(address, value as u16),
        Op::Sb => mem.write_byte(address, value as u8),
        _ => {}
    }
}
