//! Single-cycle implementation: fetch, decode, execute, memory and
//! write-back all inside one cycle, with no hazard logic. Used when the
//! pipeline is disabled; for hazard-free programs it must agree with the
//! pipelined path on the final register and memory state.

use crate::cpu::RegisterFile;
use crate::instruction::Instruction;
use crate::instruction::Op;
use crate::memory::Memory;
use crate::pipelined::stages;
use crate::predictor::BranchPredictor;

/// What one interpreted instruction produced
#[derive(Clone, Copy, Debug, Default)]
pub struct StepOutcome {
    pub retired: bool,
    pub halt: bool,
    pub anomaly: bool,
}

/// Executes exactly one instruction at `pc`
pub fn step(
    pc: &mut u32,
    regs: &mut RegisterFile,
    mem: &mut Memory,
    predictor: &mut dyn BranchPredictor,
    verbose: bool,
) -> StepOutcome {
    let fetch_pc = *pc;
    let raw = mem.read_word(fetch_pc);
    let inst = Instruction::decode(raw, fetch_pc);

    if verbose {
        eprintln!("[VERBOSE] {:#010x}: {}", fetch_pc, inst);
    }

    if inst.op == Op::Halt {
        return StepOutcome { retired: false, halt: true, anomaly: false };
    }

    let anomaly = inst.op == Op::Unknown;

    let rs_value = regs.read(inst.rs);
    let rt_value = regs.read(inst.rt);
    let result = stages::run_alu(&inst, rs_value, rt_value, inst.imm_signed());

    if inst.ctrl.mem_read {
        let value = stages::load_data(mem, inst.op, result.value);
        regs.write(inst.rt, value);
    } else if inst.ctrl.mem_write {
        stages::store_data(mem, inst.op, result.value, rt_value);
    } else if inst.ctrl.reg_write {
        if let Some(dest) = inst.write_reg() {
            regs.write(dest, result.value);
        }
    }

    let mut next_pc = fetch_pc.wrapping_add(4);
    if inst.flags.is_branch {
        let taken = inst.branch_taken(rs_value, rt_value);
        predictor.update(fetch_pc, taken, inst.branch_target());
        if taken {
            next_pc = inst.branch_target();
        }
    } else {
        match inst.op {
            Op::J | Op::Jal => next_pc = inst.jump_target(),
            Op::Jr | Op::Jalr => next_pc = rs_value,
            _ => {}
        }
    }

    *pc = next_pc;
    StepOutcome { retired: true, halt: false, anomaly }
}
