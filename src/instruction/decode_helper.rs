//! Decoding helper functions

use super::Capabilities;
use super::Controls;
use super::InstrKind;
use super::Instruction;
use super::Op;
use super::HALT;
use super::NOP;
use crate::alu::AluOp;
use crate::alu::AluSrc;

/// Decodes a raw machine word fetched from `addr`
pub fn decode(raw: u32, addr: u32) -> Instruction {
    let opcode = get_opcode(raw);
    let op = select_op(raw);
    let flags = capabilities(op);

    Instruction {
        raw,
        addr,
        kind: kind_of(opcode),
        op,
        opcode,
        rs: get_rs(raw),
        rt: get_rt(raw),
        rd: get_rd(raw),
        shamt: get_shamt(raw),
        funct: get_funct(raw),
        imm: get_imm(raw),
        jtarget: get_jtarget(raw),
        flags,
        ctrl: controls(op, &flags),
    }
}

/// Encoding class from the opcode field
fn kind_of(opcode: u8) -> InstrKind {
    match opcode {
        0 => InstrKind::R,
        2 | 3 => InstrKind::J,
        _ => InstrKind::I,
    }
}

/// Selects the operation: by funct when opcode is 0, by opcode otherwise
fn select_op(raw: u32) -> Op {
    if raw == NOP {
        return Op::Nop;
    }
    if raw == HALT {
        return Op::Halt;
    }

    let opcode = get_opcode(raw);
    if opcode == 0 {
        match get_funct(raw) {
            0x20 => Op::Add,
            0x22 => Op::Sub,
            0x24 => Op::And,
            0x25 => Op::Or,
            0x27 => Op::Nor,
            0x26 => Op::Xor,
            0x2a => Op::Slt,
            0x2b => Op::Sltu,
            0x00 => Op::Sll,
            0x02 => Op::Srl,
            0x03 => Op::Sra,
            0x08 => Op::Jr,
            0x09 => Op::Jalr,
            _ => Op::Unknown,
        }
    } else if opcode == 0x01 {
        // REGIMM: the rt field selects the comparison
        match get_rt(raw) {
            0 => Op::Bltz,
            1 => Op::Bgez,
            _ => Op::Unknown,
        }
    } else {
        match opcode {
            0x08 => Op::Addi,
            0x09 => Op::Addiu,
            0x0c => Op::Andi,
            0x0d => Op::Ori,
            0x0e => Op::Xori,
            0x0a => Op::Slti,
            0x0b => Op::Sltiu,
            0x0f => Op::Lui,
            0x23 => Op::Lw,
            0x21 => Op::Lh,
            0x20 => Op::Lb,
            0x24 => Op::Lbu,
            0x25 => Op::Lhu,
            0x2b => Op::Sw,
            0x29 => Op::Sh,
            0x28 => Op::Sb,
            0x04 => Op::Beq,
            0x05 => Op::Bne,
            0x06 => Op::Blez,
            0x07 => Op::Bgtz,
            0x02 => Op::J,
            0x03 => Op::Jal,
            _ => Op::Unknown,
        }
    }
}

/// Derives the capability flags for an operation
fn capabilities(op: Op) -> Capabilities {
    use Op::*;

    let is_load = matches!(op, Lw | Lh | Lb | Lbu | Lhu);
    let is_store = matches!(op, Sw | Sh | Sb);
    let is_branch = matches!(op, Beq | Bne | Blez | Bgtz | Bltz | Bgez);
    let imm_alu = matches!(op, Addi | Addiu | Andi | Ori | Xori | Slti | Sltiu);

    Capabilities {
        reads_rs: matches!(op, Add | Sub | And | Or | Nor | Xor | Slt | Sltu | Jr | Jalr)
            || imm_alu
            || is_load
            || is_store
            || is_branch,
        reads_rt: matches!(op, Add | Sub | And | Or | Nor | Xor | Slt | Sltu)
            || matches!(op, Sll | Srl | Sra)
            || matches!(op, Beq | Bne)
            || is_store,
        writes_rd: matches!(
            op,
            Add | Sub | And | Or | Nor | Xor | Slt | Sltu | Sll | Srl | Sra | Jalr
        ),
        writes_rt: is_load || imm_alu || op == Lui,
        is_branch,
        is_jump: matches!(op, J | Jal | Jr | Jalr),
        is_load,
        is_store,
    }
}

/// Derives the control signals for an operation
fn controls(op: Op, flags: &Capabilities) -> Controls {
    use Op::*;

    Controls {
        reg_write: flags.writes_rd || flags.writes_rt || op == Jal,
        mem_read: flags.is_load,
        mem_write: flags.is_store,
        branch: flags.is_branch,
        jump: flags.is_jump,
        alu_op: match op {
            Sub => AluOp::Sub,
            And | Andi => AluOp::And,
            Or | Ori => AluOp::Or,
            Nor => AluOp::Nor,
            Xor | Xori => AluOp::Xor,
            Slt | Slti => AluOp::Slt,
            Sltu | Sltiu => AluOp::Sltu,
            Sll => AluOp::Sll,
            Srl => AluOp::Srl,
            Sra => AluOp::Sra,
            // Branch comparisons reuse the subtractor's zero flag
            Beq | Bne | Blez | Bgtz | Bltz | Bgez => AluOp::Sub,
            _ => AluOp::Add,
        },
        alu_src: if flags.is_load || flags.is_store || matches!(op, Lui) || matches!(op, Addi | Addiu | Andi | Ori | Xori | Slti | Sltiu) {
            AluSrc::Imm
        } else {
            AluSrc::Reg
        },
    }
}

/// Extracts the opcode (bits 31:26) from a raw word
fn get_opcode(raw: u32) -> u8 {
    ((raw >> 26) & 0x3f) as u8
}

/// Extracts the rs field from a raw word
fn get_rs(raw: u32) -> u8 {
    ((raw >> 21) & 0x1f) as u8
}

/// Extracts the rt field from a raw word
fn get_rt(raw: u32) -> u8 {
    ((raw >> 16) & 0x1f) as u8
}

/// Extracts the rd field from a raw word
fn get_rd(raw: u32) -> u8 {
    ((raw >> 11) & 0x1f) as u8
}

/// Extracts the shift amount from a raw word
fn get_shamt(raw: u32) -> u8 {
    ((raw >> 6) & 0x1f) as u8
}

/// Extracts the funct field (bits 5:0) from a raw word
fn get_funct(raw: u32) -> u8 {
    (raw & 0x3f) as u8
}

/// Extracts the 16-bit immediate from a raw word
fn get_imm(raw: u32) -> u16 {
    (raw & 0xffff) as u16
}

/// Extracts the 26-bit jump target field from a raw word
fn get_jtarget(raw: u32) -> u32 {
    raw & 0x03ff_ffff
}
