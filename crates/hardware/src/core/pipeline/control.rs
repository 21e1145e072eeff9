//! Instruction Decoder (control unit).
//!
//! Maps a raw instruction word to the [`ControlSignals`] bundle driving the rest of
//! the pipeline. It performs the following:
//! 1. **Opcode Dispatch:** Selects the signal set for each base-ISA major opcode.
//! 2. **ALU Selection:** Refines the ALU operation from `funct3` and bit 5 of `funct7`.
//! 3. **Validity Gating:** A slot marked invalid always produces the zero bundle.
//!
//! The mapping is total. Unrecognised opcodes (FENCE, OP-FP, custom-0/1 and every
//! unallocated encoding) produce the zero bundle and behave like a bubble; coprocessor
//! instructions obtain their register write from the dispatcher instead.

use crate::core::pipeline::signals::{AluOp, ControlSignals, ImmType};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys_opcodes;
use crate::isa::rv32i::{funct3, funct7, opcodes};

/// Decodes an instruction into its control-signal bundle.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction.
/// * `inst_valid` - Whether the slot holds a real instruction. When `false` the
///   result is `ControlSignals::default()` regardless of `inst`.
///
/// # Returns
///
/// The control bundle for `inst`.
pub fn decode(inst: u32, inst_valid: bool) -> ControlSignals {
    if !inst_valid {
        return ControlSignals::default();
    }

    let f3 = inst.funct3();
    let alt = inst.funct7() & funct7::ALT_BIT != 0;

    match inst.opcode() {
        opcodes::OP_LUI => ControlSignals {
            reg_write: true,
            alu_src: true,
            lui: true,
            imm_type: ImmType::U,
            alu_op: AluOp::CopyB,
            ..ControlSignals::default()
        },
        opcodes::OP_AUIPC => ControlSignals {
            reg_write: true,
            alu_src: true,
            auipc: true,
            imm_type: ImmType::U,
            ..ControlSignals::default()
        },
        opcodes::OP_JAL => ControlSignals {
            reg_write: true,
            jump: true,
            alu_src: true,
            imm_type: ImmType::J,
            ..ControlSignals::default()
        },
        opcodes::OP_JALR => ControlSignals {
            reg_write: true,
            jalr: true,
            alu_src: true,
            imm_type: ImmType::I,
            ..ControlSignals::default()
        },
        opcodes::OP_BRANCH => ControlSignals {
            branch: true,
            imm_type: ImmType::B,
            alu_op: branch_alu_op(f3),
            ..ControlSignals::default()
        },
        opcodes::OP_LOAD => ControlSignals {
            reg_write: true,
            mem_read: true,
            alu_src: true,
            imm_type: ImmType::I,
            ..ControlSignals::default()
        },
        opcodes::OP_STORE => ControlSignals {
            mem_write: true,
            alu_src: true,
            imm_type: ImmType::S,
            ..ControlSignals::default()
        },
        opcodes::OP_IMM => ControlSignals {
            reg_write: true,
            alu_src: true,
            imm_type: ImmType::I,
            // ADDI has no SUBI form, so only the shifts look at funct7.
            alu_op: alu_op(f3, alt && f3 == funct3::SRL_SRA),
            ..ControlSignals::default()
        },
        opcodes::OP_REG => ControlSignals {
            reg_write: true,
            alu_op: alu_op(f3, alt),
            ..ControlSignals::default()
        },
        sys_opcodes::OP_SYSTEM => ControlSignals {
            system: true,
            reg_write: f3 != sys_opcodes::PRIV,
            ..ControlSignals::default()
        },
        _ => ControlSignals::default(),
    }
}

/// Selects the comparison ALU operation for a branch.
///
/// Unallocated `funct3` values (2, 3) fall back to `Sub`.
const fn branch_alu_op(f3: u32) -> AluOp {
    match f3 {
        funct3::BLT | funct3::BGE => AluOp::Slt,
        funct3::BLTU | funct3::BGEU => AluOp::Sltu,
        _ => AluOp::Sub,
    }
}

/// Selects the ALU operation for OP / OP-IMM from `funct3` and the alternate bit.
const fn alu_op(f3: u32, alt: bool) -> AluOp {
    match f3 {
        funct3::ADD_SUB if alt => AluOp::Sub,
        funct3::ADD_SUB => AluOp::Add,
        funct3::SLL => AluOp::Sll,
        funct3::SLT => AluOp::Slt,
        funct3::SLTU => AluOp::Sltu,
        funct3::XOR => AluOp::Xor,
        funct3::SRL_SRA if alt => AluOp::Sra,
        funct3::SRL_SRA => AluOp::Srl,
        funct3::OR => AluOp::Or,
        _ => AluOp::And,
    }
}
