//! Instruction Disassembler for the RV32I control-path subset.
//!
//! Converts a 32-bit instruction encoding into a human-readable mnemonic
//! string for debug tracing, retirement logs, and test diagnostics.
//!
//! # Supported Encodings
//!
//! - RV32I (base integer)
//! - Privileged (ECALL, EBREAK, MRET, WFI, CSR access)
//! - Coprocessor opcodes (OP-FP basic arithmetic, custom-0, custom-1)
//!
//! # Usage
//!
//! ```
//! use rvpipe_core::isa::disasm::disassemble;
//! let text = disassemble(0x00A00513);
//! assert_eq!(text, "addi a0, zero, 10");
//! ```

use crate::isa::abi;
use crate::isa::custom::opcodes as cust_op;
use crate::isa::decode::{b_imm, i_imm, j_imm, s_imm, u_imm};
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys_op;
use crate::isa::rv32f::{funct7 as f_f7, opcodes as f_op};
use crate::isa::rv32i::{funct3 as i_f3, funct7 as i_f7, opcodes as i_op};

/// Disassembles a 32-bit RISC-V instruction into a human-readable string.
///
/// Returns a mnemonic like `"add a0, a1, a2"` or `"unknown"` for
/// unrecognised encodings.
///
/// # Arguments
///
/// * `inst` - The raw 32-bit instruction encoding.
pub fn disassemble(inst: u32) -> String {
    let rd = abi::name(inst.rd());
    let rs1 = abi::name(inst.rs1());
    let rs2 = abi::name(inst.rs2());
    let f3 = inst.funct3();
    let f7 = inst.funct7();

    match inst.opcode() {
        // ── R-type register-register ──────────────────────
        i_op::OP_REG => {
            let alt = f7 & i_f7::ALT_BIT != 0;
            let mn = match (f3, alt) {
                (i_f3::ADD_SUB, false) => "add",
                (i_f3::ADD_SUB, true) => "sub",
                (i_f3::SLL, _) => "sll",
                (i_f3::SLT, _) => "slt",
                (i_f3::SLTU, _) => "sltu",
                (i_f3::XOR, _) => "xor",
                (i_f3::SRL_SRA, false) => "srl",
                (i_f3::SRL_SRA, true) => "sra",
                (i_f3::OR, _) => "or",
                _ => "and",
            };
            format!("{mn} {rd}, {rs1}, {rs2}")
        }

        // ── I-type immediate arithmetic ───────────────────
        i_op::OP_IMM => {
            let imm = i_imm(inst);
            let shamt = inst.rs2();
            match f3 {
                i_f3::ADD_SUB => format!("addi {rd}, {rs1}, {imm}"),
                i_f3::SLT => format!("slti {rd}, {rs1}, {imm}"),
                i_f3::SLTU => format!("sltiu {rd}, {rs1}, {imm}"),
                i_f3::XOR => format!("xori {rd}, {rs1}, {imm}"),
                i_f3::OR => format!("ori {rd}, {rs1}, {imm}"),
                i_f3::AND => format!("andi {rd}, {rs1}, {imm}"),
                i_f3::SLL => format!("slli {rd}, {rs1}, {shamt}"),
                _ if f7 & i_f7::ALT_BIT != 0 => format!("srai {rd}, {rs1}, {shamt}"),
                _ => format!("srli {rd}, {rs1}, {shamt}"),
            }
        }

        // ── Loads / stores ────────────────────────────────
        i_op::OP_LOAD => {
            let mn = match f3 {
                i_f3::LB => "lb",
                i_f3::LH => "lh",
                i_f3::LW => "lw",
                i_f3::LBU => "lbu",
                i_f3::LHU => "lhu",
                _ => "l??",
            };
            format!("{mn} {rd}, {}({rs1})", i_imm(inst))
        }
        i_op::OP_STORE => {
            let mn = match f3 {
                i_f3::SB => "sb",
                i_f3::SH => "sh",
                i_f3::SW => "sw",
                _ => "s??",
            };
            format!("{mn} {rs2}, {}({rs1})", s_imm(inst))
        }

        // ── Control transfer ──────────────────────────────
        i_op::OP_BRANCH => {
            let mn = match f3 {
                i_f3::BEQ => "beq",
                i_f3::BNE => "bne",
                i_f3::BLT => "blt",
                i_f3::BGE => "bge",
                i_f3::BLTU => "bltu",
                i_f3::BGEU => "bgeu",
                _ => "b??",
            };
            format!("{mn} {rs1}, {rs2}, {}", b_imm(inst))
        }
        i_op::OP_JAL => format!("jal {rd}, {}", j_imm(inst)),
        i_op::OP_JALR => format!("jalr {rd}, {}({rs1})", i_imm(inst)),

        // ── U-type ────────────────────────────────────────
        i_op::OP_LUI => format!("lui {rd}, {:#x}", (u_imm(inst) as u32) >> 12),
        i_op::OP_AUIPC => format!("auipc {rd}, {:#x}", (u_imm(inst) as u32) >> 12),

        i_op::OP_MISC_MEM => "fence".to_string(),

        // ── Coprocessor spaces ────────────────────────────
        sys_op::OP_SYSTEM => disasm_system(inst, rd, rs1),
        f_op::OP_FP => {
            let mn = match f7 {
                f_f7::FADD_S => "fadd.s",
                f_f7::FSUB_S => "fsub.s",
                f_f7::FMUL_S => "fmul.s",
                f_f7::FDIV_S => "fdiv.s",
                _ => "fp.??",
            };
            format!("{mn} f{}, f{}, f{}", inst.rd(), inst.rs1(), inst.rs2())
        }
        cust_op::OP_CUSTOM_0 => format!("custom0 {rd}, {rs1}, {rs2}"),
        cust_op::OP_CUSTOM_1 => format!("custom1 {rd}, {rs1}, {rs2}"),

        _ => "unknown".to_string(),
    }
}

/// Disassembles a SYSTEM-opcode instruction.
fn disasm_system(inst: u32, rd: &str, rs1: &str) -> String {
    match inst {
        sys_op::ECALL => return "ecall".to_string(),
        sys_op::EBREAK => return "ebreak".to_string(),
        sys_op::MRET => return "mret".to_string(),
        sys_op::WFI => return "wfi".to_string(),
        _ => {}
    }
    let csr = inst.csr();
    let zimm = inst.rs1();
    match inst.funct3() {
        sys_op::CSRRW => format!("csrrw {rd}, {csr:#x}, {rs1}"),
        sys_op::CSRRS => format!("csrrs {rd}, {csr:#x}, {rs1}"),
        sys_op::CSRRC => format!("csrrc {rd}, {csr:#x}, {rs1}"),
        sys_op::CSRRWI => format!("csrrwi {rd}, {csr:#x}, {zimm}"),
        sys_op::CSRRSI => format!("csrrsi {rd}, {csr:#x}, {zimm}"),
        sys_op::CSRRCI => format!("csrrci {rd}, {csr:#x}, {zimm}"),
        _ => "system.??".to_string(),
    }
}
