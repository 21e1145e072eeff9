//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains opcode and function-code constants, field extraction, immediate decoding,
//! and a small disassembler for the instruction subset the control path understands.
//!
//! # Groups
//!
//! * `rv32i`: Base integer instruction set (32-bit).
//! * `rv32f`: Single-precision floating-point opcodes (routed to CP1).
//! * `custom`: The two custom opcode spaces (routed to CP2 and CP3).
//! * `privileged`: SYSTEM opcode, CSR addresses, and trap cause codes (routed to CP0).

/// ABI register name mappings.
pub mod abi;

/// Custom-0 / custom-1 opcode spaces used by the accelerator coprocessors.
pub mod custom;

/// Immediate extraction for every instruction format.
pub mod decode;

/// Instruction disassembler for debug tracing and diagnostics.
pub mod disasm;

/// Instruction field extraction utilities.
pub mod instruction;

/// Privileged architecture definitions (SYSTEM opcode, CSRs, cause codes).
pub mod privileged;

/// Single-precision floating-point opcodes.
pub mod rv32f;

/// Base integer instruction set (32-bit RISC-V core instructions).
pub mod rv32i;
