//! Single-Precision Floating-Point Extension (F).
//!
//! Only the arithmetic opcode space is modelled; every OP-FP instruction is
//! offloaded to CP1.

/// Function code 7 definitions for single-precision arithmetic.
pub mod funct7;

/// Floating-point opcodes.
pub mod opcodes;
