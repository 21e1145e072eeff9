//! RISC-V Floating-Point (F) Opcodes.

/// Floating-point Arithmetic (FADD, FSUB, etc.).
pub const OP_FP: u32 = 0b1010011;
