//! RISC-V Floating-Point (F) Function Codes (funct7).

/// Single-precision add (FADD.S).
pub const FADD_S: u32 = 0b0000000;
/// Single-precision subtract (FSUB.S).
pub const FSUB_S: u32 = 0b0000100;
/// Single-precision multiply (FMUL.S).
pub const FMUL_S: u32 = 0b0001000;
/// Single-precision divide (FDIV.S).
pub const FDIV_S: u32 = 0b0001100;
