//! Branch condition evaluation.

use crate::isa::rv32i::funct3;

/// Evaluates a conditional branch.
///
/// # Arguments
///
/// * `f3` - The branch `funct3`.
/// * `a` - Value of `rs1`.
/// * `b` - Value of `rs2`.
///
/// # Returns
///
/// `true` if the branch is taken. The unallocated encodings (2, 3) are never taken.
pub const fn branch_taken(f3: u32, a: u32, b: u32) -> bool {
    match f3 {
        funct3::BEQ => a == b,
        funct3::BNE => a != b,
        funct3::BLT => (a as i32) < (b as i32),
        funct3::BGE => (a as i32) >= (b as i32),
        funct3::BLTU => a < b,
        funct3::BGEU => a >= b,
        _ => false,
    }
}
