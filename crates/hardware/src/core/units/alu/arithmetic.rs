//! ALU arithmetic operations.
//!
//! Addition and subtraction wrap modulo 2^32 and never signal overflow.

use crate::core::pipeline::signals::AluOp;

/// Executes an arithmetic operation.
///
/// Returns `0` for non-arithmetic opcodes.
pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::CopyB => b,
        _ => 0,
    }
}
