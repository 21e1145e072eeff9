//! ALU shift operations.
//!
//! Implements shift-left logical (SLL), shift-right logical (SRL), and
//! shift-right arithmetic (SRA). The shift amount is masked to 5 bits (0-31).

use crate::core::pipeline::signals::AluOp;

/// Bit mask for the RV32 shift amount (5 bits: 0-31).
const SHAMT_MASK: u32 = 0x1f;

/// Executes a shift operation.
///
/// # Arguments
///
/// * `op` - The ALU operation to perform (must be a shift variant).
/// * `a`  - The value to be shifted.
/// * `b`  - The shift amount (lower 5 bits used, upper bits ignored).
///
/// # Returns
///
/// The shifted value. Returns `0` for non-shift opcodes.
pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    let shamt = b & SHAMT_MASK;
    match op {
        AluOp::Sll => a << shamt,
        AluOp::Srl => a >> shamt,
        AluOp::Sra => ((a as i32) >> shamt) as u32,
        _ => 0,
    }
}
