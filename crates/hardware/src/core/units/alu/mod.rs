//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the reference integer ALU used by the Execute stage for
//! every non-coprocessor instruction. It is a collaborator of the control path, not
//! the object under test, and covers exactly the RV32I operations the decoder selects.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, `CopyB`
//! - [`logic`]:      Or, And, Xor, Slt, Sltu
//! - [`shifts`]:     Sll, Srl, Sra

/// Integer arithmetic operations (add, subtract, pass-through).
pub mod arithmetic;

/// Bitwise logical and comparison operations (or, and, xor, slt).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::core::pipeline::signals::AluOp;

/// Arithmetic Logic Unit (ALU) for 32-bit integer operations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform
    /// * `a`  - First operand
    /// * `b`  - Second operand (also the shift amount)
    ///
    /// # Returns
    ///
    /// The 32-bit result. All arithmetic wraps modulo 2^32.
    ///
    /// # Examples
    ///
    /// ```
    /// use rvpipe_core::core::units::alu::Alu;
    /// use rvpipe_core::core::pipeline::signals::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8), 50);
    /// assert_eq!(Alu::execute(AluOp::Add, 0xFFFF_FFFF, 1), 0);
    /// assert_eq!(Alu::execute(AluOp::Slt, -5_i32 as u32, 10), 1);
    /// assert_eq!(Alu::execute(AluOp::Sra, 0x8000_0000, 4), 0xF800_0000);
    /// ```
    pub fn execute(op: AluOp, a: u32, b: u32) -> u32 {
        match op {
            AluOp::Add | AluOp::Sub | AluOp::CopyB => arithmetic::execute(op, a, b),
            AluOp::Or | AluOp::And | AluOp::Xor | AluOp::Slt | AluOp::Sltu => {
                logic::execute(op, a, b)
            }
            AluOp::Sll | AluOp::Srl | AluOp::Sra => shifts::execute(op, a, b),
        }
    }
}
