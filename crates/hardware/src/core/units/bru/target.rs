//! Branch Target Computation.
//!
//! Pure functions of (PC, instruction, base register). Every sum wraps modulo 2^32;
//! address arithmetic never reports overflow.

use crate::isa::decode::{b_imm, i_imm, j_imm};

/// Mask clearing bit 0 of a JALR target.
const JALR_TARGET_MASK: u32 = !1;

/// Computes a conditional branch target.
///
/// The offset is the 13-bit B-immediate (bits 31, 7, 30:25, 11:8, then an implicit 0),
/// sign-extended from bit 12.
///
/// # Examples
///
/// ```
/// use rvpipe_core::core::units::bru::branch_target;
///
/// // beq x1, x2, 8
/// assert_eq!(branch_target(0x1000, 0x0020_8463), 0x1008);
/// ```
pub const fn branch_target(pc: u32, inst: u32) -> u32 {
    pc.wrapping_add_signed(b_imm(inst))
}

/// Computes a `JAL` target.
///
/// The offset is the 21-bit J-immediate (bits 31, 19:12, 20, 30:21, then an implicit 0),
/// sign-extended from bit 20.
pub const fn jal_target(pc: u32, inst: u32) -> u32 {
    pc.wrapping_add_signed(j_imm(inst))
}

/// Computes a `JALR` target.
///
/// `base` plus the 12-bit I-immediate, with bit 0 of the sum cleared even when the sum
/// is odd.
pub const fn jalr_target(base: u32, inst: u32) -> u32 {
    base.wrapping_add_signed(i_imm(inst)) & JALR_TARGET_MASK
}

/// All three candidate targets for one instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BranchTargets {
    /// `pc + B-immediate`.
    pub branch: u32,
    /// `pc + J-immediate`.
    pub jal: u32,
    /// `(base + I-immediate) & !1`.
    pub jalr: u32,
}

impl BranchTargets {
    /// Computes every target at once, independent of the instruction's real format.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the instruction.
    /// * `inst` - The instruction word.
    /// * `base` - Value of `rs1` (after forwarding) for the JALR target.
    pub const fn compute(pc: u32, inst: u32, base: u32) -> Self {
        Self {
            branch: branch_target(pc, inst),
            jal: jal_target(pc, inst),
            jalr: jalr_target(base, inst),
        }
    }
}
