//! Branch Resolution Unit (BRU).
//!
//! This module resolves control transfer in the Decode stage. It includes:
//! 1. **Targets:** Branch, JAL, and JALR target computation ([`target`]).
//! 2. **Comparison:** The BEQ/BNE/BLT/BGE/BLTU/BGEU condition ([`compare`]).
//! 3. **PC Selection:** Choice of the next fetch address among the four sources.
//!
//! The pipeline predicts every branch not-taken, so a resolved taken branch or any
//! jump is a misprediction that flushes the fetch slot.

/// Branch condition evaluation.
pub mod compare;

/// Branch and jump target computation.
pub mod target;

pub use self::compare::branch_taken;
pub use self::target::{BranchTargets, branch_target, jal_target, jalr_target};

use crate::common::constants::INSTRUCTION_BYTES;
use crate::core::pipeline::signals::ControlSignals;

/// Source of the next program counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PcSelect {
    /// Fall through to `pc + 4`.
    #[default]
    Sequential,
    /// Taken conditional branch.
    Branch,
    /// `JAL` target.
    Jal,
    /// `JALR` target.
    Jalr,
}

impl PcSelect {
    /// Chooses the PC source for a decoded instruction.
    ///
    /// # Arguments
    ///
    /// * `ctrl` - Control bundle of the instruction being resolved.
    /// * `taken` - Branch condition outcome (ignored unless `ctrl.branch`).
    pub const fn select(ctrl: &ControlSignals, taken: bool) -> Self {
        if ctrl.jump {
            Self::Jal
        } else if ctrl.jalr {
            Self::Jalr
        } else if ctrl.branch && taken {
            Self::Branch
        } else {
            Self::Sequential
        }
    }

    /// Returns `true` if this selection redirects the fetch stream.
    pub const fn redirects(self) -> bool {
        !matches!(self, Self::Sequential)
    }
}

/// Computes the next PC for a selection.
///
/// `Sequential` is `pc + 4` modulo 2^32.
pub const fn next_pc(sel: PcSelect, pc: u32, targets: &BranchTargets) -> u32 {
    match sel {
        PcSelect::Sequential => pc.wrapping_add(INSTRUCTION_BYTES),
        PcSelect::Branch => targets.branch,
        PcSelect::Jal => targets.jal,
        PcSelect::Jalr => targets.jalr,
    }
}
