//! Global Model Constants.
//!
//! This module defines constants shared across the pipeline model. It includes:
//! 1. **Instruction Constants:** Width, alignment, and the canonical NOP.
//! 2. **Register Constants:** Architectural register count.
//! 3. **Simulation Constants:** Intervals for run-loop status output.

/// Size of a standard (32-bit) RISC-V instruction in bytes.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Canonical NOP encoding (`addi x0, x0, 0`).
pub const NOP: u32 = 0x0000_0013;

/// Number of architectural integer registers.
pub const REG_COUNT: usize = 32;

/// Mask of the low bits that must be clear in a word-aligned address.
pub const WORD_ALIGN_MASK: u32 = 0b11;

/// Number of cycles between status update messages during simulation.
pub const STATUS_UPDATE_INTERVAL: u64 = 1_000_000;
