//! Integer Register File.
//!
//! This module provides the `RegisterFile` collaborator read by ID and written by WB.
//! It performs the following:
//! 1. **Storage:** Maintains 32 integer registers (`x0`-`x31`) of 32 bits each.
//! 2. **Invariant Enforcement:** Register `x0` always reads 0 and ignores writes.
//! 3. **Debugging:** Renders the complete register state for the end-of-run report.

use std::fmt;

use crate::common::constants::REG_COUNT;
use crate::isa::abi;

/// Integer register file.
///
/// Reads are combinational snoops; the only writer is the WB stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; REG_COUNT],
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register value.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `x0` and out-of-range indices return 0.
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the specified register.
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.regs.get(idx).copied().unwrap_or(0)
        }
    }

    /// Writes a value to a register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Writes to `x0` are ignored.
    /// * `val` - The 32-bit value to write.
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx == 0 {
            return;
        }
        if let Some(slot) = self.regs.get_mut(idx) {
            *slot = val;
        }
    }

    /// Returns a copy of all 32 registers (index 0 is always 0).
    pub const fn snapshot(&self) -> [u32; REG_COUNT] {
        self.regs
    }

    /// Prints all registers to stdout, two per line with ABI names.
    pub fn dump(&self) {
        print!("{self}");
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.regs.chunks_exact(2).enumerate() {
            let lo = i * 2;
            writeln!(
                f,
                "x{lo:<2} {:>4}={:#010x}  x{:<2} {:>4}={:#010x}",
                abi::name(lo),
                pair[0],
                lo + 1,
                abi::name(lo + 1),
                pair[1]
            )?;
        }
        Ok(())
    }
}
