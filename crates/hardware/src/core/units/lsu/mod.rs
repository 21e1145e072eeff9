//! Load/Store Unit (LSU).
//!
//! Byte-lane handling for the word-wide data port used by the Memory stage. It provides:
//! 1. **Byte Enables:** The lane mask for byte, halfword, and word stores.
//! 2. **Store Alignment:** Shifting store data into its lanes.
//! 3. **Load Extraction:** Selecting and sign/zero-extending the addressed lanes.
//!
//! Accesses use the naturally aligned lane containing the address; misaligned
//! halfwords and words are not split and raise no trap.

use crate::isa::rv32i::funct3;

/// Byte-enable mask covering a full word.
pub const BE_WORD: u8 = 0b1111;

/// Load/Store Unit (LSU) helpers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lsu;

impl Lsu {
    /// Byte offset of `addr` within its word, aligned to the access width.
    const fn lane(f3: u32, addr: u32) -> u32 {
        match f3 & 0b11 {
            0 => addr & 0b11,
            1 => addr & 0b10,
            _ => 0,
        }
    }

    /// Returns the byte-enable mask for a store.
    ///
    /// # Arguments
    ///
    /// * `f3` - The store (or load) `funct3`; bits 1:0 give the width.
    /// * `addr` - The effective address.
    pub const fn byte_enable(f3: u32, addr: u32) -> u8 {
        let mask: u8 = match f3 & 0b11 {
            0 => 0b0001,
            1 => 0b0011,
            _ => BE_WORD,
        };
        mask << Self::lane(f3, addr)
    }

    /// Shifts store data into the lanes selected by [`Lsu::byte_enable`].
    pub const fn store_data(f3: u32, addr: u32, value: u32) -> u32 {
        value << (Self::lane(f3, addr) * 8)
    }

    /// Extracts and extends load data from a full memory word.
    ///
    /// # Arguments
    ///
    /// * `f3` - The load `funct3` (LB/LH/LW/LBU/LHU).
    /// * `addr` - The effective address.
    /// * `word` - The aligned word returned by the data port.
    ///
    /// # Returns
    ///
    /// The value to write to `rd`.
    pub const fn load_data(f3: u32, addr: u32, word: u32) -> u32 {
        let shifted = word >> (Self::lane(f3, addr) * 8);
        match f3 {
            funct3::LB => shifted as u8 as i8 as i32 as u32,
            funct3::LH => shifted as u16 as i16 as i32 as u32,
            funct3::LBU => shifted & 0xFF,
            funct3::LHU => shifted & 0xFFFF,
            _ => word,
        }
    }
}
