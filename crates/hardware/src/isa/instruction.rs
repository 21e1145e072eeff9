//! Instruction encoding and field extraction utilities.
//!
//! Provides bit extraction functions for 32-bit RISC-V instruction encodings. An instruction is an immutable `u32`;
//! nothing here mutates it.

/// Bit mask for extracting the opcode field (bits 0-6).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit mask for extracting a register index field (5 bits).
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for extracting the funct3 field (bits 12-14).
pub const FUNCT3_MASK: u32 = 0x7;
/// Bit mask for extracting the funct7 field (bits 25-31).
pub const FUNCT7_MASK: u32 = 0x7F;
/// Bit mask for extracting the CSR address field (bits 20-31).
pub const CSR_MASK: u32 = 0xFFF;

/// Trait for extracting instruction fields from encoded instructions.
///
/// Every accessor masks explicitly; no field relies on implicit truncation.
pub trait InstructionBits {
    /// Extracts the 7-bit opcode field (bits 0-6).
    fn opcode(&self) -> u32;

    /// Extracts the destination register field (bits 7-11).
    ///
    /// Register 0 (x0) is hardwired to zero and writes to it are ignored.
    fn rd(&self) -> usize;

    /// Extracts the first source register field (bits 15-19).
    fn rs1(&self) -> usize;

    /// Extracts the second source register field (bits 20-24).
    fn rs2(&self) -> usize;

    /// Extracts the 3-bit funct3 field (bits 12-14).
    fn funct3(&self) -> u32;

    /// Extracts the 7-bit funct7 field (bits 25-31).
    fn funct7(&self) -> u32;

    /// Extracts the 12-bit CSR address field (bits 20-31).
    fn csr(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self & OPCODE_MASK
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> 7) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs1(&self) -> usize {
        ((self >> 15) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rs2(&self) -> usize {
        ((self >> 20) & REG_MASK) as usize
    }

    #[inline(always)]
    fn funct3(&self) -> u32 {
        (self >> 12) & FUNCT3_MASK
    }

    #[inline(always)]
    fn funct7(&self) -> u32 {
        (self >> 25) & FUNCT7_MASK
    }

    #[inline(always)]
    fn csr(&self) -> u32 {
        (self >> 20) & CSR_MASK
    }
}
