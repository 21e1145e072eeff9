//! RISC-V Trap Cause Codes.
//!
//! Values written to `mcause` on RV32. The most significant bit indicates whether
//! the trap is an interrupt (1) or an exception (0).

/// Interrupt definitions (MSB = 1).
pub mod interrupt {
    /// Machine external interrupt.
    pub const MACHINE_EXTERNAL: u32 = 0x8000_000B;
}

/// Exception definitions (MSB = 0).
pub mod exception {
    /// Illegal instruction (2).
    pub const ILLEGAL_INSTRUCTION: u32 = 2;
    /// Breakpoint (3).
    pub const BREAKPOINT: u32 = 3;
    /// Environment call from M-mode (11).
    pub const ENVIRONMENT_CALL_FROM_M_MODE: u32 = 11;
}
