//! Control and Status Register (CSR) addresses.
//!
//! Only the machine-mode subset held by the system coprocessor is listed.

/// Machine status register.
pub const MSTATUS: u32 = 0x300;
/// Machine trap-handler base address.
pub const MTVEC: u32 = 0x305;
/// Machine scratch register.
pub const MSCRATCH: u32 = 0x340;
/// Machine exception program counter.
pub const MEPC: u32 = 0x341;
/// Machine trap cause.
pub const MCAUSE: u32 = 0x342;
/// Cycle counter, low word (read-only).
pub const CYCLE: u32 = 0xC00;
/// Retired-instruction counter, low word (read-only).
pub const INSTRET: u32 = 0xC02;

/// Returns `true` if the CSR address lies in a read-only region (bits 11:10 == 0b11).
#[inline]
pub const fn is_read_only(addr: u32) -> bool {
    (addr >> 10) & 0b11 == 0b11
}
