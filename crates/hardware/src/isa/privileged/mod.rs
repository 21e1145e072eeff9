//! Privileged Architecture Definitions.
//!
//! Constants for the SYSTEM opcode space that CP0 services: system instruction
//! encodings, the CSR address map it implements, and `mcause` codes.
//!
//! # Modules
//!
//! - `cause`: Exception and interrupt cause codes.
//! - `csr`: CSR addresses implemented by the system coprocessor.
//! - `opcodes`: System instruction opcodes (ECALL, EBREAK, xRET, CSR ops).

/// Exception and interrupt cause code definitions.
pub mod cause;

/// Control and Status Register addresses.
pub mod csr;

/// System instruction opcodes (ECALL, EBREAK, xRET, CSR).
pub mod opcodes;
