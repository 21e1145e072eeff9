//! Common utilities and types used throughout the pipeline model.
//!
//! This module provides the building blocks shared by every stage and unit:
//! 1. **Constants:** Instruction width, the canonical NOP, and register-file size.
//! 2. **Error Handling:** Trap records for exceptions/interrupts and the harness error types.
//! 3. **Register Management:** The integer register file with `x0` hardwired to zero.

/// Common constants used throughout the model.
pub mod constants;

/// Error types and trap definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use error::{ConfigError, LoadError, SimError, Trap, TrapCause};
pub use reg::RegisterFile;
