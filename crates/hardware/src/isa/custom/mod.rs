//! Custom Opcode Spaces.
//!
//! RISC-V reserves `custom-0` and `custom-1` for non-standard extensions. This core
//! routes them to the CP2 and CP3 accelerator units respectively.

/// Custom opcode constants.
pub mod opcodes;
