//! Trap records and harness error types.
//!
//! This module defines the two kinds of failure the model distinguishes:
//! 1. **Traps:** Architectural events (coprocessor exceptions, interrupts) that redirect
//!    the pipeline. They are values recorded by the sequencer, never Rust errors.
//! 2. **Harness Errors:** Configuration and program-loading failures surfaced as `Result`s
//!    to the simulator and the CLI.

use thiserror::Error;

use crate::core::units::coproc::CpSelect;
use crate::isa::privileged::cause::{exception, interrupt};
use crate::isa::privileged::opcodes as sys_op;

/// Cause of a pipeline trap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TrapCause {
    /// The addressed coprocessor raised its exception line for `instruction`.
    #[error("{unit} exception on {instruction:#010x}")]
    CoprocessorException {
        /// Unit that raised the exception.
        unit: CpSelect,
        /// Instruction the unit was executing.
        instruction: u32,
    },
    /// External interrupt line observed by the sequencer.
    #[error("external interrupt")]
    ExternalInterrupt,
}

impl TrapCause {
    /// Returns the RV32 `mcause` encoding of this trap.
    ///
    /// ECALL and EBREAK keep their architectural codes; every other
    /// coprocessor exception reports as an illegal instruction.
    pub const fn mcause(&self) -> u32 {
        match self {
            Self::CoprocessorException { instruction, .. } => match *instruction {
                sys_op::ECALL => exception::ENVIRONMENT_CALL_FROM_M_MODE,
                sys_op::EBREAK => exception::BREAKPOINT,
                _ => exception::ILLEGAL_INSTRUCTION,
            },
            Self::ExternalInterrupt => interrupt::MACHINE_EXTERNAL,
        }
    }

    /// Returns `true` for asynchronous causes.
    pub const fn is_interrupt(&self) -> bool {
        matches!(self, Self::ExternalInterrupt)
    }
}

/// A trap taken by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{cause} (pc={pc:#010x})")]
pub struct Trap {
    /// What caused the trap.
    pub cause: TrapCause,
    /// PC of the faulting instruction, or of the first discarded instruction for interrupts.
    pub pc: u32,
}

/// Errors produced while parsing or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The configuration text is not valid JSON for the schema.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A reset address or vector is not word aligned.
    #[error("{name} ({value:#010x}) must be 4-byte aligned")]
    Misaligned {
        /// Name of the offending field.
        name: &'static str,
        /// Offending value.
        value: u32,
    },

    /// A coprocessor was configured with zero latency.
    #[error("coprocessor CP{unit} latency must be at least 1 cycle")]
    ZeroLatency {
        /// Unit index (0-3).
        unit: usize,
    },

    /// The memory size is zero or not a multiple of the word size.
    #[error("memory size {0} is not a non-zero multiple of 4")]
    MemorySize(usize),
}

/// Errors produced while loading a program image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image could not be read.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    /// The ELF container could not be parsed.
    #[error("failed to parse ELF: {0}")]
    Elf(#[from] object::Error),

    /// The ELF is not a little-endian 32-bit RISC-V executable.
    #[error("not a 32-bit little-endian RISC-V ELF")]
    UnsupportedElf,

    /// A segment or raw image does not fit in memory.
    #[error("image segment [{start:#010x}, +{len:#x}) exceeds memory of {size:#x} bytes")]
    TooLarge {
        /// Load address of the segment.
        start: u32,
        /// Segment length in bytes.
        len: usize,
        /// Memory size in bytes.
        size: usize,
    },
}

/// Top-level error for the simulator and the command-line driver.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Program load failure.
    #[error(transparent)]
    Load(#[from] LoadError),
}
