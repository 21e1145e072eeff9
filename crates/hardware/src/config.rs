//! Configuration system for the pipeline model.
//!
//! This module defines all configuration structures used to parameterize the model.
//! It provides:
//! 1. **Defaults:** Baseline reset/trap vectors, memory size, and coprocessor latencies.
//! 2. **Structures:** Hierarchical config for general, pipeline, memory, and coprocessor settings.
//! 3. **Validation:** Alignment and latency checks applied after parsing.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or taken
//! from `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::constants::WORD_ALIGN_MASK;
use crate::common::error::ConfigError;
use crate::core::units::coproc::NUM_COPROCESSORS;

/// Default configuration constants for the model.
///
/// These values define the baseline configuration when not
/// explicitly overridden in the JSON configuration.
mod defaults {
    use crate::core::units::coproc::NUM_COPROCESSORS;

    /// Address of the first instruction fetched after reset.
    pub const RESET_PC: u32 = 0x0000_0000;

    /// Redirect target for coprocessor exceptions.
    pub const TRAP_VECTOR: u32 = 0x0000_0100;

    /// Redirect target for external interrupts.
    pub const INTERRUPT_VECTOR: u32 = 0x0000_0200;

    /// Consecutive not-ready cycles before a starvation warning.
    pub const STARVATION_WARN_CYCLES: u64 = 1000;

    /// Size of each of the instruction and data memories (64 KiB).
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Instruction port latency in cycles.
    pub const FETCH_LATENCY: u32 = 1;

    /// Data port latency in cycles.
    pub const DATA_LATENCY: u32 = 1;

    /// Per-unit coprocessor latency: system, FPU, custom-0, custom-1.
    pub const COPROCESSOR_LATENCY: [u32; NUM_COPROCESSORS] = [1, 4, 2, 2];

    /// Cycle bound of the run loop.
    pub const MAX_CYCLES: u64 = 1_000_000;
}

/// Root configuration structure containing all model settings.
///
/// # Examples
///
/// ```
/// use rvpipe_core::config::Config;
///
/// let config = Config::default();
/// assert!(config.pipeline.forwarding);
/// assert_eq!(config.coprocessors.latency, [1, 4, 2, 2]);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use rvpipe_core::config::Config;
///
/// let json = r#"{
///     "general": { "trace_instructions": true, "max_cycles": 5000 },
///     "pipeline": { "trap_vector": 4096, "forwarding": false },
///     "coprocessors": { "latency": [1, 8, 3, 3] }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace_instructions);
/// assert_eq!(config.pipeline.trap_vector, 0x1000);
/// assert!(!config.pipeline.forwarding);
/// assert_eq!(config.memory.size_bytes, 64 * 1024);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation settings
    pub general: GeneralConfig,
    /// Reset, trap, and hazard-handling settings
    pub pipeline: PipelineConfig,
    /// Instruction and data memory configuration
    pub memory: MemoryConfig,
    /// Coprocessor configuration
    pub coprocessors: CoprocessorConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is malformed or a value fails validation.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks alignment of the reset PC and vectors, memory size, and latencies.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("reset_pc", self.pipeline.reset_pc),
            ("trap_vector", self.pipeline.trap_vector),
            ("interrupt_vector", self.pipeline.interrupt_vector),
        ] {
            if value & WORD_ALIGN_MASK != 0 {
                return Err(ConfigError::Misaligned { name, value });
            }
        }
        if self.memory.size_bytes == 0 || self.memory.size_bytes % 4 != 0 {
            return Err(ConfigError::MemorySize(self.memory.size_bytes));
        }
        if let Some(unit) = self.coprocessors.latency.iter().position(|&l| l == 0) {
            return Err(ConfigError::ZeroLatency { unit });
        }
        Ok(())
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log every retired instruction (disassembled) at debug level.
    pub trace_instructions: bool,

    /// Cycle bound of the run loop; the only limit on a starved pipeline.
    pub max_cycles: u64,

    /// Stop the run loop at the first trap instead of continuing at the vector.
    pub halt_on_trap: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            max_cycles: defaults::MAX_CYCLES,
            halt_on_trap: true,
        }
    }
}

/// Pipeline reset, redirect, and hazard-handling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Address fetched after reset (overridden by an ELF entry point).
    pub reset_pc: u32,

    /// Redirect target for coprocessor exceptions.
    pub trap_vector: u32,

    /// Redirect target for external interrupts.
    pub interrupt_vector: u32,

    /// Enable the EX/MEM forwarding network. When disabled every RAW dependency
    /// stalls Decode until the producer has written back.
    pub forwarding: bool,

    /// Consecutive not-ready coprocessor cycles before a warning (0 disables it).
    pub starvation_warn_cycles: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reset_pc: defaults::RESET_PC,
            trap_vector: defaults::TRAP_VECTOR,
            interrupt_vector: defaults::INTERRUPT_VECTOR,
            forwarding: true,
            starvation_warn_cycles: defaults::STARVATION_WARN_CYCLES,
        }
    }
}

/// Memory configuration applied to both the instruction and data memories.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Capacity of each memory in bytes.
    pub size_bytes: usize,

    /// Instruction port latency in cycles.
    pub fetch_latency: u32,

    /// Data port latency in cycles.
    pub data_latency: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MEMORY_SIZE,
            fetch_latency: defaults::FETCH_LATENCY,
            data_latency: defaults::DATA_LATENCY,
        }
    }
}

/// Coprocessor configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoprocessorConfig {
    /// Latency in cycles per unit (CP0..CP3). CP0 always answers in one cycle.
    pub latency: [u32; NUM_COPROCESSORS],
}

impl Default for CoprocessorConfig {
    fn default() -> Self {
        Self {
            latency: defaults::COPROCESSOR_LATENCY,
        }
    }
}
