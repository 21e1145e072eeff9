//! RV32 pipeline control-path model.
//!
//! This crate implements a cycle-level model of the control path of a five-stage RV32I
//! pipeline with coprocessor offload. It provides the following:
//! 1. **Core:** Instruction decoder, branch resolution, hazard detection and forwarding,
//!    the coprocessor dispatcher, and the pipeline sequencer.
//! 2. **Coprocessors:** A CSR/system unit and fixed-latency units behind a ready/valid trait.
//! 3. **ISA:** RV32I field extraction, immediates for every format, and a disassembler.
//! 4. **SoC:** The memory port trait and a latency-configurable reference memory.
//! 5. **Simulation:** Loader, configuration, run loop, and statistics collection.

/// Common types and constants (registers, traps, errors).
pub mod common;
/// Model configuration (defaults and hierarchical config structures).
pub mod config;
/// Pipeline control path and execution units.
pub mod core;
/// Instruction set (decode, instruction fields, ABI names, disassembly).
pub mod isa;
/// Program loader and run loop.
pub mod sim;
/// Memory port trait and reference memory.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The clocked pipeline; construct with `PipelineSequencer::new`.
pub use crate::core::PipelineSequencer;
/// Run loop over reference collaborators; construct with `Simulator::new`.
pub use crate::sim::Simulator;
