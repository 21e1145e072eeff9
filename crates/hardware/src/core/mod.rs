//! Core processor implementation.
//!
//! This module contains the control path of the pipeline and the execution units it
//! drives.

/// Instruction pipeline implementation (decoder, hazards, latches, sequencer, stages).
pub mod pipeline;

/// Execution units (ALU, branch resolution, coprocessors, LSU).
pub mod units;

pub use self::pipeline::PipelineSequencer;
