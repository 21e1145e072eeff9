//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the five-stage instruction pipeline.
//! It includes the following components:
//! 1. **Control:** The instruction decoder producing the control-signal bundle.
//! 2. **Hazards:** RAW classification, load-use detection, and operand forwarding.
//! 3. **Latches:** Inter-stage entries and the producer state used for forwarding.
//! 4. **Reasons:** Stall and flush reason sets and the per-cycle stage fate.
//! 5. **Sequencer:** The clocked pipeline that composes the stages.
//! 6. **Stages:** Implementation of Fetch, Decode, Execute, Memory, and Writeback stages.

/// Instruction decoder (control unit).
pub mod control;

/// Pipeline hazard detection and forwarding logic.
pub mod hazards;

/// Inter-stage pipeline latches (IF/ID, ID/EX, EX/MEM, MEM/WB).
pub mod latches;

/// Stall and flush reasons, stage ordering, and cycle control.
pub mod reasons;

/// The clocked five-stage pipeline.
pub mod sequencer;

/// Control signals generated during instruction decode.
pub mod signals;

/// Pipeline stage implementations (fetch, decode, execute, memory, writeback).
pub mod stages;

pub use self::sequencer::{PipelineSequencer, Retired, TickInputs, TickReport};
