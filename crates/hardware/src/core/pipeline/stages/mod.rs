//! Pipeline stage implementations.
//!
//! This module contains the individual implementations for the five stages of the
//! instruction pipeline. It includes:
//! 1. **Fetch:** Requests the word at the PC from the instruction port.
//! 2. **Decode:** Decodes, detects hazards, forwards operands, and resolves branches.
//! 3. **Execute:** Runs the reference ALU or dispatches to a coprocessor.
//! 4. **Memory:** Handles data load and store operations.
//! 5. **Writeback:** Commits results to the register file.
//!
//! Stages are evaluated oldest first (WB, MEM, EX, ID, IF) so that each one sees the
//! stall and flush requests of the stages downstream of it, and so that WB writes the
//! register file before ID reads it. Every stage writes only its own outputs into the
//! shared [`CycleState`]; latches change only at the clock edge in the sequencer.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Memory access stage implementation.
pub mod memory;

/// Writeback stage implementation.
pub mod writeback;

/// Decode stage entry point (ID stage).
pub use decode::decode_stage;
/// Execute stage entry point (EX stage).
pub use execute::execute_stage;
/// Fetch stage entry point (IF stage).
pub use fetch::fetch_stage;
/// Memory stage entry point (MEM stage).
pub use memory::mem_stage;
/// Writeback stage entry point (WB stage).
pub use writeback::wb_stage;

use crate::common::error::Trap;
use crate::core::pipeline::hazards::{ForwardSource, HazardKind};
use crate::core::pipeline::latches::{
    ExMemEntry, IdExEntry, IfIdEntry, MemWbEntry, PipelineStageState,
};
use crate::core::pipeline::reasons::CycleControl;
use crate::core::pipeline::sequencer::{Retired, TickInputs};
use crate::core::units::coproc::DispatchOutputs;

/// Scratch state of one clock cycle, filled in by the stages and applied at the edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleState {
    /// External inputs for this cycle.
    pub inputs: TickInputs,
    /// Stall and flush requests raised so far.
    pub control: CycleControl,
    /// Producer state of the instruction in EX.
    pub ex_state: PipelineStageState,
    /// Producer state of the instruction in MEM.
    pub mem_state: PipelineStageState,
    /// Instruction committed by WB.
    pub retired: Option<Retired>,
    /// MEM output (next MEM/WB entry).
    pub mem_out: Option<MemWbEntry>,
    /// EX output (next EX/MEM entry).
    pub ex_out: Option<ExMemEntry>,
    /// ID output (next ID/EX entry).
    pub id_out: Option<IdExEntry>,
    /// IF output (next IF/ID entry).
    pub if_out: Option<IfIdEntry>,
    /// Hazard classification of the decoding instruction's `rs1`.
    pub hazard_rs1: HazardKind,
    /// Hazard classification of the decoding instruction's `rs2`.
    pub hazard_rs2: HazardKind,
    /// Source of the decoding instruction's `rs1` value.
    pub forward_rs1: ForwardSource,
    /// Source of the decoding instruction's `rs2` value.
    pub forward_rs2: ForwardSource,
    /// Dispatcher outputs of the EX stage.
    pub dispatch: DispatchOutputs,
    /// Trap taken this cycle.
    pub trap: Option<Trap>,
}

impl CycleState {
    /// Starts a cycle with the given external inputs.
    pub fn new(inputs: TickInputs) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }
}
