//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the instruction pipeline.
//! It presents the current PC to the instruction port and latches the returned
//! word. The next PC is chosen at the clock edge by the sequencer.

use tracing::debug;

use crate::core::pipeline::latches::IfIdEntry;
use crate::core::pipeline::reasons::{Stage, StallReason};
use crate::core::pipeline::sequencer::PipelineSequencer;
use crate::core::pipeline::stages::CycleState;
use crate::soc::traits::MemRequest;

/// Executes the instruction fetch stage of the pipeline.
///
/// No request is made while a flush is pending (the fetched word would be discarded)
/// or while a downstream stage holds IF.
///
/// # Arguments
///
/// * `seq` - The sequencer whose PC and instruction port are used.
/// * `state` - Scratch state of the current cycle; receives the IF output.
pub fn fetch_stage(seq: &mut PipelineSequencer, state: &mut CycleState) {
    if state.control.flush_point.is_some() || state.control.held_downstream(Stage::If) {
        return;
    }

    let resp = seq.imem.access(&MemRequest::read(seq.pc));
    if !resp.ready {
        debug!("IF  pc={:#010x} instruction port not ready", seq.pc);
        state.control.stall(StallReason::MemoryNotReady, Stage::If);
        return;
    }

    state.if_out = Some(IfIdEntry {
        pc: seq.pc,
        inst: resp.read_data,
    });
}
