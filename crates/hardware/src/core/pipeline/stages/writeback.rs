//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction pipeline.
//! It is the only writer of the register file. Coprocessor results arrive here as
//! the EX result of their owning instruction, so there is no second write port.

use tracing::debug;

use crate::core::pipeline::reasons::{Stage, StageFate};
use crate::core::pipeline::sequencer::{PipelineSequencer, Retired};
use crate::core::pipeline::stages::CycleState;
use crate::isa::disasm::disassemble;

/// Executes the writeback stage of the pipeline.
///
/// Retires the instruction in the MEM/WB latch unless an external stall holds it.
/// The write happens before Decode reads the register file in the same cycle.
///
/// # Arguments
///
/// * `seq` - The sequencer whose MEM/WB latch and register file are used.
/// * `state` - Scratch state of the current cycle; receives the retired instruction.
pub fn wb_stage(seq: &mut PipelineSequencer, state: &mut CycleState) {
    let Some(entry) = seq.mem_wb else {
        return;
    };
    if state.control.fate(Stage::Wb) != StageFate::Advance {
        return;
    }

    if entry.writes_register {
        seq.regs.write(entry.rd, entry.value);
    }

    if seq.trace {
        debug!(
            "WB  pc={:#010x} {:<28} rd=x{} <- {:#010x}",
            entry.pc,
            disassemble(entry.inst),
            entry.rd,
            entry.value
        );
    }

    state.retired = Some(Retired {
        pc: entry.pc,
        inst: entry.inst,
        rd: entry.rd,
        writes_register: entry.writes_register,
        value: entry.value,
        coprocessor: entry.coprocessor,
        ctrl: entry.ctrl,
    });
}
