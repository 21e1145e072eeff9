//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the instruction pipeline.
//! Loads and stores present a request to the data port until it answers ready;
//! every other instruction passes its EX result through unchanged.
//!
//! A store is performed only in a cycle where MEM is neither flushed nor held
//! downstream, so it is written exactly once, in the cycle it advances.

use tracing::debug;

use crate::core::pipeline::latches::{MemWbEntry, PipelineStageState};
use crate::core::pipeline::reasons::{Stage, StallReason};
use crate::core::pipeline::sequencer::PipelineSequencer;
use crate::core::pipeline::stages::CycleState;
use crate::core::units::lsu::Lsu;
use crate::isa::instruction::InstructionBits;
use crate::soc::traits::MemRequest;

/// Executes the memory access stage.
///
/// # Arguments
///
/// * `seq` - The sequencer whose EX/MEM latch and data port are used.
/// * `state` - Scratch state of the current cycle; receives the MEM output and the
///   producer state used for forwarding.
pub fn mem_stage(seq: &mut PipelineSequencer, state: &mut CycleState) {
    let Some(entry) = seq.ex_mem else {
        return;
    };
    if state.control.flushed(Stage::Mem) || state.control.held_downstream(Stage::Mem) {
        return;
    }

    let mut value = entry.result;
    if entry.ctrl.mem_read || entry.ctrl.mem_write {
        let f3 = entry.inst.funct3();
        let addr = entry.result;
        let req = if entry.ctrl.mem_write {
            MemRequest {
                address: addr,
                is_write: true,
                write_data: Lsu::store_data(f3, addr, entry.store_data),
                byte_enable: Lsu::byte_enable(f3, addr),
            }
        } else {
            MemRequest::read(addr)
        };

        let resp = seq.dmem.access(&req);
        if !resp.ready {
            debug!("MEM pc={:#010x} data port not ready addr={addr:#010x}", entry.pc);
            state.control.stall(StallReason::MemoryNotReady, Stage::Mem);
            return;
        }
        if entry.ctrl.mem_read {
            value = Lsu::load_data(f3, addr, resp.read_data);
        }
    }

    let out = MemWbEntry {
        pc: entry.pc,
        inst: entry.inst,
        rd: entry.rd,
        writes_register: entry.writes_register,
        value,
        coprocessor: entry.coprocessor,
        ctrl: entry.ctrl,
    };
    state.mem_state = PipelineStageState::from_mem(&out);
    state.mem_out = Some(out);
}
