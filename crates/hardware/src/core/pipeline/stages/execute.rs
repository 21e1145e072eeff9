//! Instruction Execute (EX) Stage.
//!
//! This module implements the third stage of the instruction pipeline.
//! It performs the following:
//! 1. **Dispatch:** Clocks the coprocessor dispatcher once per cycle and, for an
//!    offloaded instruction, waits for `ready` or takes the exception.
//! 2. **Integer Datapath:** Runs every other instruction through the reference ALU.
//! 3. **Producer State:** Publishes the EX result for the forwarding network.

use tracing::debug;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::error::{Trap, TrapCause};
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry, PipelineStageState};
use crate::core::pipeline::reasons::{FlushReason, Stage, StallReason};
use crate::core::pipeline::sequencer::PipelineSequencer;
use crate::core::pipeline::stages::CycleState;
use crate::core::units::alu::Alu;
use crate::core::units::coproc::DispatchInputs;
use crate::core::units::coproc::dispatcher::classify;
use crate::isa::instruction::InstructionBits;

/// Executes the execute stage of the pipeline.
///
/// The dispatcher is evaluated even when the slot is empty, flushed, or held, so every
/// coprocessor sees exactly one request per cycle (idle when nothing is issued).
///
/// # Arguments
///
/// * `seq` - The sequencer whose ID/EX latch, dispatcher, and coprocessors are used.
/// * `state` - Scratch state of the current cycle.
pub fn execute_stage(seq: &mut PipelineSequencer, state: &mut CycleState) {
    let entry = seq.id_ex.filter(|_| !state.control.flushed(Stage::Ex));
    let held = state.control.held_downstream(Stage::Ex);

    let offloaded = entry.filter(|e| classify(e.inst.opcode()).is_some());
    let inputs = offloaded.map_or_else(DispatchInputs::default, |e| DispatchInputs {
        instruction: e.inst,
        inst_valid: true,
        pipeline_stall: held,
        rs1_data: e.rv1,
        rs2_data: e.rv2,
    });
    let out = seq.dispatcher.cycle(&inputs, &mut seq.coprocessors);
    state.dispatch = out;

    let Some(entry) = entry else {
        return;
    };
    if held {
        return;
    }

    let result = if out.is_cp_instruction {
        let Some(unit) = out.cp_select else {
            return;
        };
        if out.cp_exception_out {
            let trap = Trap {
                cause: TrapCause::CoprocessorException {
                    unit,
                    instruction: entry.inst,
                },
                pc: entry.pc,
            };
            debug!("EX  {trap}; redirect to {:#010x}", seq.settings.trap_vector);
            state
                .control
                .flush(FlushReason::Exception, Stage::Ex, seq.settings.trap_vector);
            state.trap = Some(trap);
            return;
        }
        if out.cp_stall_request {
            state.control.stall(StallReason::CoprocessorNotReady, Stage::Ex);
            return;
        }
        ExMemEntry {
            writes_register: out.cp_reg_write,
            result: out.cp_reg_data,
            coprocessor: Some(unit),
            ..integer_result(&entry)
        }
    } else {
        integer_result(&entry)
    };

    state.ex_state = PipelineStageState::from_ex(&result);
    state.ex_out = Some(result);
}

/// Runs a non-offloaded instruction through the reference ALU.
///
/// Operand A is `rs1` (the PC for AUIPC); operand B is the immediate when `alu_src`
/// is set, else `rs2`. Jumps produce the link address `pc + 4`. Loads and stores
/// produce their effective address.
fn integer_result(entry: &IdExEntry) -> ExMemEntry {
    let ctrl = entry.ctrl;
    let a = if ctrl.auipc { entry.pc } else { entry.rv1 };
    let b = if ctrl.alu_src { entry.imm as u32 } else { entry.rv2 };

    let result = if ctrl.jump || ctrl.jalr {
        entry.pc.wrapping_add(INSTRUCTION_BYTES)
    } else {
        Alu::execute(ctrl.alu_op, a, b)
    };

    ExMemEntry {
        pc: entry.pc,
        inst: entry.inst,
        rd: entry.rd,
        writes_register: ctrl.reg_write && entry.rd != 0,
        result,
        store_data: entry.rv2,
        coprocessor: None,
        ctrl,
    }
}
