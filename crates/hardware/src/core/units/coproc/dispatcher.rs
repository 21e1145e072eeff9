//! Coprocessor Dispatcher.
//!
//! Routes offloadable instructions to the coprocessor bank and reports completion back
//! to the owning pipeline stage. It performs the following:
//! 1. **Classification:** Maps the major opcode to a coprocessor slot.
//! 2. **Issue:** Presents the instruction and operands to the selected unit while the
//!    stage is neither empty nor held, and requests a stall until the unit is ready.
//! 3. **Completion:** Reports the result in the same cycle `ready` rises, gates the
//!    register write for `x0`, and mirrors the exception line without latching.
//!
//! The dispatcher adds no latency. A unit that never becomes ready keeps the stall
//! asserted forever; the only reaction is a starvation warning in the trace.

use tracing::warn;

use crate::core::units::coproc::{
    CoprocessorBank, CoprocessorRequest, CoprocessorResponse, CpSelect,
};
use crate::isa::custom::opcodes as custom_opcodes;
use crate::isa::instruction::InstructionBits;
use crate::isa::privileged::opcodes as sys_opcodes;
use crate::isa::rv32f::opcodes as fp_opcodes;

/// Maps a major opcode to the coprocessor that executes it.
///
/// # Returns
///
/// `Some(slot)` for SYSTEM (CP0), OP-FP (CP1), custom-0 (CP2) and custom-1 (CP3);
/// `None` for every other opcode.
pub const fn classify(opcode: u32) -> Option<CpSelect> {
    match opcode {
        sys_opcodes::OP_SYSTEM => Some(CpSelect::Cp0),
        fp_opcodes::OP_FP => Some(CpSelect::Cp1),
        custom_opcodes::OP_CUSTOM_0 => Some(CpSelect::Cp2),
        custom_opcodes::OP_CUSTOM_1 => Some(CpSelect::Cp3),
        _ => None,
    }
}

/// Result of coprocessor instruction detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Detection {
    /// The instruction is offloaded this cycle.
    pub is_cp_instruction: bool,
    /// The addressed unit, when detected.
    pub cp_select: Option<CpSelect>,
}

/// Detects a coprocessor instruction.
///
/// Detection is suppressed when the slot is empty (`inst_valid == false`) or the
/// pipeline is stalled downstream (`pipeline_stall == true`).
pub fn detect(instruction: u32, inst_valid: bool, pipeline_stall: bool) -> Detection {
    if !inst_valid || pipeline_stall {
        return Detection {
            is_cp_instruction: false,
            cp_select: None,
        };
    }
    let cp_select = classify(instruction.opcode());
    Detection {
        is_cp_instruction: cp_select.is_some(),
        cp_select,
    }
}

/// Per-cycle inputs of the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchInputs {
    /// The instruction in the owning stage.
    pub instruction: u32,
    /// The owning stage holds a real instruction.
    pub inst_valid: bool,
    /// A stage downstream of the owner is stalled.
    pub pipeline_stall: bool,
    /// Forwarded `rs1` value (operand A).
    pub rs1_data: u32,
    /// Forwarded `rs2` value (operand B).
    pub rs2_data: u32,
}

/// Per-cycle outputs of the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutputs {
    /// The instruction is offloaded this cycle.
    pub is_cp_instruction: bool,
    /// The addressed unit.
    pub cp_select: Option<CpSelect>,
    /// A request is presented to the addressed unit.
    pub cp_valid: bool,
    /// The request presented (idle when `cp_valid` is low).
    pub request: CoprocessorRequest,
    /// The owning stage must not advance.
    pub cp_stall_request: bool,
    /// A result is available this cycle.
    pub cp_result_valid: bool,
    /// The result is written to `cp_reg_addr`.
    pub cp_reg_write: bool,
    /// Destination register of the result.
    pub cp_reg_addr: usize,
    /// Result data.
    pub cp_reg_data: u32,
    /// Mirror of the addressed unit's exception line.
    pub cp_exception_out: bool,
}

/// Builds the request for this cycle.
///
/// # Returns
///
/// The detection and the request to present. The request is idle unless detected.
pub fn issue(inputs: &DispatchInputs) -> (Detection, CoprocessorRequest) {
    let detection = detect(inputs.instruction, inputs.inst_valid, inputs.pipeline_stall);
    let request = if detection.is_cp_instruction {
        CoprocessorRequest {
            instruction: inputs.instruction,
            operand_a: inputs.rs1_data,
            operand_b: inputs.rs2_data,
            valid: true,
        }
    } else {
        CoprocessorRequest::IDLE
    };
    (detection, request)
}

/// Combines the addressed unit's response into the dispatcher outputs.
///
/// Pure and combinational: `cp_result_valid` rises in the same cycle as `ready`, and
/// `cp_exception_out` follows `exception` in the same cycle it sets or clears.
pub fn complete(
    inputs: &DispatchInputs,
    detection: Detection,
    request: CoprocessorRequest,
    response: CoprocessorResponse,
) -> DispatchOutputs {
    let cp_valid = detection.is_cp_instruction;
    let rd = inputs.instruction.rd();
    let cp_result_valid = cp_valid && response.ready;
    DispatchOutputs {
        is_cp_instruction: detection.is_cp_instruction,
        cp_select: detection.cp_select,
        cp_valid,
        request,
        cp_stall_request: cp_valid && !response.ready,
        cp_result_valid,
        cp_reg_write: cp_result_valid && rd != 0,
        cp_reg_addr: rd,
        cp_reg_data: response.data_out,
        cp_exception_out: cp_valid && response.exception,
    }
}

/// Stateful wrapper that drives the bank each cycle and watches for starvation.
#[derive(Clone, Debug, Default)]
pub struct CoprocessorDispatcher {
    starvation_warn_cycles: u64,
    not_ready_cycles: u64,
}

impl CoprocessorDispatcher {
    /// Creates a dispatcher that warns once a unit has been not-ready for
    /// `starvation_warn_cycles` consecutive cycles (0 disables the warning).
    pub const fn new(starvation_warn_cycles: u64) -> Self {
        Self {
            starvation_warn_cycles,
            not_ready_cycles: 0,
        }
    }

    /// Consecutive cycles the current request has waited for `ready`.
    pub const fn not_ready_cycles(&self) -> u64 {
        self.not_ready_cycles
    }

    /// Evaluates one cycle: issues to the bank and completes from its response.
    ///
    /// Every unit in the bank is clocked exactly once, addressed or not.
    pub fn cycle(
        &mut self,
        inputs: &DispatchInputs,
        bank: &mut CoprocessorBank,
    ) -> DispatchOutputs {
        let (detection, request) = issue(inputs);
        let response = bank.cycle(detection.cp_select, &request);
        let out = complete(inputs, detection, request, response);

        if out.cp_stall_request {
            self.not_ready_cycles += 1;
            let starving = self.starvation_warn_cycles != 0
                && self.not_ready_cycles == self.starvation_warn_cycles;
            if let Some(slot) = out.cp_select.filter(|_| starving) {
                warn!(
                    unit = %slot,
                    name = bank.name(slot),
                    cycles = self.not_ready_cycles,
                    "coprocessor has not asserted ready; pipeline is starved"
                );
            }
        } else if !inputs.pipeline_stall {
            self.not_ready_cycles = 0;
        }
        out
    }
}
