//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the instruction pipeline.
//! It performs the following:
//! 1. **Decoding:** Builds the control bundle and immediate of the fetched word.
//! 2. **Hazard Check:** Stalls on a load-use dependency, or on any RAW dependency when
//!    forwarding is disabled.
//! 3. **Operand Read:** Reads the register file and applies the forwarding network.
//! 4. **Branch Resolution:** Resolves branches and jumps with the forwarded operands.
//!    The fetch stream is predicted not-taken, so a redirect flushes IF.

use tracing::{debug, trace};

use crate::core::pipeline::control;
use crate::core::pipeline::hazards::{self, ForwardSource, HazardKind};
use crate::core::pipeline::latches::IdExEntry;
use crate::core::pipeline::reasons::{FlushReason, Stage, StallReason};
use crate::core::pipeline::sequencer::PipelineSequencer;
use crate::core::pipeline::signals::{ControlSignals, ImmType};
use crate::core::pipeline::stages::CycleState;
use crate::core::units::bru::{BranchTargets, PcSelect, branch_taken, next_pc};
use crate::core::units::coproc::dispatcher::classify;
use crate::isa::decode::immediate;
use crate::isa::instruction::InstructionBits;

/// Registers an instruction actually reads, as `(rs1, rs2)`.
///
/// U and J formats read nothing. I format and SYSTEM read only `rs1` (the `rs2` field
/// of a CSR instruction is part of the CSR address). Unused register fields therefore
/// never raise a false dependency.
const fn reads(ctrl: &ControlSignals) -> (bool, bool) {
    if ctrl.system {
        return (true, false);
    }
    match ctrl.imm_type {
        ImmType::U | ImmType::J => (false, false),
        ImmType::I => (true, false),
        ImmType::None | ImmType::S | ImmType::B => (true, true),
    }
}

/// Executes the instruction decode stage.
///
/// Uses the EX and MEM producer states published earlier in the same cycle, and the
/// register file as already updated by Writeback.
///
/// # Arguments
///
/// * `seq` - The sequencer whose IF/ID latch and register file are used.
/// * `state` - Scratch state of the current cycle; receives the ID output, hazard and
///   forwarding decisions, and any branch redirect.
pub fn decode_stage(seq: &mut PipelineSequencer, state: &mut CycleState) {
    let Some(entry) = seq.if_id else {
        return;
    };
    if state.control.flushed(Stage::Id) || state.control.held_downstream(Stage::Id) {
        return;
    }

    let inst = entry.inst;
    let ctrl = control::decode(inst, true);
    if ctrl == ControlSignals::default() && classify(inst.opcode()).is_none() {
        debug!("ID  pc={:#010x} unrecognised {inst:#010x}; bubble", entry.pc);
        return;
    }

    let (reads_rs1, reads_rs2) = reads(&ctrl);
    let rs1 = if reads_rs1 { inst.rs1() } else { 0 };
    let rs2 = if reads_rs2 { inst.rs2() } else { 0 };

    state.hazard_rs1 = hazards::classify(rs1, &state.ex_state, &state.mem_state);
    state.hazard_rs2 = hazards::classify(rs2, &state.ex_state, &state.mem_state);

    if hazards::load_use(&[rs1, rs2], &state.ex_state) {
        debug!("ID  pc={:#010x} load-use on x{}", entry.pc, state.ex_state.dest_register);
        state.control.stall(StallReason::LoadUseHazard, Stage::Id);
        return;
    }
    let raw = [state.hazard_rs1, state.hazard_rs2].contains(&HazardKind::RawHazard);
    if raw && !seq.settings.forwarding {
        debug!("ID  pc={:#010x} RAW hazard without forwarding", entry.pc);
        state.control.stall(StallReason::RawHazard, Stage::Id);
        return;
    }

    let a = hazards::forward(rs1, seq.regs.read(rs1), &state.ex_state, &state.mem_state);
    let b = hazards::forward(rs2, seq.regs.read(rs2), &state.ex_state, &state.mem_state);
    state.forward_rs1 = a.source;
    state.forward_rs2 = b.source;
    for (reg, fwd) in [(rs1, a), (rs2, b)] {
        if fwd.source != ForwardSource::RegFile {
            trace!(
                "ID  pc={:#010x} x{reg} <- {:?} {:#010x}",
                entry.pc, fwd.source, fwd.value
            );
        }
    }

    let targets = BranchTargets::compute(entry.pc, inst, a.value);
    let taken = ctrl.branch && branch_taken(inst.funct3(), a.value, b.value);
    let sel = PcSelect::select(&ctrl, taken);
    if sel.redirects() {
        let target = next_pc(sel, entry.pc, &targets);
        debug!("ID  pc={:#010x} {sel:?} redirect to {target:#010x}", entry.pc);
        state
            .control
            .flush(FlushReason::BranchMispredict, Stage::If, target);
    }

    state.id_out = Some(IdExEntry {
        pc: entry.pc,
        inst,
        rs1,
        rs2,
        rd: inst.rd(),
        imm: immediate(inst, ctrl.imm_type),
        rv1: a.value,
        rv2: b.value,
        ctrl,
    });
}
