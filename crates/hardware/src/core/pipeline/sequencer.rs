//! Pipeline Sequencer.
//!
//! This module owns the architectural and latch state of the five-stage pipeline and
//! advances it one clock edge per [`PipelineSequencer::tick`]. It performs the following:
//! 1. **Evaluation:** Runs the stages oldest first (WB, MEM, EX, ID, IF), collecting
//!    stall and flush requests into a single [`CycleControl`].
//! 2. **Clock Edge:** Applies the per-stage fate (advance, hold, or discard) to the
//!    latches and selects the next PC.
//! 3. **Traps:** Records exceptions and interrupts and notifies the coprocessors.
//! 4. **Reporting:** Returns a [`TickReport`] of everything observable this cycle.
//!
//! Flush always wins over stall: stages at or younger than the flush point are emptied
//! even if a stall asked to hold them.

use tracing::debug;

use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::error::{Trap, TrapCause};
use crate::common::reg::RegisterFile;
use crate::config::{Config, PipelineConfig};
use crate::core::pipeline::hazards::{ForwardSource, HazardKind};
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry, IfIdEntry, MemWbEntry};
use crate::core::pipeline::reasons::{
    CycleControl, FlushReason, FlushReasons, Stage, StageFate, StallReason, StallReasons,
};
use crate::core::pipeline::signals::ControlSignals;
use crate::core::pipeline::stages::{
    CycleState, decode_stage, execute_stage, fetch_stage, mem_stage, wb_stage,
};
use crate::core::units::coproc::{
    CoprocessorBank, CoprocessorDispatcher, CpSelect, DispatchOutputs,
};
use crate::soc::traits::MemoryPort;
use crate::stats::SimStats;

/// External control inputs sampled once per cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TickInputs {
    /// Hold the whole pipeline from WB upward.
    pub external_stall: bool,
    /// External interrupt line.
    pub interrupt: bool,
}

/// An instruction committed by the Writeback stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Retired {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// Whether `rd` was written.
    pub writes_register: bool,
    /// Value written (meaningful when `writes_register`).
    pub value: u32,
    /// Coprocessor that executed the instruction, if any.
    pub coprocessor: Option<CpSelect>,
    /// Control signals of the instruction.
    pub ctrl: ControlSignals,
}

/// Everything observable after one clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the cycle just completed (the first tick is cycle 0).
    pub cycle: u64,
    /// Stall reasons raised this cycle.
    pub stalls: StallReasons,
    /// Oldest stalled stage.
    pub stall_point: Option<Stage>,
    /// Flush reasons raised this cycle.
    pub flushes: FlushReasons,
    /// Oldest flushed stage.
    pub flush_point: Option<Stage>,
    /// PC at the start of the cycle.
    pub pc_before: u32,
    /// PC after the clock edge.
    pub pc_after: u32,
    /// Source of the decoding instruction's `rs1` value.
    pub forward_rs1: ForwardSource,
    /// Source of the decoding instruction's `rs2` value.
    pub forward_rs2: ForwardSource,
    /// Hazard classification of the decoding instruction's `rs1`.
    pub hazard_rs1: HazardKind,
    /// Hazard classification of the decoding instruction's `rs2`.
    pub hazard_rs2: HazardKind,
    /// Dispatcher outputs of the EX stage.
    pub dispatch: DispatchOutputs,
    /// Instruction retired this cycle.
    pub retired: Option<Retired>,
    /// Trap taken this cycle.
    pub trap: Option<Trap>,
}

impl TickReport {
    /// Returns `true` if any stage was held this cycle.
    pub const fn stalled(&self) -> bool {
        !self.stalls.is_empty()
    }

    /// Returns `true` if any stage was emptied this cycle.
    pub const fn flushed(&self) -> bool {
        !self.flushes.is_empty()
    }
}

/// The five-stage in-order pipeline.
///
/// A `None` latch is an empty (bubble) slot.
pub struct PipelineSequencer {
    /// Address presented to the instruction port.
    pub(crate) pc: u32,
    /// IF/ID latch.
    pub(crate) if_id: Option<IfIdEntry>,
    /// ID/EX latch.
    pub(crate) id_ex: Option<IdExEntry>,
    /// EX/MEM latch.
    pub(crate) ex_mem: Option<ExMemEntry>,
    /// MEM/WB latch.
    pub(crate) mem_wb: Option<MemWbEntry>,
    /// Architectural integer registers.
    pub(crate) regs: RegisterFile,
    /// Instruction port.
    pub(crate) imem: Box<dyn MemoryPort>,
    /// Data port.
    pub(crate) dmem: Box<dyn MemoryPort>,
    /// CP0-CP3.
    pub(crate) coprocessors: CoprocessorBank,
    /// Coprocessor dispatcher of the EX stage.
    pub(crate) dispatcher: CoprocessorDispatcher,
    /// Reset, vectors, and hazard handling.
    pub(crate) settings: PipelineConfig,
    /// Log retired instructions with disassembly.
    pub(crate) trace: bool,
    last_trap: Option<Trap>,
    stats: SimStats,
    cycle: u64,
}

impl PipelineSequencer {
    /// Creates a pipeline in its reset state: every latch empty and the PC at
    /// `pipeline.reset_pc`.
    ///
    /// # Arguments
    ///
    /// * `config` - Model configuration (pipeline settings and trace flag are used).
    /// * `imem` - Instruction port.
    /// * `dmem` - Data port.
    /// * `coprocessors` - The CP0-CP3 bank.
    pub fn new(
        config: &Config,
        imem: Box<dyn MemoryPort>,
        dmem: Box<dyn MemoryPort>,
        coprocessors: CoprocessorBank,
    ) -> Self {
        Self {
            pc: config.pipeline.reset_pc,
            if_id: None,
            id_ex: None,
            ex_mem: None,
            mem_wb: None,
            regs: RegisterFile::new(),
            imem,
            dmem,
            coprocessors,
            dispatcher: CoprocessorDispatcher::new(config.pipeline.starvation_warn_cycles),
            settings: config.pipeline.clone(),
            trace: config.general.trace_instructions || cfg!(feature = "always-trace"),
            last_trap: None,
            stats: SimStats::default(),
            cycle: 0,
        }
    }

    /// Advances the pipeline by one clock edge.
    ///
    /// # Arguments
    ///
    /// * `inputs` - External stall and interrupt lines for this cycle.
    ///
    /// # Returns
    ///
    /// The [`TickReport`] of the cycle.
    pub fn tick(&mut self, inputs: TickInputs) -> TickReport {
        let mut state = CycleState::new(inputs);
        let pc_before = self.pc;

        if inputs.external_stall {
            state.control.stall(StallReason::ExternalStall, Stage::Wb);
        }
        if inputs.interrupt {
            let trap = Trap {
                cause: TrapCause::ExternalInterrupt,
                pc: self.oldest_in_flight_pc(),
            };
            debug!("{trap}; redirect to {:#010x}", self.settings.interrupt_vector);
            state.control.flush(
                FlushReason::Interrupt,
                Stage::Mem,
                self.settings.interrupt_vector,
            );
            state.trap = Some(trap);
        }

        wb_stage(self, &mut state);
        mem_stage(self, &mut state);
        execute_stage(self, &mut state);
        decode_stage(self, &mut state);
        fetch_stage(self, &mut state);

        self.clock_edge(&state);

        let report = TickReport {
            cycle: self.cycle,
            stalls: state.control.stalls,
            stall_point: state.control.stall_point,
            flushes: state.control.flushes,
            flush_point: state.control.flush_point,
            pc_before,
            pc_after: self.pc,
            forward_rs1: state.forward_rs1,
            forward_rs2: state.forward_rs2,
            hazard_rs1: state.hazard_rs1,
            hazard_rs2: state.hazard_rs2,
            dispatch: state.dispatch,
            retired: state.retired,
            trap: state.trap,
        };
        self.stats.record(&report);
        self.cycle += 1;
        report
    }

    /// Applies the per-stage fate to the latches, the PC, and the trap state.
    fn clock_edge(&mut self, state: &CycleState) {
        let control = &state.control;
        if !control.stalls.is_empty() || !control.flushes.is_empty() {
            debug!(
                stalls = ?control.stalls.iter().collect::<Vec<_>>(),
                stall_point = ?control.stall_point,
                flushes = ?control.flushes.iter().collect::<Vec<_>>(),
                flush_point = ?control.flush_point,
                "cycle {}",
                self.cycle
            );
        }

        self.mem_wb = latch(control, Stage::Wb, self.mem_wb, state.mem_out);
        self.ex_mem = latch(control, Stage::Mem, self.ex_mem, state.ex_out);
        self.id_ex = latch(control, Stage::Ex, self.id_ex, state.id_out);
        self.if_id = latch(control, Stage::Id, self.if_id, state.if_out);

        self.pc = if let Some(target) = control.redirect {
            target
        } else if control.stall_point.is_some() || state.if_out.is_none() {
            self.pc
        } else {
            self.pc.wrapping_add(INSTRUCTION_BYTES)
        };

        if state.retired.is_some() {
            self.coprocessors.retired();
        }
        if let Some(trap) = state.trap {
            self.coprocessors.trap_taken(&trap);
            self.last_trap = Some(trap);
        }
    }

    /// PC of the oldest instruction an interrupt discards (the one in MEM, else the
    /// next oldest, else the PC about to be fetched).
    fn oldest_in_flight_pc(&self) -> u32 {
        self.ex_mem
            .map(|e| e.pc)
            .or_else(|| self.id_ex.map(|e| e.pc))
            .or_else(|| self.if_id.map(|e| e.pc))
            .unwrap_or(self.pc)
    }

    /// Most recent trap taken, if any.
    pub const fn last_trap(&self) -> Option<Trap> {
        self.last_trap
    }

    /// Current fetch address.
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Statistics accumulated over every tick.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Number of cycles simulated.
    pub const fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Architectural register file.
    pub const fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Mutable register file, for seeding state before a run.
    pub const fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// IF/ID latch contents.
    pub const fn if_id(&self) -> Option<IfIdEntry> {
        self.if_id
    }

    /// ID/EX latch contents.
    pub const fn id_ex(&self) -> Option<IdExEntry> {
        self.id_ex
    }

    /// EX/MEM latch contents.
    pub const fn ex_mem(&self) -> Option<ExMemEntry> {
        self.ex_mem
    }

    /// MEM/WB latch contents.
    pub const fn mem_wb(&self) -> Option<MemWbEntry> {
        self.mem_wb
    }

    /// Returns `true` if every latch is empty.
    pub const fn is_drained(&self) -> bool {
        self.if_id.is_none()
            && self.id_ex.is_none()
            && self.ex_mem.is_none()
            && self.mem_wb.is_none()
    }

    /// Instruction port.
    pub fn imem(&self) -> &dyn MemoryPort {
        self.imem.as_ref()
    }

    /// Data port.
    pub fn dmem(&self) -> &dyn MemoryPort {
        self.dmem.as_ref()
    }

    /// Coprocessor bank.
    pub const fn coprocessors(&self) -> &CoprocessorBank {
        &self.coprocessors
    }

    /// Consecutive cycles the EX coprocessor request has been waiting.
    pub const fn coprocessor_wait(&self) -> u64 {
        self.dispatcher.not_ready_cycles()
    }
}

impl std::fmt::Debug for PipelineSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineSequencer")
            .field("pc", &format_args!("{:#010x}", self.pc))
            .field("if_id", &self.if_id)
            .field("id_ex", &self.id_ex)
            .field("ex_mem", &self.ex_mem)
            .field("mem_wb", &self.mem_wb)
            .field("coprocessors", &self.coprocessors)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

/// Next contents of the latch holding `stage`'s instruction.
///
/// A held stage keeps its instruction. Otherwise the latch takes the output of the
/// stage upstream if that stage advances, or becomes a bubble.
fn latch<T: Copy>(
    control: &CycleControl,
    stage: Stage,
    current: Option<T>,
    upstream: Option<T>,
) -> Option<T> {
    if control.fate(stage) == StageFate::Hold {
        return current;
    }
    match stage.upstream() {
        Some(prev) if control.fate(prev) == StageFate::Advance => upstream,
        _ => None,
    }
}
