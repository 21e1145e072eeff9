//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the entry types carried through the five-stage pipeline:
//! Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Instruction Flow:** One entry per latch; `None` in a latch slot is a bubble (EMPTY).
//! 2. **Producer State:** [`PipelineStageState`] summarises what an in-flight instruction
//!    will write, for the hazard unit and forwarding network.
//!
//! Entries are plain values. A stage reads its input entry and builds a fresh output
//! entry; nothing is patched in place.

use crate::core::pipeline::signals::ControlSignals;
use crate::core::units::coproc::CpSelect;

/// Entry in the IF/ID pipeline latch (Fetch to Decode stage).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IfIdEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
}

/// Entry in the ID/EX pipeline latch (Decode to Execute stage).
///
/// Source values are captured after forwarding, so Execute never reads the register file.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IdExEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// First source register index (rs1).
    pub rs1: usize,
    /// Second source register index (rs2).
    pub rs2: usize,
    /// Destination register index (rd).
    pub rd: usize,
    /// Sign-extended immediate value.
    pub imm: i32,
    /// Forwarded value of rs1.
    pub rv1: u32,
    /// Forwarded value of rs2.
    pub rv2: u32,
    /// Control signals for downstream pipeline stages.
    pub ctrl: ControlSignals,
}

/// Entry in the EX/MEM pipeline latch (Execute to Memory stage).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ExMemEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index (rd).
    pub rd: usize,
    /// Whether the instruction writes `rd` (already false for `x0`).
    pub writes_register: bool,
    /// ALU result, link address, coprocessor result, or memory address.
    pub result: u32,
    /// Data to be stored (for store instructions).
    pub store_data: u32,
    /// Coprocessor that executed the instruction, if any.
    pub coprocessor: Option<CpSelect>,
    /// Control signals for downstream pipeline stages.
    pub ctrl: ControlSignals,
}

/// Entry in the MEM/WB pipeline latch (Memory to Writeback stage).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MemWbEntry {
    /// Program counter of the instruction.
    pub pc: u32,
    /// 32-bit instruction encoding.
    pub inst: u32,
    /// Destination register index (rd).
    pub rd: usize,
    /// Whether the instruction writes `rd` (already false for `x0`).
    pub writes_register: bool,
    /// Final value for `rd` (load data for loads, the EX result otherwise).
    pub value: u32,
    /// Coprocessor that executed the instruction, if any.
    pub coprocessor: Option<CpSelect>,
    /// Control signals for the writeback stage.
    pub ctrl: ControlSignals,
}

/// What an instruction occupying the EX or MEM stage will write.
///
/// An empty stage is `PipelineStageState::default()`, which writes nothing.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PipelineStageState {
    /// Destination register index.
    pub dest_register: usize,
    /// Whether the instruction writes `dest_register`.
    pub writes_register: bool,
    /// The value it will write (EX result or MEM result).
    pub data_value: u32,
    /// Whether the instruction is a load (selects the load-data forwarding path in MEM).
    pub is_load: bool,
}

impl PipelineStageState {
    /// Builds the producer state of an instruction that has just executed.
    ///
    /// For a load, `data_value` is only the address; the hazard unit stalls instead
    /// of forwarding it.
    pub const fn from_ex(entry: &ExMemEntry) -> Self {
        Self {
            dest_register: entry.rd,
            writes_register: entry.writes_register,
            data_value: entry.result,
            is_load: entry.ctrl.mem_read,
        }
    }

    /// Builds the producer state of an instruction that has completed its memory access.
    pub const fn from_mem(entry: &MemWbEntry) -> Self {
        Self {
            dest_register: entry.rd,
            writes_register: entry.writes_register,
            data_value: entry.value,
            is_load: entry.ctrl.mem_read,
        }
    }
}
