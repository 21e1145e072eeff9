//! Data Hazard Detection and Forwarding.
//!
//! This module keeps the pipeline consistent when an instruction in Decode reads a
//! register that an older, still in-flight instruction will write. It provides:
//! 1. **Hazard Classification:** Flags a read-after-write dependency on the EX or MEM producer.
//! 2. **Operand Forwarding:** Picks the freshest value for a source operand by fixed priority.
//! 3. **Load-Use Detection:** Identifies the one case forwarding cannot cover (a load in EX).
//!
//! Every function here is a pure function of the current cycle's stage states.
//! Register `x0` never matches a producer, so it always resolves to the register file.

use crate::core::pipeline::latches::PipelineStageState;

/// Read-after-write classification for one source operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// No in-flight producer writes the operand.
    #[default]
    NoHazard,
    /// The EX or MEM instruction writes the operand.
    RawHazard,
}

/// Where a forwarded operand came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForwardSource {
    /// The register file value (no newer producer).
    #[default]
    RegFile,
    /// The result of the instruction in EX.
    ExResult,
    /// The ALU result carried by the instruction in MEM.
    MemAlu,
    /// The load data returned to the instruction in MEM.
    MemLoad,
}

/// A resolved source operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Forwarded {
    /// The operand value.
    pub value: u32,
    /// The path it was taken from.
    pub source: ForwardSource,
}

/// Returns `true` if `producer` writes the non-zero register `reg`.
#[inline]
const fn produces(producer: &PipelineStageState, reg: usize) -> bool {
    reg != 0 && producer.writes_register && producer.dest_register == reg
}

/// Classifies the dependency of a source register on the EX and MEM producers.
///
/// # Arguments
///
/// * `read_register` - The source register index read in Decode.
/// * `ex` - State of the instruction in the Execute stage.
/// * `mem` - State of the instruction in the Memory stage.
///
/// # Returns
///
/// `RawHazard` if either producer writes `read_register` and it is not `x0`.
pub const fn classify(
    read_register: usize,
    ex: &PipelineStageState,
    mem: &PipelineStageState,
) -> HazardKind {
    if produces(ex, read_register) || produces(mem, read_register) {
        HazardKind::RawHazard
    } else {
        HazardKind::NoHazard
    }
}

/// Resolves a source operand through the forwarding network.
///
/// Priority is fixed: the EX result first, then the MEM result (load data when the
/// MEM instruction is a load, else its ALU result), then the register file. When both
/// EX and MEM write the register, EX is the younger producer and wins.
///
/// # Arguments
///
/// * `read_register` - The source register index.
/// * `regfile_value` - The value the register file returns for `read_register`.
/// * `ex` - State of the instruction in the Execute stage.
/// * `mem` - State of the instruction in the Memory stage.
///
/// # Returns
///
/// The forwarded value together with its source.
pub const fn forward(
    read_register: usize,
    regfile_value: u32,
    ex: &PipelineStageState,
    mem: &PipelineStageState,
) -> Forwarded {
    if produces(ex, read_register) {
        Forwarded {
            value: ex.data_value,
            source: ForwardSource::ExResult,
        }
    } else if produces(mem, read_register) {
        Forwarded {
            value: mem.data_value,
            source: if mem.is_load {
                ForwardSource::MemLoad
            } else {
                ForwardSource::MemAlu
            },
        }
    } else {
        Forwarded {
            value: regfile_value,
            source: ForwardSource::RegFile,
        }
    }
}

/// Checks if a stall is needed due to a load-use data hazard.
///
/// A load in EX has not read memory yet, so its destination cannot be forwarded to
/// the instruction in Decode this cycle.
///
/// # Arguments
///
/// * `read_registers` - The source registers the decoding instruction actually reads.
/// * `ex` - State of the instruction in the Execute stage.
///
/// # Returns
///
/// `true` if the EX instruction is a load writing one of `read_registers`.
///
/// # Examples
///
/// ```
/// use rvpipe_core::core::pipeline::hazards::load_use;
/// use rvpipe_core::core::pipeline::latches::PipelineStageState;
///
/// // lw x1, 0(x2) in EX; add x3, x1, x4 in ID
/// let ex = PipelineStageState { dest_register: 1, writes_register: true, data_value: 0, is_load: true };
/// assert!(load_use(&[1, 4], &ex));
/// assert!(!load_use(&[2, 4], &ex));
/// ```
pub fn load_use(read_registers: &[usize], ex: &PipelineStageState) -> bool {
    ex.is_load && read_registers.iter().any(|&r| produces(ex, r))
}
