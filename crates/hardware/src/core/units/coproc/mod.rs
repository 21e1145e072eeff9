//! Coprocessor interface and units.
//!
//! System, floating-point, and custom instructions are offloaded to four auxiliary
//! units over a ready/valid handshake. This module provides:
//! 1. **Interface:** The request/response records and the [`Coprocessor`] trait.
//! 2. **Bank:** [`CoprocessorBank`], which owns CP0-CP3 and presents one request per cycle.
//! 3. **Dispatch:** The [`dispatcher`] that classifies, issues, and completes offloads.
//! 4. **Reference Units:** A CSR/system unit ([`system`]) and fixed-latency units ([`latency`]).

/// Classification, issue, and completion of coprocessor instructions.
pub mod dispatcher;

/// Fixed-latency reference coprocessors (CP1-CP3).
pub mod latency;

/// CSR and system reference coprocessor (CP0).
pub mod system;

use std::fmt;

use crate::common::error::Trap;

pub use self::dispatcher::{CoprocessorDispatcher, DispatchInputs, DispatchOutputs};
pub use self::latency::LatencyUnit;
pub use self::system::SystemUnit;

/// Number of coprocessor slots.
pub const NUM_COPROCESSORS: usize = 4;

/// Identifier of a coprocessor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpSelect {
    /// System / CSR unit (SYSTEM opcode).
    Cp0,
    /// Floating-point unit (OP-FP opcode).
    Cp1,
    /// Custom accelerator (custom-0 opcode).
    Cp2,
    /// Custom accelerator (custom-1 opcode).
    Cp3,
}

impl CpSelect {
    /// All units in slot order.
    pub const ALL: [Self; NUM_COPROCESSORS] = [Self::Cp0, Self::Cp1, Self::Cp2, Self::Cp3];

    /// Slot index (0-3).
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CpSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CP{}", self.index())
    }
}

/// Request presented to a coprocessor for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoprocessorRequest {
    /// The instruction being offloaded.
    pub instruction: u32,
    /// Operand A (forwarded `rs1`).
    pub operand_a: u32,
    /// Operand B (forwarded `rs2`).
    pub operand_b: u32,
    /// Enable. An idle request has `valid == false`.
    pub valid: bool,
}

impl CoprocessorRequest {
    /// The idle request presented to every unit not addressed this cycle.
    pub const IDLE: Self = Self {
        instruction: 0,
        operand_a: 0,
        operand_b: 0,
        valid: false,
    };
}

/// Response of a coprocessor for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoprocessorResponse {
    /// The unit has completed the current request (or is idle).
    pub ready: bool,
    /// Result data, meaningful when `ready`.
    pub data_out: u32,
    /// Exception line. Level signal, mirrored by the dispatcher without latching.
    pub exception: bool,
}

/// An opaque ready/valid coprocessor.
///
/// `respond` is called exactly once per cycle for every unit. Multi-cycle behavior is
/// visible only through `ready` being low; no fixed latency may be assumed.
pub trait Coprocessor {
    /// Evaluates one cycle of the unit against `req`.
    fn respond(&mut self, req: &CoprocessorRequest) -> CoprocessorResponse;

    /// Human-readable unit name for traces.
    fn name(&self) -> &str;

    /// Notifies the unit that an instruction retired this cycle.
    fn retired(&mut self) {}

    /// Notifies the unit that the pipeline took a trap.
    fn trap_taken(&mut self, _trap: &Trap) {}
}

/// The four coprocessor slots.
pub struct CoprocessorBank {
    units: [Box<dyn Coprocessor>; NUM_COPROCESSORS],
}

impl CoprocessorBank {
    /// Creates a bank from four units in slot order (CP0 first).
    pub fn new(units: [Box<dyn Coprocessor>; NUM_COPROCESSORS]) -> Self {
        Self { units }
    }

    /// Creates the reference bank: a [`SystemUnit`] in CP0, a single-precision
    /// [`LatencyUnit`] in CP1, and pass-through latency units in CP2 and CP3.
    ///
    /// # Arguments
    ///
    /// * `latency` - Per-slot latency in cycles. CP0 always answers in the same cycle.
    pub fn reference(latency: [u32; NUM_COPROCESSORS]) -> Self {
        Self::new([
            Box::new(SystemUnit::new()),
            Box::new(LatencyUnit::single_precision(latency[1])),
            Box::new(LatencyUnit::passthrough("CP2", latency[2])),
            Box::new(LatencyUnit::passthrough("CP3", latency[3])),
        ])
    }

    /// Evaluates one cycle of every unit.
    ///
    /// The addressed unit sees `req`; the others see [`CoprocessorRequest::IDLE`].
    ///
    /// # Returns
    ///
    /// The addressed unit's response, or the default (not ready) when nothing is addressed.
    pub fn cycle(
        &mut self,
        select: Option<CpSelect>,
        req: &CoprocessorRequest,
    ) -> CoprocessorResponse {
        let mut addressed = CoprocessorResponse::default();
        for (slot, unit) in CpSelect::ALL.into_iter().zip(self.units.iter_mut()) {
            if Some(slot) == select {
                addressed = unit.respond(req);
            } else {
                let _ = unit.respond(&CoprocessorRequest::IDLE);
            }
        }
        addressed
    }

    /// Broadcasts a retirement to every unit.
    pub fn retired(&mut self) {
        for unit in &mut self.units {
            unit.retired();
        }
    }

    /// Broadcasts a trap to every unit.
    pub fn trap_taken(&mut self, trap: &Trap) {
        for unit in &mut self.units {
            unit.trap_taken(trap);
        }
    }

    /// Name of the unit in `slot`.
    pub fn name(&self, slot: CpSelect) -> &str {
        self.units[slot.index()].name()
    }
}

impl fmt::Debug for CoprocessorBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.units.iter().map(|u| u.name()))
            .finish()
    }
}
