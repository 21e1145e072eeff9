//! Stall and flush reasons.
//!
//! Suppression conditions are collected once per cycle into two small tagged sets
//! and a pair of stage points. It provides:
//! 1. **Stages:** The five pipeline stages, ordered youngest (IF) to oldest (WB).
//! 2. **Reason Sets:** `u8` bit sets over stall and flush causes.
//! 3. **Cycle Control:** Accumulates requests and derives the stall point, flush point,
//!    and redirect target the sequencer applies at the clock edge.

use std::fmt;

/// A pipeline stage, ordered from youngest to oldest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Instruction fetch.
    If,
    /// Instruction decode, register read, branch resolution.
    Id,
    /// Execute and coprocessor dispatch.
    Ex,
    /// Data memory access.
    Mem,
    /// Register writeback.
    Wb,
}

impl Stage {
    /// All stages, youngest first.
    pub const ALL: [Self; 5] = [Self::If, Self::Id, Self::Ex, Self::Mem, Self::Wb];

    /// The stage that feeds this one, or `None` for IF.
    pub const fn upstream(self) -> Option<Self> {
        match self {
            Self::If => None,
            Self::Id => Some(Self::If),
            Self::Ex => Some(Self::Id),
            Self::Mem => Some(Self::Ex),
            Self::Wb => Some(Self::Mem),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::If => "IF",
            Self::Id => "ID",
            Self::Ex => "EX",
            Self::Mem => "MEM",
            Self::Wb => "WB",
        };
        f.write_str(name)
    }
}

/// Why a stage is held this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StallReason {
    /// RAW dependency with forwarding disabled.
    RawHazard,
    /// Load in EX feeding the instruction in ID.
    LoadUseHazard,
    /// Addressed coprocessor has not asserted ready.
    CoprocessorNotReady,
    /// Instruction or data port has not asserted ready.
    MemoryNotReady,
    /// Stall requested by the environment.
    ExternalStall,
}

impl StallReason {
    /// All stall reasons in bit order.
    pub const ALL: [Self; 5] = [
        Self::RawHazard,
        Self::LoadUseHazard,
        Self::CoprocessorNotReady,
        Self::MemoryNotReady,
        Self::ExternalStall,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Why stages are emptied this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushReason {
    /// A taken branch or a jump (predicted not-taken).
    BranchMispredict,
    /// A coprocessor raised its exception line.
    Exception,
    /// An external interrupt.
    Interrupt,
}

impl FlushReason {
    /// All flush reasons in bit order.
    pub const ALL: [Self; 3] = [Self::BranchMispredict, Self::Exception, Self::Interrupt];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

macro_rules! reason_set {
    ($(#[$meta:meta])* $name:ident, $reason:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name(u8);

        impl $name {
            /// The empty set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Adds a reason to the set.
            pub const fn insert(&mut self, reason: $reason) {
                self.0 |= reason.bit();
            }

            /// Returns `true` if the set contains `reason`.
            pub const fn contains(&self, reason: $reason) -> bool {
                self.0 & reason.bit() != 0
            }

            /// Returns `true` if the set holds no reason.
            pub const fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// Iterates over the reasons in the set, in bit order.
            pub fn iter(&self) -> impl Iterator<Item = $reason> + '_ {
                <$reason>::ALL.into_iter().filter(|r| self.contains(*r))
            }
        }

        impl FromIterator<$reason> for $name {
            fn from_iter<I: IntoIterator<Item = $reason>>(iter: I) -> Self {
                let mut set = Self::empty();
                for reason in iter {
                    set.insert(reason);
                }
                set
            }
        }
    };
}

reason_set!(
    /// Set of [`StallReason`]s. The pipeline stalls iff the set is non-empty.
    StallReasons,
    StallReason
);

reason_set!(
    /// Set of [`FlushReason`]s. The pipeline flushes iff the set is non-empty.
    FlushReasons,
    FlushReason
);

/// Stall and flush requests accumulated while the stages evaluate one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleControl {
    /// Stall reasons raised this cycle.
    pub stalls: StallReasons,
    /// Flush reasons raised this cycle.
    pub flushes: FlushReasons,
    /// Oldest stalled stage.
    pub stall_point: Option<Stage>,
    /// Oldest flushed stage.
    pub flush_point: Option<Stage>,
    /// Redirect target of the flush at `flush_point`.
    pub redirect: Option<u32>,
}

impl CycleControl {
    /// Records a stall holding `stage` and everything younger.
    pub fn stall(&mut self, reason: StallReason, stage: Stage) {
        self.stalls.insert(reason);
        self.stall_point = self.stall_point.max(Some(stage));
    }

    /// Records a flush emptying `stage` and everything younger, redirecting to `target`.
    ///
    /// The oldest flush decides the redirect.
    pub fn flush(&mut self, reason: FlushReason, stage: Stage, target: u32) {
        self.flushes.insert(reason);
        if self.flush_point.is_none_or(|f| stage > f) {
            self.flush_point = Some(stage);
            self.redirect = Some(target);
        }
    }

    /// Returns `true` if a stall at a stage older than `stage` holds it.
    pub fn held_downstream(&self, stage: Stage) -> bool {
        self.stall_point.is_some_and(|p| p > stage)
    }

    /// Returns `true` if `stage` is emptied by a flush.
    pub fn flushed(&self, stage: Stage) -> bool {
        self.flush_point.is_some_and(|f| stage <= f)
    }

    /// Returns what happens to the instruction occupying `stage` at the clock edge.
    ///
    /// Stages at or younger than the flush point are discarded. Stages between the flush
    /// point (exclusive) and the stall point (inclusive) hold. Everything else advances.
    pub fn fate(&self, stage: Stage) -> StageFate {
        if self.flushed(stage) {
            StageFate::Discard
        } else if self.stall_point.is_some_and(|p| stage <= p) {
            StageFate::Hold
        } else {
            StageFate::Advance
        }
    }
}

/// Outcome of the clock edge for one stage's instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageFate {
    /// Moves to the next stage (retires from WB).
    Advance,
    /// Stays in place.
    Hold,
    /// Becomes a bubble.
    Discard,
}
