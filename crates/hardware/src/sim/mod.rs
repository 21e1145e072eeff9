//! Simulation utilities and program loading.
//!
//! Provides the program loader and the [`Simulator`] run loop that wires the
//! pipeline to its reference memories and coprocessors.

/// Raw-binary and ELF32 program loading.
pub mod loader;

/// Run loop over the pipeline sequencer.
pub mod simulator;

pub use self::loader::{Program, Segment};
pub use self::simulator::{ExitReason, Simulator};
