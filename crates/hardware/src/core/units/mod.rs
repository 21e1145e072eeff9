//! Execution units and functional components.
//!
//! This module contains the units the control path drives: the reference integer
//! ALU, the branch resolution unit, the load/store lane logic, and the coprocessor
//! interface with its dispatcher and reference units.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch Resolution Unit (targets, comparison, PC selection).
pub mod bru;

/// Coprocessor interface, dispatcher, and reference units.
pub mod coproc;

/// Load/Store Unit byte-lane handling.
pub mod lsu;
