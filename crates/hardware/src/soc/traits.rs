//! Memory port trait for the instruction and data interfaces.
//!
//! This module defines the `MemoryPort` collaborator driven by the Fetch and Memory
//! stages. It provides:
//! 1. **Requests:** Word-addressed accesses with per-byte write enables.
//! 2. **Responses:** A ready flag that may be withheld for any number of cycles.
//! 3. **Downcasting:** Optional access to the reference [`Memory`] for inspection.

use crate::soc::memory::Memory;

/// A memory access presented for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemRequest {
    /// Byte address; the port serves the aligned word containing it.
    pub address: u32,
    /// `true` for a store.
    pub is_write: bool,
    /// Store data, already shifted into its byte lanes.
    pub write_data: u32,
    /// Byte lanes written by a store (bit `i` enables byte `i` of the word).
    pub byte_enable: u8,
}

impl MemRequest {
    /// A full-word read of `address`.
    pub const fn read(address: u32) -> Self {
        Self {
            address,
            is_write: false,
            write_data: 0,
            byte_enable: 0,
        }
    }
}

/// The port's answer for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemResponse {
    /// The access completed this cycle.
    pub ready: bool,
    /// The aligned word read (meaningful for reads when `ready`).
    pub read_data: u32,
}

/// Trait for the instruction and data memory collaborators.
///
/// A stage presents the same request every cycle until `ready` is observed.
pub trait MemoryPort {
    /// Evaluates one cycle of the port against `req`.
    fn access(&mut self, req: &MemRequest) -> MemResponse;

    /// Returns a reference as `Memory` if this port is the reference memory; otherwise `None`.
    fn as_memory(&self) -> Option<&Memory> {
        None
    }
}
