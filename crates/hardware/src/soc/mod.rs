//! Memory collaborators.
//!
//! This module provides the interfaces the pipeline uses to reach memory:
//! 1. **Traits:** The [`MemoryPort`] request/response interface used by IF and MEM.
//! 2. **Memory:** A word memory with configurable latency and byte-enable writes.

/// Reference word memory.
pub mod memory;

/// Memory port trait and request/response records.
pub mod traits;

pub use self::memory::Memory;
pub use self::traits::{MemRequest, MemResponse, MemoryPort};
