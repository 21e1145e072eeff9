//! Reference Word Memory.
//!
//! Backing store for the instruction and data ports. It provides:
//! 1. **Storage:** Little-endian words; addresses wrap modulo the memory size.
//! 2. **Latency:** A request completes after `latency` consecutive cycles of presentation.
//! 3. **Byte Enables:** Stores update only the enabled byte lanes.

use crate::common::constants::INSTRUCTION_BYTES;
use crate::common::error::LoadError;
use crate::soc::traits::{MemRequest, MemResponse, MemoryPort};

/// Latency-configurable word memory.
#[derive(Clone, Debug)]
pub struct Memory {
    words: Vec<u32>,
    latency: u32,
    pending: Option<MemRequest>,
    waited: u32,
}

impl Memory {
    /// Creates a zero-filled memory.
    ///
    /// # Arguments
    ///
    /// * `size_bytes` - Capacity in bytes (rounded down to whole words, at least one word).
    /// * `latency` - Cycles before a request is ready (values below 1 act as 1).
    pub fn new(size_bytes: usize, latency: u32) -> Self {
        let count = (size_bytes / INSTRUCTION_BYTES as usize).max(1);
        Self {
            words: vec![0; count],
            latency: latency.max(1),
            pending: None,
            waited: 0,
        }
    }

    /// Capacity in bytes.
    pub fn size_bytes(&self) -> usize {
        self.words.len() * INSTRUCTION_BYTES as usize
    }

    fn index(&self, addr: u32) -> usize {
        (addr / INSTRUCTION_BYTES) as usize % self.words.len()
    }

    /// Loads a byte slice into memory at a byte offset.
    ///
    /// The offset wraps modulo the memory size like every other access, so an image
    /// linked at a high base (e.g. `0x8000_0000`) lands in the same words the pipeline
    /// fetches from.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooLarge`] if the slice is longer than the memory.
    pub fn load(&mut self, data: &[u8], offset: u32) -> Result<(), LoadError> {
        let size = self.size_bytes();
        if data.len() > size {
            return Err(LoadError::TooLarge {
                start: offset,
                len: data.len(),
                size,
            });
        }
        for (i, byte) in data.iter().enumerate() {
            let addr = offset.wrapping_add(i as u32);
            let lane = addr % INSTRUCTION_BYTES;
            self.write_word(addr, u32::from(*byte) << (lane * 8), 1 << lane);
        }
        Ok(())
    }

    /// Reads the aligned word containing `addr`, without timing.
    pub fn read_word(&self, addr: u32) -> u32 {
        self.words[self.index(addr)]
    }

    /// Writes the enabled byte lanes of the aligned word containing `addr`, without timing.
    pub fn write_word(&mut self, addr: u32, data: u32, byte_enable: u8) {
        let mut mask = 0u32;
        for lane in 0..INSTRUCTION_BYTES {
            if byte_enable & (1 << lane) != 0 {
                mask |= 0xFF << (lane * 8);
            }
        }
        let idx = self.index(addr);
        let word = &mut self.words[idx];
        *word = (*word & !mask) | (data & mask);
    }
}

impl MemoryPort for Memory {
    fn access(&mut self, req: &MemRequest) -> MemResponse {
        self.waited = if self.pending == Some(*req) {
            self.waited + 1
        } else {
            1
        };
        if self.waited < self.latency {
            self.pending = Some(*req);
            return MemResponse::default();
        }

        self.pending = None;
        if req.is_write {
            self.write_word(req.address, req.write_data, req.byte_enable);
            MemResponse {
                ready: true,
                read_data: 0,
            }
        } else {
            MemResponse {
                ready: true,
                read_data: self.read_word(req.address),
            }
        }
    }

    fn as_memory(&self) -> Option<&Memory> {
        Some(self)
    }
}
