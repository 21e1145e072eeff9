//! Program Loader.
//!
//! This module turns a program file into an image the simulator can place in memory.
//! It performs:
//! 1. **Binary loading:** Reads the file from disk into a byte buffer.
//! 2. **ELF parsing:** Extracts the loadable segments and entry point of a 32-bit
//!    little-endian RISC-V ELF through the `object` crate.
//! 3. **Raw images:** Places a flat binary at a caller-chosen base address.
//! 4. **Placement:** Copies every segment into a reference [`Memory`].

use std::fs;
use std::path::Path;

use object::{Architecture, BinaryFormat, Object, ObjectSegment};
use tracing::debug;

use crate::common::error::LoadError;
use crate::soc::memory::Memory;

/// ELF magic number at the start of every ELF file.
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// A contiguous block of the program image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Load address of the first byte.
    pub address: u32,
    /// Initialized contents (zero-fill beyond them is left to the memory's reset state).
    pub data: Vec<u8>,
}

/// A program ready to be placed in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Entry point, when the container provides one.
    pub entry: Option<u32>,
    /// Loadable segments in file order.
    pub segments: Vec<Segment>,
}

impl Program {
    /// Wraps a flat binary loaded at `base`.
    pub fn from_raw(bytes: Vec<u8>, base: u32) -> Self {
        Self {
            entry: None,
            segments: vec![Segment {
                address: base,
                data: bytes,
            }],
        }
    }

    /// Parses an ELF image.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Elf`] if the container is malformed and
    /// [`LoadError::UnsupportedElf`] if it is not a little-endian RV32 ELF.
    pub fn from_elf(bytes: &[u8]) -> Result<Self, LoadError> {
        let file = object::File::parse(bytes)?;
        if file.format() != BinaryFormat::Elf
            || file.is_64()
            || !file.is_little_endian()
            || file.architecture() != Architecture::Riscv32
        {
            return Err(LoadError::UnsupportedElf);
        }

        let mut segments = Vec::new();
        for segment in file.segments() {
            let data = segment.data()?;
            if data.is_empty() {
                continue;
            }
            let address = u32::try_from(segment.address()).map_err(|_| LoadError::UnsupportedElf)?;
            debug!(address = %format_args!("{address:#010x}"), len = data.len(), "ELF segment");
            segments.push(Segment {
                address,
                data: data.to_vec(),
            });
        }

        let entry = u32::try_from(file.entry()).map_err(|_| LoadError::UnsupportedElf)?;
        Ok(Self {
            entry: Some(entry),
            segments,
        })
    }

    /// Copies every segment into `mem`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TooLarge`] if a segment does not fit.
    pub fn load_into(&self, mem: &mut Memory) -> Result<(), LoadError> {
        for segment in &self.segments {
            mem.load(&segment.data, segment.address)?;
        }
        Ok(())
    }
}

/// Returns `true` if `bytes` start with the ELF magic number.
pub fn is_elf(bytes: &[u8]) -> bool {
    bytes.starts_with(ELF_MAGIC)
}

/// Loads a binary file from disk into a byte vector.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read.
pub fn load_binary(path: &Path) -> Result<Vec<u8>, LoadError> {
    Ok(fs::read(path)?)
}

/// Reads a program from disk.
///
/// The file is parsed as ELF when `force_elf` is set or it carries the ELF magic;
/// otherwise it is a raw image loaded at `base`.
///
/// # Arguments
///
/// * `path` - Path to the program file.
/// * `force_elf` - Treat the file as ELF regardless of its contents.
/// * `base` - Load address of a raw image.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or parsed.
pub fn load_program(path: &Path, force_elf: bool, base: u32) -> Result<Program, LoadError> {
    let bytes = load_binary(path)?;
    if force_elf || is_elf(&bytes) {
        Program::from_elf(&bytes)
    } else {
        Ok(Program::from_raw(bytes, base))
    }
}
