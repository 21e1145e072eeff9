//! Program Loader Tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::common::builder::InstructionBuilder;
use crate::common::harness::program_bytes;
use rvpipe_core::common::error::LoadError;
use rvpipe_core::sim::loader::{is_elf, load_program};
use rvpipe_core::sim::{Program, Segment};
use rvpipe_core::soc::Memory;

const EM_RISCV: u16 = 243;
const EM_X86_64: u16 = 62;

/// Minimal executable ELF32 with one loadable segment.
pub fn elf32(machine: u16, entry: u32, vaddr: u32, data: &[u8]) -> Vec<u8> {
    const EHDR: u32 = 52;
    const PHDR: u32 = 32;
    let mut out = Vec::new();
    out.extend_from_slice(b"\x7fELF");
    out.extend_from_slice(&[1, 1, 1, 0]);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&machine.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&entry.to_le_bytes());
    out.extend_from_slice(&EHDR.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(EHDR as u16).to_le_bytes());
    out.extend_from_slice(&(PHDR as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());

    let len = data.len() as u32;
    for field in [1, EHDR + PHDR, vaddr, vaddr, len, len, 5, 4] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn raw_image_loads_at_base() {
    let words = [InstructionBuilder::new().addi(1, 0, 1).build(), 0x0000_0073];
    let file = write_temp(&program_bytes(&words));
    let program = load_program(file.path(), false, 0x40).unwrap();

    assert_eq!(program.entry, None);
    assert_eq!(
        program.segments,
        vec![Segment {
            address: 0x40,
            data: program_bytes(&words),
        }]
    );

    let mut mem = Memory::new(256, 1);
    program.load_into(&mut mem).unwrap();
    assert_eq!(mem.read_word(0x44), 0x73);
}

#[test]
fn elf_segments_and_entry_are_extracted() {
    let code = program_bytes(&[0x0000_0013, 0x0000_0073]);
    let file = write_temp(&elf32(EM_RISCV, 0x84, 0x80, &code));
    let program = load_program(file.path(), false, 0).unwrap();

    assert_eq!(program.entry, Some(0x84));
    assert_eq!(program.segments.len(), 1);
    assert_eq!(program.segments[0].address, 0x80);
    assert_eq!(program.segments[0].data, code);
}

#[test]
fn foreign_architecture_is_rejected() {
    let bytes = elf32(EM_X86_64, 0, 0, &[0; 4]);
    assert!(matches!(Program::from_elf(&bytes), Err(LoadError::UnsupportedElf)));
}

#[test]
fn forced_elf_on_raw_bytes_fails_to_parse() {
    let file = write_temp(&[0x13, 0, 0, 0]);
    let err = load_program(file.path(), true, 0).unwrap_err();
    assert!(matches!(err, LoadError::Elf(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_program(&dir.path().join("absent.bin"), false, 0).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn image_larger_than_memory_is_rejected() {
    let program = Program::from_raw(vec![0; 260], 0);
    let mut mem = Memory::new(256, 1);
    assert!(matches!(program.load_into(&mut mem), Err(LoadError::TooLarge { .. })));
}

#[test]
fn magic_detection() {
    assert!(is_elf(b"\x7fELF\x01\x01"));
    assert!(!is_elf(b"\x13\x00\x00\x00"));
    assert!(!is_elf(b""));
}
