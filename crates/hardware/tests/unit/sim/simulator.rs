//! Simulator Run Loop Tests.

use std::io::Write;

use tempfile::NamedTempFile;

use super::loader::elf32;
use crate::common::builder::InstructionBuilder;
use crate::common::builder::instruction::ECALL;
use crate::common::harness::program_bytes;
use rvpipe_core::common::error::{ConfigError, LoadError, SimError, TrapCause};
use rvpipe_core::config::Config;
use rvpipe_core::sim::{ExitReason, Program, Simulator};

fn b() -> InstructionBuilder {
    InstructionBuilder::new()
}

/// `first`, two nops, then `ecall` at offset 12.
fn then_ecall(first: u32) -> Vec<u8> {
    program_bytes(&[first, b().nop().build(), b().nop().build(), ECALL])
}

#[test]
fn halts_on_first_trap() {
    // The nops let the addi commit before the ecall reaches EX.
    let program = Program::from_raw(then_ecall(b().addi(10, 0, 42).build()), 0);
    let mut sim = Simulator::new(Config::default(), &program).unwrap();
    let exit = sim.run();

    let ExitReason::Trap(trap) = exit else {
        panic!("expected a trap, got {exit:?}");
    };
    assert_eq!(trap.pc, 12);
    assert!(matches!(trap.cause, TrapCause::CoprocessorException { .. }));
    assert_eq!(sim.pipeline().regs().read(10), 42);
    assert_eq!(sim.stats().traps_taken, 1);
}

#[test]
fn stops_at_cycle_limit() {
    let mut config = Config::default();
    config.general.max_cycles = 64;
    let program = Program::from_raw(program_bytes(&[b().jal(0, 0).build()]), 0);
    let mut sim = Simulator::new(config, &program).unwrap();

    assert_eq!(sim.run(), ExitReason::CycleLimit);
    assert_eq!(sim.stats().cycles, 64);
    assert_eq!(sim.pipeline().cycles(), 64);
}

#[test]
fn continues_past_traps_when_not_halting() {
    let mut config = Config::default();
    config.general.max_cycles = 50;
    config.general.halt_on_trap = false;
    let program = Program::from_raw(program_bytes(&[ECALL]), 0);
    let mut sim = Simulator::new(config, &program).unwrap();

    assert_eq!(sim.run(), ExitReason::CycleLimit);
    assert_eq!(sim.stats().traps_taken, 1);
    assert_eq!(sim.pipeline().pc(), 0x100 + 4 * 47);
}

#[test]
fn elf_entry_replaces_reset_pc() {
    let code = then_ecall(b().addi(5, 0, 5).build());
    let program = Program::from_elf(&elf32(243, 0x400, 0x400, &code)).unwrap();
    let mut sim = Simulator::new(Config::default(), &program).unwrap();

    assert_eq!(sim.config().pipeline.reset_pc, 0x400);
    assert_eq!(sim.pipeline().pc(), 0x400);
    assert!(matches!(sim.run(), ExitReason::Trap(t) if t.pc == 0x40C));
    assert_eq!(sim.pipeline().regs().read(5), 5);
}

#[test]
fn elf_linked_at_high_base_runs() {
    let code = then_ecall(b().addi(6, 0, 6).build());
    let program = Program::from_elf(&elf32(243, 0x8000_0000, 0x8000_0000, &code)).unwrap();
    let mut sim = Simulator::new(Config::default(), &program).unwrap();

    assert!(matches!(sim.run(), ExitReason::Trap(t) if t.pc == 0x8000_000C));
    assert_eq!(sim.pipeline().regs().read(6), 6);
}

#[test]
fn from_file_runs_a_raw_image() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&then_ecall(b().addi(1, 0, 9).build())).unwrap();
    let mut sim = Simulator::from_file(Config::default(), file.path(), false).unwrap();
    assert!(matches!(sim.run(), ExitReason::Trap(_)));
    assert_eq!(sim.pipeline().regs().read(1), 9);
}

#[test]
fn invalid_config_is_reported() {
    let mut config = Config::default();
    config.pipeline.trap_vector = 0x102;
    let err = Simulator::new(config, &Program::default()).unwrap_err();
    assert!(matches!(
        err,
        SimError::Config(ConfigError::Misaligned { value: 0x102, .. })
    ));
}

#[test]
fn oversized_image_is_reported() {
    let mut config = Config::default();
    config.memory.size_bytes = 64;
    let program = Program::from_raw(vec![0; 128], 0);
    let err = Simulator::new(config, &program).unwrap_err();
    assert!(matches!(err, SimError::Load(LoadError::TooLarge { .. })));
}
