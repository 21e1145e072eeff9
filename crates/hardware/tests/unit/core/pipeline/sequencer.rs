//! Pipeline Sequencer Behavior.
//!
//! Cycle-level checks of stalls, flushes, traps, and the handshakes with the
//! memory ports and coprocessors.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::InstructionBuilder;
use crate::common::builder::instruction::{EBREAK, ECALL};
use crate::common::harness::{TestContext, program_bytes};
use crate::common::mocks::coprocessor::{RecordingUnit, answering, never_ready};
use crate::common::mocks::memory::{MockPort, ScriptedMemory};
use rvpipe_core::common::error::TrapCause;
use rvpipe_core::config::Config;
use rvpipe_core::core::pipeline::TickInputs;
use rvpipe_core::core::pipeline::hazards::ForwardSource;
use rvpipe_core::core::pipeline::reasons::{FlushReason, Stage, StallReason};
use rvpipe_core::core::units::coproc::{
    CoprocessorBank, CoprocessorResponse, CpSelect, LatencyUnit, SystemUnit,
};
use rvpipe_core::isa::privileged::csr;
use rvpipe_core::isa::privileged::opcodes::{CSRRS, CSRRW};
use rvpipe_core::soc::{MemResponse, Memory};

fn b() -> InstructionBuilder {
    InstructionBuilder::new()
}

/// Lays out `(address, code)` blocks into one image starting at 0.
fn image(blocks: &[(u32, &[u32])]) -> Vec<u32> {
    let mut words = Vec::new();
    for &(addr, code) in blocks {
        let start = (addr / 4) as usize;
        if words.len() < start + code.len() {
            words.resize(start + code.len(), 0);
        }
        words[start..start + code.len()].copy_from_slice(code);
    }
    words
}

fn stall_cycles(ctx: &mut TestContext, n: usize, reason: StallReason) -> usize {
    ctx.run(n)
        .iter()
        .filter(|r| r.stalls.contains(reason))
        .count()
}

// ══════════════════════════════════════════════════════════
// 1. Reset and fill
// ══════════════════════════════════════════════════════════

#[test]
fn first_instruction_retires_after_five_cycles() {
    let mut ctx = TestContext::new(&[b().addi(1, 0, 7).build()]);
    let reports = ctx.run_until_retired(1, 10);
    assert_eq!(reports.len(), 5);
    let retired = reports[4].retired.unwrap();
    assert_eq!((retired.pc, retired.rd, retired.value), (0, 1, 7));
    assert_eq!(ctx.get_reg(1), 7);
}

#[test]
fn pc_advances_by_four_each_quiet_cycle() {
    let mut ctx = TestContext::new(&[b().nop().build(); 4]);
    let reports = ctx.run(3);
    let pcs: Vec<_> = reports.iter().map(|r| (r.pc_before, r.pc_after)).collect();
    assert_eq!(pcs, vec![(0, 4), (4, 8), (8, 12)]);
}

#[test]
fn unrecognised_word_becomes_a_bubble() {
    let mut ctx = TestContext::new(&[0xFFFF_FFFF, b().addi(1, 0, 1).build()]);
    let reports = ctx.run(8);
    let retired: Vec<_> = reports.iter().filter_map(|r| r.retired).collect();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].pc, 4);
    assert!(reports.iter().all(|r| r.trap.is_none()));
}

#[test]
fn writes_to_x0_are_discarded() {
    let mut ctx = TestContext::new(&[
        b().addi(0, 0, 5).build(),
        b().add(1, 0, 0).build(),
    ]);
    let _ = ctx.run_until_retired(2, 10);
    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.get_reg(1), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Data hazards
// ══════════════════════════════════════════════════════════

#[test]
fn back_to_back_dependency_forwards_from_ex() {
    let mut ctx = TestContext::new(&[
        b().addi(1, 0, 5).build(),
        b().add(2, 1, 1).build(),
    ]);
    let reports = ctx.run_until_retired(2, 12);
    assert!(reports.iter().all(|r| !r.stalled()));
    assert!(reports.iter().any(|r| r.forward_rs1 == ForwardSource::ExResult
        && r.forward_rs2 == ForwardSource::ExResult));
    assert_eq!(ctx.get_reg(2), 10);
}

#[test]
fn load_use_inserts_exactly_one_bubble() {
    let program = [
        b().addi(2, 0, 0x400).build(),
        b().lw(1, 2, 0).build(),
        b().add(3, 1, 1).build(),
    ];
    let mut ctx = TestContext::build(
        Config::default(),
        &program,
        &[(0x400, 21)],
        CoprocessorBank::reference([1, 1, 1, 1]),
    );
    let reports = ctx.run_until_retired(3, 20);

    let load_use: Vec<_> = reports
        .iter()
        .filter(|r| r.stalls.contains(StallReason::LoadUseHazard))
        .collect();
    assert_eq!(load_use.len(), 1);
    assert_eq!(load_use[0].stall_point, Some(Stage::Id));
    assert!(reports.iter().any(|r| r.forward_rs1 == ForwardSource::MemLoad));
    assert_eq!(ctx.get_reg(3), 42);
}

#[test]
fn raw_hazard_stalls_without_forwarding() {
    let mut config = Config::default();
    config.pipeline.forwarding = false;
    let mut ctx = TestContext::with_config(
        config,
        &[b().addi(1, 0, 5).build(), b().add(2, 1, 1).build()],
    );
    let reports = ctx.run_until_retired(2, 20);
    let raw = reports
        .iter()
        .filter(|r| r.stalls.contains(StallReason::RawHazard))
        .count();
    assert_eq!(raw, 2);
    assert!(reports.iter().all(|r| r.forward_rs1 == ForwardSource::RegFile));
    assert_eq!(ctx.get_reg(2), 10);
}

#[test]
fn csr_source_register_does_not_alias_rs2() {
    // csr 0x305 places x5 in the rs2 field; a pending write to x5 must not stall.
    let mut config = Config::default();
    config.pipeline.forwarding = false;
    let mut ctx = TestContext::with_config(
        config,
        &[
            b().addi(5, 0, 1).build(),
            b().csr(CSRRS, 6, 0, csr::MTVEC).build(),
        ],
    );
    let reports = ctx.run_until_retired(2, 20);
    assert!(reports.iter().all(|r| !r.stalls.contains(StallReason::RawHazard)));
}

// ══════════════════════════════════════════════════════════
// 3. Control transfer
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::taken(b().beq(0, 0, 8).build(), 0, 1)]
#[case::not_taken(b().bne(0, 0, 8).build(), 1, 0)]
fn branch_resolves_in_decode(#[case] branch: u32, #[case] x1: u32, #[case] flushes: usize) {
    let mut ctx = TestContext::new(&[
        branch,
        b().addi(1, 0, 1).build(),
        b().addi(2, 0, 2).build(),
    ]);
    let reports = ctx.run(10);
    let flush: Vec<_> = reports
        .iter()
        .filter(|r| r.flushes.contains(FlushReason::BranchMispredict))
        .collect();
    assert_eq!(flush.len(), flushes);
    if let Some(report) = flush.first() {
        assert_eq!(report.flush_point, Some(Stage::If));
        assert_eq!(report.pc_after, 8);
    }
    assert_eq!(ctx.get_reg(1), x1);
    assert_eq!(ctx.get_reg(2), 2);
}

#[test]
fn branch_uses_forwarded_operand() {
    let mut ctx = TestContext::new(&[
        b().addi(5, 0, 3).build(),
        b().bne(5, 0, 8).build(),
        b().addi(1, 0, 1).build(),
        b().addi(2, 0, 2).build(),
    ]);
    let _ = ctx.run(12);
    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.get_reg(2), 2);
}

#[test]
fn jal_and_jalr_link_and_return() {
    let program = image(&[
        (0x00, &[
            b().addi(10, 0, 5).build(),
            b().jal(1, 12).build(),
            b().addi(11, 10, 0).build(),
            b().jal(0, 0).build(),
        ]),
        (0x10, &[b().slli(10, 10, 1).build(), b().jalr(0, 1, 0).build()]),
    ]);
    let mut ctx = TestContext::new(&program);
    let _ = ctx.run(30);
    assert_eq!(ctx.get_reg(1), 8);
    assert_eq!(ctx.get_reg(10), 10);
    assert_eq!(ctx.get_reg(11), 10);
}

#[test]
fn jalr_target_clears_bit_zero() {
    let program = image(&[
        (0x00, &[b().addi(5, 0, 0x21).build(), b().jalr(0, 5, 0).build()]),
        (0x20, &[b().addi(6, 0, 6).build()]),
    ]);
    let mut ctx = TestContext::new(&program);
    let _ = ctx.run(15);
    assert_eq!(ctx.get_reg(6), 6);
}

// ══════════════════════════════════════════════════════════
// 4. Memory handshake
// ══════════════════════════════════════════════════════════

#[test]
fn stores_update_only_enabled_lanes() {
    let program = [
        b().addi(1, 0, 0x7F).build(),
        b().sb(0, 1, 0x401).build(),
        b().lw(2, 0, 0x400).build(),
        b().lbu(3, 0, 0x401).build(),
    ];
    let mut ctx = TestContext::build(
        Config::default(),
        &program,
        &[(0x400, 0xAABB_CCDD)],
        CoprocessorBank::reference([1, 1, 1, 1]),
    );
    let _ = ctx.run_until_retired(4, 20);
    assert_eq!(ctx.data_word(0x400), 0xAABB_7FDD);
    assert_eq!(ctx.get_reg(2), 0xAABB_7FDD);
    assert_eq!(ctx.get_reg(3), 0x7F);
}

#[test]
fn data_port_not_ready_holds_mem_and_younger() {
    let program = [
        b().addi(2, 0, 0x400).build(),
        b().lw(1, 2, 0).build(),
        b().addi(3, 0, 3).build(),
    ];
    let config = Config::default();
    let mut imem = Memory::new(config.memory.size_bytes, 1);
    imem.load(&program_bytes(&program), 0).unwrap();
    let mut data = Memory::new(config.memory.size_bytes, 1);
    data.write_word(0x400, 99, 0b1111);
    let dmem = ScriptedMemory::new(data, vec![0, 1]);
    let log = dmem.log.clone();

    let mut ctx = TestContext::with_ports(
        config,
        Box::new(imem),
        Box::new(dmem),
        CoprocessorBank::reference([1, 1, 1, 1]),
    );
    let reports = ctx.run_until_retired(3, 20);

    let mem_stalls: Vec<_> = reports
        .iter()
        .filter(|r| r.stalls.contains(StallReason::MemoryNotReady))
        .collect();
    assert_eq!(mem_stalls.len(), 2);
    assert!(mem_stalls.iter().all(|r| r.stall_point == Some(Stage::Mem)));
    assert!(mem_stalls.iter().all(|r| r.pc_before == r.pc_after));
    assert_eq!(ctx.get_reg(1), 99);
    assert_eq!(ctx.get_reg(3), 3);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn starved_fetch_never_touches_data_port() {
    let mut imem = MockPort::new();
    imem.expect_access().returning(|_| MemResponse::default());
    let mut dmem = MockPort::new();
    dmem.expect_access().times(0);

    let mut ctx = TestContext::with_ports(
        Config::default(),
        Box::new(imem),
        Box::new(dmem),
        CoprocessorBank::reference([1, 1, 1, 1]),
    );
    let reports = ctx.run(6);
    assert!(reports.iter().all(|r| r.stall_point == Some(Stage::If)));
    assert!(reports.iter().all(|r| r.retired.is_none()));
    assert_eq!(ctx.seq.pc(), 0);
    assert!(ctx.seq.is_drained());
}

#[test]
fn slow_fetch_port_still_runs_the_program() {
    let mut config = Config::default();
    config.memory.fetch_latency = 3;
    let mut ctx = TestContext::with_config(
        config,
        &[b().addi(1, 0, 1).build(), b().addi(1, 1, 1).build()],
    );
    let _ = ctx.run_until_retired(2, 40);
    assert_eq!(ctx.get_reg(1), 2);
    assert!(ctx.seq.stats().stalls_memory > 0);
}

// ══════════════════════════════════════════════════════════
// 5. Coprocessors
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn coprocessor_latency_costs_latency_minus_one_stalls(#[case] latency: u32) {
    let mut config = Config::default();
    config.coprocessors.latency[1] = latency;
    let mut ctx = TestContext::with_config(config, &[b().fadd_s(5, 1, 2).build()]);
    ctx.set_reg(1, 1.5f32.to_bits());
    ctx.set_reg(2, 2.25f32.to_bits());

    let reports = ctx.run_until_retired(1, 20);
    let stalls = reports
        .iter()
        .filter(|r| r.stalls.contains(StallReason::CoprocessorNotReady))
        .count();
    assert_eq!(stalls, latency as usize - 1);
    assert_eq!(ctx.get_reg(5), 3.75f32.to_bits());
    assert_eq!(reports.last().unwrap().retired.unwrap().coprocessor, Some(CpSelect::Cp1));
}

#[test]
fn held_coprocessor_sees_one_request_per_cycle() {
    let unit = RecordingUnit::new(3);
    let log = unit.log.clone();
    let bank = CoprocessorBank::new([
        Box::new(SystemUnit::new()),
        Box::new(LatencyUnit::single_precision(1)),
        Box::new(unit),
        Box::new(LatencyUnit::passthrough("CP3", 1)),
    ]);
    let mut ctx = TestContext::build(
        Config::default(),
        &[b().custom0(7, 1, 2).build()],
        &[],
        bank,
    );
    ctx.set_reg(1, 40);
    ctx.set_reg(2, 2);

    let reports = ctx.run_until_retired(1, 20);
    assert_eq!(log.lock().unwrap().len(), reports.len());
    let valid: Vec<_> = log.lock().unwrap().iter().filter(|r| r.valid).copied().collect();
    assert_eq!(valid.len(), 3);
    assert!(valid.iter().all(|r| r.operand_a == 40 && r.operand_b == 2));
    assert_eq!(ctx.get_reg(7), 42);
}

#[test]
fn never_ready_unit_stalls_indefinitely() {
    let bank = CoprocessorBank::new([
        Box::new(SystemUnit::new()),
        Box::new(LatencyUnit::single_precision(1)),
        Box::new(LatencyUnit::passthrough("CP2", 1)),
        Box::new(never_ready()),
    ]);
    let mut ctx = TestContext::build(
        Config::default(),
        &[b().custom1(1, 0, 0).build(), b().addi(2, 0, 2).build()],
        &[],
        bank,
    );
    let reports = ctx.run(50);
    let tail = &reports[10..];
    assert!(tail.iter().all(|r| r.stalls.contains(StallReason::CoprocessorNotReady)));
    assert!(tail.iter().all(|r| r.pc_before == r.pc_after));
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.seq.coprocessor_wait(), 48);
}

#[test]
fn interrupt_discards_instruction_waiting_on_coprocessor() {
    let mut config = Config::default();
    config.coprocessors.latency[1] = 6;
    let program = image(&[
        (0x000, &[b().fadd_s(5, 1, 2).build(), b().nop().build()]),
        (0x200, &[b().jal(0, -0x200).build()]),
    ]);
    let mut ctx = TestContext::with_config(config, &program);
    ctx.set_reg(1, 1.5f32.to_bits());
    ctx.set_reg(2, 2.25f32.to_bits());

    assert_eq!(stall_cycles(&mut ctx, 4, StallReason::CoprocessorNotReady), 2);
    assert_eq!(ctx.seq.id_ex().map(|e| e.pc), Some(0));

    let report = ctx.tick_with(TickInputs {
        interrupt: true,
        ..TickInputs::default()
    });
    assert!(!report.stalls.contains(StallReason::CoprocessorNotReady));
    assert_eq!(report.trap.unwrap().pc, 0);
    assert_eq!(report.pc_after, 0x200);
    assert!(ctx.seq.id_ex().is_none());
    assert!(ctx.seq.ex_mem().is_none());
    assert_eq!(ctx.get_reg(5), 0);

    // The handler returns to the fadd, which starts its operation over.
    let reports = ctx.run(20);
    let stalls = reports
        .iter()
        .filter(|r| r.stalls.contains(StallReason::CoprocessorNotReady))
        .count();
    assert_eq!(stalls, 5);
    let fadd = reports
        .iter()
        .filter_map(|r| r.retired)
        .find(|r| r.coprocessor == Some(CpSelect::Cp1))
        .unwrap();
    assert_eq!(fadd.pc, 0);
    assert_eq!(ctx.get_reg(5), 3.75f32.to_bits());
}

#[test]
fn coprocessor_result_to_x0_is_not_written() {
    let bank = CoprocessorBank::new([
        Box::new(SystemUnit::new()),
        Box::new(LatencyUnit::single_precision(1)),
        Box::new(answering(CoprocessorResponse {
            ready: true,
            data_out: 0xDEAD_BEEF,
            exception: false,
        })),
        Box::new(LatencyUnit::passthrough("CP3", 1)),
    ]);
    let mut ctx = TestContext::build(
        Config::default(),
        &[b().custom0(0, 0, 0).build(), b().custom0(4, 0, 0).build()],
        &[],
        bank,
    );
    let reports = ctx.run_until_retired(2, 20);
    let retired: Vec<_> = reports.iter().filter_map(|r| r.retired).collect();
    assert!(!retired[0].writes_register);
    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.get_reg(4), 0xDEAD_BEEF);
}

#[test]
fn csr_write_then_read_through_cp0() {
    let mut ctx = TestContext::new(&[
        b().addi(5, 0, 0x55).build(),
        b().csr(CSRRW, 0, 5, csr::MSCRATCH).build(),
        b().csr(CSRRS, 6, 0, csr::MSCRATCH).build(),
    ]);
    let _ = ctx.run_until_retired(3, 20);
    assert_eq!(ctx.get_reg(6), 0x55);
    assert_eq!(ctx.seq.stats().inst_system, 2);
}

// ══════════════════════════════════════════════════════════
// 6. Traps
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::ecall(ECALL, 11)]
#[case::ebreak(EBREAK, 3)]
fn environment_trap_redirects_to_trap_vector(#[case] inst: u32, #[case] mcause: u32) {
    let program = image(&[
        (0x000, &[b().addi(1, 0, 1).build(), inst, b().addi(2, 0, 2).build()]),
        (0x100, &[b().addi(3, 0, 3).build()]),
    ]);
    let mut ctx = TestContext::new(&program);

    let trap = ctx.run_until_trap(10).unwrap();
    assert_eq!(trap.pc, 4);
    assert_eq!(
        trap.cause,
        TrapCause::CoprocessorException {
            unit: CpSelect::Cp0,
            instruction: inst,
        }
    );
    assert_eq!(trap.cause.mcause(), mcause);
    assert_eq!(ctx.seq.pc(), 0x100);
    assert_eq!(ctx.seq.last_trap(), Some(trap));

    let _ = ctx.run(10);
    assert_eq!(ctx.get_reg(1), 1);
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.get_reg(3), 3);
    assert_eq!(ctx.seq.stats().flushes_exception, 1);
}

#[test]
fn exception_flush_discards_younger_stages() {
    let mut ctx = TestContext::new(&[ECALL, b().addi(1, 0, 1).build(), b().addi(2, 0, 2).build()]);
    let reports = ctx.run(3);
    let report = reports[2];
    assert_eq!(report.flush_point, Some(Stage::Ex));
    assert!(report.flushes.contains(FlushReason::Exception));
    assert!(ctx.seq.if_id().is_none());
    assert!(ctx.seq.id_ex().is_none());
    assert!(ctx.seq.ex_mem().is_none());
}

#[test]
fn interrupt_retires_wb_and_discards_the_rest() {
    let program = image(&[
        (0x000, &[
            b().addi(1, 0, 1).build(),
            b().addi(2, 0, 2).build(),
            b().addi(3, 0, 3).build(),
            b().addi(4, 0, 4).build(),
        ]),
        (0x200, &[b().addi(10, 0, 10).build()]),
    ]);
    let mut ctx = TestContext::new(&program);
    let _ = ctx.run(4);

    let report = ctx.tick_with(TickInputs {
        interrupt: true,
        ..TickInputs::default()
    });
    assert_eq!(report.retired.map(|r| r.pc), Some(0));
    assert_eq!(report.flush_point, Some(Stage::Mem));
    assert_eq!(report.pc_after, 0x200);
    let trap = report.trap.unwrap();
    assert_eq!(trap.cause, TrapCause::ExternalInterrupt);
    assert_eq!(trap.pc, 4);
    assert!(trap.cause.is_interrupt());

    let _ = ctx.run(10);
    assert_eq!(ctx.get_reg(1), 1);
    assert_eq!((ctx.get_reg(2), ctx.get_reg(3), ctx.get_reg(4)), (0, 0, 0));
    assert_eq!(ctx.get_reg(10), 10);
}

#[test]
fn interrupt_on_empty_pipeline_records_fetch_pc() {
    let mut ctx = TestContext::new(&[b().nop().build()]);
    let report = ctx.tick_with(TickInputs {
        interrupt: true,
        ..TickInputs::default()
    });
    assert_eq!(report.trap.unwrap().pc, 0);
    assert_eq!(ctx.seq.pc(), 0x200);
    assert!(ctx.seq.is_drained());
}

// ══════════════════════════════════════════════════════════
// 7. External control
// ══════════════════════════════════════════════════════════

#[test]
fn external_stall_freezes_every_latch() {
    let mut ctx = TestContext::new(&[
        b().addi(1, 0, 1).build(),
        b().addi(2, 0, 2).build(),
        b().addi(3, 0, 3).build(),
        b().addi(4, 0, 4).build(),
    ]);
    let _ = ctx.run(4);
    let before = (
        ctx.seq.pc(),
        ctx.seq.if_id(),
        ctx.seq.id_ex(),
        ctx.seq.ex_mem(),
        ctx.seq.mem_wb(),
    );

    let stall = TickInputs {
        external_stall: true,
        ..TickInputs::default()
    };
    for _ in 0..3 {
        let report = ctx.tick_with(stall);
        assert!(report.retired.is_none());
        assert_eq!(report.stall_point, Some(Stage::Wb));
        assert!(report.stalls.contains(StallReason::ExternalStall));
    }
    let after = (
        ctx.seq.pc(),
        ctx.seq.if_id(),
        ctx.seq.id_ex(),
        ctx.seq.ex_mem(),
        ctx.seq.mem_wb(),
    );
    assert_eq!(before, after);
    assert_eq!(ctx.get_reg(1), 0);

    let _ = ctx.run_until_retired(4, 10);
    assert_eq!(ctx.get_reg(4), 4);
}

#[test]
fn interrupt_during_external_stall_keeps_wb_and_flushes_younger() {
    let mut ctx = TestContext::new(&[b().addi(1, 0, 1).build(), b().addi(2, 0, 2).build()]);
    let _ = ctx.run(4);
    let wb = ctx.seq.mem_wb();
    assert!(wb.is_some());

    let report = ctx.tick_with(TickInputs {
        external_stall: true,
        interrupt: true,
    });
    assert!(report.retired.is_none());
    assert_eq!(ctx.seq.mem_wb(), wb);
    assert!(ctx.seq.ex_mem().is_none());
    assert!(ctx.seq.id_ex().is_none());
    assert!(ctx.seq.if_id().is_none());
    assert_eq!(ctx.seq.pc(), 0x200);
}

#[test]
fn stall_counter_matches_reports() {
    let mut ctx = TestContext::new(&[b().nop().build()]);
    let stall = TickInputs {
        external_stall: true,
        ..TickInputs::default()
    };
    for _ in 0..5 {
        let _ = ctx.tick_with(stall);
    }
    assert_eq!(stall_cycles(&mut ctx, 3, StallReason::ExternalStall), 0);
    assert_eq!(ctx.seq.stats().stalls_external, 5);
    assert_eq!(ctx.seq.cycles(), 8);
}
