//! Whole-Program Tests.
//!
//! Small loops and call sequences that exercise forwarding, branches, and memory
//! together, compared with forwarding on and off.

use rstest::rstest;

use crate::common::builder::InstructionBuilder;
use crate::common::harness::TestContext;
use rvpipe_core::config::Config;

fn b() -> InstructionBuilder {
    InstructionBuilder::new()
}

/// Sums 1..=10 in a countdown loop, stores the result, and reloads it.
fn sum_program() -> Vec<u32> {
    vec![
        b().addi(1, 0, 10).build(),
        b().addi(2, 0, 0).build(),
        b().add(2, 2, 1).build(), // loop:
        b().addi(1, 1, -1).build(),
        b().bne(1, 0, -8).build(),
        b().sw(0, 2, 0x400).build(),
        b().lw(3, 0, 0x400).build(),
        b().add(4, 3, 3).build(),
        b().jal(0, 0).build(),
    ]
}

/// Iterative Fibonacci: x10 = fib(12).
fn fib_program() -> Vec<u32> {
    vec![
        b().addi(5, 0, 12).build(),
        b().addi(6, 0, 0).build(),
        b().addi(7, 0, 1).build(),
        b().add(8, 6, 7).build(), // loop:
        b().addi(6, 7, 0).build(),
        b().addi(7, 8, 0).build(),
        b().addi(5, 5, -1).build(),
        b().bne(5, 0, -16).build(),
        b().addi(10, 6, 0).build(),
        b().jal(0, 0).build(),
    ]
}

fn with_forwarding(forwarding: bool) -> Config {
    let mut config = Config::default();
    config.pipeline.forwarding = forwarding;
    config
}

#[rstest]
#[case::forwarding(true)]
#[case::interlocked(false)]
fn sum_loop(#[case] forwarding: bool) {
    let mut ctx = TestContext::with_config(with_forwarding(forwarding), &sum_program());
    let _ = ctx.run(300);

    assert_eq!(ctx.get_reg(1), 0);
    assert_eq!(ctx.get_reg(2), 55);
    assert_eq!(ctx.get_reg(3), 55);
    assert_eq!(ctx.get_reg(4), 110);
    assert_eq!(ctx.data_word(0x400), 55);

    let stats = ctx.seq.stats();
    assert!(stats.flushes_branch > 0);
    if forwarding {
        assert_eq!(stats.stalls_raw, 0);
        assert_eq!(stats.stalls_load_use, 1);
    } else {
        assert!(stats.stalls_raw > 0);
        assert_eq!(stats.forwards_ex + stats.forwards_mem_alu + stats.forwards_mem_load, 0);
    }
}

#[rstest]
#[case::forwarding(true)]
#[case::interlocked(false)]
fn fibonacci(#[case] forwarding: bool) {
    let mut ctx = TestContext::with_config(with_forwarding(forwarding), &fib_program());
    let _ = ctx.run(400);
    assert_eq!(ctx.get_reg(10), 144);
}

#[test]
fn interlocking_costs_cycles_not_results() {
    let retire = |forwarding: bool| {
        let mut ctx = TestContext::with_config(with_forwarding(forwarding), &sum_program());
        // 2 setup + 10 iterations of 3 + sw, lw, add.
        let reports = ctx.run_until_retired(35, 400);
        (reports.len(), ctx.get_reg(4))
    };
    let (fast, fast_result) = retire(true);
    let (slow, slow_result) = retire(false);
    assert_eq!(fast_result, slow_result);
    assert!(slow > fast);
}

#[test]
fn upper_immediates() {
    let mut ctx = TestContext::new(&[
        b().lui(1, 0x1234_5000).build(),
        b().addi(1, 1, 0x678).build(),
        b().auipc(2, 0x1000).build(),
        b().srai(3, 1, 4).build(),
        b().sub(4, 0, 1).build(),
        b().sra(5, 4, 0).build(),
    ]);
    let _ = ctx.run_until_retired(6, 20);
    assert_eq!(ctx.get_reg(1), 0x1234_5678);
    assert_eq!(ctx.get_reg(2), 0x1008);
    assert_eq!(ctx.get_reg(3), 0x0123_4567);
    assert_eq!(ctx.get_reg(4), 0x1234_5678u32.wrapping_neg());
    assert_eq!(ctx.get_reg(5), ctx.get_reg(4));
}
