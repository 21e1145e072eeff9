//! Coprocessor Bank Tests.

use crate::common::mocks::coprocessor::MockUnit;
use rvpipe_core::common::error::{Trap, TrapCause};
use rvpipe_core::core::units::coproc::{
    Coprocessor, CoprocessorBank, CoprocessorRequest, CoprocessorResponse, CpSelect,
};

fn idle_unit(name: &str) -> MockUnit {
    let mut unit = MockUnit::new();
    unit.expect_respond()
        .withf(|req| !req.valid)
        .returning(|_| CoprocessorResponse {
            ready: true,
            ..CoprocessorResponse::default()
        });
    unit.expect_name().return_const(name.to_owned());
    unit
}

#[test]
fn only_the_selected_unit_sees_the_request() {
    let req = CoprocessorRequest {
        instruction: 0x0000_000B,
        operand_a: 1,
        operand_b: 2,
        valid: true,
    };
    let mut selected = MockUnit::new();
    selected
        .expect_respond()
        .withf(move |r| *r == req)
        .times(1)
        .returning(|r| CoprocessorResponse {
            ready: true,
            data_out: r.operand_a + r.operand_b,
            exception: false,
        });

    let mut bank = CoprocessorBank::new([
        Box::new(idle_unit("cp0")),
        Box::new(idle_unit("cp1")),
        Box::new(selected),
        Box::new(idle_unit("cp3")),
    ]);
    let resp = bank.cycle(Some(CpSelect::Cp2), &req);
    assert_eq!(resp.data_out, 3);
    assert!(resp.ready);
}

#[test]
fn no_selection_answers_not_ready() {
    let mut bank = CoprocessorBank::new([
        Box::new(idle_unit("a")),
        Box::new(idle_unit("b")),
        Box::new(idle_unit("c")),
        Box::new(idle_unit("d")),
    ]);
    let resp = bank.cycle(None, &CoprocessorRequest::IDLE);
    assert_eq!(resp, CoprocessorResponse::default());
    assert_eq!(bank.name(CpSelect::Cp3), "d");
    assert_eq!(format!("{bank:?}"), r#"["a", "b", "c", "d"]"#);
}

#[test]
fn notifications_reach_every_unit() {
    let trap = Trap {
        cause: TrapCause::ExternalInterrupt,
        pc: 0x40,
    };
    let units: [Box<dyn Coprocessor>; 4] = std::array::from_fn(|_| {
        let mut unit = MockUnit::new();
        unit.expect_retired().times(2).return_const(());
        unit.expect_trap_taken()
            .withf(move |t| *t == trap)
            .times(1)
            .return_const(());
        Box::new(unit) as Box<dyn Coprocessor>
    });
    let mut bank = CoprocessorBank::new(units);
    bank.retired();
    bank.retired();
    bank.trap_taken(&trap);
}

#[test]
fn reference_bank_names() {
    let bank = CoprocessorBank::reference([1, 4, 2, 2]);
    let names: Vec<_> = CpSelect::ALL.iter().map(|s| bank.name(*s).to_owned()).collect();
    assert_eq!(names, vec!["system", "fpu", "CP2", "CP3"]);
    assert_eq!(CpSelect::Cp1.to_string(), "CP1");
}
