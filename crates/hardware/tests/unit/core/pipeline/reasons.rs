//! Stall and Flush Bookkeeping.

use rstest::rstest;

use rvpipe_core::core::pipeline::reasons::{
    CycleControl, FlushReason, FlushReasons, Stage, StageFate, StallReason, StallReasons,
};

#[test]
fn reason_sets_collect_and_iterate() {
    let set: StallReasons = [StallReason::ExternalStall, StallReason::RawHazard]
        .into_iter()
        .collect();
    assert!(set.contains(StallReason::RawHazard));
    assert!(!set.contains(StallReason::LoadUseHazard));
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![StallReason::RawHazard, StallReason::ExternalStall]
    );
    assert!(FlushReasons::empty().is_empty());
}

#[test]
fn stall_point_is_the_oldest_stage() {
    let mut ctl = CycleControl::default();
    ctl.stall(StallReason::LoadUseHazard, Stage::Id);
    ctl.stall(StallReason::MemoryNotReady, Stage::Mem);
    ctl.stall(StallReason::MemoryNotReady, Stage::If);
    assert_eq!(ctl.stall_point, Some(Stage::Mem));

    assert_eq!(ctl.fate(Stage::Wb), StageFate::Advance);
    for stage in [Stage::If, Stage::Id, Stage::Ex, Stage::Mem] {
        assert_eq!(ctl.fate(stage), StageFate::Hold, "{stage}");
    }
    assert!(ctl.held_downstream(Stage::Ex));
    assert!(!ctl.held_downstream(Stage::Mem));
}

#[test]
fn oldest_flush_chooses_the_redirect() {
    let mut ctl = CycleControl::default();
    ctl.flush(FlushReason::BranchMispredict, Stage::If, 0x40);
    ctl.flush(FlushReason::Exception, Stage::Ex, 0x100);
    ctl.flush(FlushReason::BranchMispredict, Stage::If, 0x80);
    assert_eq!(ctl.flush_point, Some(Stage::Ex));
    assert_eq!(ctl.redirect, Some(0x100));
    assert!(ctl.flushes.contains(FlushReason::BranchMispredict));
    assert!(ctl.flushes.contains(FlushReason::Exception));
}

#[rstest]
#[case::stall_inside_flush(Stage::Id, Stage::Ex)]
#[case::same_stage(Stage::Ex, Stage::Ex)]
fn flush_wins_over_stall(#[case] stall_at: Stage, #[case] flush_at: Stage) {
    let mut ctl = CycleControl::default();
    ctl.stall(StallReason::CoprocessorNotReady, stall_at);
    ctl.flush(FlushReason::Exception, flush_at, 0x100);
    assert_eq!(ctl.fate(stall_at), StageFate::Discard);
    assert_eq!(ctl.fate(Stage::If), StageFate::Discard);
    assert_eq!(ctl.fate(Stage::Wb), StageFate::Advance);
}

#[test]
fn stall_older_than_flush_holds_the_gap() {
    let mut ctl = CycleControl::default();
    ctl.stall(StallReason::ExternalStall, Stage::Wb);
    ctl.flush(FlushReason::Interrupt, Stage::Mem, 0x200);
    assert_eq!(ctl.fate(Stage::Wb), StageFate::Hold);
    assert_eq!(ctl.fate(Stage::Mem), StageFate::Discard);
    assert_eq!(ctl.fate(Stage::If), StageFate::Discard);
}

#[test]
fn stage_topology() {
    assert_eq!(Stage::If.upstream(), None);
    assert_eq!(Stage::Wb.upstream(), Some(Stage::Mem));
    assert!(Stage::ALL.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(Stage::Mem.to_string(), "MEM");
}
