use super::*;

#[test]
fn progress_floors_and_never_decreases() {
    let mut p = ProgressCounter::default();
    assert_eq!(p.update(0.0, Some(4.0)), None);
    assert_eq!(p.update(0.039, Some(4.0)), None);
    assert_eq!(p.update(0.04, Some(4.0)), Some(1));
    assert_eq!(p.update(1.999, Some(4.0)), Some(49));
    assert_eq!(p.update(1.0, Some(4.0)), None);
    assert_eq!(p.percent(), 49);
    assert_eq!(p.update(9.0, Some(4.0)), Some(100));
    assert_eq!(p.finish(), None);
}

#[test]
fn unknown_duration_holds_until_finish() {
    let mut p = ProgressCounter::default();
    assert_eq!(p.update(3.0, None), None);
    assert_eq!(p.update(3.0, Some(0.0)), None);
    assert_eq!(p.update(f64::NAN, Some(2.0)), None);
    assert_eq!(p.finish(), Some(100));
    p.reset();
    assert_eq!(p.percent(), 0);
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    token.cancel();
    assert!(other.is_cancelled());
}

#[test]
fn terminal_states() {
    for s in [ExportState::Done, ExportState::Failed, ExportState::Cancelled] {
        assert!(s.is_terminal());
    }
    for s in [
        ExportState::Idle,
        ExportState::Preparing,
        ExportState::Encoding,
        ExportState::Finalizing,
    ] {
        assert!(!s.is_terminal());
    }
    assert_eq!(ExportState::Finalizing.to_string(), "finalizing");
}
