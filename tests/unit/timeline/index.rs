use super::*;
use crate::model::segment::Emotion;

fn seg(start: f64, end: f64, text: &str, emotion: Emotion) -> Segment {
    Segment::new(start, end, text, emotion).unwrap()
}

#[test]
fn every_time_inside_a_segment_resolves_to_it() {
    let index = SegmentIndex::new(vec![
        seg(0.5, 1.5, "Ready...", Emotion::Neutral),
        seg(2.0, 3.0, "LOUD!!", Emotion::Anger),
    ]);
    for i in 0..=100 {
        let t = 2.0 + f64::from(i) * 0.01;
        assert_eq!(index.active_at(t).map(|s| s.text.as_str()), Some("LOUD!!"));
    }
    assert_eq!(index.active_at(0.5).map(|s| s.text.as_str()), Some("Ready..."));
}

#[test]
fn gaps_between_segments_have_no_caption() {
    let index = SegmentIndex::new(vec![
        seg(0.5, 1.5, "Ready...", Emotion::Neutral),
        seg(2.0, 3.0, "LOUD!!", Emotion::Anger),
    ]);
    assert!(index.active_at(1.9).is_none());
    assert!(index.active_at(1.500_1).is_none());
    assert!(index.active_at(0.0).is_none());
    assert!(index.active_at(10.0).is_none());
}

#[test]
fn shared_boundary_resolves_to_first_segment() {
    let index = SegmentIndex::new(vec![
        seg(0.5, 1.5, "Ready...", Emotion::Neutral),
        seg(1.5, 2.5, "FIGHT!", Emotion::Hype),
    ]);
    assert_eq!(index.active_at(1.5).map(|s| s.text.as_str()), Some("Ready..."));
    assert_eq!(index.active_at(1.6).map(|s| s.text.as_str()), Some("FIGHT!"));
}

#[test]
fn overlapping_segments_pick_earlier_entry() {
    let index = SegmentIndex::new(vec![
        seg(1.0, 3.0, "first", Emotion::Joy),
        seg(2.0, 4.0, "second", Emotion::Sad),
    ]);
    assert_eq!(index.active_at(2.5).map(|s| s.text.as_str()), Some("first"));
    assert_eq!(index.active_at(3.5).map(|s| s.text.as_str()), Some("second"));
}

#[test]
fn lookup_is_pure() {
    let index = SegmentIndex::new(vec![seg(0.0, 1.0, "a", Emotion::Neutral)]);
    let a = index.active_at(0.5).cloned();
    let b = index.active_at(0.5).cloned();
    assert_eq!(a, b);
    assert!(SegmentIndex::default().active_at(0.5).is_none());
}
