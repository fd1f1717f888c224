use super::*;

#[test]
fn unknown_or_missing_emotion_is_neutral() {
    let json = r#"[
        {"start": 0.0, "end": 1.0, "text": "a", "emotion": "furious"},
        {"start": 1.0, "end": 2.0, "text": "b"},
        {"start": 2.0, "end": 3.0, "text": "c", "emotion": null},
        {"start": 3.0, "end": 4.0, "text": "d", "emotion": "HYPE"}
    ]"#;
    let segs: Vec<Segment> = serde_json::from_str(json).unwrap();
    assert_eq!(segs[0].emotion, Emotion::Neutral);
    assert_eq!(segs[1].emotion, Emotion::Neutral);
    assert_eq!(segs[2].emotion, Emotion::Neutral);
    assert_eq!(segs[3].emotion, Emotion::Hype);
}

#[test]
fn emotion_serializes_lowercase() {
    let s = serde_json::to_string(&Emotion::Anger).unwrap();
    assert_eq!(s, "\"anger\"");
}

#[test]
fn new_rejects_inverted_or_empty_ranges() {
    assert!(Segment::new(1.0, 1.0, "x", Emotion::Joy).is_err());
    assert!(Segment::new(2.0, 1.0, "x", Emotion::Joy).is_err());
    assert!(Segment::new(f64::NAN, 1.0, "x", Emotion::Joy).is_err());
    assert!(Segment::new(0.5, 1.5, "Ready...", Emotion::Neutral).is_ok());
}

#[test]
fn contains_is_inclusive_on_both_ends() {
    let s = Segment::new(1.5, 2.5, "FIGHT!", Emotion::Hype).unwrap();
    assert!(s.contains(1.5));
    assert!(s.contains(2.5));
    assert!(!s.contains(2.500_001));
    assert_eq!(s.duration(), 1.0);
}
