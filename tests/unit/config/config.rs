use super::*;

#[test]
fn defaults_are_valid() {
    let cfg = ExportConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.video_bitrate_bps, 8_000_000);
    assert_eq!(cfg.caption.base_px(FontSizeTier::Medium), 65.0);
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: ExportConfig =
        serde_json::from_str(r#"{"shake_intensity_px": 40.0, "caption": {"fade_out_secs": 0.2}}"#)
            .unwrap();
    assert_eq!(cfg.shake_intensity_px, 40.0);
    assert_eq!(cfg.caption.fade_out_secs, 0.2);
    assert_eq!(cfg.caption.fade_in_secs, 0.08);
    assert_eq!(cfg.format_preference, OutputFormat::PREFERENCE.to_vec());
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = ExportConfig::default();
    cfg.format_preference.clear();
    assert!(cfg.validate().is_err());

    let mut cfg = ExportConfig::default();
    cfg.caption.fade_in_secs = -1.0;
    assert!(cfg.validate().is_err());

    let mut cfg = ExportConfig::default();
    cfg.output_fps = Some(Fps { num: 30, den: 0 });
    assert!(cfg.validate().is_err());
}

#[test]
fn from_json_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{"file_prefix": "clip", "video_bitrate_bps": 4000000}"#).unwrap();
    let cfg = ExportConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.file_prefix, "clip");
    assert_eq!(cfg.video_bitrate_bps, 4_000_000);

    std::fs::write(&path, "not json").unwrap();
    assert!(ExportConfig::from_json_file(&path).is_err());
}
