use super::*;

#[test]
fn artifact_names_carry_prefix_timestamp_and_extension() {
    assert_eq!(
        artifact_file_name("arcade_fighter", OutputFormat::WebmVp9, 1_700_000_000_123),
        "arcade_fighter_1700000000123.webm"
    );
    assert_eq!(
        artifact_file_name("clip", OutputFormat::Mp4H264, 5),
        "clip_5.mp4"
    );
}

#[test]
fn save_writes_into_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = FfmpegPlatform::new(dir.path().join("exports"));
    let artifact = OutputArtifact {
        format: OutputFormat::WebmVp8,
        file_name: "a_1.webm".to_string(),
        bytes: vec![1, 2, 3],
    };
    let path = platform.save(&artifact).unwrap();
    assert_eq!(path, dir.path().join("exports").join("a_1.webm"));
    assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
}

#[test]
fn oversized_canvas_is_a_graphics_context_error() {
    let mut platform = FfmpegPlatform::new(".");
    let err = platform
        .open_canvas(Canvas {
            width: 70_000,
            height: 2,
        })
        .err()
        .unwrap();
    assert!(matches!(err, CaptionFxError::GraphicsContext(_)));
    assert!(
        platform
            .open_canvas(Canvas {
                width: 64,
                height: 36
            })
            .is_ok()
    );
}

#[test]
fn silent_sources_get_no_audio_route() {
    let mut platform = FfmpegPlatform::new(".");
    let props = SourceProperties {
        canvas: Canvas {
            width: 2,
            height: 2,
        },
        fps: Fps { num: 30, den: 1 },
        duration_secs: Some(1.0),
        has_audio: false,
    };
    assert!(
        platform
            .open_audio(Path::new("missing.webm"), &props)
            .unwrap()
            .is_none()
    );
}

#[test]
fn missing_source_is_a_media_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = FfmpegPlatform::new(dir.path());
    let err = platform
        .open_source(&dir.path().join("nope.webm"))
        .err()
        .unwrap();
    assert!(matches!(err, CaptionFxError::MediaLoad(_)));
}
