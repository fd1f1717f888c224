use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CaptionFxError::media_load("x")
            .to_string()
            .contains("media load error:")
    );
    assert!(
        CaptionFxError::unsupported_format("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(
        CaptionFxError::graphics_context("x")
            .to_string()
            .contains("graphics context error:")
    );
    assert!(
        CaptionFxError::encoder("x")
            .to_string()
            .contains("encoder error:")
    );
    assert!(
        CaptionFxError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CaptionFxError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn kind_matches_variant() {
    assert_eq!(
        CaptionFxError::unsupported_format("none").kind(),
        ErrorKind::UnsupportedFormat
    );
    assert_eq!(CaptionFxError::busy("x").kind(), ErrorKind::Busy);
    assert_eq!(CaptionFxError::encoder("x").kind(), ErrorKind::Encoder);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CaptionFxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
