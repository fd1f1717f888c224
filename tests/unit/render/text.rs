use super::*;

#[test]
fn shape_key_distinguishes_text_font_and_size() {
    let base = shape_key("FIGHT!", 1, 64.0);
    assert_eq!(base, shape_key("FIGHT!", 1, 64.0));
    assert_ne!(base, shape_key("FIGHT?", 1, 64.0));
    assert_ne!(base, shape_key("FIGHT!", 2, 64.0));
    assert_ne!(base, shape_key("FIGHT!", 1, 64.5));
}

#[test]
fn shaping_rejects_bad_sizes() {
    let mut engine = TextLayoutEngine::new();
    let font = LoadedFont {
        bytes: Arc::new(Vec::new()),
        index: 0,
        key: 0,
    };
    assert!(engine.shape("x", &font, 0.0).is_err());
    assert!(engine.shape("x", &font, f32::NAN).is_err());
}

#[test]
fn system_fonts_shape_centred_when_available() {
    let mut book = FontBook::system(None);
    let Some(font) = book.resolve(FontTag::Sans) else {
        eprintln!("skipping: no system fonts");
        return;
    };
    let mut engine = TextLayoutEngine::new();
    let shaped = engine.shape("HELLO", &font, 48.0).unwrap();
    assert_eq!(shaped.glyphs.len(), 5);
    assert!(shaped.width > 0.0);
    let first = shaped.glyphs[0].x;
    let last = shaped.glyphs[4].x;
    assert!(first < 0.0 && last > 0.0);

    let again = engine.shape("HELLO", &font, 48.0).unwrap();
    assert!(Arc::ptr_eq(&shaped, &again));
}
