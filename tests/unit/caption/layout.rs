use super::*;
use crate::model::style::StyleId;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn canvas() -> Canvas {
    Canvas {
        width: 1920,
        height: 1080,
    }
}

fn seg(start: f64, end: f64, text: &str, emotion: Emotion) -> Segment {
    Segment::new(start, end, text, emotion).unwrap()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn envelope_is_hidden_then_ramps_then_holds_then_fades() {
    let t = CaptionTuning::default();
    assert_eq!(caption_opacity(0.0, 1.0, &t), 0.0);
    assert_eq!(caption_opacity(0.049, 1.0, &t), 0.0);
    assert!(approx(caption_opacity(0.09, 1.0, &t), 0.5));
    assert_eq!(caption_opacity(0.2, 1.0, &t), 1.0);
    assert!(approx(caption_opacity(0.5, 0.075, &t), 0.5));
    assert_eq!(caption_opacity(0.5, 0.0, &t), 0.0);
    assert_eq!(caption_opacity(0.5, -0.1, &t), 0.0);
}

#[test]
fn envelope_takes_the_minimum_of_both_ramps() {
    let t = CaptionTuning::default();
    // Half-way through fade-in but also deep in fade-out on a very short segment.
    let a = caption_opacity(0.09, 0.03, &t);
    assert!(approx(a, 0.2));
}

#[test]
fn layout_is_idempotent_for_calm_emotions() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::RyuClassic);
    let s = seg(1.0, 2.0, "hello", Emotion::Neutral);
    let mut rng = StdRng::seed_from_u64(1);
    let a = r.layout(&s, style, FontSizeTier::Medium, 0.3, canvas(), &mut rng);
    let b = r.layout(&s, style, FontSizeTier::Medium, 0.3, canvas(), &mut rng);
    assert_eq!(a, b);
    assert_eq!(a.text, "HELLO");
    assert_eq!(a.fill, style.base_color);
    assert!(a.glow.is_none());
    assert_eq!(a.offset, Vec2::ZERO);
    assert_eq!(a.rotation, 0.0);
    assert_eq!(a.scale, 1.0);
}

#[test]
fn anger_shake_changes_geometry_but_not_opacity() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::KenFire);
    let s = seg(2.0, 3.0, "loud!!", Emotion::Anger);
    let mut rng = StdRng::seed_from_u64(42);
    let a = r.layout(&s, style, FontSizeTier::Large, 0.5, canvas(), &mut rng);
    let b = r.layout(&s, style, FontSizeTier::Large, 0.5, canvas(), &mut rng);
    assert_eq!(a.opacity, b.opacity);
    assert_ne!(a.offset, b.offset);
    assert!(a.offset.x.abs() <= 10.0 && a.offset.y.abs() <= 10.0);
    assert!(a.rotation.abs() <= 0.075);
    assert_eq!(a.fill, Rgba8::rgb(0xef, 0x44, 0x44));
}

#[test]
fn joy_bobs_and_hype_pulses() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::RyuClassic);
    let mut rng = StdRng::seed_from_u64(0);

    let joy = r.layout(
        &seg(0.0, 2.0, "yay", Emotion::Joy),
        style,
        FontSizeTier::Medium,
        0.15,
        canvas(),
        &mut rng,
    );
    assert_eq!(joy.offset.x, 0.0);
    assert!((joy.offset.y - (1.5f64).sin() * 30.0).abs() < 1e-9);
    assert!((joy.rotation - (0.75f64).sin() * 0.08).abs() < 1e-12);

    let hype = r.layout(
        &seg(0.0, 2.0, "fight!", Emotion::Hype),
        style,
        FontSizeTier::Medium,
        0.1,
        canvas(),
        &mut rng,
    );
    assert!((hype.scale - (1.0 + (1.2f64).sin().abs() * 0.2)).abs() < 1e-12);
    let glow = hype.glow.expect("hype glows");
    assert_eq!(glow.color, Rgba8::rgb(0xe8, 0x79, 0xf9));
    assert!((glow.blur_radius - 40.0).abs() < 1e-9);
}

#[test]
fn lightning_style_always_glows() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::ChunLightning);
    let mut rng = StdRng::seed_from_u64(0);
    let run = r.layout(
        &seg(0.0, 1.0, "calm", Emotion::Sad),
        style,
        FontSizeTier::Small,
        0.5,
        canvas(),
        &mut rng,
    );
    assert!(run.glow.is_some());
    assert_eq!(run.families(), &[FontFamily::Monospace]);
}

#[test]
fn size_scales_with_short_side_and_anchor_sits_low() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::RyuClassic);
    let s = seg(0.0, 1.0, "x", Emotion::Neutral);
    let mut rng = StdRng::seed_from_u64(0);
    let small = Canvas {
        width: 700,
        height: 1244,
    };
    let a = r.layout(&s, style, FontSizeTier::Medium, 0.5, small, &mut rng);
    assert!((a.size_px - 65.0).abs() < 1e-9);
    assert_eq!(a.anchor, Point::new(350.0, 1244.0 * 0.8));

    let b = r.layout(&s, style, FontSizeTier::Medium, 0.5, canvas(), &mut rng);
    assert!((b.size_px - 65.0 * 1080.0 / 700.0).abs() < 1e-9);
    assert!((b.stroke.width - 15.0).abs() < 1e-9);
    assert_eq!(b.stroke.color, Rgba8::BLACK);
}

#[test]
fn font_stacks_follow_style_tier() {
    assert_eq!(
        font_stack(FontTag::Arcade)[0],
        FontFamily::Named("Press Start 2P")
    );
    assert_eq!(font_stack(FontTag::Title)[0], FontFamily::Named("Russo One"));
    assert_eq!(font_stack(FontTag::Sans), &[FontFamily::SansSerif]);
}

#[test]
fn transform_places_text_centre_at_origin() {
    let r = CaptionRenderer::default();
    let style = StyleConfig::get(StyleId::RyuClassic);
    let mut rng = StdRng::seed_from_u64(0);
    let run = r.layout(
        &seg(0.0, 1.0, "x", Emotion::Neutral),
        style,
        FontSizeTier::Medium,
        0.5,
        canvas(),
        &mut rng,
    );
    let p = run.transform() * Point::ORIGIN;
    assert!((p.x - 960.0).abs() < 1e-9);
    assert!((p.y - 864.0).abs() < 1e-9);
}
