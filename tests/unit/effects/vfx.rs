use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn canvas() -> Canvas {
    Canvas {
        width: 1920,
        height: 1080,
    }
}

#[test]
fn calm_emotions_draw_nothing() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(EffectEngine::draw(Emotion::Neutral, 0.4, canvas(), &mut rng).is_empty());
    assert!(EffectEngine::draw(Emotion::Sad, 0.4, canvas(), &mut rng).is_empty());
}

#[test]
fn hype_emits_beam_core_and_six_sparks() {
    let mut rng = StdRng::seed_from_u64(7);
    let ops = EffectEngine::draw(Emotion::Hype, 0.5, canvas(), &mut rng);
    assert_eq!(ops.len(), 3);
    assert!(ops.iter().all(|op| op.blend() == BlendMode::Screen));

    let DrawOp::LinearGradientRect { rect, stops, .. } = &ops[0] else {
        panic!("expected beam gradient, got {:?}", ops[0]);
    };
    assert!((rect.center().y - 810.0).abs() < 1e-9);
    assert_eq!(stops.len(), 5);
    assert_eq!(stops[2].color, Rgba8::rgba_f(200, 255, 255, 0.9));

    let DrawOp::LinearGradientRect { rect: core, .. } = &ops[1] else {
        panic!("expected core band");
    };
    assert!(core.height() < rect.height());

    let DrawOp::LineSet { lines, .. } = &ops[2] else {
        panic!("expected sparks");
    };
    assert_eq!(lines.len(), 6);
    for l in lines {
        assert!(l.p0.y >= rect.y0 - 1e-9 && l.p0.y <= rect.y1 + 1e-9);
        assert!(l.p1.x > l.p0.x);
    }
}

#[test]
fn hype_beam_flickers_over_time() {
    let mut rng = StdRng::seed_from_u64(3);
    let height_at = |t: f64, rng: &mut StdRng| match &EffectEngine::draw(Emotion::Hype, t, canvas(), rng)[0] {
        DrawOp::LinearGradientRect { rect, .. } => rect.height(),
        other => panic!("unexpected op {other:?}"),
    };
    let a = height_at(0.0, &mut rng);
    let b = height_at(0.05, &mut rng);
    assert!((a - 375.0).abs() < 1e-9);
    assert!((a - b).abs() > 1.0);
}

#[test]
fn anger_vignette_pulses_and_is_transparent_inside() {
    let mut rng = StdRng::seed_from_u64(0);
    let ops = EffectEngine::draw(Emotion::Anger, 0.0, canvas(), &mut rng);
    let [
        DrawOp::RadialGradientRect {
            inner_radius,
            outer_radius,
            stops,
            ..
        },
    ] = ops.as_slice()
    else {
        panic!("expected a single vignette, got {ops:?}");
    };
    assert!((inner_radius - 432.0).abs() < 1e-9);
    assert!((outer_radius - 1080.0).abs() < 1e-9);
    assert_eq!(stops[0].color.a, 0);
    assert_eq!(stops[1].color, Rgba8::rgba_f(220, 38, 38, 0.4));

    let later = EffectEngine::draw(Emotion::Anger, 0.05, canvas(), &mut rng);
    assert_ne!(ops, later);
}

#[test]
fn joy_dots_are_deterministic_and_alternate_colours() {
    let mut rng = StdRng::seed_from_u64(0);
    let a = EffectEngine::draw(Emotion::Joy, 1.25, canvas(), &mut rng);
    let b = EffectEngine::draw(Emotion::Joy, 1.25, canvas(), &mut rng);
    assert_eq!(a, b);

    let DrawOp::CircleSet { dots, .. } = &a[0] else {
        panic!("expected dots");
    };
    assert_eq!(dots.len(), 25);
    assert_ne!(dots[0].color, dots[1].color);
    assert_eq!(dots[0].color, dots[2].color);
    for d in dots {
        assert!(d.center.x >= 0.0 && d.center.x < 1920.0);
        assert!(d.center.y >= 0.0 && d.center.y < 1080.0);
    }
}

#[test]
fn joy_dots_drift_with_time() {
    let mut rng = StdRng::seed_from_u64(0);
    let a = EffectEngine::draw(Emotion::Joy, 0.0, canvas(), &mut rng);
    let b = EffectEngine::draw(Emotion::Joy, 0.1, canvas(), &mut rng);
    assert_ne!(a, b);
}

#[test]
fn sample_stops_interpolates_between_neighbours() {
    let stops = [
        GradientStop {
            offset: 0.0,
            color: Rgba8::rgba_f(0, 0, 0, 0.0),
        },
        GradientStop {
            offset: 1.0,
            color: Rgba8::rgb(200, 100, 50),
        },
    ];
    assert_eq!(sample_stops(&stops, -1.0).a, 0);
    assert_eq!(sample_stops(&stops, 2.0), Rgba8::rgb(200, 100, 50));
    let mid = sample_stops(&stops, 0.5);
    assert_eq!((mid.r, mid.g, mid.b), (100, 50, 25));
    assert!(mid.a.abs_diff(128) <= 1);
}
