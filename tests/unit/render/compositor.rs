use super::*;
use crate::effects::filter::FilterBank;
use crate::effects::vfx::DrawOp;
use crate::model::style::{FilterSelection, StyleId};

fn compositor(seed: u64) -> FrameCompositor {
    FrameCompositor::with_rng(
        CompositorSettings {
            canvas: Canvas {
                width: 640,
                height: 360,
            },
            filter: FilterBank::resolve(FilterSelection::Sepia),
            style: StyleConfig::get(StyleId::RyuClassic).clone(),
            font_size: FontSizeTier::Medium,
            shake_intensity_px: 30.0,
        },
        CaptionRenderer::default(),
        StdRng::seed_from_u64(seed),
    )
}

struct RecordingBackend {
    plans: Vec<FramePlan>,
}

impl RasterBackend for RecordingBackend {
    fn render(&mut self, plan: &FramePlan, source: &VideoFrame) -> CaptionFxResult<FrameRGBA> {
        self.plans.push(plan.clone());
        Ok(FrameRGBA {
            width: source.width,
            height: source.height,
            data: source.data.clone(),
            premultiplied: false,
        })
    }
}

#[test]
fn no_active_segment_means_source_only() {
    let mut c = compositor(1);
    let plan = c.plan(None, 1.9);
    assert_eq!(plan.background, Rgba8::BLACK);
    assert_eq!(plan.source.offset, Vec2::ZERO);
    assert_eq!(plan.source.filter, PixelTransformSpec::Sepia { amount: 0.8 });
    assert_eq!(plan.overlay_count(), 0);
}

#[test]
fn anger_shakes_source_within_intensity() {
    let mut c = compositor(9);
    let seg = Segment::new(2.0, 3.0, "loud!!", Emotion::Anger).unwrap();
    for i in 0..20 {
        let plan = c.plan(Some(&seg), 2.0 + f64::from(i) * 0.05);
        let o = plan.source.offset;
        assert!(o.x.abs() <= 15.0 && o.y.abs() <= 15.0);
        assert!(o != Vec2::ZERO);
        assert!(matches!(plan.effects[0], DrawOp::RadialGradientRect { .. }));
    }
}

#[test]
fn caption_uses_segment_local_time() {
    let mut c = compositor(0);
    let seg = Segment::new(10.0, 12.0, "late", Emotion::Neutral).unwrap();
    let early = c.plan(Some(&seg), 10.0);
    assert_eq!(early.caption.as_ref().map(|g| g.opacity), Some(0.0));
    let mid = c.plan(Some(&seg), 11.0);
    assert_eq!(mid.caption.as_ref().map(|g| g.opacity), Some(1.0));
    assert_eq!(mid.source.offset, Vec2::ZERO);
    assert!(mid.effects.is_empty());
}

#[test]
fn composite_hands_plan_to_backend() {
    let mut c = compositor(0);
    let mut backend = RecordingBackend { plans: Vec::new() };
    let source = VideoFrame {
        width: 640,
        height: 360,
        data: vec![7u8; 640 * 360 * 4],
        pts_secs: 2.0,
    };
    let seg = Segment::new(1.5, 2.5, "fight!", Emotion::Hype).unwrap();
    let (plan, frame) = c
        .composite(&mut backend, &source, Some(&seg), 2.0)
        .unwrap();
    assert_eq!(backend.plans, vec![plan.clone()]);
    assert_eq!(frame.data.len(), 640 * 360 * 4);
    assert_eq!(plan.effects.len(), 3);
    assert_eq!(plan.caption.map(|g| g.text), Some("FIGHT!".to_string()));
}
