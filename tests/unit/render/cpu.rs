use super::*;
use crate::effects::filter::PixelTransformSpec;
use crate::caption::layout::{CAPTION_WEIGHT, Stroke};
use crate::effects::vfx::{Dot, EffectOps};
use crate::foundation::core::{Canvas, Vec2};
use crate::model::style::FontTag;
use crate::render::compositor::SourceDraw;
use smallvec::smallvec;

fn solid_source(w: u32, h: u32, rgba: [u8; 4]) -> VideoFrame {
    VideoFrame {
        width: w,
        height: h,
        data: rgba.repeat((w * h) as usize),
        pts_secs: 0.0,
    }
}

fn plan(w: u32, h: u32) -> FramePlan {
    FramePlan {
        canvas: Canvas {
            width: w,
            height: h,
        },
        time_secs: 0.0,
        background: Rgba8::BLACK,
        source: SourceDraw {
            filter: PixelTransformSpec::Identity,
            offset: Vec2::ZERO,
        },
        effects: EffectOps::new(),
        caption: None,
    }
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn source_is_scaled_to_fill_the_canvas() {
    let mut r = CpuRasterizer::new();
    let out = r
        .render(&plan(16, 8), &solid_source(4, 2, [200, 10, 10, 255]))
        .unwrap();
    assert_eq!(out.data.len(), 16 * 8 * 4);
    assert!(out.premultiplied);
    for (x, y) in [(0, 0), (15, 7), (8, 4)] {
        let p = px(&out, x, y);
        assert!(p[0] >= 190 && p[1] <= 20 && p[3] == 255, "pixel {x},{y} = {p:?}");
    }
}

#[test]
fn filter_applies_to_source_pixels() {
    let mut r = CpuRasterizer::new();
    let mut p = plan(8, 8);
    p.source.filter = PixelTransformSpec::Invert { amount: 1.0 };
    let out = r.render(&p, &solid_source(8, 8, [255, 0, 0, 255])).unwrap();
    let c = px(&out, 4, 4);
    assert!(c[0] <= 5 && c[1] >= 250 && c[2] >= 250);
}

#[test]
fn shake_offset_reveals_black_background() {
    let mut r = CpuRasterizer::new();
    let mut p = plan(16, 16);
    p.source.offset = Vec2::new(8.0, 0.0);
    let out = r.render(&p, &solid_source(16, 16, [255, 255, 255, 255])).unwrap();
    assert_eq!(px(&out, 2, 8), [0, 0, 0, 255]);
    assert!(px(&out, 12, 8)[0] >= 250);
}

#[test]
fn screen_band_brightens_only_inside_rect() {
    let mut r = CpuRasterizer::new();
    let mut p = plan(20, 20);
    let white = Rgba8::rgba_f(255, 255, 255, 0.5);
    p.effects = smallvec![DrawOp::LinearGradientRect {
        rect: Rect::new(0.0, 10.0, 20.0, 14.0),
        start: Point::new(0.0, 12.0),
        end: Point::new(20.0, 12.0),
        stops: smallvec![
            GradientStop { offset: 0.0, color: white },
            GradientStop { offset: 1.0, color: white },
        ],
        blend: BlendMode::Screen,
    }];
    let out = r.render(&p, &solid_source(20, 20, [40, 40, 40, 255])).unwrap();
    assert_eq!(px(&out, 5, 2)[0], 40);
    assert!(px(&out, 5, 12)[0] > 120);
}

#[test]
fn radial_vignette_leaves_centre_and_tints_corners() {
    let mut r = CpuRasterizer::new();
    let mut p = plan(40, 40);
    p.effects = smallvec![DrawOp::RadialGradientRect {
        rect: Rect::new(0.0, 0.0, 40.0, 40.0),
        center: Point::new(20.0, 20.0),
        inner_radius: 16.0,
        outer_radius: 40.0,
        stops: smallvec![
            GradientStop { offset: 0.0, color: Rgba8::rgba_f(255, 0, 0, 0.0) },
            GradientStop { offset: 1.0, color: Rgba8::rgba_f(220, 38, 38, 0.6) },
        ],
        blend: BlendMode::Normal,
    }];
    let out = r.render(&p, &solid_source(40, 40, [0, 0, 0, 255])).unwrap();
    assert_eq!(px(&out, 20, 20), [0, 0, 0, 255]);
    assert!(px(&out, 0, 0)[0] > 40);
}

#[test]
fn circles_are_filled_in_their_colour() {
    let mut r = CpuRasterizer::new();
    let mut p = plan(32, 32);
    p.effects = smallvec![DrawOp::CircleSet {
        dots: smallvec![Dot {
            center: Point::new(16.0, 16.0),
            radius: 6.0,
            color: Rgba8::rgb(255, 215, 0),
        }],
        blend: BlendMode::Normal,
    }];
    let out = r.render(&p, &solid_source(32, 32, [0, 0, 0, 255])).unwrap();
    let c = px(&out, 16, 16);
    assert!(c[0] >= 250 && c[1] >= 205 && c[2] <= 5);
    assert_eq!(px(&out, 2, 2), [0, 0, 0, 255]);
}

#[test]
fn mismatched_source_buffer_is_a_media_error() {
    let mut r = CpuRasterizer::new();
    let bad = VideoFrame {
        width: 4,
        height: 4,
        data: vec![0; 10],
        pts_secs: 0.0,
    };
    let err = r.render(&plan(4, 4), &bad).unwrap_err();
    assert!(matches!(err, CaptionFxError::MediaLoad(_)));
}

#[test]
fn oversized_canvas_is_a_graphics_context_error() {
    let mut r = CpuRasterizer::new();
    let err = r
        .render(&plan(70_000, 2), &solid_source(2, 2, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(matches!(err, CaptionFxError::GraphicsContext(_)));
}

fn caption(stroke_width: f64) -> GlyphRun {
    GlyphRun {
        text: "LW".to_owned(),
        font: FontTag::Sans,
        weight: CAPTION_WEIGHT,
        size_px: 64.0,
        anchor: Point::new(80.0, 60.0),
        offset: Vec2::ZERO,
        rotation: 0.0,
        scale: 1.0,
        stroke: Stroke {
            width: stroke_width,
            color: Rgba8::rgb(255, 0, 0),
        },
        glow: None,
        fill: Rgba8::WHITE,
        opacity: 1.0,
    }
}

#[test]
fn caption_outline_surrounds_every_glyph_edge() {
    let mut r = CpuRasterizer::new();
    if r.fonts.resolve(FontTag::Sans).is_none() {
        eprintln!("skipping: no system font available");
        return;
    }
    let (w, h) = (160u32, 120u32);
    let black = solid_source(w, h, [0, 0, 0, 255]);

    let mut p = plan(w, h);
    p.caption = Some(caption(0.0));
    let bare = r.render(&p, &black).unwrap();
    p.caption = Some(caption(16.0));
    let outlined = r.render(&p, &black).unwrap();

    let inside: Vec<(u32, u32)> = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| px(&bare, x, y)[0] >= 128)
        .collect();
    assert!(!inside.is_empty());
    assert!((0..h).any(|y| (0..w).any(|x| {
        let c = px(&outlined, x, y);
        c[0] >= 200 && c[1] <= 40
    })));

    // A round-joined 16px stroke reaches 8px past the outline everywhere, corners included.
    let reach = 6i64;
    for &(x, y) in &inside {
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if dx * dx + dy * dy > reach * reach {
                    continue;
                }
                let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
                if nx < 0 || ny < 0 || nx >= i64::from(w) || ny >= i64::from(h) {
                    continue;
                }
                let c = px(&outlined, nx as u32, ny as u32);
                assert!(c[0] >= 64, "gap in outline at {nx},{ny}: {c:?}");
            }
        }
    }
}
