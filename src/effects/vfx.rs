//! Procedural overlay effects keyed by emotion.
//!
//! [`EffectEngine::draw`] is a pure function of `(emotion, t, canvas)` plus a cosmetic random
//! source. It returns backend-agnostic [`DrawOp`]s; rasterization lives in `render::cpu`.

use rand::Rng;
use smallvec::{SmallVec, smallvec};

use crate::foundation::core::{Canvas, Line, Point, Rect, Rgba8};
use crate::model::segment::Emotion;

/// How an overlay op combines with what is already on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// `1 - (1 - s)(1 - d)`: brightens, never darkens.
    Screen,
}

/// One colour stop of a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Straight-alpha colour.
    pub color: Rgba8,
}

/// Filled circle of a [`DrawOp::CircleSet`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    /// Centre in canvas pixels.
    pub center: Point,
    /// Radius in canvas pixels.
    pub radius: f64,
    /// Straight-alpha fill.
    pub color: Rgba8,
}

/// Gradient stops, inline for the common case.
pub type Stops = SmallVec<[GradientStop; 5]>;

/// A single overlay drawing instruction in canvas pixel space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `rect` filled with a linear gradient running from `start` to `end`.
    LinearGradientRect {
        /// Filled area.
        rect: Rect,
        /// Gradient start point (offset 0).
        start: Point,
        /// Gradient end point (offset 1).
        end: Point,
        /// Colour stops, sorted by offset.
        stops: Stops,
        /// Blend mode.
        blend: BlendMode,
    },
    /// `rect` filled with a two-circle concentric radial gradient.
    RadialGradientRect {
        /// Filled area.
        rect: Rect,
        /// Shared centre of both circles.
        center: Point,
        /// Radius at offset 0; pixels inside take the first stop.
        inner_radius: f64,
        /// Radius at offset 1; pixels outside take the last stop.
        outer_radius: f64,
        /// Colour stops, sorted by offset.
        stops: Stops,
        /// Blend mode.
        blend: BlendMode,
    },
    /// Stroked line segments sharing one width and colour, round caps.
    LineSet {
        /// Segments in canvas pixels.
        lines: SmallVec<[Line; 8]>,
        /// Stroke width in pixels.
        width: f64,
        /// Straight-alpha stroke colour.
        color: Rgba8,
        /// Blend mode.
        blend: BlendMode,
    },
    /// Filled circles.
    CircleSet {
        /// Circles in draw order.
        dots: SmallVec<[Dot; 32]>,
        /// Blend mode.
        blend: BlendMode,
    },
}

impl DrawOp {
    /// Blend mode of this op.
    pub fn blend(&self) -> BlendMode {
        match self {
            DrawOp::LinearGradientRect { blend, .. }
            | DrawOp::RadialGradientRect { blend, .. }
            | DrawOp::LineSet { blend, .. }
            | DrawOp::CircleSet { blend, .. } => *blend,
        }
    }
}

/// Ops for one frame, inline up to the largest per-emotion set.
pub type EffectOps = SmallVec<[DrawOp; 3]>;

const SPARK_COUNT: usize = 6;
const JOY_DOT_COUNT: usize = 25;

/// Sample a gradient at `t`, linearly interpolating straight-alpha channels.
pub fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba8 {
    let Some(first) = stops.first() else {
        return Rgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        };
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f32::EPSILON);
            let u = ((t - a.offset) / span).clamp(0.0, 1.0);
            let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * u).round() as u8;
            return Rgba8 {
                r: mix(a.color.r, b.color.r),
                g: mix(a.color.g, b.color.g),
                b: mix(a.color.b, b.color.b),
                a: mix(a.color.a, b.color.a),
            };
        }
    }
    stops[stops.len() - 1].color
}

/// Stateless per-emotion overlay generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectEngine;

impl EffectEngine {
    /// Overlay ops for `emotion` at `t` seconds into the segment.
    ///
    /// Geometry is authored for a 1080px short side and scaled to `canvas`.
    pub fn draw<R: Rng + ?Sized>(
        emotion: Emotion,
        t: f64,
        canvas: Canvas,
        rng: &mut R,
    ) -> EffectOps {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let unit = canvas.min_side() / 1080.0;
        match emotion {
            Emotion::Hype => hype_beam(t, w, h, unit, rng),
            Emotion::Anger => smallvec![rage_vignette(t, w, h)],
            Emotion::Joy => smallvec![joy_sparkles(t, w, h, unit)],
            Emotion::Sad | Emotion::Neutral => SmallVec::new(),
        }
    }
}

fn hype_beam<R: Rng + ?Sized>(t: f64, w: f64, h: f64, unit: f64, rng: &mut R) -> EffectOps {
    let center_y = h * 0.75;
    let flicker = (t * 30.0).sin() * 0.5 + 1.5;

    let beam_h = 250.0 * flicker * unit;
    let edge = Rgba8::rgba_f(0, 255, 255, 0.0);
    let mid = Rgba8::rgba_f(50, 150, 255, 0.6);
    let hot = Rgba8::rgba_f(200, 255, 255, 0.9);
    let beam = DrawOp::LinearGradientRect {
        rect: Rect::new(0.0, center_y - beam_h / 2.0, w, center_y + beam_h / 2.0),
        start: Point::new(0.0, center_y),
        end: Point::new(w, center_y),
        stops: smallvec![
            GradientStop { offset: 0.0, color: edge },
            GradientStop { offset: 0.2, color: mid },
            GradientStop { offset: 0.5, color: hot },
            GradientStop { offset: 0.8, color: mid },
            GradientStop { offset: 1.0, color: edge },
        ],
        blend: BlendMode::Screen,
    };

    let core_h = 60.0 * flicker * unit;
    let core_color = Rgba8::rgba_f(255, 255, 255, 0.8);
    let core = DrawOp::LinearGradientRect {
        rect: Rect::new(0.0, center_y - core_h / 2.0, w, center_y + core_h / 2.0),
        start: Point::new(0.0, center_y),
        end: Point::new(w, center_y),
        stops: smallvec![
            GradientStop { offset: 0.0, color: core_color },
            GradientStop { offset: 1.0, color: core_color },
        ],
        blend: BlendMode::Screen,
    };

    let mut lines = SmallVec::new();
    for _ in 0..SPARK_COUNT {
        let x = rng.gen_range(0.0..w.max(1.0));
        let y = center_y + (rng.r#gen::<f64>() - 0.5) * beam_h;
        let len = (50.0 + rng.r#gen::<f64>() * 150.0) * unit;
        let dy = (rng.r#gen::<f64>() - 0.5) * 60.0 * unit;
        lines.push(Line::new((x, y), (x + len, y + dy)));
    }
    let sparks = DrawOp::LineSet {
        lines,
        width: 6.0 * unit,
        color: Rgba8::WHITE,
        blend: BlendMode::Screen,
    };

    smallvec![beam, core, sparks]
}

fn rage_vignette(t: f64, w: f64, h: f64) -> DrawOp {
    let pulse = (t * 20.0).sin();
    DrawOp::RadialGradientRect {
        rect: Rect::new(0.0, 0.0, w, h),
        center: Point::new(w / 2.0, h / 2.0),
        inner_radius: h * 0.4,
        outer_radius: h,
        stops: smallvec![
            GradientStop {
                offset: 0.0,
                color: Rgba8::rgba_f(255, 0, 0, 0.0),
            },
            GradientStop {
                offset: 1.0,
                color: Rgba8::rgba_f(220, 38, 38, 0.4 + pulse * 0.2),
            },
        ],
        blend: BlendMode::Normal,
    }
}

fn joy_sparkles(t: f64, w: f64, h: f64, unit: f64) -> DrawOp {
    let gold = Rgba8::rgba_f(0xff, 0xd7, 0x00, 0.8);
    let white = Rgba8::rgba_f(0xff, 0xff, 0xff, 0.8);
    let dots = (0..JOY_DOT_COUNT)
        .map(|i| {
            let fi = i as f64;
            let x = ((t * 150.0 + fi * 150.0) * unit).rem_euclid(w.max(1.0));
            let y = ((t * 250.0 + fi * 100.0) * unit).rem_euclid(h.max(1.0));
            Dot {
                center: Point::new(x, y),
                radius: (8.0 + (i % 3) as f64 * 5.0) * unit,
                color: if i % 2 == 0 { gold } else { white },
            }
        })
        .collect();
    DrawOp::CircleSet {
        dots,
        blend: BlendMode::Normal,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/vfx.rs"]
mod tests;
