use rand::Rng;

use crate::config::CaptionTuning;
use crate::foundation::core::{Affine, Canvas, Point, Rgba8, Vec2};
use crate::model::segment::{Emotion, Segment};
use crate::model::style::{FontSizeTier, FontTag, StyleConfig};

/// Caption weight (CSS 900, "black").
pub const CAPTION_WEIGHT: u16 = 900;

/// One entry of a font fallback stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// A specific family, looked up by name.
    Named(&'static str),
    /// The platform's default monospace family.
    Monospace,
    /// The platform's default sans-serif family.
    SansSerif,
}

/// Fallback stack for a style's typeface tier, most preferred first.
pub fn font_stack(tag: FontTag) -> &'static [FontFamily] {
    match tag {
        FontTag::Arcade => &[FontFamily::Named("Press Start 2P"), FontFamily::Monospace],
        FontTag::Title => &[FontFamily::Named("Russo One"), FontFamily::SansSerif],
        FontTag::Mono => &[FontFamily::Monospace],
        FontTag::Sans => &[FontFamily::SansSerif],
    }
}

/// Dark outline drawn under the fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Outline width in canvas pixels.
    pub width: f64,
    /// Outline colour.
    pub color: Rgba8,
}

/// Soft halo drawn behind the fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    /// Halo colour.
    pub color: Rgba8,
    /// Blur radius in canvas pixels.
    pub blur_radius: f64,
}

/// Everything needed to draw one caption, in canvas pixel space.
///
/// Text is centred on `anchor + offset`, then rotated and scaled about that point.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRun {
    /// Case-normalised text.
    pub text: String,
    /// Typeface tier the family stack came from.
    pub font: FontTag,
    /// Font weight.
    pub weight: u16,
    /// Font size in pixels before `scale`.
    pub size_px: f64,
    /// Base position: horizontally centred, near the bottom.
    pub anchor: Point,
    /// Per-frame animation offset.
    pub offset: Vec2,
    /// Rotation in radians.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Outline.
    pub stroke: Stroke,
    /// Optional halo.
    pub glow: Option<Glow>,
    /// Fill colour.
    pub fill: Rgba8,
    /// Opacity in `[0, 1]`, applied to stroke, glow and fill alike.
    pub opacity: f32,
}

impl GlyphRun {
    /// Fallback family stack.
    pub fn families(&self) -> &'static [FontFamily] {
        font_stack(self.font)
    }

    /// Centre point after animation offset.
    pub fn origin(&self) -> Point {
        self.anchor + self.offset
    }

    /// Maps text space (origin at the text centre) to canvas space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin().to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }

    /// `true` when drawing would produce no visible pixels.
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0 || self.text.trim().is_empty()
    }
}

/// Fade envelope: hidden for `delay`, linear fade-in, hold, linear fade-out over the last
/// `fade_out` seconds. The two ramps combine with `min`.
pub fn caption_opacity(t_local: f64, remaining: f64, tuning: &CaptionTuning) -> f32 {
    let mut alpha = if t_local < tuning.delay_secs {
        0.0
    } else if tuning.fade_in_secs > 0.0 && t_local < tuning.delay_secs + tuning.fade_in_secs {
        (t_local - tuning.delay_secs) / tuning.fade_in_secs
    } else {
        1.0
    };
    if remaining < tuning.fade_out_secs {
        alpha = alpha.min(remaining / tuning.fade_out_secs);
    }
    alpha.clamp(0.0, 1.0) as f32
}

/// Builds [`GlyphRun`]s from the active segment.
#[derive(Clone, Debug, Default)]
pub struct CaptionRenderer {
    tuning: CaptionTuning,
}

impl CaptionRenderer {
    /// Renderer with the given constants.
    pub fn new(tuning: CaptionTuning) -> Self {
        Self { tuning }
    }

    /// Constants in use.
    pub fn tuning(&self) -> &CaptionTuning {
        &self.tuning
    }

    /// Lay out `segment` at `t_local` seconds after its start.
    ///
    /// `rng` only feeds the `anger` shake; every other field is a pure function of the inputs.
    pub fn layout<R: Rng + ?Sized>(
        &self,
        segment: &Segment,
        style: &StyleConfig,
        tier: FontSizeTier,
        t_local: f64,
        canvas: Canvas,
        rng: &mut R,
    ) -> GlyphRun {
        let tn = &self.tuning;
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let unit = canvas.min_side() / 1080.0;
        let remaining = segment.end - (segment.start + t_local);

        let mut offset = Vec2::ZERO;
        let mut rotation = 0.0;
        let mut scale = 1.0;
        match segment.emotion {
            Emotion::Anger => {
                offset = Vec2::new(
                    (rng.r#gen::<f64>() - 0.5) * tn.jitter_px * unit,
                    (rng.r#gen::<f64>() - 0.5) * tn.jitter_px * unit,
                );
                rotation = (rng.r#gen::<f64>() - 0.5) * tn.jitter_rotation_rad;
            }
            Emotion::Joy => {
                offset = Vec2::new(0.0, (t_local * 10.0).sin() * 30.0 * unit);
                rotation = (t_local * 5.0).sin() * 0.08;
            }
            Emotion::Hype => {
                scale = 1.0 + (t_local * 12.0).sin().abs() * 0.2;
            }
            Emotion::Sad | Emotion::Neutral => {}
        }

        let fill = style.caption_fill(segment.emotion);
        let glow = style.caption_glows(segment.emotion).then_some(Glow {
            color: fill,
            blur_radius: tn.glow_blur_px * unit,
        });

        GlyphRun {
            text: style.text_case.apply(&segment.text),
            font: style.font,
            weight: CAPTION_WEIGHT,
            size_px: tn.base_px(tier) * canvas.min_side() / tn.reference_px,
            anchor: Point::new(w / 2.0, h * tn.anchor_y_frac),
            offset,
            rotation,
            scale,
            stroke: Stroke {
                width: tn.stroke_px * unit,
                color: Rgba8::BLACK,
            },
            glow,
            fill,
            opacity: caption_opacity(t_local, remaining, tn),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/layout.rs"]
mod tests;
