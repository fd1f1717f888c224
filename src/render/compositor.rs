//! Per-frame composition plan.
//!
//! [`FrameCompositor::plan`] decides *what* a frame contains; a [`RasterBackend`] decides how it
//! becomes pixels. Keeping the two apart lets the pipeline be tested without a drawing surface.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::media::VideoFrame;
use crate::caption::layout::{CaptionRenderer, GlyphRun};
use crate::effects::filter::PixelTransformSpec;
use crate::effects::vfx::{EffectEngine, EffectOps};
use crate::foundation::core::{Canvas, Rgba8, Vec2};
use crate::foundation::error::CaptionFxResult;
use crate::model::segment::{Emotion, Segment};
use crate::model::style::{FontSizeTier, StyleConfig};
use crate::render::backend::{FrameRGBA, RasterBackend};

/// How the source frame is placed on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceDraw {
    /// Whole-frame colour transform.
    pub filter: PixelTransformSpec,
    /// Translation applied after scaling the source to the canvas size.
    pub offset: Vec2,
}

/// Everything drawn for one output frame, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Output size.
    pub canvas: Canvas,
    /// Presentation time of the frame in source seconds.
    pub time_secs: f64,
    /// Opaque background fill, drawn first.
    pub background: Rgba8,
    /// Filtered, scaled source footage.
    pub source: SourceDraw,
    /// Emotion overlays, drawn over the source.
    pub effects: EffectOps,
    /// Caption, drawn last.
    pub caption: Option<GlyphRun>,
}

impl FramePlan {
    /// Number of overlay items (effect ops plus caption).
    pub fn overlay_count(&self) -> usize {
        self.effects.len() + usize::from(self.caption.is_some())
    }
}

/// Per-export look selections.
#[derive(Clone, Debug)]
pub struct CompositorSettings {
    /// Output size.
    pub canvas: Canvas,
    /// Resolved source filter.
    pub filter: PixelTransformSpec,
    /// Caption look.
    pub style: StyleConfig,
    /// Caption size tier.
    pub font_size: FontSizeTier,
    /// Peak-to-peak source shake for `anger`, in pixels.
    pub shake_intensity_px: f64,
}

/// Builds [`FramePlan`]s and hands them to a [`RasterBackend`].
pub struct FrameCompositor {
    settings: CompositorSettings,
    captions: CaptionRenderer,
    rng: StdRng,
}

impl FrameCompositor {
    /// Compositor with an entropy-seeded jitter source.
    pub fn new(settings: CompositorSettings, captions: CaptionRenderer) -> Self {
        Self::with_rng(settings, captions, StdRng::from_entropy())
    }

    /// Compositor with a caller-provided jitter source.
    pub fn with_rng(settings: CompositorSettings, captions: CaptionRenderer, rng: StdRng) -> Self {
        Self {
            settings,
            captions,
            rng,
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// Plan the frame at source time `t` with `active` as the covering segment.
    pub fn plan(&mut self, active: Option<&Segment>, t: f64) -> FramePlan {
        let canvas = self.settings.canvas;
        let mut plan = FramePlan {
            canvas,
            time_secs: t,
            background: Rgba8::BLACK,
            source: SourceDraw {
                filter: self.settings.filter,
                offset: Vec2::ZERO,
            },
            effects: EffectOps::new(),
            caption: None,
        };
        let Some(seg) = active else {
            return plan;
        };

        if seg.emotion == Emotion::Anger {
            let k = self.settings.shake_intensity_px;
            plan.source.offset = Vec2::new(
                (self.rng.r#gen::<f64>() - 0.5) * k,
                (self.rng.r#gen::<f64>() - 0.5) * k,
            );
        }

        let t_local = t - seg.start;
        plan.effects = EffectEngine::draw(seg.emotion, t_local, canvas, &mut self.rng);
        plan.caption = Some(self.captions.layout(
            seg,
            &self.settings.style,
            self.settings.font_size,
            t_local,
            canvas,
            &mut self.rng,
        ));
        plan
    }

    /// Plan and rasterize one frame.
    pub fn composite(
        &mut self,
        backend: &mut dyn RasterBackend,
        source: &VideoFrame,
        active: Option<&Segment>,
        t: f64,
    ) -> CaptionFxResult<(FramePlan, FrameRGBA)> {
        let plan = self.plan(active, t);
        tracing::trace!(
            t,
            overlays = plan.overlay_count(),
            dx = plan.source.offset.x,
            dy = plan.source.offset.y,
            "composite frame"
        );
        let frame = backend.render(&plan, source)?;
        Ok((plan, frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
