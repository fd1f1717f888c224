//! `vello_cpu` rasterizer for [`FramePlan`]s.
//!
//! Vector work (source placement, circles, sparks, glyphs) goes through `vello_cpu`; gradients and
//! layer blending are done per pixel in `render::blend`, which is also where `Screen` lives.

use std::path::Path;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::media::VideoFrame;
use crate::caption::layout::GlyphRun;
use crate::effects::vfx::{BlendMode, DrawOp, GradientStop, sample_stops};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::render::backend::{FrameRGBA, RasterBackend, surface_dims};
use crate::render::blend::{self, premultiply_rgba8_in_place};
use crate::render::blur::blur_layer_in_place;
use crate::render::compositor::FramePlan;
use crate::render::text::{FontBook, ShapedCaption, TextLayoutEngine};

/// CPU raster backend.
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    fonts: FontBook,
    text: TextLayoutEngine,
}

impl CpuRasterizer {
    /// Rasterizer using system fonts.
    pub fn new() -> Self {
        Self::with_font_dir(None)
    }

    /// Rasterizer using system fonts plus the font files in `dir`.
    pub fn with_font_dir(dir: Option<&Path>) -> Self {
        Self {
            ctx: None,
            fonts: FontBook::system(dir),
            text: TextLayoutEngine::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Draw with `f` into a fresh transparent layer and return its premultiplied pixels.
    fn paint_layer(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext),
    ) -> vello_cpu::Pixmap {
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(width, height, |ctx| {
            ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            f(ctx);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
        });
        pixmap
    }

    fn draw_base(
        &mut self,
        plan: &FramePlan,
        source: &VideoFrame,
        width: u16,
        height: u16,
    ) -> CaptionFxResult<vello_cpu::Pixmap> {
        let expected = (source.width as usize)
            .saturating_mul(source.height as usize)
            .saturating_mul(4);
        if source.width == 0 || source.height == 0 || source.data.len() != expected {
            return Err(CaptionFxError::media_load(format!(
                "source frame {}x{} carries {} bytes, expected {expected}",
                source.width,
                source.height,
                source.data.len()
            )));
        }

        let mut filtered = source.data.clone();
        plan.source.filter.apply_rgba8_in_place(&mut filtered);
        premultiply_rgba8_in_place(&mut filtered);
        let img = rgba_premul_to_image(&filtered, source.width, source.height)?;

        let bg = plan.background;
        let (cw, ch) = (f64::from(plan.canvas.width), f64::from(plan.canvas.height));
        let (sw, sh) = (f64::from(source.width), f64::from(source.height));
        let placement = Affine::translate(plan.source.offset) * Affine::scale_non_uniform(cw / sw, ch / sh);

        Ok(self.paint_layer(width, height, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, cw, ch));

            ctx.set_transform(affine_to_cpu(placement));
            ctx.set_paint(img);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, sw, sh));
        }))
    }

    fn draw_effect(
        &mut self,
        base: &mut [u8],
        op: &DrawOp,
        width: u16,
        height: u16,
    ) -> CaptionFxResult<()> {
        match op {
            DrawOp::LinearGradientRect {
                rect,
                start,
                end,
                stops,
                blend,
            } => {
                let axis = *end - *start;
                let len2 = axis.hypot2().max(f64::EPSILON);
                fill_gradient_rect(base, width, height, *rect, stops, *blend, |p| {
                    ((p - *start).dot(axis) / len2) as f32
                });
                Ok(())
            }
            DrawOp::RadialGradientRect {
                rect,
                center,
                inner_radius,
                outer_radius,
                stops,
                blend,
            } => {
                let span = (outer_radius - inner_radius).max(f64::EPSILON);
                fill_gradient_rect(base, width, height, *rect, stops, *blend, |p| {
                    ((p.distance(*center) - inner_radius) / span) as f32
                });
                Ok(())
            }
            DrawOp::LineSet {
                lines,
                width: stroke_w,
                color,
                blend,
            } => {
                let c = *color;
                let stroke = vello_cpu::kurbo::Stroke::new(*stroke_w)
                    .with_caps(vello_cpu::kurbo::Cap::Round);
                let layer = self.paint_layer(width, height, |ctx| {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_stroke(stroke);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                    for line in lines {
                        let mut p = BezPath::new();
                        p.move_to(line.p0);
                        p.line_to(line.p1);
                        ctx.stroke_path(&bezpath_to_cpu(&p));
                    }
                });
                blend::blend_in_place(*blend, base, layer.data_as_u8_slice(), 1.0)
            }
            DrawOp::CircleSet { dots, blend } => {
                let layer = self.paint_layer(width, height, |ctx| {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    for d in dots {
                        let c = d.color;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                        let circle = kurbo::Circle::new(d.center, d.radius);
                        ctx.fill_path(&bezpath_to_cpu(&circle.to_path(0.1)));
                    }
                });
                blend::blend_in_place(*blend, base, layer.data_as_u8_slice(), 1.0)
            }
        }
    }

    fn draw_caption(
        &mut self,
        base: &mut [u8],
        run: &GlyphRun,
        width: u16,
        height: u16,
    ) -> CaptionFxResult<()> {
        if run.is_invisible() {
            return Ok(());
        }
        let Some(font) = self.fonts.resolve(run.font) else {
            return Ok(());
        };
        let shaped = self.text.shape(&run.text, &font, run.size_px as f32)?;
        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            font.index,
        );
        let tr = run.transform();

        let stroke_layer = self.paint_layer(width, height, |ctx| {
            stroke_glyphs(ctx, &font_data, &shaped, tr, run.stroke.width, run.stroke.color);
        });
        let fill_layer = self.paint_layer(width, height, |ctx| {
            fill_glyphs(ctx, &font_data, &shaped, tr, run.fill);
        });

        blend::blend_in_place(BlendMode::Normal, base, stroke_layer.data_as_u8_slice(), run.opacity)?;
        if let Some(glow) = run.glow {
            let mut halo = self
                .paint_layer(width, height, |ctx| {
                    fill_glyphs(ctx, &font_data, &shaped, tr, glow.color);
                })
                .data_as_u8_slice()
                .to_vec();
            let radius = glow.blur_radius.round().max(0.0) as u32;
            blur_layer_in_place(&mut halo, u32::from(width), u32::from(height), radius)?;
            blend::blend_in_place(BlendMode::Normal, base, &halo, run.opacity)?;
        }
        blend::blend_in_place(BlendMode::Normal, base, fill_layer.data_as_u8_slice(), run.opacity)
    }
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterBackend for CpuRasterizer {
    fn render(&mut self, plan: &FramePlan, source: &VideoFrame) -> CaptionFxResult<FrameRGBA> {
        let (width, height) = surface_dims(plan.canvas)?;
        let mut base = self.draw_base(plan, source, width, height)?;
        let pixels = base.data_as_u8_slice_mut();

        for op in &plan.effects {
            self.draw_effect(pixels, op, width, height)?;
        }
        if let Some(run) = &plan.caption {
            self.draw_caption(pixels, run, width, height)?;
        }

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: base.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn cpu_glyphs(shaped: &ShapedCaption) -> impl Iterator<Item = vello_cpu::Glyph> + '_ {
    shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    })
}

fn fill_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    shaped: &ShapedCaption,
    tr: Affine,
    color: Rgba8,
) {
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.glyph_run(font)
        .font_size(shaped.font_size)
        .fill_glyphs(cpu_glyphs(shaped));
}

/// Outline the glyphs with a round-joined stroke centred on the glyph edges.
fn stroke_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    shaped: &ShapedCaption,
    tr: Affine,
    stroke_width: f64,
    color: Rgba8,
) {
    if stroke_width <= 0.0 {
        return;
    }
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_stroke(
        vello_cpu::kurbo::Stroke::new(stroke_width)
            .with_join(vello_cpu::kurbo::Join::Round)
            .with_caps(vello_cpu::kurbo::Cap::Round),
    );
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        color.r, color.g, color.b, color.a,
    ));
    ctx.glyph_run(font)
        .font_size(shaped.font_size)
        .stroke_glyphs(cpu_glyphs(shaped));
}

/// Shade the pixels of `rect` with the gradient value `t_at(pixel centre)`.
fn fill_gradient_rect(
    base: &mut [u8],
    width: u16,
    height: u16,
    rect: Rect,
    stops: &[GradientStop],
    mode: BlendMode,
    t_at: impl Fn(Point) -> f32,
) {
    let clip = rect.intersect(Rect::new(0.0, 0.0, f64::from(width), f64::from(height)));
    if clip.is_zero_area() {
        return;
    }
    let (x0, y0) = (clip.x0.floor() as usize, clip.y0.floor() as usize);
    let (x1, y1) = (clip.x1.ceil() as usize, clip.y1.ceil() as usize);
    let stride = usize::from(width) * 4;
    for y in y0..y1.min(usize::from(height)) {
        let cy = y as f64 + 0.5;
        // Partial coverage on the band's top and bottom rows.
        let cover = ((cy + 0.5).min(rect.y1) - (cy - 0.5).max(rect.y0)).clamp(0.0, 1.0) as f32;
        for x in x0..x1.min(usize::from(width)) {
            let c = sample_stops(stops, t_at(Point::new(x as f64 + 0.5, cy)));
            if c.a == 0 {
                continue;
            }
            let src = c.premul().to_array();
            let i = y * stride + x * 4;
            let dst = [base[i], base[i + 1], base[i + 2], base[i + 3]];
            base[i..i + 4].copy_from_slice(&blend::blend_px(mode, dst, src, cover));
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> CaptionFxResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CaptionFxError::graphics_context("source width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CaptionFxError::graphics_context("source height exceeds u16"))?;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
