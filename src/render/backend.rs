use crate::assets::media::VideoFrame;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::render::compositor::FramePlan;

/// A composited output frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels, for image encoders.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Turns a [`FramePlan`] plus the decoded source frame into pixels.
///
/// This is the drawing-surface seam: acquiring an implementation may fail with
/// [`CaptionFxError::GraphicsContext`].
pub trait RasterBackend: Send {
    /// Rasterize one frame.
    fn render(&mut self, plan: &FramePlan, source: &VideoFrame) -> CaptionFxResult<FrameRGBA>;
}

/// Canvas dimensions as the `u16` pair raster surfaces are sized with.
pub(crate) fn surface_dims(canvas: Canvas) -> CaptionFxResult<(u16, u16)> {
    let w: u16 = canvas.width.try_into().map_err(|_| {
        CaptionFxError::graphics_context(format!("canvas width {} exceeds u16", canvas.width))
    })?;
    let h: u16 = canvas.height.try_into().map_err(|_| {
        CaptionFxError::graphics_context(format!("canvas height {} exceeds u16", canvas.height))
    })?;
    if w == 0 || h == 0 {
        return Err(CaptionFxError::graphics_context("canvas must be non-empty"));
    }
    Ok((w, h))
}
