use crate::effects::vfx::BlendMode;
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};

/// Premultiplied RGBA8 pixel.
pub(crate) type PremulPx = [u8; 4];

/// Source-over with an extra opacity multiplier.
pub(crate) fn over(dst: PremulPx, src: PremulPx, opacity: f32) -> PremulPx {
    let op = unit_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Screen: `s + d - s·d` per premultiplied channel.
pub(crate) fn screen(dst: PremulPx, src: PremulPx, opacity: f32) -> PremulPx {
    let op = unit_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }
    let mut out = [0u8; 4];
    for i in 0..4 {
        let s = u16::from(mul_div255_u8(u16::from(src[i]), op));
        let d = u16::from(dst[i]);
        out[i] = (s + d - u16::from(mul_div255_u8(s, d))).min(255) as u8;
    }
    out
}

/// Blend one pixel with `mode`.
pub(crate) fn blend_px(mode: BlendMode, dst: PremulPx, src: PremulPx, opacity: f32) -> PremulPx {
    match mode {
        BlendMode::Normal => over(dst, src, opacity),
        BlendMode::Screen => screen(dst, src, opacity),
    }
}

/// Blend a whole layer into `dst`.
pub(crate) fn blend_in_place(
    mode: BlendMode,
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
) -> CaptionFxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionFxError::graphics_context(
            "blend_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = blend_px(mode, [d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Premultiply straight RGBA8 in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
