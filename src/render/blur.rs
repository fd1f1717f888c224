use crate::foundation::error::{CaptionFxError, CaptionFxResult};

/// Separable Gaussian blur over premultiplied RGBA8 with a Q16 fixed-point kernel.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CaptionFxResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CaptionFxError::graphics_context("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(CaptionFxError::graphics_context(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur only the region of `layer` that has coverage, padded by `radius`.
///
/// Glow layers are mostly empty; this keeps a caption halo from costing a full-frame blur.
pub(crate) fn blur_layer_in_place(
    layer: &mut [u8],
    width: u32,
    height: u32,
    radius: u32,
) -> CaptionFxResult<()> {
    if radius == 0 {
        return Ok(());
    }
    let Some((x0, y0, x1, y1)) = coverage_bounds(layer, width, height) else {
        return Ok(());
    };
    let x0 = x0.saturating_sub(radius);
    let y0 = y0.saturating_sub(radius);
    let x1 = (x1 + radius + 1).min(width);
    let y1 = (y1 + radius + 1).min(height);
    let (rw, rh) = (x1 - x0, y1 - y0);

    let stride = width as usize * 4;
    let row_bytes = rw as usize * 4;
    let mut region = Vec::with_capacity(row_bytes * rh as usize);
    for y in y0..y1 {
        let start = y as usize * stride + x0 as usize * 4;
        region.extend_from_slice(&layer[start..start + row_bytes]);
    }

    let blurred = blur_rgba8_premul(&region, rw, rh, radius, radius as f32 / 2.0)?;
    for (i, y) in (y0..y1).enumerate() {
        let start = y as usize * stride + x0 as usize * 4;
        layer[start..start + row_bytes].copy_from_slice(&blurred[i * row_bytes..(i + 1) * row_bytes]);
    }
    Ok(())
}

fn coverage_bounds(layer: &[u8], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..height {
        let row = &layer[(y * width) as usize * 4..((y + 1) * width) as usize * 4];
        for (x, px) in row.chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = x as u32;
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((a, b, c, d)) => (a.min(x), b.min(y), c.max(x), d.max(y)),
            });
        }
    }
    bounds
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CaptionFxResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CaptionFxError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(CaptionFxError::graphics_context("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Rounding drift goes to the centre tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
