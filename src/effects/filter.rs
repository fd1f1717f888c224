use crate::model::style::FilterSelection;

/// Declarative per-pixel transform applied to the whole source frame before overlays.
///
/// Amounts follow CSS filter-effects semantics (`1.0` = 100%), so any renderer can implement the
/// transform as a shader, a per-pixel loop or a platform filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PixelTransformSpec {
    /// Leave pixels untouched.
    Identity,
    /// Desaturate by `amount`.
    Grayscale {
        /// `1.0` is full desaturation.
        amount: f32,
    },
    /// Desaturate and warm by `amount`.
    Sepia {
        /// `1.0` is full sepia.
        amount: f32,
    },
    /// Contrast then saturation multipliers.
    ContrastSaturate {
        /// Contrast multiplier around mid-grey.
        contrast: f32,
        /// Saturation multiplier.
        saturation: f32,
    },
    /// Invert channels by `amount`.
    Invert {
        /// `1.0` is full inversion.
        amount: f32,
    },
}

/// Maps a [`FilterSelection`] to its [`PixelTransformSpec`]. Pure: same input, same output.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterBank;

impl FilterBank {
    /// Resolve a selection.
    pub fn resolve(selection: FilterSelection) -> PixelTransformSpec {
        match selection {
            FilterSelection::None => PixelTransformSpec::Identity,
            FilterSelection::Grayscale => PixelTransformSpec::Grayscale { amount: 1.0 },
            FilterSelection::Sepia => PixelTransformSpec::Sepia { amount: 0.8 },
            FilterSelection::Contrast => PixelTransformSpec::ContrastSaturate {
                contrast: 1.3,
                saturation: 1.4,
            },
            FilterSelection::Invert => PixelTransformSpec::Invert { amount: 1.0 },
        }
    }
}

/// Affine colour transform on straight RGB in `[0, 1]`: `out = m · rgb + offset`.
///
/// Alpha is passed through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix {
    /// Row-major 3x3 channel mix.
    pub m: [[f32; 3]; 3],
    /// Per-channel offset added after the mix.
    pub offset: [f32; 3],
}

impl ColorMatrix {
    /// No-op matrix.
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        offset: [0.0; 3],
    };

    fn grayscale(amount: f32) -> Self {
        let s = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            m: [
                [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
                [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
                [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
            ],
            offset: [0.0; 3],
        }
    }

    fn sepia(amount: f32) -> Self {
        let s = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            m: [
                [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
                [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
                [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
            ],
            offset: [0.0; 3],
        }
    }

    fn saturate(s: f32) -> Self {
        Self {
            m: [
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ],
            offset: [0.0; 3],
        }
    }

    fn contrast(c: f32) -> Self {
        let o = 0.5 - 0.5 * c;
        Self {
            m: [[c, 0.0, 0.0], [0.0, c, 0.0], [0.0, 0.0, c]],
            offset: [o; 3],
        }
    }

    fn invert(amount: f32) -> Self {
        let a = amount.clamp(0.0, 1.0);
        let d = 1.0 - 2.0 * a;
        Self {
            m: [[d, 0.0, 0.0], [0.0, d, 0.0], [0.0, 0.0, d]],
            offset: [a; 3],
        }
    }

    /// Matrix equivalent to applying `self` first, then `next`.
    pub fn then(self, next: Self) -> Self {
        let mut m = [[0.0f32; 3]; 3];
        let mut offset = [0.0f32; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| next.m[i][k] * self.m[k][j]).sum();
            }
            offset[i] = (0..3).map(|k| next.m[i][k] * self.offset[k]).sum::<f32>() + next.offset[i];
        }
        Self { m, offset }
    }

    /// Transform one straight-alpha RGB triple.
    pub fn apply_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        let x = rgb.map(|c| f32::from(c) / 255.0);
        let mut out = [0u8; 3];
        for (i, o) in out.iter_mut().enumerate() {
            let v = self.m[i][0] * x[0] + self.m[i][1] * x[1] + self.m[i][2] * x[2] + self.offset[i];
            *o = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        out
    }
}

impl PixelTransformSpec {
    /// Return `true` for the identity transform.
    pub fn is_identity(&self) -> bool {
        matches!(self, PixelTransformSpec::Identity)
    }

    /// Colour matrix implementing this transform.
    pub fn color_matrix(&self) -> ColorMatrix {
        match *self {
            PixelTransformSpec::Identity => ColorMatrix::IDENTITY,
            PixelTransformSpec::Grayscale { amount } => ColorMatrix::grayscale(amount),
            PixelTransformSpec::Sepia { amount } => ColorMatrix::sepia(amount),
            PixelTransformSpec::ContrastSaturate {
                contrast,
                saturation,
            } => ColorMatrix::contrast(contrast).then(ColorMatrix::saturate(saturation)),
            PixelTransformSpec::Invert { amount } => ColorMatrix::invert(amount),
        }
    }

    /// Apply to a straight-alpha RGBA8 buffer in place.
    pub fn apply_rgba8_in_place(&self, rgba: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        let matrix = self.color_matrix();
        for px in rgba.chunks_exact_mut(4) {
            let [r, g, b] = matrix.apply_rgb([px[0], px[1], px[2]]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
