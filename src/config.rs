//! Export tunables.
//!
//! The constants that used to vary between export code paths (shake strength, bitrate, fade
//! timing) live here as data so every run goes through one pipeline.

use std::path::{Path, PathBuf};

use crate::encode::format::OutputFormat;
use crate::foundation::core::Fps;
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::model::style::FontSizeTier;

/// Caption layout and animation constants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionTuning {
    /// Fully transparent lead-in after the segment starts.
    pub delay_secs: f64,
    /// Linear fade-in duration after the delay.
    pub fade_in_secs: f64,
    /// Linear fade-out duration before the segment ends.
    pub fade_out_secs: f64,
    /// Base pixel size of the `small` tier at the reference side length.
    pub small_px: f64,
    /// Base pixel size of the `medium` tier at the reference side length.
    pub medium_px: f64,
    /// Base pixel size of the `large` tier at the reference side length.
    pub large_px: f64,
    /// Frame short side at which the tier sizes apply unscaled.
    pub reference_px: f64,
    /// Outline width at a 1080px short side.
    pub stroke_px: f64,
    /// Glow blur radius at a 1080px short side.
    pub glow_blur_px: f64,
    /// Peak-to-peak random offset for `anger` captions at a 1080px short side.
    pub jitter_px: f64,
    /// Peak-to-peak random rotation for `anger` captions, radians.
    pub jitter_rotation_rad: f64,
    /// Vertical anchor as a fraction of frame height.
    pub anchor_y_frac: f64,
}

impl Default for CaptionTuning {
    fn default() -> Self {
        Self {
            delay_secs: 0.05,
            fade_in_secs: 0.08,
            fade_out_secs: 0.15,
            small_px: 40.0,
            medium_px: 65.0,
            large_px: 90.0,
            reference_px: 700.0,
            stroke_px: 15.0,
            glow_blur_px: 40.0,
            jitter_px: 20.0,
            jitter_rotation_rad: 0.15,
            anchor_y_frac: 0.8,
        }
    }
}

impl CaptionTuning {
    /// Base pixel size for a tier, before resolution scaling.
    pub fn base_px(&self, tier: FontSizeTier) -> f64 {
        match tier {
            FontSizeTier::Small => self.small_px,
            FontSizeTier::Medium => self.medium_px,
            FontSizeTier::Large => self.large_px,
        }
    }
}

/// Full export configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Target video bitrate handed to the encoder.
    pub video_bitrate_bps: u64,
    /// Output frame rate; `None` follows the source.
    pub output_fps: Option<Fps>,
    /// Frame rate used when the source does not report one.
    pub fallback_fps: Fps,
    /// Output formats to try, most preferred first.
    pub format_preference: Vec<OutputFormat>,
    /// Artifact file name prefix; a millisecond timestamp and extension are appended.
    pub file_prefix: String,
    /// Directory the artifact is saved into.
    pub output_dir: PathBuf,
    /// Peak-to-peak camera shake applied to the source frame for `anger` segments, in pixels.
    pub shake_intensity_px: f64,
    /// Caption constants.
    pub caption: CaptionTuning,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            video_bitrate_bps: 8_000_000,
            output_fps: None,
            fallback_fps: Fps { num: 30, den: 1 },
            format_preference: OutputFormat::PREFERENCE.to_vec(),
            file_prefix: "arcade_fighter".to_string(),
            output_dir: PathBuf::from("."),
            shake_intensity_px: 30.0,
            caption: CaptionTuning::default(),
        }
    }
}

impl ExportConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> CaptionFxResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CaptionFxError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            CaptionFxError::serde(format!("config '{}' is invalid: {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pipeline cannot honour.
    pub fn validate(&self) -> CaptionFxResult<()> {
        if self.video_bitrate_bps == 0 {
            return Err(CaptionFxError::validation("video_bitrate_bps must be > 0"));
        }
        if self.format_preference.is_empty() {
            return Err(CaptionFxError::validation(
                "format_preference must list at least one format",
            ));
        }
        if let Some(fps) = self.output_fps {
            Fps::new(fps.num, fps.den)?;
        }
        Fps::new(self.fallback_fps.num, self.fallback_fps.den)?;
        if self.file_prefix.trim().is_empty() {
            return Err(CaptionFxError::validation("file_prefix must be non-empty"));
        }

        let c = &self.caption;
        let non_negative = [
            ("shake_intensity_px", self.shake_intensity_px),
            ("caption.delay_secs", c.delay_secs),
            ("caption.fade_in_secs", c.fade_in_secs),
            ("caption.fade_out_secs", c.fade_out_secs),
            ("caption.stroke_px", c.stroke_px),
            ("caption.glow_blur_px", c.glow_blur_px),
            ("caption.jitter_px", c.jitter_px),
            ("caption.jitter_rotation_rad", c.jitter_rotation_rad),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(CaptionFxError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        let positive = [
            ("caption.small_px", c.small_px),
            ("caption.medium_px", c.medium_px),
            ("caption.large_px", c.large_px),
            ("caption.reference_px", c.reference_px),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(CaptionFxError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !(0.0..=1.0).contains(&c.anchor_y_frac) {
            return Err(CaptionFxError::validation(
                "caption.anchor_y_frac must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
