//! Boundary to the external annotation provider.
//!
//! The provider's own failures never reach the export pipeline: [`resolve_segments`] degrades to
//! a placeholder list, so downstream code only ever sees a (possibly empty) valid segment list.

use std::path::{Path, PathBuf};

use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::model::segment::{Emotion, Segment};

/// Source of time-stamped, emotion-tagged segments for a clip's audio.
pub trait SegmentProvider {
    /// Annotate the audio at `audio`.
    fn segments_for(&self, audio: &Path) -> CaptionFxResult<Vec<Segment>>;
}

/// Provider backed by a JSON array of `{start, end, text, emotion}` objects on disk.
#[derive(Clone, Debug)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Read segments from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SegmentProvider for JsonFileProvider {
    fn segments_for(&self, _audio: &Path) -> CaptionFxResult<Vec<Segment>> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            CaptionFxError::validation(format!(
                "failed to read segments '{}': {e}",
                self.path.display()
            ))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CaptionFxError::serde(format!(
                "segments '{}' are not a valid segment array: {e}",
                self.path.display()
            ))
        })
    }
}

/// Segments shown when the provider is unavailable.
pub fn placeholder_segments() -> Vec<Segment> {
    [
        (0.5, 2.0, "Processing failed (check API Key)", Emotion::Neutral),
        (2.2, 4.0, "But here is a demo of the style!", Emotion::Hype),
        (4.2, 6.0, "Look at this ANGER animation!", Emotion::Anger),
        (6.2, 8.0, "And this smooth joy...", Emotion::Joy),
    ]
    .into_iter()
    .map(|(start, end, text, emotion)| Segment {
        start,
        end,
        text: text.to_string(),
        emotion,
    })
    .collect()
}

/// Drop segments that violate `start < end` or have non-finite bounds. Order is preserved.
pub fn sanitize_segments(raw: Vec<Segment>) -> Vec<Segment> {
    let total = raw.len();
    let kept: Vec<Segment> = raw
        .into_iter()
        .filter(|s| match s.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "dropping invalid segment");
                false
            }
        })
        .collect();
    if kept.len() != total {
        tracing::warn!(kept = kept.len(), total, "some provider segments were dropped");
    }
    kept
}

/// Ask `provider` for segments, degrading to [`placeholder_segments`] on failure.
pub fn resolve_segments(provider: &dyn SegmentProvider, audio: &Path) -> Vec<Segment> {
    match provider.segments_for(audio) {
        Ok(raw) => sanitize_segments(raw),
        Err(e) => {
            tracing::warn!(error = %e, "segment provider failed, using placeholder segments");
            placeholder_segments()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/provider/provider.rs"]
mod tests;
