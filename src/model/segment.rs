use crate::foundation::error::{CaptionFxError, CaptionFxResult};

/// Closed classification of spoken tone. Drives both effect and caption animation branches.
///
/// Deserialization is lenient: unknown, missing or `null` values become [`Emotion::Neutral`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// Shaking captions, red vignette, camera shake.
    Anger,
    /// Bobbing captions, drifting sparkles.
    Joy,
    /// Caption only.
    Sad,
    /// Caption only.
    #[default]
    Neutral,
    /// Pulsing glowing captions and an energy beam.
    Hype,
}

impl Emotion {
    /// Every variant, in declaration order.
    pub const ALL: [Emotion; 5] = [
        Emotion::Anger,
        Emotion::Joy,
        Emotion::Sad,
        Emotion::Neutral,
        Emotion::Hype,
    ];

    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Joy => "joy",
            Emotion::Sad => "sad",
            Emotion::Neutral => "neutral",
            Emotion::Hype => "hype",
        }
    }

    /// Case-insensitive parse; anything unrecognised maps to `Neutral`.
    pub fn parse_lenient(s: &str) -> Self {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .unwrap_or_default()
    }
}

impl<'de> serde::Deserialize<'de> for Emotion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Emotion::parse_lenient).unwrap_or_default())
    }
}

/// A time-bounded unit of captioned speech.
///
/// Times are seconds from the start of the source clip, `start < end`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Inclusive start time in seconds.
    pub start: f64,
    /// Inclusive end time in seconds.
    pub end: f64,
    /// Spoken text.
    #[serde(default)]
    pub text: String,
    /// Tone of the segment.
    #[serde(default)]
    pub emotion: Emotion,
}

impl Segment {
    /// Create a validated segment.
    pub fn new(
        start: f64,
        end: f64,
        text: impl Into<String>,
        emotion: Emotion,
    ) -> CaptionFxResult<Self> {
        let seg = Self {
            start,
            end,
            text: text.into(),
            emotion,
        };
        seg.validate()?;
        Ok(seg)
    }

    /// Check `start < end` with finite bounds.
    pub fn validate(&self) -> CaptionFxResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(CaptionFxError::validation(format!(
                "segment '{}' has non-finite bounds",
                self.text
            )));
        }
        if self.start >= self.end {
            return Err(CaptionFxError::validation(format!(
                "segment '{}' must satisfy start < end (got {} >= {})",
                self.text, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Return `true` when `t` lies in `[start, end]`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/segment.rs"]
mod tests;
