use crate::foundation::core::Rgba8;
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::model::segment::Emotion;

/// Identity of a catalog style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleId {
    /// Balanced, blue, title font.
    RyuClassic,
    /// Fiery orange, arcade font.
    KenFire,
    /// Dark red, title font.
    AkumaRage,
    /// Electric cyan, monospace, always glowing.
    ChunLightning,
}

impl StyleId {
    /// Stable identifier string.
    pub fn as_str(self) -> &'static str {
        match self {
            StyleId::RyuClassic => "ryu_classic",
            StyleId::KenFire => "ken_fire",
            StyleId::AkumaRage => "akuma_rage",
            StyleId::ChunLightning => "chun_lightning",
        }
    }
}

impl std::str::FromStr for StyleId {
    type Err = CaptionFxError;

    fn from_str(s: &str) -> CaptionFxResult<Self> {
        STYLE_CATALOG
            .iter()
            .map(|style| style.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CaptionFxError::validation(format!("unknown style id '{s}'")))
    }
}

/// Typeface tier requested by a style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontTag {
    /// Condensed heavy title face.
    Title,
    /// Pixel/arcade face.
    Arcade,
    /// Monospace.
    Mono,
    /// Anything else: default sans-serif.
    Sans,
}

/// Case normalisation applied to caption text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextCase {
    /// Upper-case every character.
    Upper,
    /// Leave text untouched.
    AsIs,
}

impl TextCase {
    /// Apply the normalisation.
    pub fn apply(self, text: &str) -> String {
        match self {
            TextCase::Upper => text.to_uppercase(),
            TextCase::AsIs => text.to_string(),
        }
    }
}

/// Immutable look selected before recording.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig {
    /// Catalog identity.
    pub id: StyleId,
    /// Human-facing name.
    pub display_name: &'static str,
    /// Caption colour when the emotion does not pick one.
    pub base_color: Rgba8,
    /// Accent/border colour.
    pub accent_border_color: Rgba8,
    /// Typeface tier.
    pub font: FontTag,
    /// Background gradient endpoints (top, bottom).
    pub gradient: [Rgba8; 2],
    /// Caption case normalisation.
    pub text_case: TextCase,
}

/// The fixed style catalog. The first entry is the fallback for unknown ids.
pub static STYLE_CATALOG: [StyleConfig; 4] = [
    StyleConfig {
        id: StyleId::RyuClassic,
        display_name: "RYU CLASSIC",
        base_color: Rgba8::rgb(0x60, 0xa5, 0xfa),
        accent_border_color: Rgba8::rgb(0x3b, 0x82, 0xf6),
        font: FontTag::Title,
        gradient: [Rgba8::rgb(0x1e, 0x3a, 0x8a), Rgba8::rgb(0x0f, 0x17, 0x2a)],
        text_case: TextCase::Upper,
    },
    StyleConfig {
        id: StyleId::KenFire,
        display_name: "KEN INFERNO",
        base_color: Rgba8::rgb(0xfb, 0x92, 0x3c),
        accent_border_color: Rgba8::rgb(0xf9, 0x73, 0x16),
        font: FontTag::Arcade,
        gradient: [Rgba8::rgb(0x7c, 0x2d, 0x12), Rgba8::rgb(0x7f, 0x1d, 0x1d)],
        text_case: TextCase::Upper,
    },
    StyleConfig {
        id: StyleId::AkumaRage,
        display_name: "AKUMA RAGE",
        base_color: Rgba8::rgb(0xdc, 0x26, 0x26),
        accent_border_color: Rgba8::rgb(0xb9, 0x1c, 0x1c),
        font: FontTag::Title,
        gradient: [Rgba8::rgb(0x45, 0x0a, 0x0a), Rgba8::BLACK],
        text_case: TextCase::Upper,
    },
    StyleConfig {
        id: StyleId::ChunLightning,
        display_name: "CHUN SPARK",
        base_color: Rgba8::rgb(0x22, 0xd3, 0xee),
        accent_border_color: Rgba8::rgb(0x22, 0xd3, 0xee),
        font: FontTag::Mono,
        gradient: [Rgba8::rgb(0x16, 0x4e, 0x63), Rgba8::rgb(0x1e, 0x3a, 0x8a)],
        text_case: TextCase::Upper,
    },
];

impl StyleConfig {
    /// Catalog entry for `id`.
    pub fn get(id: StyleId) -> &'static StyleConfig {
        STYLE_CATALOG
            .iter()
            .find(|s| s.id == id)
            .unwrap_or(&STYLE_CATALOG[0])
    }

    /// Catalog entry for a raw id string, falling back to the first entry.
    pub fn lookup(id: &str) -> &'static StyleConfig {
        match id.parse::<StyleId>() {
            Ok(id) => Self::get(id),
            Err(_) => {
                tracing::warn!(style = id, "unknown style id, using default style");
                &STYLE_CATALOG[0]
            }
        }
    }

    /// Caption fill colour: emotion first, then style identity.
    pub fn caption_fill(&self, emotion: Emotion) -> Rgba8 {
        match emotion {
            Emotion::Anger => Rgba8::rgb(0xef, 0x44, 0x44),
            Emotion::Joy => Rgba8::rgb(0xfa, 0xcc, 0x15),
            Emotion::Hype => Rgba8::rgb(0xe8, 0x79, 0xf9),
            Emotion::Sad | Emotion::Neutral => self.base_color,
        }
    }

    /// Whether captions glow for this emotion/style pair.
    pub fn caption_glows(&self, emotion: Emotion) -> bool {
        matches!(emotion, Emotion::Hype) || matches!(self.id, StyleId::ChunLightning)
    }
}

/// Colour filter selected for the source footage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterSelection {
    /// Untouched footage.
    #[default]
    None,
    /// Full desaturation.
    Grayscale,
    /// Warm retro tint.
    Sepia,
    /// Punchy contrast and saturation.
    Contrast,
    /// Channel inversion.
    Invert,
}

impl FilterSelection {
    /// Every variant, in catalog order.
    pub const ALL: [FilterSelection; 5] = [
        FilterSelection::None,
        FilterSelection::Grayscale,
        FilterSelection::Sepia,
        FilterSelection::Contrast,
        FilterSelection::Invert,
    ];

    /// Human-facing name.
    pub fn display_name(self) -> &'static str {
        match self {
            FilterSelection::None => "Normal",
            FilterSelection::Grayscale => "B&W",
            FilterSelection::Sepia => "Retro",
            FilterSelection::Contrast => "Drama",
            FilterSelection::Invert => "X-Ray",
        }
    }
}

/// Caption size tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeTier {
    /// Small captions.
    Small,
    /// Medium captions.
    #[default]
    Medium,
    /// Large captions.
    Large,
}

#[cfg(test)]
#[path = "../../tests/unit/model/style.rs"]
mod tests;
