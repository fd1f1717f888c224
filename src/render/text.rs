use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::caption::layout::{CAPTION_WEIGHT, FontFamily, font_stack};
use crate::foundation::error::{CaptionFxError, CaptionFxResult};
use crate::model::style::FontTag;

/// Raw bytes of one font face.
#[derive(Clone, Debug)]
pub(crate) struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
    pub(crate) key: u64,
}

/// System font lookup for caption typeface tiers, cached per tier.
pub(crate) struct FontBook {
    db: usvg::fontdb::Database,
    resolved: HashMap<FontTag, Option<LoadedFont>>,
}

impl FontBook {
    /// Font book over the system fonts plus any `.ttf`/`.otf`/`.ttc` files in `extra_dir`.
    pub(crate) fn system(extra_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self {
            db,
            resolved: HashMap::new(),
        }
    }

    /// Best face for `tag`, walking its fallback stack, then any face at all.
    pub(crate) fn resolve(&mut self, tag: FontTag) -> Option<LoadedFont> {
        if let Some(hit) = self.resolved.get(&tag) {
            return hit.clone();
        }
        let found = self.query(tag);
        if found.is_none() {
            tracing::warn!(?tag, "no usable font face, captions will be skipped");
        }
        self.resolved.insert(tag, found.clone());
        found
    }

    fn query(&self, tag: FontTag) -> Option<LoadedFont> {
        let families: Vec<usvg::fontdb::Family<'_>> = font_stack(tag)
            .iter()
            .map(|f| match f {
                FontFamily::Named(name) => usvg::fontdb::Family::Name(name),
                FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
            })
            .chain([usvg::fontdb::Family::SansSerif])
            .collect();
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(CAPTION_WEIGHT),
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        self.db.with_face_data(id, |data, index| LoadedFont {
            key: xxhash_rust::xxh3::xxh3_64(data),
            bytes: Arc::new(data.to_vec()),
            index,
        })
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc")
            && let Err(e) = db.load_font_file(&path)
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}

/// Glyph id and pen position, relative to the text centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShapedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// A single-line caption, shaped and centred on the origin (CSS `text-align: center`,
/// `text-baseline: middle`).
#[derive(Clone, Debug)]
pub(crate) struct ShapedCaption {
    pub(crate) glyphs: Vec<ShapedGlyph>,
    pub(crate) font_size: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

/// Parley contexts plus a shaped-caption cache keyed by (font, text, size).
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: HashMap<u64, String>,
    shaped: HashMap<u64, Arc<ShapedCaption>>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

const SHAPED_CACHE_LIMIT: usize = 256;

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            shaped: HashMap::new(),
        }
    }

    /// Shape `text` with `font` at `size_px`, reusing earlier work for identical requests.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
    ) -> CaptionFxResult<Arc<ShapedCaption>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CaptionFxError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let key = shape_key(text, font.key, size_px);
        if let Some(hit) = self.shaped.get(&key) {
            return Ok(Arc::clone(hit));
        }

        let family_name = self.family_for(font)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(CAPTION_WEIGHT)),
        ));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let (width, height) = (layout.width(), layout.height());
        let (cx, cy) = (width / 2.0, height / 2.0);
        let mut glyphs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| ShapedGlyph {
                    id: g.id,
                    x: g.x - cx,
                    y: g.y - cy,
                }));
            }
        }

        if self.shaped.len() >= SHAPED_CACHE_LIMIT {
            self.shaped.clear();
        }
        let out = Arc::new(ShapedCaption {
            glyphs,
            font_size: size_px,
            width,
            height,
        });
        self.shaped.insert(key, Arc::clone(&out));
        Ok(out)
    }

    fn family_for(&mut self, font: &LoadedFont) -> CaptionFxResult<String> {
        if let Some(name) = self.families.get(&font.key) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CaptionFxError::graphics_context("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionFxError::graphics_context("registered font family has no name"))?
            .to_string();
        self.families.insert(font.key, name.clone());
        Ok(name)
    }
}

pub(crate) fn shape_key(text: &str, font_key: u64, size_px: f32) -> u64 {
    let mut buf = Vec::with_capacity(text.len() + 12);
    buf.extend_from_slice(text.as_bytes());
    buf.extend_from_slice(&font_key.to_le_bytes());
    buf.extend_from_slice(&size_px.to_bits().to_le_bytes());
    xxhash_rust::xxh3::xxh3_64(&buf)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
