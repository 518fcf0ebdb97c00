//! Font resolver used by layout and PDF generation.
//!
//! Faces are registered explicitly, in order, from a supplier or a file. The
//! resolver never discovers system fonts: a request that matches no registered
//! face resolves to the built-in Helvetica.
//!
//! ## Matching
//!
//! - Families are compared case-insensitively and tried in the order given.
//! - Within a family the closest style wins, then the closest weight. A face
//!   registered without a style matches any style, after exact matches.
//! - On a tie the most recent registration wins, so re-registering a
//!   family/weight/style shadows the earlier face.
//! - Characters missing from the chosen face fall back to the first
//!   registered face that has them.

use crate::builtin::{self, BUILTIN_FONT_NAME};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use vellum_traits::{CacheValue, FontError, FontMetrics, FontSupplier, FsCache, NoOpCacheStore, SharedFontData};
use vellum_types::font::{FontStyle, FontWeight};

/// A registered font face with its raw TrueType data.
pub struct FontFace {
    pub family: String,
    pub postscript_name: String,
    pub weight: FontWeight,
    pub style: Option<FontStyle>,
    /// Only the glyphs actually drawn are described in the output.
    pub subset: bool,
    pub data: SharedFontData,
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("postscript_name", &self.postscript_name)
            .field("weight", &self.weight)
            .field("style", &self.style)
            .field("subset", &self.subset)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontFace {
    /// Creates a lightweight Face view over the font data.
    /// Data was validated at registration, so this only fails on corrupted memory.
    pub fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    /// Width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        let Some(face) = self.parse() else {
            return 0.0;
        };
        let upem = face.units_per_em().max(1) as f32;
        let units: u32 = text
            .chars()
            .map(|c| {
                face.glyph_index(c)
                    .or_else(|| face.glyph_index('\u{FFFD}'))
                    .and_then(|g| face.glyph_hor_advance(g))
                    .unwrap_or(0) as u32
            })
            .sum();
        units as f32 * size / upem
    }

    /// Key under which this face's metrics are cached.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.postscript_name,
            self.weight.numeric_value(),
            style_key(self.style)
        )
    }

    fn read_metrics(&self) -> Option<FontMetrics> {
        let face = self.parse()?;
        let bbox = face.global_bounding_box();
        let underline = face.underline_metrics();
        Some(FontMetrics {
            units_per_em: face.units_per_em(),
            ascent: face.ascender(),
            descent: face.descender(),
            line_gap: face.line_gap(),
            cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
            italic_angle: match self.style {
                Some(FontStyle::Italic) | Some(FontStyle::Oblique) => -12.0,
                _ => 0.0,
            },
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            underline_position: underline.map(|u| u.position).unwrap_or(-100),
            underline_thickness: underline.map(|u| u.thickness).unwrap_or(50),
        })
    }
}

fn style_key(style: Option<FontStyle>) -> &'static str {
    match style {
        Some(FontStyle::Normal) => "normal",
        Some(FontStyle::Italic) => "italic",
        Some(FontStyle::Oblique) => "oblique",
        None => "any",
    }
}

/// Extracts the PostScript name from font data, falling back to the full
/// name and then the family name with spaces removed.
fn extract_postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let find = |id: u16| {
        face.names()
            .into_iter()
            .find(|n| n.name_id == id)
            .and_then(|n| n.to_string())
    };
    find(ttf_parser::name_id::POST_SCRIPT_NAME)
        .or_else(|| find(ttf_parser::name_id::FULL_NAME).map(|n| n.replace(' ', "")))
        .or_else(|| find(ttf_parser::name_id::FAMILY).map(|n| n.replace(' ', "")))
}

/// The outcome of resolving a font request.
#[derive(Debug, Clone)]
pub enum ResolvedFont {
    Embedded(Arc<FontFace>),
    BuiltIn,
}

impl ResolvedFont {
    pub fn is_embedded(&self) -> bool {
        matches!(self, ResolvedFont::Embedded(_))
    }

    pub fn name(&self) -> &str {
        match self {
            ResolvedFont::Embedded(face) => &face.postscript_name,
            ResolvedFont::BuiltIn => BUILTIN_FONT_NAME,
        }
    }

    pub fn same_as(&self, other: &ResolvedFont) -> bool {
        match (self, other) {
            (ResolvedFont::Embedded(a), ResolvedFont::Embedded(b)) => Arc::ptr_eq(a, b),
            (ResolvedFont::BuiltIn, ResolvedFont::BuiltIn) => true,
            _ => false,
        }
    }

    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            ResolvedFont::Embedded(face) => face.measure(text, size),
            ResolvedFont::BuiltIn => {
                let units: u32 = text.chars().map(|c| builtin::builtin_width(c) as u32).sum();
                units as f32 * size / 1000.0
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontResolver {
    faces: Vec<Arc<FontFace>>,
    metrics_cache: Arc<dyn FsCache>,
}

impl Default for FontResolver {
    fn default() -> Self {
        Self::new(NoOpCacheStore::shared())
    }
}

impl FontResolver {
    pub fn new(metrics_cache: Arc<dyn FsCache>) -> Self {
        Self {
            faces: Vec::new(),
            metrics_cache,
        }
    }

    pub fn metrics_cache(&self) -> &Arc<dyn FsCache> {
        &self.metrics_cache
    }

    /// Registered faces in registration order.
    pub fn faces(&self) -> &[Arc<FontFace>] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Registers a face whose bytes come from `supplier`.
    ///
    /// # Errors
    ///
    /// Returns `FontError::Supplier` if the supplier fails and
    /// `FontError::InvalidData` if the bytes are not a usable font.
    pub fn add_font_from_supplier(
        &mut self,
        supplier: &dyn FontSupplier,
        family: &str,
        weight: FontWeight,
        style: Option<FontStyle>,
        subset: bool,
    ) -> Result<Arc<FontFace>, FontError> {
        let data = supplier.supply().map_err(|e| FontError::Supplier {
            family: family.to_string(),
            message: e.to_string(),
        })?;
        self.add_font_data(data, family, weight, style, subset)
    }

    /// Registers a face read from a TrueType file.
    ///
    /// # Errors
    ///
    /// Returns `FontError::LoadFailed` naming the path when the file cannot be
    /// read or does not contain a usable font.
    pub fn add_font_file(
        &mut self,
        path: &Path,
        family: &str,
        weight: FontWeight,
        style: Option<FontStyle>,
        subset: bool,
    ) -> Result<Arc<FontFace>, FontError> {
        let load_failed = |message: String| FontError::LoadFailed {
            path: path.display().to_string(),
            message,
        };
        let data = std::fs::read(path).map_err(|e| load_failed(e.to_string()))?;
        self.add_font_data(data, family, weight, style, subset)
            .map_err(|e| load_failed(e.to_string()))
    }

    /// Validates `data` and appends it as a new face.
    pub fn add_font_data(
        &mut self,
        data: Vec<u8>,
        family: &str,
        weight: FontWeight,
        style: Option<FontStyle>,
        subset: bool,
    ) -> Result<Arc<FontFace>, FontError> {
        let postscript_name = {
            let face = ttf_parser::Face::parse(&data, 0).map_err(|e| FontError::InvalidData {
                family: family.to_string(),
                message: e.to_string(),
            })?;
            extract_postscript_name(&face).unwrap_or_else(|| family.replace(' ', ""))
        };

        log::debug!(
            "Registering font '{}' (family: {}, weight: {}, style: {}, subset: {})",
            postscript_name,
            family,
            weight.numeric_value(),
            style_key(style),
            subset
        );

        let face = Arc::new(FontFace {
            family: family.to_string(),
            postscript_name,
            weight,
            style,
            subset,
            data: Arc::new(data),
        });
        self.faces.push(face.clone());
        Ok(face)
    }

    /// Finds the best registered face for the first family in `families` that
    /// has any registered face, or the built-in font when none does.
    pub fn resolve(&self, families: &[&str], weight: FontWeight, style: FontStyle) -> ResolvedFont {
        for family in families {
            let mut best: Option<(u32, &Arc<FontFace>)> = None;
            for face in self.faces.iter().filter(|f| f.family.eq_ignore_ascii_case(family)) {
                let style_penalty = match face.style {
                    Some(s) if s == style => 0,
                    None => 1,
                    Some(_) => 2,
                };
                let weight_distance =
                    (face.weight.numeric_value() as i32 - weight.numeric_value() as i32).unsigned_abs();
                let score = style_penalty * 10_000 + weight_distance;
                if best.is_none_or(|(s, _)| score <= s) {
                    best = Some((score, face));
                }
            }
            if let Some((_, face)) = best {
                return ResolvedFont::Embedded(face.clone());
            }
        }
        ResolvedFont::BuiltIn
    }

    /// Splits `text` into runs drawn with one font each.
    ///
    /// Characters use the face `resolve` picks unless it has no glyph for
    /// them, in which case the first registered face that does is used.
    /// Whitespace always stays with the preferred font. Each face is parsed at
    /// most once per call.
    pub fn resolve_text(
        &self,
        families: &[&str],
        weight: FontWeight,
        style: FontStyle,
        text: &str,
    ) -> Vec<(ResolvedFont, String)> {
        let preferred = self.resolve(families, weight, style);
        let preferred_face = match &preferred {
            ResolvedFont::Embedded(face) => face.parse(),
            ResolvedFont::BuiltIn => None,
        };
        let mut fallbacks: Option<Vec<Option<ttf_parser::Face<'_>>>> = None;
        let mut runs: Vec<(ResolvedFont, String)> = Vec::new();

        for c in text.chars() {
            let drawable = match &preferred {
                ResolvedFont::BuiltIn => builtin::builtin_supports(c),
                ResolvedFont::Embedded(_) => preferred_face.as_ref().is_some_and(|f| f.glyph_index(c).is_some()),
            };
            let font = if c.is_whitespace() || drawable {
                preferred.clone()
            } else {
                let parsed = fallbacks.get_or_insert_with(|| self.faces.iter().map(|f| f.parse()).collect());
                parsed
                    .iter()
                    .position(|face| face.as_ref().is_some_and(|f| f.glyph_index(c).is_some()))
                    .map(|i| ResolvedFont::Embedded(self.faces[i].clone()))
                    .unwrap_or_else(|| preferred.clone())
            };
            match runs.last_mut() {
                Some((last, run)) if last.same_as(&font) => run.push(c),
                _ => runs.push((font, c.to_string())),
            }
        }
        runs
    }

    /// Like `resolve`, but falls back to other faces when the preferred one
    /// cannot draw `c`.
    pub fn resolve_for_char(
        &self,
        families: &[&str],
        weight: FontWeight,
        style: FontStyle,
        c: char,
    ) -> ResolvedFont {
        let mut buf = [0u8; 4];
        self.resolve_text(families, weight, style, c.encode_utf8(&mut buf))
            .into_iter()
            .next()
            .map(|(font, _)| font)
            .unwrap_or_else(|| self.resolve(families, weight, style))
    }

    /// Metrics for `font`, read through the font metrics cache.
    pub fn metrics(&self, font: &ResolvedFont) -> Arc<FontMetrics> {
        let face = match font {
            ResolvedFont::BuiltIn => return builtin::builtin_metrics(),
            ResolvedFont::Embedded(face) => face,
        };
        let key = face.cache_key();
        if let Some(metrics) = self.metrics_cache.get(&key).and_then(|v| v.as_font_metrics().cloned()) {
            return metrics;
        }
        let Some(metrics) = face.read_metrics().map(Arc::new) else {
            log::warn!("Could not read metrics of '{}', using built-in metrics", face.postscript_name);
            return builtin::builtin_metrics();
        };
        log::debug!("Caching metrics for '{}' in {}", key, self.metrics_cache.name());
        self.metrics_cache.put(key, CacheValue::FontMetrics(metrics.clone()));
        metrics
    }
}
