//! Font resources: the built-in Helvetica as a simple font and registered
//! TrueType faces as embedded Type0/CIDFontType2 fonts with Identity-H encoding.

use crate::conformance::ConformancePolicy;
use crate::error::GenerationError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::collections::BTreeMap;
use std::sync::Arc;
use vellum_layout::builtin::{BUILTIN_FONT_NAME, encode_win_ansi};
use vellum_layout::{FontFace, FontResolver, ResolvedFont};

const BFCHAR_CHUNK: usize = 100;

struct FontEntry {
    resource_name: String,
    font: ResolvedFont,
    /// Glyph id to the text it was drawn for.
    used_glyphs: BTreeMap<u16, char>,
}

/// The fonts a document draws with, and which glyphs it uses from each.
pub(crate) struct FontTable {
    entries: Vec<FontEntry>,
}

impl FontTable {
    /// Rejects fonts the policy does not allow before anything is written.
    pub fn new(fonts: Vec<ResolvedFont>, policy: &ConformancePolicy) -> Result<Self, GenerationError> {
        if policy.requires_embedded_fonts()
            && let Some(font) = fonts.iter().find(|f| !f.is_embedded())
        {
            return Err(GenerationError::FontNotEmbedded {
                font: font.name().to_string(),
                conformance: policy.pdfa,
            });
        }
        if fonts.iter().any(|f| !f.is_embedded()) {
            log::debug!("Falling back to non-embedded {} for unmatched text", BUILTIN_FONT_NAME);
        }
        let entries = fonts
            .into_iter()
            .enumerate()
            .map(|(i, font)| FontEntry {
                resource_name: format!("F{}", i + 1),
                font,
                used_glyphs: BTreeMap::new(),
            })
            .collect();
        Ok(Self { entries })
    }

    fn entry_mut(&mut self, font: &ResolvedFont) -> Result<&mut FontEntry, GenerationError> {
        self.entries
            .iter_mut()
            .find(|e| e.font.same_as(font))
            .ok_or_else(|| GenerationError::Pdf(format!("font '{}' was not collected", font.name())))
    }

    /// Encodes `text` for a `Tj` operator and records the glyphs it uses.
    /// Returns the font's resource name with the encoded string.
    pub fn encode(&mut self, font: &ResolvedFont, text: &str) -> Result<(String, Object), GenerationError> {
        let entry = self.entry_mut(font)?;
        let encoded = match &entry.font {
            ResolvedFont::BuiltIn => {
                let bytes = text.chars().map(|c| encode_win_ansi(c).unwrap_or(b'?')).collect();
                Object::String(bytes, StringFormat::Literal)
            }
            ResolvedFont::Embedded(face) => {
                let parsed = face
                    .parse()
                    .ok_or_else(|| GenerationError::CorruptFont(face.postscript_name.clone()))?;
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = parsed.glyph_index(c).map(|g| g.0).unwrap_or(0);
                    entry.used_glyphs.entry(gid).or_insert(c);
                    bytes.extend_from_slice(&gid.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
        };
        Ok((entry.resource_name.clone(), encoded))
    }

    /// Writes every font object and returns the `/Font` resource dictionary.
    pub fn write(self, doc: &mut Document, resolver: &FontResolver) -> Result<Dictionary, GenerationError> {
        let mut resources = Dictionary::new();
        for entry in self.entries {
            let font_id = match &entry.font {
                ResolvedFont::BuiltIn => doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => BUILTIN_FONT_NAME,
                    "Encoding" => "WinAnsiEncoding",
                }),
                ResolvedFont::Embedded(face) => {
                    write_embedded_font(doc, face, &entry.font, &entry.used_glyphs, resolver)?
                }
            };
            resources.set(entry.resource_name.as_bytes(), font_id);
        }
        Ok(resources)
    }
}

fn base_font_name(face: &FontFace) -> Vec<u8> {
    face.postscript_name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect::<String>()
        .into_bytes()
}

fn write_embedded_font(
    doc: &mut Document,
    face: &Arc<FontFace>,
    font: &ResolvedFont,
    used_glyphs: &BTreeMap<u16, char>,
    resolver: &FontResolver,
) -> Result<ObjectId, GenerationError> {
    let parsed = face
        .parse()
        .ok_or_else(|| GenerationError::CorruptFont(face.postscript_name.clone()))?;
    let metrics = resolver.metrics(font);
    let upem = metrics.units_per_em.max(1) as i64;
    let scale = |v: i16| v as i64 * 1000 / upem;
    let base_font = base_font_name(face);

    let font_file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => face.data.len() as i64 },
        face.data.to_vec(),
    ));

    let mut flags = 32;
    if metrics.italic_angle != 0.0 {
        flags |= 64;
    }
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_font.clone()),
        "Flags" => flags,
        "FontBBox" => vec![
            scale(metrics.bbox[0]).into(),
            scale(metrics.bbox[1]).into(),
            scale(metrics.bbox[2]).into(),
            scale(metrics.bbox[3]).into(),
        ],
        "ItalicAngle" => metrics.italic_angle,
        "Ascent" => scale(metrics.ascent),
        "Descent" => scale(metrics.descent),
        "CapHeight" => scale(metrics.cap_height),
        "StemV" => 80,
        "FontFile2" => font_file_id,
    });

    let width_of = |gid: u16| -> i64 {
        parsed
            .glyph_hor_advance(ttf_parser::GlyphId(gid))
            .map(|a| a as i64 * 1000 / upem)
            .unwrap_or(0)
    };
    let widths: Vec<Object> = if face.subset {
        used_glyphs
            .keys()
            .flat_map(|&gid| [Object::Integer(gid as i64), Object::Array(vec![width_of(gid).into()])])
            .collect()
    } else {
        let all: Vec<Object> = (0..parsed.number_of_glyphs()).map(|gid| width_of(gid).into()).collect();
        vec![Object::Integer(0), Object::Array(all)]
    };

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(base_font.clone()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "CIDToGIDMap" => "Identity",
        "W" => widths,
    });

    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! {},
        to_unicode_cmap(used_glyphs).into_bytes(),
    ));

    log::debug!(
        "Embedding '{}' ({} bytes, {} glyph(s) used)",
        face.postscript_name,
        face.data.len(),
        used_glyphs.len()
    );

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(base_font),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
        "ToUnicode" => to_unicode_id,
    }))
}

fn utf16_hex(c: char) -> String {
    let mut units = [0u16; 2];
    c.encode_utf16(&mut units)
        .iter()
        .map(|u| format!("{:04X}", u))
        .collect()
}

/// A ToUnicode CMap mapping each used glyph id back to its character.
fn to_unicode_cmap(used_glyphs: &BTreeMap<u16, char>) -> String {
    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\n");
    out.push_str("begincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n");
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    let entries: Vec<(&u16, &char)> = used_glyphs.iter().collect();
    for chunk in entries.chunks(BFCHAR_CHUNK) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            out.push_str(&format!("<{:04X}> <{}>\n", gid, utf16_hex(**c)));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\n");
    out.push_str("CMapName currentdict /CMap defineresource pop\n");
    out.push_str("end\nend\n");
    out
}
