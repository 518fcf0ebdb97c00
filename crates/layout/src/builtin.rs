//! The standard Helvetica font that every PDF viewer provides.
//!
//! It is used when no registered face matches a request. It is never embedded,
//! which makes it illegal in PDF/A output.

use once_cell::sync::Lazy;
use std::sync::Arc;
use vellum_traits::FontMetrics;

pub const BUILTIN_FONT_NAME: &str = "Helvetica";

const DEFAULT_WIDTH: u16 = 556;

/// Advance widths for U+0020..=U+007E, in 1/1000 em.
#[rustfmt::skip]
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

static BUILTIN_METRICS: Lazy<Arc<FontMetrics>> = Lazy::new(|| {
    Arc::new(FontMetrics {
        units_per_em: 1000,
        ascent: 718,
        descent: -207,
        line_gap: 0,
        cap_height: 718,
        italic_angle: 0.0,
        bbox: [-166, -225, 1000, 931],
        underline_position: -100,
        underline_thickness: 50,
    })
});

pub fn builtin_metrics() -> Arc<FontMetrics> {
    BUILTIN_METRICS.clone()
}

/// Maps a character to its byte in WinAnsiEncoding.
///
/// Only printable ASCII and Latin-1 are covered; everything else has no code.
pub fn encode_win_ansi(c: char) -> Option<u8> {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => None,
    }
}

pub fn builtin_supports(c: char) -> bool {
    encode_win_ansi(c).is_some()
}

/// Advance width of `c` in 1/1000 em.
pub fn builtin_width(c: char) -> u16 {
    match c as u32 {
        code @ 0x20..=0x7E => ASCII_WIDTHS[(code - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    }
}
