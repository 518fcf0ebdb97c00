//! PDF/A conformance levels and the PDF/UA accessibility flag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A PDF/A conformance target: a part (1-3) and a level (A, B or U).
///
/// Any value other than `None` makes non-embedded fonts illegal and adds the
/// XMP identification and output intent the standard requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdfAConformance {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "PDFA_1_A")]
    PdfA1A,
    #[serde(rename = "PDFA_1_B")]
    PdfA1B,
    #[serde(rename = "PDFA_2_A")]
    PdfA2A,
    #[serde(rename = "PDFA_2_B")]
    PdfA2B,
    #[serde(rename = "PDFA_2_U")]
    PdfA2U,
    #[serde(rename = "PDFA_3_A")]
    PdfA3A,
    #[serde(rename = "PDFA_3_B")]
    PdfA3B,
    #[serde(rename = "PDFA_3_U")]
    PdfA3U,
}

impl PdfAConformance {
    pub const ALL: [PdfAConformance; 9] = [
        PdfAConformance::None,
        PdfAConformance::PdfA1A,
        PdfAConformance::PdfA1B,
        PdfAConformance::PdfA2A,
        PdfAConformance::PdfA2B,
        PdfAConformance::PdfA2U,
        PdfAConformance::PdfA3A,
        PdfAConformance::PdfA3B,
        PdfAConformance::PdfA3U,
    ];

    /// The PDF/A part, or `None` when no conformance is requested.
    pub fn part(&self) -> Option<u8> {
        match self {
            PdfAConformance::None => None,
            PdfAConformance::PdfA1A | PdfAConformance::PdfA1B => Some(1),
            PdfAConformance::PdfA2A | PdfAConformance::PdfA2B | PdfAConformance::PdfA2U => Some(2),
            PdfAConformance::PdfA3A | PdfAConformance::PdfA3B | PdfAConformance::PdfA3U => Some(3),
        }
    }

    /// The part as a signed number, `-1` for no conformance.
    pub fn part_number(&self) -> i32 {
        self.part().map(i32::from).unwrap_or(-1)
    }

    /// The conformance level letter, empty for no conformance.
    pub fn conformance_value(&self) -> &'static str {
        match self {
            PdfAConformance::None => "",
            PdfAConformance::PdfA1A | PdfAConformance::PdfA2A | PdfAConformance::PdfA3A => "A",
            PdfAConformance::PdfA1B | PdfAConformance::PdfA2B | PdfAConformance::PdfA3B => "B",
            PdfAConformance::PdfA2U | PdfAConformance::PdfA3U => "U",
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.part().is_some()
    }

    pub fn requires_embedded_fonts(&self) -> bool {
        self.is_enabled()
    }

    /// Level A requires a logical structure tree.
    pub fn requires_tagging(&self) -> bool {
        self.conformance_value() == "A"
    }

    pub fn token(&self) -> &'static str {
        match self {
            PdfAConformance::None => "NONE",
            PdfAConformance::PdfA1A => "PDFA_1_A",
            PdfAConformance::PdfA1B => "PDFA_1_B",
            PdfAConformance::PdfA2A => "PDFA_2_A",
            PdfAConformance::PdfA2B => "PDFA_2_B",
            PdfAConformance::PdfA2U => "PDFA_2_U",
            PdfAConformance::PdfA3A => "PDFA_3_A",
            PdfAConformance::PdfA3B => "PDFA_3_B",
            PdfAConformance::PdfA3U => "PDFA_3_U",
        }
    }
}

impl fmt::Display for PdfAConformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part() {
            Some(part) => write!(f, "PDF/A-{}{}", part, self.conformance_value().to_lowercase()),
            None => f.write_str("none"),
        }
    }
}

impl FromStr for PdfAConformance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        PdfAConformance::ALL
            .into_iter()
            .find(|c| c.token() == wanted)
            .ok_or_else(|| format!("Unknown PDF/A conformance: '{}'", s))
    }
}

/// The conformance rules a session enforces while generating output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConformancePolicy {
    pub pdfa: PdfAConformance,
    pub pdf_ua: bool,
}

impl ConformancePolicy {
    pub fn new(pdfa: PdfAConformance, pdf_ua: bool) -> Self {
        Self { pdfa, pdf_ua }
    }

    pub fn requires_embedded_fonts(&self) -> bool {
        self.pdfa.requires_embedded_fonts()
    }

    /// Whether output must carry marked content and a structure tree.
    pub fn requires_tagging(&self) -> bool {
        self.pdf_ua || self.pdfa.requires_tagging()
    }

    /// Whether an XMP metadata stream must be written.
    pub fn requires_metadata(&self) -> bool {
        self.pdf_ua || self.pdfa.is_enabled()
    }
}
