//! Output types from the layout engine.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and y growing downwards. The PDF writer flips them.

use crate::fonts::ResolvedFont;
use vellum_types::{BlockKind, Size};

/// A piece of text drawn with one font at one size.
#[derive(Debug, Clone)]
pub struct PositionedRun {
    /// Text in drawing order.
    pub text: String,
    pub font: ResolvedFont,
    pub size: f32,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone)]
pub struct PositionedLine {
    /// Index of the source block in the document tree.
    pub block_index: usize,
    pub kind: BlockKind,
    /// Distance of the baseline from the top of the page.
    pub baseline: f32,
    pub runs: Vec<PositionedRun>,
}

#[derive(Debug, Clone, Default)]
pub struct LaidOutPage {
    pub lines: Vec<PositionedLine>,
}

impl LaidOutPage {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.runs.iter().map(|r| r.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The result of laying out a document.
#[derive(Debug, Clone)]
pub struct LaidOutPages {
    pub pages: Vec<LaidOutPage>,
    pub page_size: Size,
    pub title: Option<String>,
    pub lang: Option<String>,
}

impl LaidOutPages {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn runs(&self) -> impl Iterator<Item = &PositionedRun> {
        self.pages.iter().flat_map(|p| p.lines.iter()).flat_map(|l| l.runs.iter())
    }

    /// Distinct fonts used, in first-use order.
    pub fn fonts_used(&self) -> Vec<ResolvedFont> {
        let mut fonts: Vec<ResolvedFont> = Vec::new();
        for run in self.runs() {
            if !fonts.iter().any(|f| f.same_as(&run.font)) {
                fonts.push(run.font.clone());
            }
        }
        fonts
    }
}
