//! Layout engine contract and the default flow engine.

use crate::config::PageGeometry;
use crate::fonts::FontResolver;
use crate::output::{LaidOutPage, LaidOutPages, PositionedLine, PositionedRun};
use crate::text::{LineBox, visual_fragments, wrap_block};
use crate::unicode::UnicodeImplementation;
use crate::LayoutError;
use std::fmt::Debug;
use vellum_types::{Block, BlockKind, DocumentTree, TextDirection};

/// Minimum line height as a multiple of the font size.
const MIN_LINE_HEIGHT: f32 = 1.2;

/// Space after each block as a multiple of the block's default font size.
const BLOCK_SPACING: f32 = 0.5;

/// Turns a document tree into positioned lines on pages.
pub trait LayoutEngine: Send + Sync + Debug {
    fn layout(
        &self,
        document: &DocumentTree,
        fonts: &FontResolver,
        geometry: &PageGeometry,
        unicode: &UnicodeImplementation,
    ) -> Result<LaidOutPages, LayoutError>;
}

/// Stacks blocks top to bottom, filling lines greedily and starting a new page
/// when the next line does not fit.
#[derive(Debug, Clone, Default)]
pub struct FlowLayoutEngine;

impl FlowLayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Returns (ascent, height) of a line in points.
    fn line_extent(line: &LineBox, block: &Block, fonts: &FontResolver) -> (f32, f32) {
        if line.is_empty() {
            let size = block.kind.default_font_size();
            return (size * 0.8, size * MIN_LINE_HEIGHT);
        }
        let mut ascent: f32 = 0.0;
        let mut descent: f32 = 0.0;
        let mut min_height: f32 = 0.0;
        for fragment in &line.fragments {
            let metrics = fonts.metrics(&fragment.font);
            ascent = ascent.max(metrics.ascent_pt(fragment.size));
            descent = descent.max(metrics.descent_pt(fragment.size));
            min_height = min_height
                .max(metrics.line_height(fragment.size))
                .max(fragment.size * MIN_LINE_HEIGHT);
        }
        let height = min_height.max(ascent + descent);
        let leading = (height - ascent - descent) / 2.0;
        (ascent + leading, height)
    }
}

impl LayoutEngine for FlowLayoutEngine {
    fn layout(
        &self,
        document: &DocumentTree,
        fonts: &FontResolver,
        geometry: &PageGeometry,
        unicode: &UnicodeImplementation,
    ) -> Result<LaidOutPages, LayoutError> {
        if !geometry.has_content_area() {
            return Err(LayoutError::EmptyPage(geometry.size.width, geometry.size.height));
        }

        let top = geometry.margin;
        let bottom = geometry.size.height - geometry.margin;
        let content_width = geometry.content_width();

        let mut pages = vec![LaidOutPage::default()];
        let mut cursor = top;

        for (block_index, block) in document.blocks.iter().enumerate() {
            if block.is_blank() && block.kind != BlockKind::Preformatted {
                continue;
            }
            for line in wrap_block(block, fonts, unicode, content_width)? {
                let (ascent, height) = Self::line_extent(&line, block, fonts);
                let page_has_lines = pages.last().is_some_and(|p| !p.is_empty());
                if cursor + height > bottom && page_has_lines {
                    pages.push(LaidOutPage::default());
                    cursor = top;
                }

                let line_width = line.width;
                let mut x = match unicode.default_direction {
                    TextDirection::Ltr => geometry.margin,
                    TextDirection::Rtl => geometry.margin + (content_width - line_width).max(0.0),
                };
                let runs = visual_fragments(line, unicode)?
                    .into_iter()
                    .filter(|f| !f.text.is_empty())
                    .map(|f| {
                        let run = PositionedRun {
                            text: f.text,
                            font: f.font,
                            size: f.size,
                            x,
                            width: f.width,
                        };
                        x += f.width;
                        run
                    })
                    .collect();

                if let Some(page) = pages.last_mut() {
                    page.lines.push(PositionedLine {
                        block_index,
                        kind: block.kind,
                        baseline: cursor + ascent,
                        runs,
                    });
                }
                cursor += height;
            }
            cursor += block.kind.default_font_size() * BLOCK_SPACING;
        }

        log::debug!(
            "Laid out {} blocks onto {} page(s)",
            document.blocks.len(),
            pages.len()
        );

        Ok(LaidOutPages {
            pages,
            page_size: geometry.size,
            title: document.title.clone(),
            lang: document.lang.clone(),
        })
    }
}
