//! The in-memory document tree consumed by layout.
//!
//! Markup sources are parsed into this tree before layout; callers that build
//! documents programmatically can hand a tree to the renderer directly.

use crate::font::{FontStyle, FontWeight};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// A run of text sharing one set of font properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Comma separated family list, tried in order. `None` means the default font.
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    /// Overrides the block's default size, in points.
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub transform: TextTransform,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: None,
            font_weight: FontWeight::Regular,
            font_style: FontStyle::Normal,
            font_size: None,
            transform: TextTransform::None,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.font_style = style;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_transform(mut self, transform: TextTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Family names in preference order, trimmed and unquoted.
    pub fn families(&self) -> Vec<&str> {
        self.font_family
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
                    .filter(|f| !f.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
    Preformatted,
}

impl BlockKind {
    pub fn default_font_size(&self) -> f32 {
        match self {
            BlockKind::Heading(1) => 24.0,
            BlockKind::Heading(2) => 20.0,
            BlockKind::Heading(3) => 16.0,
            BlockKind::Heading(4) => 14.0,
            BlockKind::Heading(_) => 12.0,
            BlockKind::Paragraph | BlockKind::ListItem => 12.0,
            BlockKind::Preformatted => 10.0,
        }
    }

    /// The standard structure type used when the output is tagged.
    pub fn structure_role(&self) -> &'static str {
        match self {
            BlockKind::Heading(1) => "H1",
            BlockKind::Heading(2) => "H2",
            BlockKind::Heading(3) => "H3",
            BlockKind::Heading(4) => "H4",
            BlockKind::Heading(5) => "H5",
            BlockKind::Heading(_) => "H6",
            BlockKind::Paragraph | BlockKind::ListItem | BlockKind::Preformatted => "P",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<TextRun>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            runs: Vec::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph).with_run(TextRun::new(text))
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading(level.clamp(1, 6))).with_run(TextRun::new(text))
    }

    pub fn with_run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}
