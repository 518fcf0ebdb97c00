//! Loads well-formed XHTML into a `DocumentTree`.
//!
//! Only the structure the flow layout engine understands is kept: block
//! elements become blocks, inline elements adjust the font of their text, and
//! a small set of inline `style` declarations is honoured. Anything else is
//! walked for its text.

use roxmltree::{Node, ParsingOptions};
use std::str::FromStr;
use vellum_layout::LayoutError;
use vellum_types::font::{FontStyle, FontWeight};
use vellum_types::{Block, BlockKind, DocumentTree, TextRun, TextTransform};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Inherited inline formatting.
#[derive(Debug, Clone, Default)]
struct InlineStyle {
    family: Option<String>,
    weight: FontWeight,
    style: FontStyle,
    size: Option<f32>,
    transform: TextTransform,
}

impl InlineStyle {
    fn for_element(&self, name: &str, declarations: Option<&str>) -> Self {
        let mut style = self.clone();
        match name {
            "b" | "strong" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => style.weight = FontWeight::Bold,
            "i" | "em" | "cite" | "var" => style.style = FontStyle::Italic,
            _ => {}
        }
        if let Some(declarations) = declarations {
            style.apply_declarations(declarations);
        }
        style
    }

    fn apply_declarations(&mut self, declarations: &str) {
        for declaration in declarations.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match property.trim().to_ascii_lowercase().as_str() {
                "font-family" => self.family = Some(value.to_string()),
                "font-weight" => match FontWeight::from_str(value) {
                    Ok(weight) => self.weight = weight,
                    Err(e) => log::debug!("Ignoring font-weight: {}", e),
                },
                "font-style" => match FontStyle::from_str(value) {
                    Ok(style) => self.style = style,
                    Err(e) => log::debug!("Ignoring font-style: {}", e),
                },
                "font-size" => match parse_font_size(value) {
                    Some(size) => self.size = Some(size),
                    None => log::debug!("Ignoring font-size: '{}'", value),
                },
                "text-transform" => {
                    self.transform = match value.to_ascii_lowercase().as_str() {
                        "uppercase" => TextTransform::Uppercase,
                        "lowercase" => TextTransform::Lowercase,
                        "capitalize" => TextTransform::Capitalize,
                        _ => TextTransform::None,
                    }
                }
                _ => {}
            }
        }
    }

    fn run(&self, text: &str) -> TextRun {
        TextRun {
            text: text.to_string(),
            font_family: self.family.clone(),
            font_weight: self.weight,
            font_style: self.style,
            font_size: self.size,
            transform: self.transform,
        }
    }
}

/// Parses a CSS font size in `pt`, `px` or unitless points.
fn parse_font_size(value: &str) -> Option<f32> {
    let value = value.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(n) = value.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, 0.75)
    } else {
        (value.as_str(), 1.0)
    };
    number
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|n| *n > 0.0)
        .map(|n| n * scale)
}

fn block_kind(name: &str) -> Option<BlockKind> {
    match name {
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "nav" | "aside"
        | "blockquote" | "ul" | "ol" | "body" | "address" | "figure" | "figcaption" => {
            Some(BlockKind::Paragraph)
        }
        "li" | "dt" | "dd" => Some(BlockKind::ListItem),
        "pre" => Some(BlockKind::Preformatted),
        "h1" => Some(BlockKind::Heading(1)),
        "h2" => Some(BlockKind::Heading(2)),
        "h3" => Some(BlockKind::Heading(3)),
        "h4" => Some(BlockKind::Heading(4)),
        "h5" => Some(BlockKind::Heading(5)),
        "h6" => Some(BlockKind::Heading(6)),
        _ => None,
    }
}

#[derive(Default)]
struct Collector {
    blocks: Vec<Block>,
    current: Option<Block>,
}

impl Collector {
    fn flush(&mut self) {
        if let Some(block) = self.current.take()
            && !block.is_blank()
        {
            self.blocks.push(block);
        }
    }

    fn push_text(&mut self, kind: BlockKind, text: &str, style: &InlineStyle) {
        self.current
            .get_or_insert_with(|| Block::new(kind))
            .runs
            .push(style.run(text));
    }

    fn walk(&mut self, node: Node<'_, '_>, kind: BlockKind, style: &InlineStyle) {
        for child in node.children() {
            if child.is_text() {
                if let Some(text) = child.text() {
                    self.push_text(kind, text, style);
                }
                continue;
            }
            if !child.is_element() {
                continue;
            }
            let name = child.tag_name().name().to_ascii_lowercase();
            if matches!(name.as_str(), "head" | "title" | "script" | "style") {
                continue;
            }
            if name == "br" {
                self.push_text(kind, "\n", style);
                continue;
            }
            let child_style = style.for_element(&name, child.attribute("style"));
            match block_kind(&name) {
                Some(child_kind) => {
                    self.flush();
                    self.walk(child, child_kind, &child_style);
                    self.flush();
                }
                None => self.walk(child, kind, &child_style),
            }
        }
    }
}

fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses XHTML markup into a document tree.
///
/// # Errors
///
/// Returns `LayoutError::Markup` if the markup is not well-formed XML.
pub fn parse_html(markup: &str) -> Result<DocumentTree, LayoutError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(markup, options)
        .map_err(|e| LayoutError::Markup(e.to_string()))?;
    let root = doc.root_element();

    let mut tree = DocumentTree::new();
    tree.lang = root
        .attribute("lang")
        .or_else(|| root.attribute((XML_NAMESPACE, "lang")))
        .map(str::to_string);
    tree.title = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("title"))
        .map(element_text)
        .filter(|t| !t.is_empty());

    let body = if root.tag_name().name().eq_ignore_ascii_case("html") {
        root.children()
            .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("body"))
    } else {
        Some(root)
    };

    let mut collector = Collector::default();
    if let Some(body) = body {
        let name = body.tag_name().name().to_ascii_lowercase();
        let style = InlineStyle::default().for_element(&name, body.attribute("style"));
        collector.walk(body, block_kind(&name).unwrap_or(BlockKind::Paragraph), &style);
        collector.flush();
    }
    tree.blocks = collector.blocks;

    log::debug!("Parsed markup into {} block(s)", tree.blocks.len());
    Ok(tree)
}
