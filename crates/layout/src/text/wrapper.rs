use super::strategy_slice;
use crate::LayoutError;
use crate::fonts::{FontResolver, ResolvedFont};
use crate::unicode::UnicodeImplementation;
use vellum_types::{Block, BlockKind, TextRun};

/// A measured piece of a line, in logical order.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
    pub font: ResolvedFont,
    pub size: f32,
    pub width: f32,
}

impl Fragment {
    fn continues(&self, font: &ResolvedFont, size: f32) -> bool {
        self.size == size && self.font.same_as(font)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineBox {
    pub fragments: Vec<Fragment>,
    pub width: f32,
}

impl LineBox {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn push(&mut self, fragment: Fragment) {
        self.width += fragment.width;
        match self.fragments.last_mut() {
            Some(last) if last.continues(&fragment.font, fragment.size) => {
                last.text.push_str(&fragment.text);
                last.width += fragment.width;
            }
            _ => self.fragments.push(fragment),
        }
    }

    fn trim_end(&mut self) {
        while let Some(last) = self.fragments.last_mut() {
            let trimmed = last.text.trim_end();
            if trimmed.len() == last.text.len() {
                break;
            }
            let trimmed = trimmed.to_string();
            let width = last.font.measure(&trimmed, last.size);
            self.width -= last.width - width;
            if trimmed.is_empty() {
                self.fragments.pop();
            } else {
                last.text = trimmed;
                last.width = width;
            }
        }
    }
}

/// A breakable unit of text sharing one text run.
struct Token<'a> {
    text: String,
    run: &'a TextRun,
    size: f32,
    hard_break: bool,
}

struct Wrapper<'a> {
    resolver: &'a FontResolver,
    unicode: &'a UnicodeImplementation,
    max_width: f32,
    lines: Vec<LineBox>,
    current: LineBox,
}

impl<'a> Wrapper<'a> {
    fn flush(&mut self, keep_empty: bool) {
        let mut line = std::mem::take(&mut self.current);
        line.trim_end();
        if keep_empty || !line.is_empty() {
            self.lines.push(line);
        }
    }

    /// Splits `text` into fragments, switching fonts where the preferred one
    /// has no glyph.
    fn measure(&self, text: &str, run: &TextRun, size: f32) -> Vec<Fragment> {
        self.resolver
            .resolve_text(&run.families(), run.font_weight, run.font_style, text)
            .into_iter()
            .map(|(font, text)| Fragment {
                width: font.measure(&text, size),
                text,
                font,
                size,
            })
            .collect()
    }

    fn width_of(fragments: &[Fragment]) -> f32 {
        fragments.iter().map(|f| f.width).sum()
    }

    fn place(&mut self, token: &Token<'_>) -> Result<(), LayoutError> {
        let fragments = self.measure(&token.text, token.run, token.size);
        let visible = token.text.trim_end();
        let visible_width = if visible.len() == token.text.len() {
            Self::width_of(&fragments)
        } else {
            Self::width_of(&self.measure(visible, token.run, token.size))
        };

        if self.current.width + visible_width > self.max_width && !self.current.is_empty() {
            self.flush(false);
        }

        if visible_width > self.max_width {
            self.place_broken(token)?;
        } else {
            for fragment in fragments {
                self.current.push(fragment);
            }
        }

        if token.hard_break {
            self.flush(true);
        }
        Ok(())
    }

    /// Places a token wider than a whole line by breaking it between characters.
    fn place_broken(&mut self, token: &Token<'_>) -> Result<(), LayoutError> {
        const STRATEGY: &str = "character breaker";
        let text = token.text.as_str();
        let boundaries = self.unicode.char_breaker.char_boundaries(text);
        let mut start = 0;
        let mut last_fit = None;
        for &end in &boundaries {
            let piece = strategy_slice(text, start, end, STRATEGY)?;
            let width = Self::width_of(&self.measure(piece, token.run, token.size));
            if self.current.width + width > self.max_width {
                // Always take at least one character so progress is made.
                let cut = last_fit.unwrap_or(end);
                let piece = strategy_slice(text, start, cut, STRATEGY)?;
                for fragment in self.measure(piece, token.run, token.size) {
                    self.current.push(fragment);
                }
                self.flush(false);
                start = cut;
                last_fit = (cut < end).then_some(end);
            } else {
                last_fit = Some(end);
            }
        }
        if start < text.len() {
            let rest = strategy_slice(text, start, text.len(), STRATEGY)?;
            for fragment in self.measure(rest, token.run, token.size) {
                self.current.push(fragment);
            }
        }
        Ok(())
    }
}

fn collapse_whitespace(text: &str, at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = at_line_start;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn tokenize<'a>(
    block: &'a Block,
    unicode: &UnicodeImplementation,
) -> Result<Vec<Token<'a>>, LayoutError> {
    const STRATEGY: &str = "line breaker";
    let preformatted = block.kind == BlockKind::Preformatted;
    let default_size = block.kind.default_font_size();
    let mut tokens = Vec::new();
    let mut at_space = true;

    for run in &block.runs {
        let size = run.font_size.unwrap_or(default_size);
        let transformed = unicode.apply_transform(&run.text, run.transform);
        let text = if preformatted {
            transformed
        } else {
            let collapsed = collapse_whitespace(&transformed, at_space);
            if let Some(last) = collapsed.chars().last() {
                at_space = last == ' ';
            }
            collapsed
        };

        let segments: Vec<(&str, bool)> = if preformatted {
            let mut parts: Vec<(&str, bool)> = text.split('\n').map(|l| (l, true)).collect();
            if let Some(last) = parts.last_mut() {
                last.1 = false;
            }
            parts
        } else {
            vec![(text.as_str(), false)]
        };

        for (segment, hard_break) in segments {
            let mut start = 0;
            for end in unicode.line_breaker.break_opportunities(segment) {
                if end == start {
                    continue;
                }
                tokens.push(Token {
                    text: strategy_slice(segment, start, end, STRATEGY)?.to_string(),
                    run,
                    size,
                    hard_break: false,
                });
                start = end;
            }
            if start < segment.len() || hard_break {
                tokens.push(Token {
                    text: strategy_slice(segment, start, segment.len(), STRATEGY)?.to_string(),
                    run,
                    size,
                    hard_break,
                });
            }
        }
    }
    Ok(tokens)
}

/// Breaks a block into lines no wider than `max_width`.
///
/// Preformatted blocks keep their whitespace and break at newlines; other
/// blocks collapse whitespace runs to a single space.
pub fn wrap_block(
    block: &Block,
    resolver: &FontResolver,
    unicode: &UnicodeImplementation,
    max_width: f32,
) -> Result<Vec<LineBox>, LayoutError> {
    let mut wrapper = Wrapper {
        resolver,
        unicode,
        max_width,
        lines: Vec::new(),
        current: LineBox::default(),
    };
    for token in tokenize(block, unicode)? {
        wrapper.place(&token)?;
    }
    wrapper.flush(false);
    Ok(wrapper.lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mono_resolver;
    use std::sync::Arc;
    use vellum_traits::unicode::LineBreaker;

    /// Counts characters instead of bytes when reporting break opportunities.
    #[derive(Debug)]
    struct CharIndexBreaker;

    impl LineBreaker for CharIndexBreaker {
        fn break_opportunities(&self, text: &str) -> Vec<usize> {
            text.chars()
                .enumerate()
                .filter(|(_, c)| c.is_whitespace())
                .map(|(i, _)| i + 1)
                .collect()
        }
    }

    fn line_texts(lines: &[LineBox]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.fragments.iter().map(|f| f.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_short_paragraph_is_one_line() {
        let resolver = FontResolver::default();
        let block = Block::paragraph("Hello   world");
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), 500.0).unwrap();
        assert_eq!(line_texts(&lines), vec!["Hello world"]);
    }

    #[test]
    fn test_greedy_wrapping_with_monospace() {
        let resolver = mono_resolver();
        let block = Block::new(BlockKind::Paragraph)
            .with_run(TextRun::new("aaaa bbbb cccc").with_family("Mono").with_size(10.0));
        let char_width = resolver.faces()[0].measure("a", 10.0);
        // Room for "aaaa bbbb" but not the third word.
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), char_width * 10.0).unwrap();
        assert_eq!(line_texts(&lines), vec!["aaaa bbbb", "cccc"]);
        assert!(lines.iter().all(|l| l.width <= char_width * 10.0 + 0.001));
    }

    #[test]
    fn test_overlong_word_is_broken_between_characters() {
        let resolver = mono_resolver();
        let block = Block::new(BlockKind::Paragraph)
            .with_run(TextRun::new("abcdefghij").with_family("Mono").with_size(10.0));
        let char_width = resolver.faces()[0].measure("a", 10.0);
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), char_width * 4.0 + 0.01).unwrap();
        assert_eq!(line_texts(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_preformatted_keeps_newlines() {
        let resolver = FontResolver::default();
        let block = Block::new(BlockKind::Preformatted).with_run(TextRun::new("one\n\nthree"));
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), 500.0).unwrap();
        assert_eq!(line_texts(&lines), vec!["one", "", "three"]);
    }

    #[test]
    fn test_runs_with_different_fonts_stay_separate() {
        let resolver = mono_resolver();
        let block = Block::new(BlockKind::Paragraph)
            .with_run(TextRun::new("plain "))
            .with_run(TextRun::new("mono").with_family("Mono"));
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), 500.0).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].fragments.len(), 2);
        assert!(!lines[0].fragments[0].font.is_embedded());
        assert!(lines[0].fragments[1].font.is_embedded());
    }

    #[test]
    fn test_transform_is_applied() {
        let resolver = FontResolver::default();
        let block = Block::new(BlockKind::Paragraph)
            .with_run(TextRun::new("shout").with_transform(vellum_types::TextTransform::Uppercase));
        let lines = wrap_block(&block, &resolver, &UnicodeImplementation::default(), 500.0).unwrap();
        assert_eq!(line_texts(&lines), vec!["SHOUT"]);
    }

    #[test]
    fn test_break_inside_a_character_is_an_error() {
        let unicode = UnicodeImplementation {
            line_breaker: Arc::new(CharIndexBreaker),
            ..Default::default()
        };
        let block = Block::paragraph("héé wörld");
        match wrap_block(&block, &FontResolver::default(), &unicode, 500.0) {
            Err(LayoutError::Strategy { strategy, start, end, len }) => {
                assert_eq!(strategy, "line breaker");
                assert_eq!((start, end, len), (0, 4, 12));
            }
            other => panic!("expected a strategy error, got {other:?}"),
        }
    }
}
