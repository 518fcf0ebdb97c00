//! Pluggable Unicode services used by layout.
//!
//! The renderer bundles one implementation of each trait per session. The
//! defaults here are deliberately small: they cover the scripts and break
//! rules a document generator needs without pulling in full UAX #9/#14 tables.
//! Callers with stricter needs bind their own implementations.

use std::fmt::Debug;
use vellum_types::TextDirection;

/// A maximal run of text with one resolved direction. `start`/`end` are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidiRun {
    pub start: usize,
    pub end: usize,
    pub direction: TextDirection,
}

/// Splits text into directional runs.
pub trait BidiSplitter: Send + Sync + Debug {
    fn split(&self, text: &str, base: TextDirection) -> Vec<BidiRun>;
}

/// Orders directional runs visually and shapes their content for display.
pub trait BidiReorderer: Send + Sync + Debug {
    /// Returns indices into `directions` in left-to-right display order.
    fn visual_order(&self, directions: &[TextDirection], base: TextDirection) -> Vec<usize>;

    /// Returns the characters of a run in the order they are drawn.
    fn shape_run(&self, text: &str, direction: TextDirection) -> String;
}

/// Finds the byte offsets at which a line may be broken.
pub trait LineBreaker: Send + Sync + Debug {
    /// Offsets are positions *after* which a break is allowed, in ascending order.
    fn break_opportunities(&self, text: &str) -> Vec<usize>;
}

/// Finds the byte offsets of character boundaries, used to break words that
/// do not fit on a line.
pub trait CharBreaker: Send + Sync + Debug {
    fn char_boundaries(&self, text: &str) -> Vec<usize>;
}

pub trait TextTransformer: Send + Sync + Debug {
    fn transform(&self, text: &str) -> String;
}

fn is_strong_rtl(c: char) -> bool {
    matches!(c as u32,
        0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF | 0x10800..=0x10FFF | 0x1E800..=0x1EFFF)
}

fn strong_direction(c: char) -> Option<TextDirection> {
    if is_strong_rtl(c) {
        Some(TextDirection::Rtl)
    } else if c.is_alphabetic() {
        Some(TextDirection::Ltr)
    } else {
        None
    }
}

/// Classifies characters as strong LTR, strong RTL or neutral. Neutrals join
/// the run before them; leading neutrals take the base direction.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBidiSplitter;

impl BidiSplitter for DefaultBidiSplitter {
    fn split(&self, text: &str, base: TextDirection) -> Vec<BidiRun> {
        let mut runs: Vec<BidiRun> = Vec::new();
        for (offset, c) in text.char_indices() {
            let end = offset + c.len_utf8();
            let current = runs.last().map(|r| r.direction);
            let direction = strong_direction(c).or(current).unwrap_or(base);
            match runs.last_mut() {
                Some(run) if run.direction == direction => run.end = end,
                _ => runs.push(BidiRun {
                    start: offset,
                    end,
                    direction,
                }),
            }
        }
        runs
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBidiReorderer;

impl BidiReorderer for DefaultBidiReorderer {
    fn visual_order(&self, directions: &[TextDirection], base: TextDirection) -> Vec<usize> {
        let order: Vec<usize> = (0..directions.len()).collect();
        match base {
            TextDirection::Ltr => order,
            TextDirection::Rtl => order.into_iter().rev().collect(),
        }
    }

    fn shape_run(&self, text: &str, direction: TextDirection) -> String {
        match direction {
            TextDirection::Ltr => text.to_string(),
            TextDirection::Rtl => text.chars().rev().collect(),
        }
    }
}

/// Allows a break after each run of whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceLineBreaker;

impl LineBreaker for WhitespaceLineBreaker {
    fn break_opportunities(&self, text: &str) -> Vec<usize> {
        let mut breaks = Vec::new();
        let mut chars = text.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if !c.is_whitespace() {
                continue;
            }
            let next_is_space = chars.peek().is_some_and(|(_, n)| n.is_whitespace());
            if !next_is_space {
                breaks.push(offset + c.len_utf8());
            }
        }
        breaks
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleCharBreaker;

impl CharBreaker for SimpleCharBreaker {
    fn char_boundaries(&self, text: &str) -> Vec<usize> {
        text.char_indices()
            .map(|(offset, _)| offset)
            .skip(1)
            .chain(std::iter::once(text.len()))
            .filter(|&offset| offset > 0)
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LowerCaseTransformer;

impl TextTransformer for LowerCaseTransformer {
    fn transform(&self, text: &str) -> String {
        text.to_lowercase()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UpperCaseTransformer;

impl TextTransformer for UpperCaseTransformer {
    fn transform(&self, text: &str) -> String {
        text.to_uppercase()
    }
}

/// Capitalizes the first letter of each word.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleCaseTransformer;

impl TextTransformer for TitleCaseTransformer {
    fn transform(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut at_word_start = true;
        for c in text.chars() {
            if at_word_start && c.is_alphabetic() {
                out.extend(c.to_uppercase());
                at_word_start = false;
            } else {
                out.push(c);
                if c.is_whitespace() {
                    at_word_start = true;
                }
            }
        }
        out
    }
}
