use super::strategy_slice;
use super::wrapper::{Fragment, LineBox};
use crate::LayoutError;
use crate::unicode::UnicodeImplementation;
use vellum_types::TextDirection;

/// Converts a line from logical to visual order.
///
/// Each fragment is split into directional runs, the runs are ordered by the
/// bound reorderer and right-to-left runs are shaped for drawing.
pub fn visual_fragments(line: LineBox, unicode: &UnicodeImplementation) -> Result<Vec<Fragment>, LayoutError> {
    let base = unicode.default_direction;
    let mut pieces: Vec<(Fragment, TextDirection)> = Vec::new();

    for fragment in line.fragments {
        let runs = unicode.splitter.split(&fragment.text, base);
        if runs.len() <= 1 {
            let direction = runs.first().map(|r| r.direction).unwrap_or(base);
            pieces.push((fragment, direction));
            continue;
        }
        for run in runs {
            let text = strategy_slice(&fragment.text, run.start, run.end, "bidi splitter")?.to_string();
            let width = fragment.font.measure(&text, fragment.size);
            pieces.push((
                Fragment {
                    text,
                    font: fragment.font.clone(),
                    size: fragment.size,
                    width,
                },
                run.direction,
            ));
        }
    }

    if base == TextDirection::Ltr && pieces.iter().all(|(_, d)| *d == TextDirection::Ltr) {
        return Ok(pieces.into_iter().map(|(f, _)| f).collect());
    }

    let directions: Vec<TextDirection> = pieces.iter().map(|(_, d)| *d).collect();
    let order = unicode.reorderer.visual_order(&directions, base);
    let mut slots: Vec<Option<(Fragment, TextDirection)>> = pieces.into_iter().map(Some).collect();

    Ok(order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .map(|(mut fragment, direction)| {
            fragment.text = unicode.reorderer.shape_run(&fragment.text, direction);
            fragment
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::ResolvedFont;
    use std::sync::Arc;
    use vellum_traits::unicode::{BidiRun, BidiSplitter};

    /// Reports a run ending one byte past the text.
    #[derive(Debug)]
    struct OverrunSplitter;

    impl BidiSplitter for OverrunSplitter {
        fn split(&self, text: &str, _base: TextDirection) -> Vec<BidiRun> {
            vec![
                BidiRun { start: 0, end: 1, direction: TextDirection::Ltr },
                BidiRun { start: 1, end: text.len() + 1, direction: TextDirection::Rtl },
            ]
        }
    }

    fn line(texts: &[&str]) -> LineBox {
        let fragments: Vec<Fragment> = texts
            .iter()
            .map(|t| Fragment {
                text: t.to_string(),
                font: ResolvedFont::BuiltIn,
                size: 12.0,
                width: ResolvedFont::BuiltIn.measure(t, 12.0),
            })
            .collect();
        let width = fragments.iter().map(|f| f.width).sum();
        LineBox { fragments, width }
    }

    #[test]
    fn test_ltr_line_is_untouched() {
        let out = visual_fragments(line(&["abc", "def"]), &UnicodeImplementation::default()).unwrap();
        let texts: Vec<_> = out.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def"]);
    }

    #[test]
    fn test_rtl_run_is_shaped_in_place() {
        let out = visual_fragments(line(&["ab אבג"]), &UnicodeImplementation::default()).unwrap();
        let texts: Vec<_> = out.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["ab ", "גבא"]);
    }

    #[test]
    fn test_rtl_base_reverses_run_order() {
        let unicode = UnicodeImplementation {
            default_direction: TextDirection::Rtl,
            ..Default::default()
        };
        let out = visual_fragments(line(&["אב", "cd"]), &unicode).unwrap();
        let texts: Vec<_> = out.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["cd", "בא"]);
    }

    #[test]
    fn test_splitter_range_past_end_is_an_error() {
        let unicode = UnicodeImplementation {
            splitter: Arc::new(OverrunSplitter),
            ..Default::default()
        };
        match visual_fragments(line(&["abc"]), &unicode) {
            Err(LayoutError::Strategy { strategy, start, end, len }) => {
                assert_eq!(strategy, "bidi splitter");
                assert_eq!((start, end, len), (1, 4, 3));
            }
            other => panic!("expected a strategy error, got {other:?}"),
        }
    }
}
