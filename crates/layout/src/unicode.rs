use std::sync::Arc;
use vellum_traits::{
    BidiReorderer, BidiSplitter, CharBreaker, DefaultBidiReorderer, DefaultBidiSplitter, LineBreaker,
    LowerCaseTransformer, SimpleCharBreaker, TextTransformer, TitleCaseTransformer, UpperCaseTransformer,
    WhitespaceLineBreaker,
};
use vellum_types::{TextDirection, TextTransform};

/// The Unicode services a layout run uses, bundled so they travel together.
#[derive(Debug, Clone)]
pub struct UnicodeImplementation {
    pub splitter: Arc<dyn BidiSplitter>,
    pub reorderer: Arc<dyn BidiReorderer>,
    pub line_breaker: Arc<dyn LineBreaker>,
    pub char_breaker: Arc<dyn CharBreaker>,
    pub to_lower: Arc<dyn TextTransformer>,
    pub to_upper: Arc<dyn TextTransformer>,
    pub to_title: Arc<dyn TextTransformer>,
    pub default_direction: TextDirection,
}

impl Default for UnicodeImplementation {
    fn default() -> Self {
        Self {
            splitter: Arc::new(DefaultBidiSplitter),
            reorderer: Arc::new(DefaultBidiReorderer),
            line_breaker: Arc::new(WhitespaceLineBreaker),
            char_breaker: Arc::new(SimpleCharBreaker),
            to_lower: Arc::new(LowerCaseTransformer),
            to_upper: Arc::new(UpperCaseTransformer),
            to_title: Arc::new(TitleCaseTransformer),
            default_direction: TextDirection::Ltr,
        }
    }
}

impl UnicodeImplementation {
    pub fn apply_transform(&self, text: &str, transform: TextTransform) -> String {
        match transform {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => self.to_upper.transform(text),
            TextTransform::Lowercase => self.to_lower.transform(text),
            TextTransform::Capitalize => self.to_title.transform(text),
        }
    }
}
