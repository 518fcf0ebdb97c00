use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Malformed markup: {0}")]
    Markup(String),
    #[error("Failed to read document source '{location}': {message}")]
    Source { location: String, message: String },
    #[error("Unsupported document URI '{0}': only file URIs can be loaded")]
    UnsupportedUri(String),
    #[error("Unicode {strategy} returned the range {start}..{end}, which is not a valid slice of a {len}-byte text")]
    Strategy {
        strategy: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("Page of {0:.2}x{1:.2}pt leaves no room for content inside its margins.")]
    EmptyPage(f32, f32),
    #[error("Generic layout error: {0}")]
    Generic(String),
}

pub mod builtin;
pub mod config;
pub mod engine;
pub mod fonts;
pub mod output;
pub mod text;
pub mod unicode;

pub use self::config::PageGeometry;
pub use self::engine::{FlowLayoutEngine, LayoutEngine};
pub use self::fonts::{FontFace, FontResolver, ResolvedFont};
pub use self::output::{LaidOutPage, LaidOutPages, PositionedLine, PositionedRun};
pub use self::unicode::UnicodeImplementation;

pub use vellum_types::geometry::Size;

#[cfg(test)]
pub(crate) mod test_utils;
