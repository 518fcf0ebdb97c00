pub mod document;
pub mod font;
pub mod geometry;
pub mod text;

pub use document::{Block, BlockKind, DocumentTree, TextRun, TextTransform};
pub use font::{FontStyle, FontWeight};
pub use geometry::{PageDimensions, PageSizeUnits, Size};
pub use text::TextDirection;
