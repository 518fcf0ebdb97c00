pub mod cache;
pub mod font;
pub mod unicode;

pub use cache::{CacheValue, FontMetrics, FsCache, InMemoryCacheStore, NoOpCacheStore};
pub use font::{FontError, FontSupplier, SharedFontData};
pub use unicode::{
    BidiReorderer, BidiRun, BidiSplitter, CharBreaker, DefaultBidiReorderer, DefaultBidiSplitter,
    LineBreaker, LowerCaseTransformer, SimpleCharBreaker, TextTransformer, TitleCaseTransformer,
    UpperCaseTransformer, WhitespaceLineBreaker,
};
