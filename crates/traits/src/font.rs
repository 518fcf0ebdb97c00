//! Font sources and font loading errors.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Error type for font loading operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontError {
    #[error("Failed to load font '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Invalid font data for family '{family}': {message}")]
    InvalidData { family: String, message: String },

    #[error("Font supplier for family '{family}' failed: {message}")]
    Supplier { family: String, message: String },
}

/// Shared font data type (reference-counted bytes).
pub type SharedFontData = Arc<Vec<u8>>;

/// Produces the bytes of a font program on demand.
///
/// Suppliers are caller code. A failing supplier is treated as a defect in
/// that code, so its error is never swallowed by the renderer.
pub trait FontSupplier: Send + Sync {
    fn supply(&self) -> io::Result<Vec<u8>>;
}

impl<F> FontSupplier for F
where
    F: Fn() -> io::Result<Vec<u8>> + Send + Sync,
{
    fn supply(&self) -> io::Result<Vec<u8>> {
        self()
    }
}
