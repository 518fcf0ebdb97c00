use crate::conformance::PdfAConformance;
use thiserror::Error;
use vellum_layout::LayoutError;
use vellum_traits::FontError;

/// Inconsistent or incomplete configuration, detected when a session is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Page width and height must both be set or both be left unset (width: {width:?}, height: {height:?})")]
    InconsistentPageSize { width: Option<f32>, height: Option<f32> },

    #[error("Page dimensions must be positive, got {width}x{height}")]
    InvalidPageSize { width: f32, height: f32 },

    #[error("No document source has been configured. Use `with_html_content`, `with_document_tree`, `with_file` or `with_uri`.")]
    MissingSource,

    #[error("No output has been configured. Use `to_stream` or `use_document_container`.")]
    MissingOutput,

    #[error("Invalid URI '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    #[error("Unsupported PDF version {0}; expected 1.0 to 1.7 or 2.0")]
    UnsupportedPdfVersion(f32),

    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Failure while turning laid-out pages into PDF output.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{conformance} requires every font to be embedded, but '{font}' is not")]
    FontNotEmbedded { font: String, conformance: PdfAConformance },

    #[error("Font '{0}' could not be parsed while embedding it")]
    CorruptFont(String),

    #[error("Page supplier failed for page {page}: {message}")]
    PageSupplier { page: usize, message: String },

    #[error("PDF generation error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document container error: {0}")]
    Container(#[from] ResourceError),
}

impl From<lopdf::Error> for GenerationError {
    fn from(err: lopdf::Error) -> Self {
        GenerationError::Pdf(err.to_string())
    }
}

/// Failure while acquiring or releasing session resources.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("The document container has already been disposed")]
    AlreadyDisposed,

    #[error("The {0} lock was poisoned by a panic in another thread")]
    Poisoned(&'static str),
}

/// The error type returned by rendering sessions and the builder.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Font loading failed: {0}")]
    Font(#[from] FontError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("PDF generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Cannot {operation} a session that is {state}")]
    InvalidState { operation: &'static str, state: &'static str },
}
