//! Rendering sessions that turn XHTML or document trees into PDF.
//!
//! A [`PdfRendererBuilder`] collects configuration. Building it produces a
//! [`RenderingSession`], which lays the document out, writes the PDF and then
//! releases its document container. [`PdfRendererBuilder::run`] does all
//! three in one call.
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use vellum::{PdfAConformance, PdfRendererBuilder};
//! use vellum::types::font::{FontStyle, FontWeight};
//!
//! let output = Arc::new(Mutex::new(Vec::new()));
//! PdfRendererBuilder::new()
//!     .with_html_content("<html><body><p>Hello</p></body></html>", None)
//!     .use_font_file("fonts/Body.ttf", "Body", FontWeight::Regular, Some(FontStyle::Normal), true)
//!     .use_pdf_a_conformance(PdfAConformance::PdfA2B)
//!     .to_stream(output.clone())
//!     .run()?;
//! # Ok::<(), vellum::RenderError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod conformance;
pub mod container;
pub mod error;
pub mod fonts;
pub mod markup;
pub mod options;
pub mod render;
pub mod session;
pub mod source;

pub use builder::{PdfRendererBuilder, PdfRendererBuilderState};
pub use cache::{CacheRegistry, CacheStore};
pub use conformance::{ConformancePolicy, PdfAConformance};
pub use container::DocumentContainer;
pub use error::{ConfigError, GenerationError, RenderError, ResourceError};
pub use fonts::{AddedFont, FontSource, RegistrationReport, SkippedFont};
pub use options::RenderOptions;
pub use render::{DefaultPageSupplier, PageSupplier};
pub use session::{OutputSink, RenderingSession, SessionState};
pub use source::{DocumentSource, DocumentSources};

pub use vellum_layout as layout;
pub use vellum_traits as traits;
pub use vellum_types as types;
