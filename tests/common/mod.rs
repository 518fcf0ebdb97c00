#![allow(dead_code)]

pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vellum::types::font::FontWeight;
use vellum::{PdfRendererBuilder, RenderError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    /// Create a GeneratedPdf from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

pub fn fixture_font_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/DejaVuSansMono.ttf")
}

pub fn fixture_font_bytes() -> Vec<u8> {
    std::fs::read(fixture_font_path()).expect("fixture font is readable")
}

/// A supplier closure serving the fixture font.
pub fn fixture_font_supplier() -> impl Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static {
    let bytes = fixture_font_bytes();
    move || -> io::Result<Vec<u8>> { Ok(bytes.clone()) }
}

pub fn output_sink() -> Arc<Mutex<Vec<u8>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// A builder rendering `markup` with the fixture font registered as "Mono".
pub fn builder_with_font(markup: &str, sink: Arc<Mutex<Vec<u8>>>) -> PdfRendererBuilder {
    PdfRendererBuilder::new()
        .with_html_content(markup, None)
        .use_font(fixture_font_supplier(), "Mono", FontWeight::Regular, None, true)
        .to_stream(sink)
}

/// Runs `builder` and loads what it wrote to `sink`.
pub fn render(
    builder: &PdfRendererBuilder,
    sink: &Arc<Mutex<Vec<u8>>>,
) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    builder.run()?;
    let bytes = sink.lock().map_err(|_| "output sink poisoned")?.clone();
    GeneratedPdf::from_bytes(bytes)
}

pub fn render_error(builder: &PdfRendererBuilder) -> RenderError {
    match builder.run() {
        Ok(()) => panic!("expected rendering to fail"),
        Err(e) => e,
    }
}

pub const SIMPLE_PAGE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml" lang="en">
  <head><title>Simple Page</title></head>
  <body style="font-family: Mono">
    <h1>Heading</h1>
    <p>Some body text for the page.</p>
  </body>
</html>"#;

