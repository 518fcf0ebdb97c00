// src/builder.rs
use crate::cache::{CacheRegistry, CacheStore};
use crate::conformance::{ConformancePolicy, PdfAConformance};
use crate::container::DocumentContainer;
use crate::error::{ConfigError, RenderError, ResourceError};
use crate::fonts::{AddedFont, FontSource, register_fonts};
use crate::options::RenderOptions;
use crate::render::{DefaultPageSupplier, PageSupplier};
use crate::session::{OutputSink, RenderingSession, SessionInputs};
use crate::source::DocumentSources;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use vellum_layout::config::DEFAULT_MARGIN;
use vellum_layout::{FlowLayoutEngine, FontResolver, LayoutEngine, PageGeometry, UnicodeImplementation};
use vellum_traits::{BidiReorderer, BidiSplitter, CharBreaker, FontSupplier, FsCache, LineBreaker, TextTransformer};
use vellum_types::font::{FontStyle, FontWeight};
use vellum_types::{DocumentTree, PageDimensions, PageSizeUnits, Size, TextDirection};

const DEFAULT_PDF_VERSION: f32 = 1.7;
const PDFA_1_VERSION: f32 = 1.4;

/// The draft configuration collected by a `PdfRendererBuilder`.
///
/// A rendering session takes a snapshot of this state when it is built;
/// changing the builder afterwards does not affect sessions already built.
#[derive(Clone)]
pub struct PdfRendererBuilderState {
    pub sources: DocumentSources,
    pub page_dimensions: PageDimensions,
    pub margin: f32,
    pub unicode: UnicodeImplementation,
    pub fonts: Vec<AddedFont>,
    pub output: Option<OutputSink>,
    pub pdf_version: Option<f32>,
    pub pdfa_conformance: PdfAConformance,
    pub pdf_ua: bool,
    pub color_profile: Option<Arc<Vec<u8>>>,
    pub document_container: Option<DocumentContainer>,
    pub producer: Option<String>,
    pub caches: CacheRegistry,
    pub page_supplier: Arc<dyn PageSupplier>,
    pub layout_engine: Arc<dyn LayoutEngine>,
}

impl Default for PdfRendererBuilderState {
    fn default() -> Self {
        Self {
            sources: DocumentSources::default(),
            page_dimensions: PageDimensions::default(),
            margin: DEFAULT_MARGIN,
            unicode: UnicodeImplementation::default(),
            fonts: Vec::new(),
            output: None,
            pdf_version: None,
            pdfa_conformance: PdfAConformance::None,
            pdf_ua: false,
            color_profile: None,
            document_container: None,
            producer: None,
            caches: CacheRegistry::new(),
            page_supplier: Arc::new(DefaultPageSupplier),
            layout_engine: Arc::new(FlowLayoutEngine::new()),
        }
    }
}

impl fmt::Debug for PdfRendererBuilderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfRendererBuilderState")
            .field("sources", &self.sources)
            .field("page_dimensions", &self.page_dimensions)
            .field("margin", &self.margin)
            .field("fonts", &self.fonts)
            .field("output", &self.output.is_some())
            .field("pdf_version", &self.pdf_version)
            .field("pdfa_conformance", &self.pdfa_conformance)
            .field("pdf_ua", &self.pdf_ua)
            .field("color_profile", &self.color_profile.as_ref().map(|p| p.len()))
            .field("document_container", &self.document_container)
            .field("producer", &self.producer)
            .field("caches", &self.caches)
            .field("page_supplier", &self.page_supplier)
            .field("layout_engine", &self.layout_engine)
            .finish()
    }
}

/// Checks a requested PDF version and formats it for the file header.
fn pdf_version_string(version: f32) -> Result<String, ConfigError> {
    let tenths = (version * 10.0).round();
    let exact = (version * 10.0 - tenths).abs() < 1e-3;
    if exact && ((10.0..=17.0).contains(&tenths) || tenths == 20.0) {
        Ok(format!("{:.1}", tenths / 10.0))
    } else {
        Err(ConfigError::UnsupportedPdfVersion(version))
    }
}

/// A builder for creating a `RenderingSession`, or rendering in one step with `run`.
#[derive(Debug, Clone, Default)]
pub struct PdfRendererBuilder {
    state: PdfRendererBuilderState,
}

impl PdfRendererBuilder {
    /// Creates a builder with A4 pages, the built-in Unicode services and no fonts.
    pub fn new() -> Self { Default::default() }

    /// The configuration collected so far.
    pub fn state(&self) -> &PdfRendererBuilderState { &self.state }

    /// Renders XHTML markup. Relative URIs resolve against `base_uri`.
    pub fn with_html_content(mut self, markup: impl Into<String>, base_uri: Option<&str>) -> Self {
        self.state.sources.markup = Some(markup.into());
        self.state.sources.base_uri = base_uri.map(str::to_string);
        self
    }

    /// Renders an already-built document tree. Takes precedence over every other source.
    pub fn with_document_tree(mut self, tree: DocumentTree) -> Self { self.state.sources.tree = Some(Arc::new(tree)); self }

    /// Renders an XHTML file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self { self.state.sources.file = Some(path.into()); self }

    /// Renders the document at `uri`. Only `file:` URIs can be loaded.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self { self.state.sources.uri = Some(uri.into()); self }

    /// Sets the page size used when the document does not specify one.
    /// Width and height must be given together.
    pub fn use_default_page_size(mut self, width: Option<f32>, height: Option<f32>, units: PageSizeUnits) -> Self {
        self.state.page_dimensions = PageDimensions::new(width, height, units);
        self
    }

    /// Sets the page margin in points, applied on all four sides.
    pub fn use_page_margin(mut self, margin: f32) -> Self { self.state.margin = margin; self }

    /// Splits text into directional runs. Runs must be byte ranges of the text.
    pub fn use_unicode_bidi_splitter(mut self, splitter: Arc<dyn BidiSplitter>) -> Self { self.state.unicode.splitter = splitter; self }

    /// Orders directional runs for display and shapes right-to-left runs.
    pub fn use_unicode_bidi_reorderer(mut self, reorderer: Arc<dyn BidiReorderer>) -> Self { self.state.unicode.reorderer = reorderer; self }

    /// Finds line break opportunities, reported as byte offsets.
    pub fn use_unicode_line_breaker(mut self, breaker: Arc<dyn LineBreaker>) -> Self { self.state.unicode.line_breaker = breaker; self }

    /// Finds where overlong words may be split, reported as byte offsets.
    pub fn use_unicode_character_breaker(mut self, breaker: Arc<dyn CharBreaker>) -> Self { self.state.unicode.char_breaker = breaker; self }

    /// Applied to runs styled `text-transform: lowercase`.
    pub fn use_unicode_to_lower_transformer(mut self, transformer: Arc<dyn TextTransformer>) -> Self { self.state.unicode.to_lower = transformer; self }

    /// Applied to runs styled `text-transform: uppercase`.
    pub fn use_unicode_to_upper_transformer(mut self, transformer: Arc<dyn TextTransformer>) -> Self { self.state.unicode.to_upper = transformer; self }

    /// Applied to runs styled `text-transform: capitalize`.
    pub fn use_unicode_to_title_transformer(mut self, transformer: Arc<dyn TextTransformer>) -> Self { self.state.unicode.to_title = transformer; self }

    /// Sets the base direction for paragraphs that do not declare one.
    pub fn default_text_direction(mut self, direction: TextDirection) -> Self { self.state.unicode.default_direction = direction; self }

    /// Adds a font whose bytes come from `supplier`. A failing supplier fails the build.
    ///
    /// A `style` of `None` lets the face match any requested style.
    pub fn use_font(
        mut self,
        supplier: impl FontSupplier + 'static,
        family: impl Into<String>,
        weight: FontWeight,
        style: Option<FontStyle>,
        subset: bool,
    ) -> Self {
        self.state.fonts.push(AddedFont {
            source: FontSource::Supplier(Arc::new(supplier)),
            family: family.into(),
            weight,
            style,
            subset,
        });
        self
    }

    /// Adds a font file. A file that cannot be loaded is skipped with a warning.
    pub fn use_font_file(
        mut self,
        path: impl Into<PathBuf>,
        family: impl Into<String>,
        weight: FontWeight,
        style: Option<FontStyle>,
        subset: bool,
    ) -> Self {
        self.state.fonts.push(AddedFont {
            source: FontSource::File(path.into()),
            family: family.into(),
            weight,
            style,
            subset,
        });
        self
    }

    /// Writes the finished PDF to `sink`. The sink is flushed but not closed.
    pub fn to_stream<W: Write + Send + 'static>(mut self, sink: Arc<Mutex<W>>) -> Self {
        let sink: OutputSink = sink;
        self.state.output = Some(sink);
        self
    }

    /// Sets the PDF version. Defaults to 1.7, or 1.4 under PDF/A-1.
    pub fn use_pdf_version(mut self, version: f32) -> Self { self.state.pdf_version = Some(version); self }

    /// Targets a PDF/A level. Every font must then be embedded.
    pub fn use_pdf_a_conformance(mut self, conformance: PdfAConformance) -> Self { self.state.pdfa_conformance = conformance; self }

    /// Tags the output for accessibility and declares PDF/UA-1 in its metadata.
    pub fn use_pdf_ua_accessibility(mut self, enabled: bool) -> Self { self.state.pdf_ua = enabled; self }

    /// Sets the ICC profile written as the PDF/A output intent.
    pub fn use_color_profile(mut self, icc_profile: Vec<u8>) -> Self { self.state.color_profile = Some(Arc::new(icc_profile)); self }

    /// Writes into a caller-supplied document. The container is disposed when the session closes.
    pub fn use_document_container(mut self, container: DocumentContainer) -> Self { self.state.document_container = Some(container); self }

    /// Overrides the Producer written to the Info dictionary and XMP metadata.
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self { self.state.producer = Some(producer.into()); self }

    /// Replaces the cache bound to `slot`. Sessions already built keep their binding.
    pub fn use_cache_store(mut self, slot: CacheStore, cache: Arc<dyn FsCache>) -> Self { self.state.caches.replace(slot, cache); self }

    /// Creates the page objects the laid-out pages are written into.
    pub fn use_page_supplier(mut self, supplier: Arc<dyn PageSupplier>) -> Self { self.state.page_supplier = supplier; self }

    /// Replaces the engine that turns the document tree into pages.
    pub fn use_layout_engine(mut self, engine: Arc<dyn LayoutEngine>) -> Self { self.state.layout_engine = engine; self }

    /// Applies every field set in `options`; unset fields keep their current values.
    pub fn with_options(mut self, options: &RenderOptions) -> Self {
        if options.page_width.is_some() || options.page_height.is_some() {
            self.state.page_dimensions = PageDimensions::new(
                options.page_width,
                options.page_height,
                options.page_units.unwrap_or(self.state.page_dimensions.units),
            );
        } else if let Some(units) = options.page_units {
            self.state.page_dimensions.units = units;
        }
        if let Some(margin) = options.margin {
            self.state.margin = margin;
        }
        if let Some(version) = options.pdf_version {
            self.state.pdf_version = Some(version);
        }
        if let Some(producer) = &options.producer {
            self.state.producer = Some(producer.clone());
        }
        if let Some(conformance) = options.pdfa_conformance {
            self.state.pdfa_conformance = conformance;
        }
        if let Some(pdf_ua) = options.pdf_ua {
            self.state.pdf_ua = pdf_ua;
        }
        if let Some(direction) = options.text_direction {
            self.state.unicode.default_direction = direction;
        }
        self
    }

    fn resolve_geometry(&self) -> Result<PageGeometry, ConfigError> {
        let dimensions = &self.state.page_dimensions;
        let size = dimensions.resolve(Size::a4()).ok_or(ConfigError::InconsistentPageSize {
            width: dimensions.width,
            height: dimensions.height,
        })?;
        if !(size.width > 0.0 && size.height > 0.0) || self.state.margin < 0.0 {
            return Err(ConfigError::InvalidPageSize {
                width: size.width,
                height: size.height,
            });
        }
        Ok(PageGeometry::new(size).with_margin(self.state.margin))
    }

    fn resolve_pdf_version(&self) -> Result<String, ConfigError> {
        match self.state.pdf_version {
            Some(version) => pdf_version_string(version),
            None if self.state.pdfa_conformance.part() == Some(1) => pdf_version_string(PDFA_1_VERSION),
            None => pdf_version_string(DEFAULT_PDF_VERSION),
        }
    }

    /// Freezes the current configuration into a new session and registers its fonts.
    ///
    /// # Errors
    ///
    /// `ConfigError` for inconsistent page geometry, a missing source or
    /// output, or an unsupported PDF version; `FontError` when a font supplier
    /// fails. Font files that cannot be loaded do not fail the build; they are
    /// listed in the session's registration report.
    pub fn build_pdf_renderer(&self) -> Result<RenderingSession, RenderError> {
        let geometry = self.resolve_geometry()?;
        let source = self.state.sources.select()?;
        let pdf_version = self.resolve_pdf_version()?;
        if self.state.output.is_none() && self.state.document_container.is_none() {
            return Err(ConfigError::MissingOutput.into());
        }

        let container = self.state.document_container.clone().unwrap_or_default();
        if container.is_closed() {
            return Err(ResourceError::AlreadyDisposed.into());
        }

        let policy = ConformancePolicy::new(self.state.pdfa_conformance, self.state.pdf_ua);
        let producer = self
            .state
            .producer
            .clone()
            .unwrap_or_else(|| format!("vellum {}", env!("CARGO_PKG_VERSION")));

        let mut fonts = FontResolver::new(self.state.caches.get(CacheStore::PdfFontMetrics).clone());
        let report = register_fonts(&self.state.fonts, &mut fonts)?;

        log::info!(
            "Built rendering session: {} source, {:.1}x{:.1}pt pages, {} font(s), PDF {} ({}{})",
            source.kind(),
            geometry.size.width,
            geometry.size.height,
            fonts.len(),
            pdf_version,
            policy.pdfa,
            if policy.pdf_ua { ", PDF/UA" } else { "" }
        );

        let inputs = SessionInputs {
            source,
            geometry,
            unicode: self.state.unicode.clone(),
            policy,
            pdf_version,
            producer,
            color_profile: self.state.color_profile.clone(),
            output: self.state.output.clone(),
            container,
            page_supplier: self.state.page_supplier.clone(),
            layout_engine: self.state.layout_engine.clone(),
            caches: self.state.caches.clone(),
        };
        Ok(RenderingSession::new(inputs, fonts, report))
    }

    /// Builds a session, lays out, writes the PDF and closes the session.
    ///
    /// The session is closed on every path. The first failure is returned; a
    /// failure to close after an earlier error is only logged.
    pub fn run(&self) -> Result<(), RenderError> {
        let mut session = self.build_pdf_renderer()?;
        let result = session.layout().and_then(|_| session.create_pdf());
        let closed = session.close();
        match (result, closed) {
            (Ok(()), closed) => closed,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                log::warn!("Failed to close rendering session after an error: {}", close_error);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> Arc<Mutex<Vec<u8>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn builder() -> PdfRendererBuilder {
        PdfRendererBuilder::new()
            .with_html_content("<p>Hello</p>", None)
            .to_stream(sink())
    }

    #[test]
    fn test_pdf_version_validation() {
        assert_eq!(pdf_version_string(1.4).unwrap(), "1.4");
        assert_eq!(pdf_version_string(2.0).unwrap(), "2.0");
        assert!(matches!(pdf_version_string(1.8), Err(ConfigError::UnsupportedPdfVersion(_))));
        assert!(matches!(pdf_version_string(1.45), Err(ConfigError::UnsupportedPdfVersion(_))));
    }

    #[test]
    fn test_pdfa_1_defaults_to_version_1_4() {
        let session = builder()
            .use_pdf_a_conformance(PdfAConformance::PdfA1B)
            .build_pdf_renderer()
            .unwrap();
        assert_eq!(session.pdf_version(), "1.4");

        let session = builder()
            .use_pdf_a_conformance(PdfAConformance::PdfA2B)
            .build_pdf_renderer()
            .unwrap();
        assert_eq!(session.pdf_version(), "1.7");
    }

    #[test]
    fn test_default_producer_names_the_crate() {
        let session = builder().build_pdf_renderer().unwrap();
        assert!(session.producer().starts_with("vellum "));
    }

    #[test]
    fn test_missing_output() {
        let err = PdfRendererBuilder::new()
            .with_html_content("<p>Hello</p>", None)
            .build_pdf_renderer()
            .unwrap_err();
        assert!(matches!(err, RenderError::Config(ConfigError::MissingOutput)));
    }

    #[test]
    fn test_options_keep_unset_fields() {
        let options = RenderOptions::from_json(r#"{"pdfUa": true}"#).unwrap();
        let builder = builder()
            .use_default_page_size(Some(100.0), Some(150.0), PageSizeUnits::Mm)
            .with_producer("custom")
            .with_options(&options);
        assert!(builder.state().pdf_ua);
        assert_eq!(builder.state().producer.as_deref(), Some("custom"));
        assert_eq!(builder.state().page_dimensions.width, Some(100.0));
    }

    #[test]
    fn test_negative_margin_is_rejected() {
        let err = builder().use_page_margin(-1.0).build_pdf_renderer().unwrap_err();
        assert!(matches!(err, RenderError::Config(ConfigError::InvalidPageSize { .. })));
    }
}
