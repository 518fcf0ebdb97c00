//! A built rendering session and its phases.

use crate::cache::{CacheRegistry, CacheStore};
use crate::conformance::ConformancePolicy;
use crate::container::DocumentContainer;
use crate::error::{GenerationError, RenderError, ResourceError};
use crate::fonts::RegistrationReport;
use crate::render::{self, DocumentMetadata, GenerationContext, PageSupplier};
use crate::source::DocumentSource;
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};
use vellum_layout::{FontResolver, LaidOutPages, LayoutEngine, PageGeometry, UnicodeImplementation};
use vellum_traits::FsCache;

/// A caller-owned byte sink. Sessions flush it but never close it.
pub type OutputSink = Arc<Mutex<dyn Write + Send>>;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Built,
    LaidOut,
    Generated,
    /// PDF generation stopped part way. The container may hold a partial
    /// document, so the session can only be closed.
    Failed,
    Closed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Built => "built",
            SessionState::LaidOut => "laid out",
            SessionState::Generated => "generated",
            SessionState::Failed => "failed",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a session takes from the builder. Built once, never changed.
pub(crate) struct SessionInputs {
    pub source: DocumentSource,
    pub geometry: PageGeometry,
    pub unicode: UnicodeImplementation,
    pub policy: ConformancePolicy,
    pub pdf_version: String,
    pub producer: String,
    pub color_profile: Option<Arc<Vec<u8>>>,
    pub output: Option<OutputSink>,
    pub container: DocumentContainer,
    pub page_supplier: Arc<dyn PageSupplier>,
    pub layout_engine: Arc<dyn LayoutEngine>,
    pub caches: CacheRegistry,
}

/// Lays out one document and writes it as PDF.
///
/// Phases run in order: [`layout`](Self::layout), then
/// [`create_pdf`](Self::create_pdf). [`close`](Self::close) releases the
/// document container and may be called at any point, any number of times.
/// A failed `create_pdf` leaves the session [`Failed`](SessionState::Failed).
/// A session that is dropped without being closed closes itself.
pub struct RenderingSession {
    state: SessionState,
    inputs: SessionInputs,
    fonts: FontResolver,
    report: RegistrationReport,
    pages: Option<LaidOutPages>,
}

impl RenderingSession {
    pub(crate) fn new(inputs: SessionInputs, fonts: FontResolver, report: RegistrationReport) -> Self {
        Self {
            state: SessionState::Built,
            inputs,
            fonts,
            report,
            pages: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn font_resolver(&self) -> &FontResolver {
        &self.fonts
    }

    pub fn registration_report(&self) -> &RegistrationReport {
        &self.report
    }

    pub fn laid_out_pages(&self) -> Option<&LaidOutPages> {
        self.pages.as_ref()
    }

    pub fn document_container(&self) -> &DocumentContainer {
        &self.inputs.container
    }

    pub fn page_geometry(&self) -> &PageGeometry {
        &self.inputs.geometry
    }

    pub fn conformance(&self) -> ConformancePolicy {
        self.inputs.policy
    }

    pub fn pdf_version(&self) -> &str {
        &self.inputs.pdf_version
    }

    pub fn producer(&self) -> &str {
        &self.inputs.producer
    }

    /// The cache bound to `slot` when this session was built.
    pub fn cache(&self, slot: CacheStore) -> &Arc<dyn FsCache> {
        self.inputs.caches.get(slot)
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), RenderError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    /// Loads the document source and lays it out.
    pub fn layout(&mut self) -> Result<(), RenderError> {
        self.require(SessionState::Built, "lay out")?;
        let document = self.inputs.source.load()?;
        let pages = self.inputs.layout_engine.layout(
            &document,
            &self.fonts,
            &self.inputs.geometry,
            &self.inputs.unicode,
        )?;
        log::debug!(
            "Laid out {} block(s) from {} source into {} page(s)",
            document.blocks.len(),
            self.inputs.source.kind(),
            pages.page_count()
        );
        self.pages = Some(pages);
        self.state = SessionState::LaidOut;
        Ok(())
    }

    /// Writes the laid-out pages into the document container, then saves the
    /// document to the output stream if one was configured.
    ///
    /// # Errors
    ///
    /// Any failure after the state check moves the session to
    /// [`SessionState::Failed`]; later calls are rejected with
    /// `RenderError::InvalidState`.
    pub fn create_pdf(&mut self) -> Result<(), RenderError> {
        self.require(SessionState::LaidOut, "create a PDF from")?;
        let pages = self.pages.as_ref().ok_or(RenderError::InvalidState {
            operation: "create a PDF from",
            state: "missing its laid-out pages",
        })?;

        let mut metadata = DocumentMetadata::new(self.inputs.producer.clone());
        metadata.title = pages.title.clone();
        metadata.lang = pages.lang.clone();
        let ctx = GenerationContext {
            policy: self.inputs.policy,
            metadata: &metadata,
            version: &self.inputs.pdf_version,
            color_profile: self.inputs.color_profile.as_deref().map(Vec::as_slice),
            page_supplier: self.inputs.page_supplier.as_ref(),
            fonts: &self.fonts,
        };
        let output = self.inputs.output.clone();

        let written = self
            .inputs
            .container
            .with_document(|doc| -> Result<(), GenerationError> {
                render::write_document(doc, pages, &ctx)?;
                if let Some(sink) = output {
                    let mut buffer = Vec::new();
                    doc.save_to(&mut buffer)?;
                    let mut sink = sink
                        .lock()
                        .map_err(|_| ResourceError::Poisoned("output stream"))?;
                    sink.write_all(&buffer)?;
                    sink.flush()?;
                    log::debug!("Wrote {} byte(s) to the output stream", buffer.len());
                } else {
                    log::debug!("No output stream; the document stays in its container");
                }
                Ok(())
            })
            .map_err(GenerationError::from)
            .and_then(|inner| inner);

        match written {
            Ok(()) => {
                self.state = SessionState::Generated;
                Ok(())
            }
            Err(e) => {
                log::warn!("PDF generation failed, the session can only be closed: {}", e);
                self.state = SessionState::Failed;
                Err(e.into())
            }
        }
    }

    /// Releases the document container. Closing a closed session does nothing.
    pub fn close(&mut self) -> Result<(), RenderError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        log::debug!("Closing rendering session from state '{}'", self.state);
        self.state = SessionState::Closed;
        self.pages = None;
        self.inputs.container.dispose()?;
        Ok(())
    }
}

impl Drop for RenderingSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed
            && let Err(e) = self.close()
        {
            log::warn!("Failed to close rendering session on drop: {}", e);
        }
    }
}

impl fmt::Debug for RenderingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingSession")
            .field("state", &self.state)
            .field("source", &self.inputs.source.kind())
            .field("geometry", &self.inputs.geometry)
            .field("policy", &self.inputs.policy)
            .field("pdf_version", &self.inputs.pdf_version)
            .field("fonts", &self.fonts.len())
            .finish()
    }
}
