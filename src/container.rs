//! The document a rendering session writes into.

use crate::error::ResourceError;
use lopdf::Document;
use std::sync::{Arc, Mutex};

/// A shareable handle to an in-memory PDF document.
///
/// Sessions write their pages into the container and dispose of it when they
/// close. Clones share the same document, so a caller that supplies a
/// container can inspect the document after generation and before the session
/// is closed.
#[derive(Debug, Clone)]
pub struct DocumentContainer {
    inner: Arc<Mutex<Option<Document>>>,
}

impl DocumentContainer {
    pub fn new() -> Self {
        Self::from_document(Document::with_version("1.7"))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(document))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().map(|guard| guard.is_none()).unwrap_or(true)
    }

    /// Runs `f` against the document.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> Result<R, ResourceError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ResourceError::Poisoned("document container"))?;
        let document = guard.as_mut().ok_or(ResourceError::AlreadyDisposed)?;
        Ok(f(document))
    }

    /// Drops the document. Every clone observes the container as closed.
    pub(crate) fn dispose(&self) -> Result<(), ResourceError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ResourceError::Poisoned("document container"))?;
        match guard.take() {
            Some(document) => {
                log::debug!("Disposed document container ({} object(s))", document.objects.len());
                Ok(())
            }
            None => Err(ResourceError::AlreadyDisposed),
        }
    }
}

impl Default for DocumentContainer {
    fn default() -> Self {
        Self::new()
    }
}
