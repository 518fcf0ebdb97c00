//! Document sources and the order in which they are consulted.
//!
//! A builder may be given several sources. Exactly one is used, chosen by a
//! fixed precedence: an in-memory tree, then markup, then a file, then a URI.
//! The others are ignored.

use crate::error::ConfigError;
use crate::markup;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;
use vellum_layout::LayoutError;
use vellum_types::DocumentTree;

/// Every source a builder has been given.
#[derive(Debug, Clone, Default)]
pub struct DocumentSources {
    pub tree: Option<Arc<DocumentTree>>,
    pub markup: Option<String>,
    pub base_uri: Option<String>,
    pub file: Option<PathBuf>,
    pub uri: Option<String>,
}

/// The one source a session loads its document from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Tree(Arc<DocumentTree>),
    Markup { content: String, base_uri: Option<Url> },
    File(PathBuf),
    Uri(Url),
}

fn parse_uri(uri: &str, base: Option<&Url>) -> Result<Url, ConfigError> {
    let invalid = |e: url::ParseError| ConfigError::InvalidUri {
        uri: uri.to_string(),
        message: e.to_string(),
    };
    match Url::parse(uri) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(uri).map_err(invalid),
            None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
        },
        Err(e) => Err(invalid(e)),
    }
}

impl DocumentSources {
    pub fn is_empty(&self) -> bool {
        self.tree.is_none() && self.markup.is_none() && self.file.is_none() && self.uri.is_none()
    }

    /// Picks the authoritative source.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingSource` when nothing was configured, and
    /// `ConfigError::InvalidUri` when the chosen URI or the base URI cannot be parsed.
    pub fn select(&self) -> Result<DocumentSource, ConfigError> {
        let base = self.base_uri.as_deref().map(|b| parse_uri(b, None)).transpose()?;

        let source = if let Some(tree) = &self.tree {
            DocumentSource::Tree(tree.clone())
        } else if let Some(content) = &self.markup {
            DocumentSource::Markup {
                content: content.clone(),
                base_uri: base,
            }
        } else if let Some(file) = &self.file {
            DocumentSource::File(file.clone())
        } else if let Some(uri) = &self.uri {
            DocumentSource::Uri(parse_uri(uri, base.as_ref())?)
        } else {
            return Err(ConfigError::MissingSource);
        };

        let ignored = [
            ("markup", self.markup.is_some()),
            ("file", self.file.is_some()),
            ("uri", self.uri.is_some()),
        ];
        for (name, present) in ignored {
            if present && name != source.kind() {
                log::debug!("Ignoring {} source; using {} source", name, source.kind());
            }
        }
        Ok(source)
    }
}

impl DocumentSource {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Tree(_) => "tree",
            DocumentSource::Markup { .. } => "markup",
            DocumentSource::File(_) => "file",
            DocumentSource::Uri(_) => "uri",
        }
    }

    /// Loads the document.
    ///
    /// Only `file:` URIs are fetched; other schemes are rejected.
    pub fn load(&self) -> Result<DocumentTree, LayoutError> {
        match self {
            DocumentSource::Tree(tree) => Ok(tree.as_ref().clone()),
            DocumentSource::Markup { content, .. } => markup::parse_html(content),
            DocumentSource::File(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| LayoutError::Source {
                    location: path.display().to_string(),
                    message: e.to_string(),
                })?;
                markup::parse_html(&content)
            }
            DocumentSource::Uri(url) => {
                if url.scheme() != "file" {
                    return Err(LayoutError::UnsupportedUri(url.to_string()));
                }
                let path = url
                    .to_file_path()
                    .map_err(|_| LayoutError::UnsupportedUri(url.to_string()))?;
                DocumentSource::File(path).load().map_err(|e| match e {
                    LayoutError::Source { message, .. } => LayoutError::Source {
                        location: url.to_string(),
                        message,
                    },
                    other => other,
                })
            }
        }
    }
}
