//! Requested fonts and their registration into a session's font resolver.

use crate::error::RenderError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use vellum_layout::FontResolver;
use vellum_traits::{FontError, FontSupplier};
use vellum_types::font::{FontStyle, FontWeight};

/// Where the bytes of a requested font come from.
#[derive(Clone)]
pub enum FontSource {
    Supplier(Arc<dyn FontSupplier>),
    File(PathBuf),
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Supplier(_) => f.write_str("Supplier(..)"),
            FontSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// One font registration request, consumed when a session is built.
#[derive(Debug, Clone)]
pub struct AddedFont {
    pub source: FontSource,
    pub family: String,
    pub weight: FontWeight,
    /// `None` lets the face match any requested style.
    pub style: Option<FontStyle>,
    pub subset: bool,
}

/// A file font that could not be registered.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFont {
    pub path: PathBuf,
    pub family: String,
    pub error: FontError,
}

/// What happened to each requested font during a build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    /// Family names registered, in order.
    pub registered: Vec<String>,
    pub skipped: Vec<SkippedFont>,
}

impl RegistrationReport {
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Registers every requested font in order.
///
/// A font file that cannot be read or parsed is skipped with a warning. A
/// failing supplier aborts registration and its error is returned.
pub fn register_fonts(
    fonts: &[AddedFont],
    resolver: &mut FontResolver,
) -> Result<RegistrationReport, RenderError> {
    let mut report = RegistrationReport::default();

    for font in fonts {
        match &font.source {
            FontSource::Supplier(supplier) => {
                resolver.add_font_from_supplier(
                    supplier.as_ref(),
                    &font.family,
                    font.weight,
                    font.style,
                    font.subset,
                )?;
                report.registered.push(font.family.clone());
            }
            FontSource::File(path) => {
                match resolver.add_font_file(path, &font.family, font.weight, font.style, font.subset) {
                    Ok(_) => report.registered.push(font.family.clone()),
                    Err(error) => {
                        log::warn!("Font {} could not be loaded: {}", path.display(), error);
                        report.skipped.push(SkippedFont {
                            path: path.clone(),
                            family: font.family.clone(),
                            error,
                        });
                    }
                }
            }
        }
    }

    log::debug!(
        "Registered {} font(s), skipped {}",
        report.registered.len(),
        report.skipped.len()
    );
    Ok(report)
}
