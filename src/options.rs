//! Serializable renderer options, for configuration loaded from JSON.

use crate::conformance::PdfAConformance;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use vellum_types::{PageSizeUnits, TextDirection};

/// Options that can be applied to a builder in one step.
///
/// Every field is optional; unset fields leave the builder unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderOptions {
    pub page_width: Option<f32>,
    pub page_height: Option<f32>,
    pub page_units: Option<PageSizeUnits>,
    pub margin: Option<f32>,
    pub pdf_version: Option<f32>,
    pub producer: Option<String>,
    pub pdfa_conformance: Option<PdfAConformance>,
    pub pdf_ua: Option<bool>,
    pub text_direction: Option<TextDirection>,
}

impl RenderOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
