use crate::error::GenerationError;
use lopdf::{Dictionary, Document, dictionary};
use std::fmt::Debug;

/// Creates page dictionaries for the writer.
///
/// The writer sets `Parent`, `Contents` and `Resources` on the returned
/// dictionary; a supplier may add anything else (boxes, rotation, user units).
pub trait PageSupplier: Send + Sync + Debug {
    fn request_page(
        &self,
        document: &mut Document,
        width: f32,
        height: f32,
        page_number: usize,
    ) -> Result<Dictionary, GenerationError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPageSupplier;

impl PageSupplier for DefaultPageSupplier {
    fn request_page(
        &self,
        _document: &mut Document,
        width: f32,
        height: f32,
        _page_number: usize,
    ) -> Result<Dictionary, GenerationError> {
        Ok(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        })
    }
}
