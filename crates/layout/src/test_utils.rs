use crate::fonts::FontResolver;
use crate::output::LaidOutPages;
use crate::{FlowLayoutEngine, LayoutEngine, LayoutError, PageGeometry, UnicodeImplementation};
use std::path::PathBuf;
use vellum_types::DocumentTree;
use vellum_types::font::FontWeight;

pub fn fixture_font_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/fonts/DejaVuSansMono.ttf")
}

pub fn fixture_font() -> Vec<u8> {
    std::fs::read(fixture_font_path()).expect("font fixture is checked in")
}

/// A resolver with the fixture registered as family "Mono".
pub fn mono_resolver() -> FontResolver {
    let mut resolver = FontResolver::default();
    resolver
        .add_font_data(fixture_font(), "Mono", FontWeight::Regular, None, true)
        .expect("fixture is a valid font");
    resolver
}

/// Lays out `document` with the default engine and Unicode implementation.
pub fn layout_document(
    document: &DocumentTree,
    resolver: &FontResolver,
    geometry: &PageGeometry,
) -> Result<LaidOutPages, LayoutError> {
    let _ = env_logger::builder().is_test(true).try_init();
    FlowLayoutEngine::new().layout(document, resolver, geometry, &UnicodeImplementation::default())
}
