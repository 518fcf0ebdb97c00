mod common;

use common::pdf_assertions::{get_page_dimensions, shown_literals};
use common::{SIMPLE_PAGE, TestResult, builder_with_font, init_logging, output_sink, render};
use std::io::Write;
use std::sync::Arc;
use vellum::traits::{FsCache, InMemoryCacheStore};
use vellum::types::{Block, DocumentTree, PageSizeUnits};
use vellum::{CacheStore, ConfigError, PdfRendererBuilder, RenderError, RenderOptions};

#[test]
fn test_every_cache_slot_starts_as_no_op() {
    let builder = PdfRendererBuilder::new();
    for slot in CacheStore::ALL {
        assert_eq!(builder.state().caches.get(slot).name(), "NoOpCacheStore");
    }
}

#[test]
fn test_cache_replacement_only_affects_later_sessions() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone());
    let mut before = builder.build_pdf_renderer()?;

    let cache = Arc::new(InMemoryCacheStore::new());
    let builder = builder.use_cache_store(CacheStore::PdfFontMetrics, cache.clone());
    let after = builder.build_pdf_renderer()?;

    assert_eq!(before.cache(CacheStore::PdfFontMetrics).name(), "NoOpCacheStore");
    assert_eq!(after.cache(CacheStore::PdfFontMetrics).name(), "InMemoryCacheStore");

    before.layout()?;
    assert!(cache.is_empty());
    drop(after);

    builder.run()?;
    assert!(cache.contains_key("DejaVuSansMono:400:any"));
    Ok(())
}

#[test]
fn test_page_size_needs_width_and_height() {
    init_logging();
    let base = || PdfRendererBuilder::new().with_html_content("<p>x</p>", None).to_stream(output_sink());

    let err = base()
        .use_default_page_size(Some(210.0), None, PageSizeUnits::Mm)
        .build_pdf_renderer()
        .unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::InconsistentPageSize { .. })));

    let err = base()
        .use_default_page_size(None, Some(11.0), PageSizeUnits::Inches)
        .build_pdf_renderer()
        .unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::InconsistentPageSize { .. })));

    assert!(base().use_default_page_size(None, None, PageSizeUnits::Mm).build_pdf_renderer().is_ok());
    assert!(
        base()
            .use_default_page_size(Some(8.5), Some(11.0), PageSizeUnits::Inches)
            .build_pdf_renderer()
            .is_ok()
    );
}

#[test]
fn test_zero_page_size_is_rejected() {
    let err = PdfRendererBuilder::new()
        .with_html_content("<p>x</p>", None)
        .to_stream(output_sink())
        .use_default_page_size(Some(0.0), Some(10.0), PageSizeUnits::Mm)
        .build_pdf_renderer()
        .unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::InvalidPageSize { .. })));
}

#[test]
fn test_page_size_in_inches() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).use_default_page_size(
        Some(8.5),
        Some(11.0),
        PageSizeUnits::Inches,
    );
    let pdf = render(&builder, &sink)?;
    assert_eq!(get_page_dimensions(&pdf.doc, 1), Some((612.0, 792.0)));
    Ok(())
}

#[test]
fn test_missing_source() {
    let err = PdfRendererBuilder::new().to_stream(output_sink()).build_pdf_renderer().unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::MissingSource)));
}

#[test]
fn test_unsupported_pdf_version() {
    let err = PdfRendererBuilder::new()
        .with_html_content("<p>x</p>", None)
        .to_stream(output_sink())
        .use_pdf_version(3.0)
        .build_pdf_renderer()
        .unwrap_err();
    assert!(matches!(err, RenderError::Config(ConfigError::UnsupportedPdfVersion(_))));
}

#[test]
fn test_document_tree_wins_over_markup_and_file() -> TestResult {
    init_logging();
    let sink = output_sink();
    let tree = DocumentTree::new().with_block(Block::paragraph("from the tree"));
    let builder = PdfRendererBuilder::new()
        .with_file("/no/such/file.xhtml")
        .with_html_content("<p>from the markup</p>", None)
        .with_document_tree(tree)
        .to_stream(sink.clone());
    let pdf = render(&builder, &sink)?;
    assert_eq!(shown_literals(&pdf.doc, 1), vec!["from the tree".to_string()]);
    Ok(())
}

#[test]
fn test_file_and_uri_sources() -> TestResult {
    init_logging();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("doc.xhtml");
    let mut file = std::fs::File::create(&path)?;
    write!(file, "<html><body><p>from the file</p></body></html>")?;

    let sink = output_sink();
    let builder = PdfRendererBuilder::new().with_file(&path).to_stream(sink.clone());
    let pdf = render(&builder, &sink)?;
    assert_eq!(shown_literals(&pdf.doc, 1), vec!["from the file".to_string()]);

    let sink = output_sink();
    let uri = url::Url::from_file_path(&path).map_err(|_| "path is not absolute")?;
    let builder = PdfRendererBuilder::new().with_uri(uri.as_str()).to_stream(sink.clone());
    let pdf = render(&builder, &sink)?;
    assert_eq!(shown_literals(&pdf.doc, 1), vec!["from the file".to_string()]);
    Ok(())
}

#[test]
fn test_options_from_json() -> TestResult {
    init_logging();
    let options = RenderOptions::from_json(
        r#"{ "pageWidth": 100, "pageHeight": 50, "pageUnits": "mm", "pdfVersion": 1.5, "producer": "from json" }"#,
    )?;
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).with_options(&options);
    let session = builder.build_pdf_renderer()?;
    assert_eq!(session.pdf_version(), "1.5");
    assert_eq!(session.producer(), "from json");
    let size = session.page_geometry().size;
    assert!((size.width - 283.46).abs() < 0.01);
    assert!((size.height - 141.73).abs() < 0.01);
    Ok(())
}
