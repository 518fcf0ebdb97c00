mod common;

use common::pdf_assertions::{catalog, page_operators, resolve, resolve_dict, xmp_metadata};
use common::{SIMPLE_PAGE, TestResult, builder_with_font, init_logging, output_sink, render};
use vellum::{GenerationError, PdfAConformance, PdfRendererBuilder, RenderError};

const UNSTYLED_PAGE: &str = r#"<html lang="en"><head><title>Plain</title></head><body><p>No registered font here.</p></body></html>"#;

// Not a real ICC profile; validators are not run here.
const FAKE_ICC: &[u8] = b"fake icc profile bytes";

#[test]
fn test_pdfa_rejects_non_embedded_font() {
    init_logging();
    let builder = PdfRendererBuilder::new()
        .with_html_content(UNSTYLED_PAGE, None)
        .use_pdf_a_conformance(PdfAConformance::PdfA1B)
        .to_stream(output_sink());

    match builder.run() {
        Err(RenderError::Generation(GenerationError::FontNotEmbedded { font, conformance })) => {
            assert_eq!(font, "Helvetica");
            assert_eq!(conformance, PdfAConformance::PdfA1B);
        }
        other => panic!("expected FontNotEmbedded, got {other:?}"),
    }
}

#[test]
fn test_same_document_without_conformance_succeeds() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = PdfRendererBuilder::new()
        .with_html_content(UNSTYLED_PAGE, None)
        .use_pdf_a_conformance(PdfAConformance::None)
        .to_stream(sink.clone());
    let pdf = render(&builder, &sink)?;
    assert_eq!(pdf.page_count(), 1);
    assert!(!catalog(&pdf.doc).has(b"Metadata"));
    Ok(())
}

#[test]
fn test_generation_failure_leaves_sink_untouched() {
    init_logging();
    let sink = output_sink();
    let builder = PdfRendererBuilder::new()
        .with_html_content(UNSTYLED_PAGE, None)
        .use_pdf_a_conformance(PdfAConformance::PdfA3B)
        .to_stream(sink.clone());
    assert!(builder.run().is_err());
    assert!(sink.lock().unwrap().is_empty());
}

#[test]
fn test_pdfa_metadata_and_output_intent() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone())
        .use_pdf_a_conformance(PdfAConformance::PdfA2B)
        .use_color_profile(FAKE_ICC.to_vec())
        .with_producer("vellum tests");
    let pdf = render(&builder, &sink)?;

    let xmp = xmp_metadata(&pdf.doc).expect("XMP metadata stream");
    assert!(xmp.contains("<pdfaid:part>2</pdfaid:part>"));
    assert!(xmp.contains("<pdfaid:conformance>B</pdfaid:conformance>"));
    assert!(xmp.contains("Simple Page"));
    assert!(xmp.contains("<pdf:Producer>vellum tests</pdf:Producer>"));
    assert!(!xmp.contains("pdfuaid"));

    let intents = resolve(&pdf.doc, catalog(&pdf.doc).get(b"OutputIntents")?).as_array()?;
    assert_eq!(intents.len(), 1);
    let intent = resolve_dict(&pdf.doc, &intents[0]).expect("output intent");
    assert_eq!(intent.get(b"S")?.as_name()?, b"GTS_PDFA1");
    let profile = resolve(&pdf.doc, intent.get(b"DestOutputProfile")?).as_stream()?;
    assert_eq!(profile.content, FAKE_ICC);

    assert!(pdf.doc.trailer.get(b"ID").is_ok());
    let info = resolve_dict(&pdf.doc, pdf.doc.trailer.get(b"Info")?).expect("info dictionary");
    assert_eq!(info.get(b"Producer")?.as_str()?, b"vellum tests");
    assert_eq!(info.get(b"Title")?.as_str()?, b"Simple Page");
    Ok(())
}

#[test]
fn test_pdfa_without_color_profile_still_generates() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).use_pdf_a_conformance(PdfAConformance::PdfA2B);
    let pdf = render(&builder, &sink)?;
    assert!(!catalog(&pdf.doc).has(b"OutputIntents"));
    assert!(xmp_metadata(&pdf.doc).is_some());
    Ok(())
}

#[test]
fn test_pdfa_1_uses_pdf_1_4() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).use_pdf_a_conformance(PdfAConformance::PdfA1B);
    let pdf = render(&builder, &sink)?;
    assert!(pdf.bytes.starts_with(b"%PDF-1.4"));

    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone())
        .use_pdf_a_conformance(PdfAConformance::PdfA1B)
        .use_pdf_version(1.6);
    let pdf = render(&builder, &sink)?;
    assert!(pdf.bytes.starts_with(b"%PDF-1.6"));
    Ok(())
}

#[test]
fn test_pdf_ua_tags_the_document() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).use_pdf_ua_accessibility(true);
    let pdf = render(&builder, &sink)?;

    let catalog = catalog(&pdf.doc);
    assert_eq!(catalog.get(b"Lang")?.as_str()?, b"en");
    let mark_info = resolve_dict(&pdf.doc, catalog.get(b"MarkInfo")?).expect("MarkInfo");
    assert!(mark_info.get(b"Marked")?.as_bool()?);
    let prefs = resolve_dict(&pdf.doc, catalog.get(b"ViewerPreferences")?).expect("ViewerPreferences");
    assert!(prefs.get(b"DisplayDocTitle")?.as_bool()?);

    let root = resolve_dict(&pdf.doc, catalog.get(b"StructTreeRoot")?).expect("structure tree");
    let document = resolve_dict(&pdf.doc, root.get(b"K")?).expect("document element");
    let kids = document.get(b"K")?.as_array()?;
    let roles: Vec<Vec<u8>> = kids
        .iter()
        .filter_map(|k| resolve_dict(&pdf.doc, k))
        .filter_map(|e| e.get(b"S").ok()?.as_name().ok().map(|n| n.to_vec()))
        .collect();
    assert_eq!(roles, vec![b"H1".to_vec(), b"P".to_vec()]);

    let operators = page_operators(&pdf.doc, 1);
    assert_eq!(operators.iter().filter(|op| *op == "BDC").count(), 2);
    assert_eq!(operators.iter().filter(|op| *op == "EMC").count(), 2);

    let xmp = xmp_metadata(&pdf.doc).expect("XMP metadata stream");
    assert!(xmp.contains("<pdfuaid:part>1</pdfuaid:part>"));
    Ok(())
}

#[test]
fn test_level_a_implies_tagging() -> TestResult {
    init_logging();
    let sink = output_sink();
    let builder = builder_with_font(SIMPLE_PAGE, sink.clone()).use_pdf_a_conformance(PdfAConformance::PdfA3A);
    let pdf = render(&builder, &sink)?;
    assert!(catalog(&pdf.doc).has(b"StructTreeRoot"));
    assert!(!catalog(&pdf.doc).has(b"ViewerPreferences"));
    Ok(())
}
