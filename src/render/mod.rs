//! PDF generation with lopdf.
//!
//! `write_document` turns laid-out pages into objects of a `lopdf::Document`:
//! one content stream per page, a shared resource dictionary, the page tree
//! and the catalog. Conformance-driven additions (XMP metadata, output
//! intent, structure tree) are written when the policy asks for them.

use crate::conformance::ConformancePolicy;
use crate::error::GenerationError;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use vellum_layout::{FontResolver, LaidOutPages, PositionedLine};

pub mod fonts;
pub mod metadata;
pub mod page;
pub mod tagging;

pub use self::metadata::DocumentMetadata;
pub use self::page::{DefaultPageSupplier, PageSupplier};

use self::fonts::FontTable;
use self::tagging::StructureBuilder;

/// Everything the writer needs besides the pages themselves.
pub struct GenerationContext<'a> {
    pub policy: ConformancePolicy,
    pub metadata: &'a DocumentMetadata,
    pub version: &'a str,
    pub color_profile: Option<&'a [u8]>,
    pub page_supplier: &'a dyn PageSupplier,
    pub fonts: &'a FontResolver,
}

fn line_operations(
    line: &PositionedLine,
    page_height: f32,
    fonts: &mut FontTable,
    operations: &mut Vec<Operation>,
) -> Result<(), GenerationError> {
    let y = page_height - line.baseline;
    operations.push(Operation::new("BT", vec![]));
    let mut current: Option<(String, f32)> = None;
    for run in &line.runs {
        let (resource_name, encoded) = fonts.encode(&run.font, &run.text)?;
        let font_changed = current
            .as_ref()
            .is_none_or(|(name, size)| *name != resource_name || *size != run.size);
        if font_changed {
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(resource_name.clone().into_bytes()), run.size.into()],
            ));
            current = Some((resource_name, run.size));
        }
        operations.push(Operation::new(
            "Tm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), run.x.into(), y.into()],
        ));
        operations.push(Operation::new("Tj", vec![encoded]));
    }
    operations.push(Operation::new("ET", vec![]));
    Ok(())
}

/// Writes `pages` into `doc` and makes them its page tree.
///
/// Any catalog already present in `doc` is replaced.
///
/// # Errors
///
/// Fails with `GenerationError::FontNotEmbedded` before anything is written
/// when the policy requires embedded fonts and a run uses the built-in font.
pub fn write_document(
    doc: &mut Document,
    pages: &LaidOutPages,
    ctx: &GenerationContext<'_>,
) -> Result<(), GenerationError> {
    let mut font_table = FontTable::new(pages.fonts_used(), &ctx.policy)?;
    let tagged = ctx.policy.requires_tagging();
    let mut structure = StructureBuilder::new();

    doc.version = ctx.version.to_string();
    let pages_id = doc.new_object_id();
    let resources_id = doc.new_object_id();
    let width = pages.page_size.width;
    let height = pages.page_size.height;

    let mut page_ids = Vec::with_capacity(pages.page_count());
    for (index, page) in pages.pages.iter().enumerate() {
        let mut operations = Vec::new();
        for line in &page.lines {
            if tagged {
                let role = line.kind.structure_role();
                let mcid = structure.mark(index, line.block_index, role);
                operations.push(Operation::new(
                    "BDC",
                    vec![
                        Object::Name(role.as_bytes().to_vec()),
                        Object::Dictionary(dictionary! { "MCID" => mcid }),
                    ],
                ));
            }
            line_operations(line, height, &mut font_table, &mut operations)?;
            if tagged {
                operations.push(Operation::new("EMC", vec![]));
            }
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut page_dict = ctx.page_supplier.request_page(doc, width, height, index + 1)?;
        page_dict.set("Type", "Page");
        page_dict.set("Parent", pages_id);
        page_dict.set("Contents", content_id);
        page_dict.set("Resources", resources_id);
        if !page_dict.has(b"MediaBox") {
            page_dict.set("MediaBox", vec![0.into(), 0.into(), width.into(), height.into()]);
        }
        if tagged {
            page_dict.set("StructParents", index as i64);
            page_dict.set("Tabs", "S");
        }
        page_ids.push(doc.add_object(page_dict));
    }

    let font_resources = font_table.write(doc, ctx.fonts)?;
    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! { "Font" => font_resources }),
    );

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = write_catalog(doc, pages_id, &page_ids, structure, ctx)?;
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(metadata::info_dictionary(ctx.metadata));
    doc.trailer.set("Info", info_id);
    doc.trailer.set("ID", metadata::file_identifier());

    log::info!(
        "Generated {} page(s) with {} font(s), conformance {}",
        page_ids.len(),
        pages.fonts_used().len(),
        ctx.policy.pdfa
    );
    Ok(())
}

fn write_catalog(
    doc: &mut Document,
    pages_id: ObjectId,
    page_ids: &[ObjectId],
    structure: StructureBuilder,
    ctx: &GenerationContext<'_>,
) -> Result<ObjectId, GenerationError> {
    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(lang) = &ctx.metadata.lang {
        catalog.set("Lang", Object::string_literal(lang.as_str()));
    }

    if ctx.policy.requires_metadata() {
        let metadata_id = metadata::add_metadata_stream(doc, ctx.metadata, &ctx.policy);
        catalog.set("Metadata", metadata_id);
    }

    if ctx.policy.pdfa.is_enabled() {
        match ctx.color_profile {
            Some(profile) => {
                let intent_id = metadata::add_output_intent(doc, profile);
                catalog.set("OutputIntents", vec![Object::Reference(intent_id)]);
            }
            None => log::warn!(
                "{} output without a color profile has no output intent and will not validate",
                ctx.policy.pdfa
            ),
        }
    }

    if ctx.policy.requires_tagging() {
        let lang = ctx.metadata.lang.as_deref();
        let root_id = structure.write(doc, page_ids, lang);
        catalog.set("StructTreeRoot", root_id);
        catalog.set("MarkInfo", dictionary! { "Marked" => true });
    }

    if ctx.policy.pdf_ua {
        if ctx.metadata.title.is_none() {
            log::warn!("PDF/UA output has no document title");
        }
        catalog.set("ViewerPreferences", dictionary! { "DisplayDocTitle" => true });
    }

    Ok(doc.add_object(catalog))
}
