use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Follows a reference, or returns the object itself.
pub fn resolve<'a>(doc: &'a LopdfDocument, object: &'a Object) -> &'a Object {
    match object.as_reference() {
        Ok(id) => doc.get_object(id).unwrap_or(object),
        Err(_) => object,
    }
}

pub fn resolve_dict<'a>(doc: &'a LopdfDocument, object: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, object).as_dict().ok()
}

pub fn catalog(doc: &LopdfDocument) -> &Dictionary {
    doc.catalog().expect("document has a catalog")
}

/// All font dictionaries reachable from page resources, with their resource names.
pub fn page_fonts(doc: &LopdfDocument) -> Vec<(String, Dictionary)> {
    let mut fonts = Vec::new();
    for (_page_num, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else { continue };
        let Some(resources) = page.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) else {
            continue;
        };
        let Some(font_dict) = resources.get(b"Font").ok().and_then(|f| resolve_dict(doc, f)) else {
            continue;
        };
        for (name, font) in font_dict.iter() {
            let name = String::from_utf8_lossy(name).to_string();
            if fonts.iter().any(|(n, _)| *n == name) {
                continue;
            }
            if let Some(font) = resolve_dict(doc, font) {
                fonts.push((name, font.clone()));
            }
        }
    }
    fonts
}

pub fn name_of(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
}

/// Extract font names from the PDF
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    page_fonts(doc)
        .iter()
        .filter_map(|(_, font)| name_of(font, b"BaseFont"))
        .collect()
}

/// The descendant CID font of a Type0 font.
pub fn descendant_font<'a>(doc: &'a LopdfDocument, type0: &'a Dictionary) -> Option<&'a Dictionary> {
    let descendants = type0.get(b"DescendantFonts").ok()?;
    let first = resolve(doc, descendants).as_array().ok()?.first()?;
    resolve_dict(doc, first)
}

/// The decoded bytes of a stream referenced from `dict[key]`.
pub fn stream_content(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<Vec<u8>> {
    let object = resolve(doc, dict.get(key).ok()?);
    let stream = object.as_stream().ok()?;
    Some(stream.content.clone())
}

/// The XMP packet in the catalog's `/Metadata` stream.
pub fn xmp_metadata(doc: &LopdfDocument) -> Option<String> {
    stream_content(doc, catalog(doc), b"Metadata").map(|b| String::from_utf8_lossy(&b).to_string())
}

/// Operators of a page's content stream, in order.
pub fn page_operators(doc: &LopdfDocument, page_num: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let Ok(bytes) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    Content::decode(&bytes)
        .map(|content| content.operations.into_iter().map(|op| op.operator).collect())
        .unwrap_or_default()
}

/// Literal strings shown with `Tj` on a page.
pub fn shown_literals(doc: &LopdfDocument, page_num: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let Ok(bytes) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&bytes) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|s| String::from_utf8_lossy(s).to_string())
        .collect()
}

/// Get page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = *doc.get_pages().get(&page_num)?;
    let page = doc.get_dictionary(page_id).ok()?;
    let media_box = page.get(b"MediaBox").ok()?.as_array().ok()?;
    if media_box.len() != 4 {
        return None;
    }
    let width = media_box[2].as_float().ok()? - media_box[0].as_float().ok()?;
    let height = media_box[3].as_float().ok()? - media_box[1].as_float().ok()?;
    Some((width, height))
}
