//! Document information, XMP metadata and output intents.

use crate::conformance::ConformancePolicy;
use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

const OUTPUT_CONDITION: &str = "sRGB IEC61966-2.1";

/// Values written to the Info dictionary and the XMP packet.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub lang: Option<String>,
    pub producer: String,
    pub creation_date: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            title: None,
            lang: None,
            producer: producer.into(),
            creation_date: Utc::now(),
        }
    }
}

/// A PDF text string: literal when ASCII, UTF-16BE with a byte order mark otherwise.
pub(crate) fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn pdf_date(date: &DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

fn xmp_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub(crate) fn info_dictionary(metadata: &DocumentMetadata) -> Dictionary {
    let date = pdf_date(&metadata.creation_date);
    let mut info = dictionary! {
        "Producer" => text_string(&metadata.producer),
        "CreationDate" => Object::string_literal(date.clone()),
        "ModDate" => Object::string_literal(date),
    };
    if let Some(title) = &metadata.title {
        info.set("Title", text_string(title));
    }
    info
}

/// Characters XML 1.0 does not allow anywhere in a document.
fn is_xml_illegal(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Escapes markup characters and drops the ones XML cannot carry.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if is_xml_illegal(c) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// The XMP packet for the catalog's `/Metadata` stream.
pub(crate) fn xmp_packet(metadata: &DocumentMetadata, policy: &ConformancePolicy) -> String {
    let date = xmp_date(&metadata.creation_date);
    let mut xmp = String::new();
    xmp.push_str("<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n");
    xmp.push_str("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n");
    xmp.push_str("<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n");

    xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:pdf=\"http://ns.adobe.com/pdf/1.3/\">\n");
    xmp.push_str(&format!("<pdf:Producer>{}</pdf:Producer>\n", escape_xml(&metadata.producer)));
    xmp.push_str("</rdf:Description>\n");

    xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:xmp=\"http://ns.adobe.com/xap/1.0/\">\n");
    xmp.push_str(&format!("<xmp:CreateDate>{date}</xmp:CreateDate>\n"));
    xmp.push_str(&format!("<xmp:ModifyDate>{date}</xmp:ModifyDate>\n"));
    xmp.push_str(&format!("<xmp:CreatorTool>{}</xmp:CreatorTool>\n", escape_xml(&metadata.producer)));
    xmp.push_str("</rdf:Description>\n");

    if metadata.title.is_some() || metadata.lang.is_some() {
        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
        if let Some(title) = &metadata.title {
            xmp.push_str(&format!(
                "<dc:title><rdf:Alt><rdf:li xml:lang=\"x-default\">{}</rdf:li></rdf:Alt></dc:title>\n",
                escape_xml(title)
            ));
        }
        if let Some(lang) = &metadata.lang {
            xmp.push_str(&format!(
                "<dc:language><rdf:Bag><rdf:li>{}</rdf:li></rdf:Bag></dc:language>\n",
                escape_xml(lang)
            ));
        }
        xmp.push_str("</rdf:Description>\n");
    }

    if let Some(part) = policy.pdfa.part() {
        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:pdfaid=\"http://www.aiim.org/pdfa/ns/id/\">\n");
        xmp.push_str(&format!("<pdfaid:part>{part}</pdfaid:part>\n"));
        xmp.push_str(&format!(
            "<pdfaid:conformance>{}</pdfaid:conformance>\n",
            policy.pdfa.conformance_value()
        ));
        xmp.push_str("</rdf:Description>\n");
    }

    if policy.pdf_ua {
        xmp.push_str("<rdf:Description rdf:about=\"\" xmlns:pdfuaid=\"http://www.aiim.org/pdfua/ns/id/\">\n");
        xmp.push_str("<pdfuaid:part>1</pdfuaid:part>\n");
        xmp.push_str("</rdf:Description>\n");
    }

    xmp.push_str("</rdf:RDF>\n");
    xmp.push_str("</x:xmpmeta>\n");
    xmp.push_str("<?xpacket end=\"w\"?>");
    xmp
}

pub(crate) fn add_metadata_stream(
    doc: &mut Document,
    metadata: &DocumentMetadata,
    policy: &ConformancePolicy,
) -> ObjectId {
    let packet = xmp_packet(metadata, policy);
    doc.add_object(Stream::new(
        dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
        packet.into_bytes(),
    ))
}

/// Adds an sRGB output intent backed by `icc_profile` and returns its id.
pub(crate) fn add_output_intent(doc: &mut Document, icc_profile: &[u8]) -> ObjectId {
    let profile_id = doc.add_object(Stream::new(dictionary! { "N" => 3 }, icc_profile.to_vec()));
    doc.add_object(dictionary! {
        "Type" => "OutputIntent",
        "S" => "GTS_PDFA1",
        "OutputConditionIdentifier" => Object::string_literal(OUTPUT_CONDITION),
        "Info" => Object::string_literal(OUTPUT_CONDITION),
        "DestOutputProfile" => profile_id,
    })
}

/// A random file identifier for the trailer's `/ID` entry.
pub(crate) fn file_identifier() -> Object {
    let id = uuid::Uuid::new_v4().as_bytes().to_vec();
    Object::Array(vec![
        Object::String(id.clone(), StringFormat::Hexadecimal),
        Object::String(id, StringFormat::Hexadecimal),
    ])
}
