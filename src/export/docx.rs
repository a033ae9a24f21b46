//! Minimal WordprocessingML package writer
//!
//! The document body is a single paragraph holding a single run; newlines in
//! the text become `<w:br/>` line breaks and tabs become `<w:tab/>`.

use crate::error::NotesError;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r>"#;

// A4 portrait with one-inch margins
const DOCUMENT_TAIL: &str = r#"</w:r></w:p><w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

pub fn encode(text: &str) -> Result<Vec<u8>, NotesError> {
    let document = document_xml(text)?;

    // Fixed timestamps keep the archive byte-for-byte reproducible
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, options).map_err(package_error)?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish().map_err(package_error)?;
    Ok(cursor.into_inner())
}

fn package_error(e: zip::result::ZipError) -> NotesError {
    NotesError::Internal(format!("Failed to write DOCX package: {}", e))
}

/// `word/document.xml` for a single-paragraph document
pub fn document_xml(text: &str) -> Result<String, NotesError> {
    let mut xml =
        String::with_capacity(DOCUMENT_HEAD.len() + DOCUMENT_TAIL.len() + text.len() * 2);
    xml.push_str(DOCUMENT_HEAD);

    let mut pending = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flush_text(&mut xml, &mut pending);
                xml.push_str("<w:br/>");
            }
            '\t' => {
                flush_text(&mut xml, &mut pending);
                xml.push_str("<w:tab/>");
            }
            c if is_xml_char(c) => pending.push(c),
            c => {
                return Err(NotesError::ExportEncoding {
                    format: "docx",
                    reason: format!("control character U+{:04X} is not allowed in XML", c as u32),
                })
            }
        }
    }
    flush_text(&mut xml, &mut pending);

    xml.push_str(DOCUMENT_TAIL);
    Ok(xml)
}

fn flush_text(xml: &mut String, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape(pending.as_str()));
    xml.push_str("</w:t>");
    pending.clear();
}

/// XML 1.0 `Char` production, minus the whitespace handled separately
fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
}
