//! PDF writer
//!
//! Each input line becomes a wrapped multi-line cell in a 12pt font on A4
//! pages, breaking onto new pages as needed. Layout in points:
//! 10 mm side/top margins, 20 mm bottom break margin, 10 mm line height,
//! 1 mm horizontal cell padding.

use super::font::{Glyph, PdfFont};
use super::UnencodablePolicy;
use crate::error::NotesError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::BTreeMap;

const MM: f32 = 72.0 / 25.4;

pub const PAGE_WIDTH: f32 = 210.0 * MM;
pub const PAGE_HEIGHT: f32 = 297.0 * MM;
const MARGIN: f32 = 10.0 * MM;
const BREAK_MARGIN: f32 = 20.0 * MM;
const CELL_PADDING: f32 = 1.0 * MM;
const LINE_HEIGHT: f32 = 10.0 * MM;
pub const FONT_SIZE: f32 = 12.0;

/// Usable width of a text line
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * CELL_PADDING;

pub fn encode(
    text: &str,
    font: &PdfFont<'_>,
    policy: UnencodablePolicy,
) -> Result<Vec<u8>, NotesError> {
    let mut layout = Layout::new();
    let mut used: BTreeMap<u16, Glyph> = BTreeMap::new();
    let mut replaced = 0usize;

    // `\r\n` and lone `\r` end lines too, as in the DOCX writer
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    for line in text.split('\n') {
        let glyphs = shape(line, font, policy, &mut replaced)?;
        for segment in wrap(&glyphs, TEXT_WIDTH) {
            for glyph in segment {
                used.entry(glyph.code).or_insert(*glyph);
            }
            layout.cell(font, segment);
        }
    }

    if replaced > 0 {
        tracing::warn!(
            "Replaced {} character(s) that {} cannot draw with '?'",
            replaced,
            font.name()
        );
    }

    write_document(font, &used, layout.pages)
}

/// Resolve every character of a line against the font
fn shape(
    line: &str,
    font: &PdfFont<'_>,
    policy: UnencodablePolicy,
    replaced: &mut usize,
) -> Result<Vec<Glyph>, NotesError> {
    let mut glyphs = Vec::with_capacity(line.len());
    for ch in line.chars() {
        let ch = if ch == '\t' { ' ' } else { ch };
        match font.glyph(ch) {
            Some(glyph) => glyphs.push(glyph),
            None => match policy {
                UnencodablePolicy::Replace => {
                    *replaced += 1;
                    glyphs.push(font.replacement());
                }
                UnencodablePolicy::Strict => {
                    return Err(NotesError::ExportEncoding {
                        format: "pdf",
                        reason: format!(
                            "character '{}' (U+{:04X}) cannot be drawn with font {}",
                            ch,
                            ch as u32,
                            font.name()
                        ),
                    })
                }
            },
        }
    }
    Ok(glyphs)
}

fn advance(glyph: &Glyph) -> f32 {
    glyph.width * FONT_SIZE / 1000.0
}

/// Split a line into segments no wider than `max_width`, breaking after the
/// last space that fits or mid-word when there is none. The breaking space
/// is dropped. An empty line yields one empty segment.
fn wrap(glyphs: &[Glyph], max_width: f32) -> Vec<&[Glyph]> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut width = 0.0;
    let mut last_space = None;
    let mut i = 0;

    while i < glyphs.len() {
        if glyphs[i].ch == ' ' {
            last_space = Some(i);
        }
        width += advance(&glyphs[i]);

        if width > max_width && i > start {
            match last_space {
                Some(space) => {
                    segments.push(&glyphs[start..space]);
                    start = space + 1;
                }
                None => {
                    segments.push(&glyphs[start..i]);
                    start = i;
                }
            }
            width = 0.0;
            last_space = None;
            i = start;
            continue;
        }
        i += 1;
    }

    segments.push(&glyphs[start..]);
    segments
}

/// Cursor over the pages being filled
struct Layout {
    pages: Vec<Vec<Operation>>,
    /// Top of the next cell, measured down from the page top
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: MARGIN,
        }
    }

    fn cell(&mut self, font: &PdfFont<'_>, glyphs: &[Glyph]) {
        if self.y + LINE_HEIGHT > PAGE_HEIGHT - BREAK_MARGIN {
            self.pages.push(Vec::new());
            self.y = MARGIN;
        }

        if !glyphs.is_empty() {
            let baseline = self.y + 0.5 * LINE_HEIGHT + 0.3 * FONT_SIZE;
            let ops = [
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
                Operation::new(
                    "Td",
                    vec![(MARGIN + CELL_PADDING).into(), (PAGE_HEIGHT - baseline).into()],
                ),
                Operation::new("Tj", vec![font.encode(glyphs)]),
                Operation::new("ET", vec![]),
            ];
            if let Some(page) = self.pages.last_mut() {
                page.extend(ops);
            }
        }

        self.y += LINE_HEIGHT;
    }
}

fn write_document(
    font: &PdfFont<'_>,
    used: &BTreeMap<u16, Glyph>,
    pages: Vec<Vec<Operation>>,
) -> Result<Vec<u8>, NotesError> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = font.write(&mut doc, used);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| NotesError::Internal(format!("Failed to encode PDF content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| NotesError::Internal(format!("Failed to write PDF: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Dictionary;
    use std::collections::BTreeSet;

    fn courier_glyphs(s: &str) -> Vec<Glyph> {
        let font = PdfFont::courier();
        s.chars().filter_map(|c| font.glyph(c)).collect()
    }

    fn as_text(segment: &[Glyph]) -> String {
        segment.iter().map(|g| g.ch).collect()
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    /// Operands of every `Tj` on every page, in drawing order
    fn drawn_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        let mut drawn = Vec::new();
        for page_id in doc.get_pages().into_values() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            for op in content.operations.iter().filter(|op| op.operator == "Tj") {
                if let Object::String(bytes, _) = &op.operands[0] {
                    drawn.push(bytes.clone());
                }
            }
        }
        drawn
    }

    #[test]
    fn test_output_is_pdf() {
        let bytes = encode("hello", &PdfFont::courier(), UnencodablePolicy::Strict).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(page_count(&bytes), 1);
    }

    #[test]
    fn test_wrap_short_line_untouched() {
        let glyphs = courier_glyphs("short line");
        let segments = wrap(&glyphs, TEXT_WIDTH);
        assert_eq!(segments.len(), 1);
        assert_eq!(as_text(segments[0]), "short line");
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        // 7.2pt per Courier glyph at 12pt; 10 glyphs fit in 75pt
        let glyphs = courier_glyphs("aaaa bbbb cccc");
        let segments: Vec<String> = wrap(&glyphs, 75.0).into_iter().map(as_text).collect();
        assert_eq!(segments, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let glyphs = courier_glyphs("abcdefghijkl");
        let segments: Vec<String> = wrap(&glyphs, 36.0).into_iter().map(as_text).collect();
        assert_eq!(segments, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn test_wrap_empty_line_is_one_segment() {
        let segments = wrap(&[], TEXT_WIDTH);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_empty());
    }

    #[test]
    fn test_full_width_line_count() {
        // 532.9pt usable / 7.2pt = 74 glyphs per line
        let glyphs = courier_glyphs(&"x".repeat(74 * 3));
        assert_eq!(wrap(&glyphs, TEXT_WIDTH).len(), 3);
    }

    #[test]
    fn test_pages_added_as_needed() {
        // (297 - 10 - 20) / 10 -> 26 lines per page
        let text = vec!["line"; 60].join("\n");
        let bytes = encode(&text, &PdfFont::courier(), UnencodablePolicy::Strict).unwrap();
        assert_eq!(page_count(&bytes), 3);
    }

    #[test]
    fn test_blank_lines_take_space() {
        let text = "\n".repeat(30);
        let bytes = encode(&text, &PdfFont::courier(), UnencodablePolicy::Strict).unwrap();
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn test_text_is_drawn() {
        let bytes =
            encode("Hello (notes)", &PdfFont::courier(), UnencodablePolicy::Strict).unwrap();
        assert_eq!(drawn_strings(&bytes), vec![b"Hello (notes)".to_vec()]);
    }

    #[test]
    fn test_strict_rejects_devanagari_with_courier() {
        let err = encode("नमस्ते", &PdfFont::courier(), UnencodablePolicy::Strict).unwrap_err();
        match err {
            NotesError::ExportEncoding { format, reason } => {
                assert_eq!(format, "pdf");
                assert!(reason.contains("U+0928"), "{}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_replace_substitutes_question_marks() {
        let mut replaced = 0;
        let glyphs = shape(
            "ok க",
            &PdfFont::courier(),
            UnencodablePolicy::Replace,
            &mut replaced,
        )
        .unwrap();
        assert_eq!(as_text(&glyphs), "ok ?");
        assert_eq!(replaced, 1);
    }

    #[test]
    fn test_latin1_accents_encodable() {
        let text = "café déjà vu – 5€";
        assert!(encode(text, &PdfFont::courier(), UnencodablePolicy::Strict).is_ok());
    }

    #[test]
    fn test_tabs_become_spaces() {
        let mut replaced = 0;
        let glyphs = shape("a\tb", &PdfFont::courier(), UnencodablePolicy::Strict, &mut replaced)
            .unwrap();
        assert_eq!(as_text(&glyphs), "a b");
    }

    #[test]
    fn test_carriage_returns_end_lines() {
        for text in ["one\r\ntwo", "one\rtwo", "one\ntwo"] {
            let bytes = encode(text, &PdfFont::courier(), UnencodablePolicy::Strict).unwrap();
            assert_eq!(drawn_strings(&bytes), vec![b"one".to_vec(), b"two".to_vec()]);
        }
        // No stray `?` for a lone CR either
        let bytes = encode("one\rtwo", &PdfFont::courier(), UnencodablePolicy::Replace).unwrap();
        assert_eq!(drawn_strings(&bytes).len(), 2);
    }

    const MONTSERRAT: &[u8] = include_bytes!("../../tests/fixtures/Montserrat-Regular.ttf");

    fn montserrat() -> PdfFont<'static> {
        PdfFont::embedded(MONTSERRAT).unwrap()
    }

    /// Every dictionary in `doc` whose `key` is the name `value`
    fn dicts_with<'a>(doc: &'a Document, key: &[u8], value: &[u8]) -> Vec<&'a Dictionary> {
        doc.objects
            .values()
            .filter_map(|object| match object {
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            })
            .filter(|dict| matches!(dict.get(key), Ok(Object::Name(name)) if name == value))
            .collect()
    }

    fn glyph_ids(font: &PdfFont<'_>, text: &str) -> BTreeSet<u16> {
        text.chars()
            .filter(|c| *c != '\n')
            .map(|c| font.glyph(c).unwrap_or_else(|| font.replacement()).code)
            .collect()
    }

    #[test]
    fn test_embedded_font_dictionaries() {
        let bytes = encode("Щука café", &montserrat(), UnencodablePolicy::Strict).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let type0 = dicts_with(&doc, b"Subtype", b"Type0");
        assert_eq!(type0.len(), 1);
        let font = type0[0];
        assert!(matches!(
            font.get(b"Encoding"),
            Ok(Object::Name(name)) if name == b"Identity-H"
        ));
        assert!(matches!(
            font.get(b"BaseFont"),
            Ok(Object::Name(name)) if name == b"Montserrat-Regular"
        ));

        let to_unicode = match font.get(b"ToUnicode") {
            Ok(Object::Reference(id)) => doc.get_object(*id).unwrap(),
            other => panic!("ToUnicode should be a reference, got {:?}", other),
        };
        match to_unicode {
            Object::Stream(stream) => {
                let cmap = String::from_utf8_lossy(&stream.content);
                assert!(cmap.contains("beginbfchar"));
                // Щ
                assert!(cmap.contains("<0429>"));
            }
            other => panic!("ToUnicode should be a stream, got {:?}", other),
        }

        let descriptors = dicts_with(&doc, b"Type", b"FontDescriptor");
        assert_eq!(descriptors.len(), 1);
        assert!(matches!(
            descriptors[0].get(b"FontFile2"),
            Ok(Object::Reference(_))
        ));
    }

    #[test]
    fn test_width_array_lists_every_drawn_glyph() {
        let text = "Щука café\nΩ € ?";
        let font = montserrat();
        let bytes = encode(text, &font, UnencodablePolicy::Strict).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let cid_fonts = dicts_with(&doc, b"Subtype", b"CIDFontType2");
        assert_eq!(cid_fonts.len(), 1);
        let listed: BTreeSet<u16> = match cid_fonts[0].get(b"W") {
            Ok(Object::Array(items)) => items
                .iter()
                .step_by(2)
                .filter_map(|item| match item {
                    Object::Integer(gid) => Some(*gid as u16),
                    _ => None,
                })
                .collect(),
            other => panic!("W should be an array, got {:?}", other),
        };

        assert_eq!(listed, glyph_ids(&font, text));
    }

    #[test]
    fn test_embedded_font_draws_glyph_ids() {
        let font = montserrat();
        let bytes = encode("Ab", &font, UnencodablePolicy::Strict).unwrap();

        let expected: Vec<u8> = "Ab"
            .chars()
            .flat_map(|c| font.glyph(c).unwrap().code.to_be_bytes())
            .collect();
        assert_eq!(drawn_strings(&bytes), vec![expected]);
    }

    #[test]
    fn test_strict_with_embedded_font() {
        // Cyrillic and Greek are in the font; Courier cannot draw them
        assert!(encode("Щука Ωmega", &montserrat(), UnencodablePolicy::Strict).is_ok());
        assert!(encode("Щука", &PdfFont::courier(), UnencodablePolicy::Strict).is_err());

        let err = encode("कखग", &montserrat(), UnencodablePolicy::Strict).unwrap_err();
        match err {
            NotesError::ExportEncoding { format, reason } => {
                assert_eq!(format, "pdf");
                assert!(reason.contains("U+0915"), "{}", reason);
                assert!(reason.contains("Montserrat-Regular"), "{}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_replace_with_embedded_font_uses_question_mark_glyph() {
        let font = montserrat();
        let bytes = encode("क", &font, UnencodablePolicy::Replace).unwrap();
        let question = font.glyph('?').unwrap().code.to_be_bytes().to_vec();
        assert_eq!(drawn_strings(&bytes), vec![question]);
    }

    #[test]
    fn test_embedded_font_output_is_reproducible() {
        let text = "\n\n--- Image 1 ---\nЩука café Ω\nक second line";
        let first = encode(text, &montserrat(), UnencodablePolicy::Replace).unwrap();
        let second = encode(text, &montserrat(), UnencodablePolicy::Replace).unwrap();
        assert_eq!(first, second);
    }
}
