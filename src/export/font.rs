//! Fonts for the PDF exporter
//!
//! Two strategies:
//! - the standard Courier font with WinAnsi encoding; needs no font file but
//!   only covers Western European text;
//! - an embedded TrueType font written as a Type0/CIDFontType2 font with
//!   Identity-H encoding, which draws any character the font has a glyph for.

use crate::error::NotesError;
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use ttf_parser::{name_id, Face, GlyphId};

/// Courier advance width, 1/1000 em
const COURIER_WIDTH: f32 = 600.0;

/// A character resolved against a font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    /// WinAnsi byte for Courier, glyph id for embedded fonts
    pub code: u16,
    /// Advance width in 1/1000 em
    pub width: f32,
}

pub enum PdfFont<'a> {
    Courier,
    Embedded(EmbeddedFont<'a>),
}

pub struct EmbeddedFont<'a> {
    data: &'a [u8],
    face: Face<'a>,
    scale: f32,
}

/// Check that `data` is a TrueType font we can embed
pub fn validate(data: &[u8]) -> Result<(), String> {
    let face = Face::parse(data, 0).map_err(|e| e.to_string())?;
    if face.tables().glyf.is_none() {
        return Err("only fonts with TrueType (glyf) outlines can be embedded".to_string());
    }
    if face.units_per_em() == 0 {
        return Err("font reports zero units per em".to_string());
    }
    Ok(())
}

impl<'a> PdfFont<'a> {
    pub fn courier() -> Self {
        PdfFont::Courier
    }

    pub fn embedded(data: &'a [u8]) -> Result<Self, NotesError> {
        validate(data).map_err(NotesError::Initialization)?;
        let face = Face::parse(data, 0)
            .map_err(|e| NotesError::Initialization(format!("Failed to parse font: {}", e)))?;
        let scale = 1000.0 / face.units_per_em() as f32;
        Ok(PdfFont::Embedded(EmbeddedFont { data, face, scale }))
    }

    pub fn name(&self) -> String {
        match self {
            PdfFont::Courier => "Courier".to_string(),
            PdfFont::Embedded(font) => font.postscript_name(),
        }
    }

    /// Resolve `ch`, or `None` if this font cannot draw it
    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        if ch.is_control() {
            return None;
        }
        match self {
            PdfFont::Courier => unicode_to_winansi(ch).map(|byte| Glyph {
                ch,
                code: byte as u16,
                width: COURIER_WIDTH,
            }),
            PdfFont::Embedded(font) => {
                let gid = font.face.glyph_index(ch)?;
                if gid.0 == 0 {
                    return None;
                }
                Some(font.glyph(ch, gid))
            }
        }
    }

    /// Glyph drawn in place of unencodable characters
    pub fn replacement(&self) -> Glyph {
        self.glyph('?').unwrap_or_else(|| match self {
            PdfFont::Courier => Glyph {
                ch: '?',
                code: b'?' as u16,
                width: COURIER_WIDTH,
            },
            // .notdef
            PdfFont::Embedded(font) => font.glyph('?', GlyphId(0)),
        })
    }

    /// String operand for a run of glyphs
    pub fn encode(&self, glyphs: &[Glyph]) -> Object {
        match self {
            PdfFont::Courier => Object::String(
                glyphs.iter().map(|g| g.code as u8).collect(),
                StringFormat::Literal,
            ),
            PdfFont::Embedded(_) => Object::String(
                glyphs.iter().flat_map(|g| g.code.to_be_bytes()).collect(),
                StringFormat::Hexadecimal,
            ),
        }
    }

    /// Add the font objects to `doc`; `used` maps every drawn code to its glyph
    pub fn write(&self, doc: &mut Document, used: &BTreeMap<u16, Glyph>) -> ObjectId {
        match self {
            PdfFont::Courier => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Courier",
                "Encoding" => "WinAnsiEncoding",
            }),
            PdfFont::Embedded(font) => font.write(doc, used),
        }
    }
}

impl<'a> EmbeddedFont<'a> {
    fn glyph(&self, ch: char, gid: GlyphId) -> Glyph {
        let advance = self.face.glyph_hor_advance(gid).unwrap_or(0);
        Glyph {
            ch,
            code: gid.0,
            width: advance as f32 * self.scale,
        }
    }

    fn postscript_name(&self) -> String {
        let name = self
            .face
            .names()
            .into_iter()
            .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .unwrap_or_default();
        let cleaned: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if cleaned.is_empty() {
            "EmbeddedFont".to_string()
        } else {
            cleaned
        }
    }

    fn units(&self, value: i16) -> Object {
        Object::Integer((value as f32 * self.scale).round() as i64)
    }

    fn write(&self, doc: &mut Document, used: &BTreeMap<u16, Glyph>) -> ObjectId {
        let base_font = Object::Name(self.postscript_name().into_bytes());
        let bbox = self.face.global_bounding_box();

        let font_file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.to_vec(),
        ));

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font.clone(),
            "Flags" => 4,
            "FontBBox" => vec![
                self.units(bbox.x_min),
                self.units(bbox.y_min),
                self.units(bbox.x_max),
                self.units(bbox.y_max),
            ],
            "ItalicAngle" => 0,
            "Ascent" => self.units(self.face.ascender()),
            "Descent" => self.units(self.face.descender()),
            "CapHeight" => self.units(self.face.capital_height().unwrap_or(self.face.ascender())),
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });

        let mut widths: Vec<Object> = Vec::with_capacity(used.len() * 2);
        for (gid, glyph) in used {
            widths.push(Object::Integer(*gid as i64));
            widths.push(Object::Array(vec![Object::Integer(glyph.width.round() as i64)]));
        }

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(used).into_bytes(),
        ));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}

/// CMap that lets viewers copy text back out of glyph ids
fn to_unicode_cmap(used: &BTreeMap<u16, Glyph>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<(&u16, &Glyph)> = used.iter().collect();
    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, glyph) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = glyph
                .ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

/// WinAnsi (Windows-1252) byte for a character, if it has one
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let codepoint = ch as u32;
    if (0x20..0x7F).contains(&codepoint) || (0xA0..=0xFF).contains(&codepoint) {
        return Some(codepoint as u8);
    }

    // 0x80-0x9F differ from Latin-1
    match codepoint {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation mark
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation mark
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
