//! Glyph metrics and font objects for the PDF writer.
//!
//! Without a configured font file the report uses the base-14 Helvetica pair
//! in WinAnsi. With one, the file is embedded as a `Type0` font over a
//! `CIDFontType2` descendant, addressed by glyph id (`Identity-H`), so
//! Devanagari text survives.

use crate::domain::error::{AppError, Result};
use crate::infrastructure::fonts::FontFile;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use ttf_parser::{Face, GlyphId};

/// Entries per `beginbfchar` block; the CMap format caps it at 100.
const BFCHAR_BLOCK: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum Font {
    Regular,
    Bold,
}

impl Font {
    pub(super) fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Glyphs drawn with an embedded font: id → (width in 1/1000 em, source char).
pub(super) type GlyphSet = BTreeMap<u16, (i64, char)>;

pub(super) struct Embedded<'a> {
    face: Face<'a>,
    file: &'a FontFile,
    units_per_em: i64,
}

impl Embedded<'_> {
    fn glyph(&self, c: char) -> GlyphId {
        self.face.glyph_index(c).unwrap_or(GlyphId(0))
    }

    fn advance(&self, glyph: GlyphId) -> i64 {
        self.scale(self.face.glyph_hor_advance(glyph).map_or(0, i64::from))
    }

    fn scale(&self, units: i64) -> i64 {
        units * 1000 / self.units_per_em
    }
}

pub(super) enum Typeface<'a> {
    Standard,
    Embedded(Embedded<'a>),
}

impl<'a> Typeface<'a> {
    pub(super) fn embedded(file: &'a FontFile) -> Result<Self> {
        let face = Face::parse(file.data(), 0)
            .map_err(|e| AppError::RenderError(format!("Unreadable font {}: {}", file.name(), e)))?;
        let units_per_em = i64::from(face.units_per_em()).max(1);
        Ok(Typeface::Embedded(Embedded {
            face,
            file,
            units_per_em,
        }))
    }

    /// Advance width in thousandths of the font size.
    pub(super) fn glyph_width(&self, c: char, font: Font) -> i64 {
        match self {
            Typeface::Standard => helvetica_width(c, font),
            Typeface::Embedded(embedded) => embedded.advance(embedded.glyph(c)),
        }
    }

    pub(super) fn text_width(&self, text: &str, font: Font, size: i64) -> i64 {
        text.chars().map(|c| self.glyph_width(c, font)).sum::<i64>() * size / 1000
    }

    /// Greedy word wrap; words wider than the line are split by character.
    pub(super) fn wrap(&self, text: &str, font: Font, size: i64, max_width: i64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", line, word)
                };
                if self.text_width(&candidate, font, size) <= max_width {
                    line = candidate;
                    continue;
                }
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                for c in word.chars() {
                    line.push(c);
                    if self.text_width(&line, font, size) > max_width && line.chars().count() > 1 {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(c);
                    }
                }
            }
            lines.push(line);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    /// String operand for `Tj`. Embedded glyphs are recorded in `used`.
    pub(super) fn encode(&self, text: &str, used: &mut GlyphSet) -> Object {
        match self {
            Typeface::Standard => Object::string_literal(encode_win_ansi(text)),
            Typeface::Embedded(embedded) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let c = if c == '\t' { ' ' } else { c };
                    let glyph = embedded.glyph(c);
                    used.entry(glyph.0)
                        .or_insert_with(|| (embedded.advance(glyph), c));
                    bytes.extend_from_slice(&glyph.0.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
        }
    }

    /// Add the font objects to `doc` and return the `/Font` resource dictionary.
    pub(super) fn register(&self, doc: &mut Document, used: &GlyphSet) -> Dictionary {
        match self {
            Typeface::Standard => {
                let regular_id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                });
                let bold_id = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica-Bold",
                    "Encoding" => "WinAnsiEncoding",
                });
                dictionary! {
                    Font::Regular.resource() => regular_id,
                    Font::Bold.resource() => bold_id,
                }
            }
            // One face serves both weights.
            Typeface::Embedded(embedded) => {
                let font_id = embed(doc, embedded, used);
                dictionary! {
                    Font::Regular.resource() => font_id,
                    Font::Bold.resource() => font_id,
                }
            }
        }
    }
}

fn embed(doc: &mut Document, embedded: &Embedded<'_>, used: &GlyphSet) -> ObjectId {
    let name = embedded.file.name();
    let face = &embedded.face;
    let scale = |units: i16| embedded.scale(i64::from(units));
    let bbox = face.global_bounding_box();

    let file_id = doc.add_object(Stream::new(
        dictionary! { "Length1" => embedded.file.data().len() as i64 },
        embedded.file.data().to_vec(),
    ));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(name.as_bytes().to_vec()),
        "Flags" => 32i64,
        "FontBBox" => vec![
            scale(bbox.x_min).into(),
            scale(bbox.y_min).into(),
            scale(bbox.x_max).into(),
            scale(bbox.y_max).into(),
        ],
        "ItalicAngle" => 0i64,
        "Ascent" => scale(face.ascender()),
        "Descent" => scale(face.descender()),
        "CapHeight" => scale(face.capital_height().unwrap_or_else(|| face.ascender())),
        "StemV" => 80i64,
        "FontFile2" => file_id,
    });

    let widths: Vec<Object> = used
        .iter()
        .flat_map(|(glyph, (width, _))| {
            [
                Object::Integer(i64::from(*glyph)),
                Object::Array(vec![Object::Integer(*width)]),
            ]
        })
        .collect();
    let descendant_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0i64,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000i64,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(used).into_bytes()));
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(name.as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![descendant_id.into()],
        "ToUnicode" => to_unicode_id,
    })
}

/// Glyph id → Unicode map so viewers can copy and search the text.
fn to_unicode_cmap(used: &GlyphSet) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &(i64, char))> = used.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (glyph, (_, c)) in block {
            let mut units = [0u16; 2];
            let hex: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", glyph, hex));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// Approximate Helvetica advance width, in thousandths of the font size.
fn helvetica_width(c: char, font: Font) -> i64 {
    let base = match c {
        'i' | 'j' | 'l' | '|' | '\'' | '.' | ',' | ':' | ';' | '!' => 278,
        ' ' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' | '-' => 333,
        'm' | 'M' | 'W' => 833,
        'w' => 722,
        'A'..='Z' => 667,
        _ => 556,
    };
    match font {
        Font::Regular => base,
        Font::Bold => base + 30,
    }
}

/// WinAnsi bytes for the base-14 fonts. Anything unrepresentable becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\t' => b' ',
            '\u{20ac}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fonts::test_font_bytes;
    use pretty_assertions::assert_eq;

    const SIZE: i64 = 10;

    fn test_font() -> FontFile {
        FontFile::from_bytes("TestSans", test_font_bytes()).unwrap()
    }

    #[test]
    fn test_encode_replaces_non_latin() {
        assert_eq!(encode_win_ansi("Grade: A"), b"Grade: A".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("हो"), b"??".to_vec());
        assert_eq!(encode_win_ansi("a\u{2013}b"), vec![b'a', 0x96, b'b']);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Entries after page forty are missing signatures and dates";
        let lines = Typeface::Standard.wrap(text, Font::Regular, SIZE, 120);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Typeface::Standard.text_width(line, Font::Regular, SIZE) <= 120, "{}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let url = "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOpQrStUvWxYz/view?usp=sharing";
        let lines = Typeface::Standard.wrap(url, Font::Regular, SIZE, 100);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url);
    }

    #[test]
    fn test_wrap_empty_keeps_one_line() {
        assert_eq!(
            Typeface::Standard.wrap("", Font::Regular, SIZE, 100),
            vec![String::new()]
        );
    }

    #[test]
    fn test_embedded_widths_come_from_the_face() {
        let file = test_font();
        let typeface = Typeface::embedded(&file).unwrap();

        assert_eq!(typeface.glyph_width('A', Font::Regular), 600);
        assert_eq!(typeface.glyph_width('क', Font::Bold), 700);
        assert_eq!(typeface.glyph_width('z', Font::Regular), 500);
        assert_eq!(typeface.text_width("Aक", Font::Regular, SIZE), 13);
    }

    #[test]
    fn test_embedded_text_is_glyph_ids() {
        let file = test_font();
        let typeface = Typeface::embedded(&file).unwrap();
        let mut used = GlyphSet::new();

        let operand = typeface.encode("Aक", &mut used);

        match operand {
            Object::String(bytes, StringFormat::Hexadecimal) => assert_eq!(bytes, vec![0, 1, 0, 2]),
            other => panic!("unexpected operand {:?}", other),
        }
        assert_eq!(used.get(&1), Some(&(600, 'A')));
        assert_eq!(used.get(&2), Some(&(700, 'क')));
    }

    #[test]
    fn test_to_unicode_maps_glyphs_back() {
        let mut used = GlyphSet::new();
        used.insert(2, (700, 'क'));
        used.insert(1, (600, 'A'));

        let cmap = to_unicode_cmap(&used);

        assert!(cmap.contains("2 beginbfchar\n<0001> <0041>\n<0002> <0915>\nendbfchar"));
    }
}
