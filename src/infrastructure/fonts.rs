use crate::domain::error::{AppError, Result};
use std::path::Path;
use std::sync::Arc;

const FALLBACK_FONT_NAME: &str = "EmbeddedFont";

/// A TrueType file read once at startup and shared by every PDF export.
#[derive(Debug, Clone)]
pub struct FontFile {
    name: String,
    data: Arc<[u8]>,
}

impl FontFile {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(&stem, data)
    }

    /// Fails unless `data` parses as a TrueType/OpenType face.
    pub fn from_bytes(name: &str, data: Vec<u8>) -> Result<Self> {
        ttf_parser::Face::parse(&data, 0)
            .map_err(|e| AppError::RenderError(format!("Unreadable font {}: {}", name, e)))?;
        Ok(Self {
            name: postscript_name(name),
            data: data.into(),
        })
    }

    /// Name used for `BaseFont`; no spaces or delimiters.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

fn postscript_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        FALLBACK_FONT_NAME.to_string()
    } else {
        cleaned
    }
}

/// Smallest font the parser accepts: `.notdef`, `A` and `क`, 1000 units per em.
#[cfg(test)]
pub(crate) fn test_font_bytes() -> Vec<u8> {
    fn u16s(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
    head[18..20].copy_from_slice(&1000u16.to_be_bytes());
    head[40..42].copy_from_slice(&1000i16.to_be_bytes());
    head[42..44].copy_from_slice(&800i16.to_be_bytes());

    let mut hhea = vec![0u8; 36];
    hhea[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea[4..6].copy_from_slice(&800i16.to_be_bytes());
    hhea[6..8].copy_from_slice(&(-200i16).to_be_bytes());
    hhea[10..12].copy_from_slice(&700u16.to_be_bytes());
    hhea[34..36].copy_from_slice(&3u16.to_be_bytes());

    let mut maxp = 0x0000_5000u32.to_be_bytes().to_vec();
    maxp.extend(u16s(&[3]));

    // (advance, left side bearing) per glyph.
    let hmtx = u16s(&[500, 0, 600, 0, 700, 0]);

    let delta = |gid: u16, code: u16| gid.wrapping_sub(code);
    let mut cmap = u16s(&[0, 1, 3, 1]);
    cmap.extend(12u32.to_be_bytes());
    cmap.extend(u16s(&[4, 40, 0, 6, 4, 1, 2]));
    cmap.extend(u16s(&[0x41, 0x915, 0xFFFF]));
    cmap.extend(u16s(&[0]));
    cmap.extend(u16s(&[0x41, 0x915, 0xFFFF]));
    cmap.extend(u16s(&[delta(1, 0x41), delta(2, 0x915), 1]));
    cmap.extend(u16s(&[0, 0, 0]));

    let tables: [(&[u8; 4], Vec<u8>); 5] = [
        (b"cmap", cmap),
        (b"head", head),
        (b"hhea", hhea),
        (b"hmtx", hmtx),
        (b"maxp", maxp),
    ];

    let mut font = 0x0001_0000u32.to_be_bytes().to_vec();
    font.extend(u16s(&[tables.len() as u16, 64, 2, 16]));
    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend_from_slice(*tag);
        font.extend(0u32.to_be_bytes());
        font.extend((offset as u32).to_be_bytes());
        font.extend((data.len() as u32).to_be_bytes());
        let mut padded = data.clone();
        padded.resize(data.len().div_ceil(4) * 4, 0);
        offset += padded.len();
        body.extend(padded);
    }
    font.extend(body);
    font
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_bytes_parse_and_map() {
        let font = FontFile::from_bytes("Test Sans", test_font_bytes()).unwrap();
        let face = ttf_parser::Face::parse(font.data(), 0).unwrap();

        assert_eq!(font.name(), "TestSans");
        assert_eq!(face.units_per_em(), 1000);
        assert_eq!(face.glyph_index('A').map(|g| g.0), Some(1));
        assert_eq!(face.glyph_index('क').map(|g| g.0), Some(2));
        assert!(face.glyph_index('z').is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = FontFile::from_bytes("broken", b"not a font".to_vec());
        assert!(matches!(result, Err(AppError::RenderError(_))));
    }

    #[test]
    fn test_load_uses_file_stem() {
        let dir = std::env::temp_dir().join(format!("daptar-font-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("NotoSansDevanagari-Regular.ttf");
        std::fs::write(&path, test_font_bytes()).unwrap();

        let font = FontFile::load(&path).unwrap();

        assert_eq!(font.name(), "NotoSansDevanagari-Regular");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
