//! Textual font format (`.lsdfnt`)
//!
//! A plain-text serialization of one font: the font name on the first
//! line, then one line per tile holding its 16 bytes as two-digit hex
//! tokens. Decode followed by encode reproduces the file byte for byte.

use super::{Font, FontError, TILE_BYTES, TILE_COUNT, TILE_DATA_SIZE};

/// A font decoded from text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FntFont {
    /// Font name (first line of the file)
    pub name: String,
    /// Plain tile bytes, `TILE_COUNT * TILE_BYTES` of them
    pub tiles: Vec<u8>,
}

/// Parse the textual font format.
///
/// Nothing is written anywhere: the result holds the decoded name and
/// tile bytes, fully validated. The name line is kept verbatim so that
/// decode followed by encode reproduces the file exactly.
pub fn parse_fnt(text: &str) -> Result<FntFont, FontError> {
    let mut lines = text.lines();
    let name = lines
        .next()
        .ok_or_else(|| FontError::Format("missing name line".into()))?
        .to_string();

    let mut tiles = Vec::with_capacity(TILE_DATA_SIZE);
    for token in lines.flat_map(str::split_whitespace) {
        if token.len() != 2 {
            return Err(FontError::Format(format!("bad byte token {token:?}")));
        }
        let byte = u8::from_str_radix(token, 16)
            .map_err(|_| FontError::Format(format!("bad byte token {token:?}")))?;
        if tiles.len() == TILE_DATA_SIZE {
            return Err(FontError::Format(format!(
                "too many tile bytes (expected {TILE_DATA_SIZE})"
            )));
        }
        tiles.push(byte);
    }
    if tiles.len() != TILE_DATA_SIZE {
        return Err(FontError::Format(format!(
            "expected {TILE_DATA_SIZE} tile bytes, got {}",
            tiles.len()
        )));
    }
    Ok(FntFont { name, tiles })
}

/// Serialize a font name and its plain tile bytes to text form
pub fn write_fnt(name: &str, tiles: &[u8]) -> String {
    let mut out = String::with_capacity(TILE_DATA_SIZE * 3 + name.len() + TILE_COUNT + 1);
    out.push_str(name);
    out.push('\n');
    for row in tiles.chunks(TILE_BYTES) {
        for (i, byte) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{byte:02x}"));
        }
        out.push('\n');
    }
    out
}

impl Font<'_> {
    /// Replace this font's plain tiles from text form and regenerate the
    /// derived variants. The ROM is untouched if parsing fails. Returns
    /// the decoded font name.
    pub fn load_fnt(&mut self, text: &str) -> Result<String, FontError> {
        let parsed = parse_fnt(text)?;
        self.tile_data_mut().copy_from_slice(&parsed.tiles);
        self.generate_all_variants();
        Ok(parsed.name)
    }

    /// Serialize this font's plain tiles to text form
    pub fn save_fnt(&self, name: &str) -> String {
        write_fnt(name, self.tile_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::test_buffer;

    #[test]
    fn text_roundtrip_is_byte_exact() {
        let tiles: Vec<u8> = (0..TILE_DATA_SIZE).map(|i| (i * 7 % 256) as u8).collect();
        let text = write_fnt("MAIN", &tiles);
        let parsed = parse_fnt(&text).unwrap();
        assert_eq!(parsed.name, "MAIN");
        assert_eq!(parsed.tiles, tiles);
        assert_eq!(write_fnt(&parsed.name, &parsed.tiles), text);
    }

    #[test]
    fn name_line_is_preserved_verbatim() {
        let tiles = vec![0u8; TILE_DATA_SIZE];
        let text = write_fnt("PAD  ", &tiles);
        let parsed = parse_fnt(&text).unwrap();
        assert_eq!(parsed.name, "PAD  ");
        assert_eq!(write_fnt(&parsed.name, &parsed.tiles), text);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(parse_fnt(""), Err(FontError::Format(_))));
        assert!(matches!(parse_fnt("NAME\n00 zz"), Err(FontError::Format(_))));
        assert!(matches!(parse_fnt("NAME\n00 0"), Err(FontError::Format(_))));
        // Truncated tile data
        assert!(matches!(parse_fnt("NAME\n00 01 02"), Err(FontError::Format(_))));
        // One byte too many
        let mut text = write_fnt("NAME", &vec![0u8; TILE_DATA_SIZE]);
        text.push_str("00\n");
        assert!(matches!(parse_fnt(&text), Err(FontError::Format(_))));
    }

    #[test]
    fn load_fnt_writes_tiles_and_variants() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        let tiles: Vec<u8> = (0..TILE_DATA_SIZE).map(|i| (i % 251) as u8).collect();
        let text = write_fnt("COOL", &tiles);

        let name = font.load_fnt(&text).unwrap();
        assert_eq!(name, "COOL");
        assert_eq!(font.tile_data(), &tiles[..]);
        assert_eq!(font.save_fnt("COOL"), text);
    }

    #[test]
    fn failed_load_leaves_rom_untouched() {
        let (mut rom, data, gfx) = test_buffer();
        let before = rom.clone();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        assert!(font.load_fnt("NAME\n00 01").is_err());
        assert_eq!(rom, before);
    }
}
