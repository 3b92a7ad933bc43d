//! Signature scans over the ROM buffer
//!
//! The ROM carries no directory of its own structures, so the offsets of
//! the font data, the font name table and the palette tables are found by
//! scanning for fixed byte patterns. Every function here is a pure,
//! single-pass function of the buffer: identical input always yields the
//! identical result, and a miss is reported as `None` rather than an error
//! so callers can disable the dependent feature and keep going.
//!
//! Offsets are only meaningful for the buffer they were scanned from. If
//! the caller swaps the buffer (loads another ROM), it must re-scan.

use crate::font::{FONT_COUNT, FontError, GFX_TILE_COUNT, TILE_BYTES};

/// Marker bytes directly preceding the graphics character tiles
const GFX_FONT_SIGNATURE: [u8; 4] = [1, 46, 0, 1];

/// First entry of the language word table; the font name table is the 15
/// bytes before it
const FONT_NAME_SIGNATURE: &[u8] = b"ENGLISH";

/// First two entries of the palette name table
const PALETTE_NAME_SIGNATURE: &[u8] = b"GRAY\0INV";

/// Bytes per font name entry: 4 characters + NUL
pub const FONT_NAME_SIZE: usize = 5;

/// Visible characters in a font name
pub const FONT_NAME_LENGTH: usize = 4;

/// Bytes per palette name entry: 4 characters + NUL
pub const PALETTE_NAME_SIZE: usize = 5;

fn find(rom: &[u8], signature: &[u8]) -> Option<usize> {
    rom.windows(signature.len()).position(|w| w == signature)
}

/// Offset of the graphics character tile block, or `None` if the buffer
/// does not look like a supported ROM.
///
/// The signature marks a spot 2 + 8 tiles before the graphics characters.
pub fn find_gfx_font_offset(rom: &[u8]) -> Option<usize> {
    find(rom, &GFX_FONT_SIGNATURE).map(|i| i + 2 + 8 * TILE_BYTES)
}

/// Offset of the first font slot. The font slots directly follow the
/// graphics character tiles.
pub fn find_font_offset(rom: &[u8]) -> Option<usize> {
    find_gfx_font_offset(rom).map(|i| i + GFX_TILE_COUNT * TILE_BYTES)
}

/// Offset of the font name table (three 5-byte entries)
pub fn find_font_name_offset(rom: &[u8]) -> Option<usize> {
    let i = find(rom, FONT_NAME_SIGNATURE)?;
    i.checked_sub(FONT_COUNT * FONT_NAME_SIZE)
}

/// Offset of the palette name table
pub fn find_palette_name_offset(rom: &[u8]) -> Option<usize> {
    find(rom, PALETTE_NAME_SIGNATURE)
}

/// Number of palettes in the ROM, counted as consecutive well-formed
/// name entries (4 printable characters, NUL terminated) starting at the
/// palette name table. `None` when the table itself is missing.
pub fn find_palette_count(rom: &[u8]) -> Option<usize> {
    let base = find_palette_name_offset(rom)?;
    let mut count = 0;
    loop {
        let offset = base + count * PALETTE_NAME_SIZE;
        if offset + PALETTE_NAME_SIZE > rom.len() {
            break;
        }
        let entry = &rom[offset..offset + PALETTE_NAME_SIZE];
        let name_ok = entry[..4]
            .iter()
            .all(|&b| b == 0 || (0x20..0x7f).contains(&b));
        if entry[0] == 0 || !name_ok || entry[4] != 0 {
            break;
        }
        count += 1;
    }
    Some(count)
}

/// Read a font name from the name table at `name_offset`
pub fn font_name(rom: &[u8], name_offset: usize, index: usize) -> Result<String, FontError> {
    let offset = name_table_entry(rom, name_offset, index)?;
    let name: String = rom[offset..offset + FONT_NAME_LENGTH]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    Ok(name.trim_end().to_string())
}

/// Write a font name (upper-cased, space padded to 4 characters)
pub fn set_font_name(
    rom: &mut [u8],
    name_offset: usize,
    index: usize,
    name: &str,
) -> Result<(), FontError> {
    let offset = name_table_entry(rom, name_offset, index)?;
    let name = name.to_uppercase();
    let mut bytes = name.bytes().chain(std::iter::repeat(b' '));
    for slot in &mut rom[offset..offset + FONT_NAME_LENGTH] {
        *slot = bytes.next().unwrap_or(b' ');
    }
    Ok(())
}

fn name_table_entry(rom: &[u8], name_offset: usize, index: usize) -> Result<usize, FontError> {
    let offset = name_offset + index * FONT_NAME_SIZE;
    if index >= FONT_COUNT || offset + FONT_NAME_SIZE > rom.len() {
        return Err(FontError::OutOfRange);
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_gfx_signature_at(pos: usize) -> Vec<u8> {
        let mut rom = vec![0xffu8; 0x8000];
        rom[pos..pos + 4].copy_from_slice(&GFX_FONT_SIGNATURE);
        rom
    }

    #[test]
    fn gfx_and_font_offsets() {
        let rom = rom_with_gfx_signature_at(0x1000);
        assert_eq!(find_gfx_font_offset(&rom), Some(0x1000 + 2 + 128));
        assert_eq!(
            find_font_offset(&rom),
            Some(0x1000 + 2 + 128 + GFX_TILE_COUNT * TILE_BYTES)
        );
    }

    #[test]
    fn scans_are_deterministic() {
        let rom = rom_with_gfx_signature_at(0x2345);
        assert_eq!(find_gfx_font_offset(&rom), find_gfx_font_offset(&rom));
        assert_eq!(find_font_offset(&rom), find_font_offset(&rom));
    }

    #[test]
    fn missing_signatures_report_none() {
        let rom = vec![0u8; 0x4000];
        assert_eq!(find_gfx_font_offset(&rom), None);
        assert_eq!(find_font_offset(&rom), None);
        assert_eq!(find_font_name_offset(&rom), None);
        assert_eq!(find_palette_count(&rom), None);
    }

    #[test]
    fn font_name_table() {
        let mut rom = vec![0u8; 0x4000];
        let base = 0x200;
        rom[base..base + 15].copy_from_slice(b"AAAA\0BBBB\0CCCC\0");
        rom[base + 15..base + 22].copy_from_slice(FONT_NAME_SIGNATURE);

        assert_eq!(find_font_name_offset(&rom), Some(base));
        assert_eq!(font_name(&rom, base, 1).unwrap(), "BBBB");

        set_font_name(&mut rom, base, 1, "xy").unwrap();
        assert_eq!(font_name(&rom, base, 1).unwrap(), "XY");
        assert_eq!(&rom[base + 5..base + 9], b"XY  ");

        assert!(matches!(font_name(&rom, base, 3), Err(FontError::OutOfRange)));
    }

    #[test]
    fn palette_count() {
        let mut rom = vec![0u8; 0x4000];
        let base = 0x300;
        rom[base..base + 20].copy_from_slice(b"GRAY\0INV \0SEA \0CODE\0");
        // Terminate the table with a non-name byte
        rom[base + 20] = 0x80;
        assert_eq!(find_palette_count(&rom), Some(4));
    }
}
