//! Font tile codec
//!
//! Fonts are stored as 8×8 tiles in the classic 2-bits-per-pixel bit-plane
//! format: each tile row is two bytes, plane 0 holding the low color bit
//! and plane 1 the high bit, most significant bit leftmost. A font slot
//! holds a small header followed by three tile blocks: the plain glyphs
//! plus a shaded and an inverted variant derived from them. The variants
//! are never edited directly; after any change to the plain tiles they
//! must be regenerated with [`Font::generate_all_variants`].
//!
//! A separate block of graphics characters (borders, cursors, ...) is
//! shared by all fonts and sits outside the font slots. Tiles with index
//! `TILE_COUNT..TILE_COUNT + GFX_TILE_COUNT` address that block.

pub mod fnt;
pub mod sheet;

pub use fnt::{FntFont, parse_fnt, write_fnt};

// =============================================================================
// Constants
// =============================================================================

/// Number of fonts in the ROM
pub const FONT_COUNT: usize = 3;

/// Editable tiles per font variant
pub const TILE_COUNT: usize = 71;

/// Graphics character tiles shared by all fonts
pub const GFX_TILE_COUNT: usize = 46;

/// Bytes per 8×8 2bpp tile
pub const TILE_BYTES: usize = 16;

/// Stride between font slots
pub const FONT_SIZE: usize = 0xe96;

/// Header bytes at the start of each font slot
pub const FONT_HEADER_SIZE: usize = 130;

/// Bytes in one tile block (one variant)
pub const TILE_DATA_SIZE: usize = TILE_COUNT * TILE_BYTES;

/// Offset of the shaded variant relative to the plain tile data
const SHADED_DELTA: usize = 0x4d2;

/// Offset of the inverted variant relative to the plain tile data
const INVERTED_DELTA: usize = 0x9a4;

/// Display font index -> physical slot. The ROM stores the fonts in a
/// rotated order; this table is a fixed quirk of the format and must not
/// be re-derived.
pub const FONT_SLOT_ORDER: [usize; FONT_COUNT] = [1, 2, 0];

/// Offset of the plain tile data for a font, by display index.
///
/// `font_offset` is the value returned by
/// [`crate::locator::find_font_offset`].
pub fn font_data_offset(font_offset: usize, display_index: usize) -> usize {
    let slot = FONT_SLOT_ORDER[display_index % FONT_COUNT];
    font_offset + slot * FONT_SIZE + FONT_HEADER_SIZE
}

// =============================================================================
// Errors
// =============================================================================

/// Font codec errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    /// Tile index, pixel coordinate or color value out of range
    #[error("tile, pixel or color out of range")]
    OutOfRange,
    /// Imported sheet is not 64×72 pixels
    #[error("font sheet must be 64x72 pixels, got {0}x{1}")]
    WrongDimensions(u32, u32),
    /// Malformed textual font data
    #[error("malformed font text: {0}")]
    Format(String),
}

/// Tile rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// =============================================================================
// Font view
// =============================================================================

/// Mutable view of one font's tile data inside the ROM buffer.
///
/// Borrows the buffer for the duration of the edit; nothing is copied.
pub struct Font<'a> {
    rom: &'a mut [u8],
    data_offset: usize,
    gfx_offset: Option<usize>,
}

impl<'a> Font<'a> {
    /// Create a view over the plain tile data at `data_offset` (see
    /// [`font_data_offset`]), optionally with the graphics character block
    /// at `gfx_offset`. Fails if either region falls outside the buffer.
    pub fn new(
        rom: &'a mut [u8],
        data_offset: usize,
        gfx_offset: Option<usize>,
    ) -> Result<Self, FontError> {
        if data_offset + INVERTED_DELTA + TILE_DATA_SIZE > rom.len() {
            return Err(FontError::OutOfRange);
        }
        if let Some(gfx) = gfx_offset {
            if gfx + GFX_TILE_COUNT * TILE_BYTES > rom.len() {
                return Err(FontError::OutOfRange);
            }
        }
        Ok(Self {
            rom,
            data_offset,
            gfx_offset,
        })
    }

    /// Total addressable tiles: the editable block plus, when a graphics
    /// offset is set, the graphics characters.
    pub fn tile_count(&self) -> usize {
        match self.gfx_offset {
            Some(_) => TILE_COUNT + GFX_TILE_COUNT,
            None => TILE_COUNT,
        }
    }

    fn tile_location(&self, tile: usize) -> Result<usize, FontError> {
        if tile < TILE_COUNT {
            Ok(self.data_offset + tile * TILE_BYTES)
        } else if tile < TILE_COUNT + GFX_TILE_COUNT {
            let gfx = self.gfx_offset.ok_or(FontError::OutOfRange)?;
            Ok(gfx + (tile - TILE_COUNT) * TILE_BYTES)
        } else {
            Err(FontError::OutOfRange)
        }
    }

    /// Read one pixel (color 0-3)
    pub fn pixel(&self, tile: usize, x: usize, y: usize) -> Result<u8, FontError> {
        if x >= 8 || y >= 8 {
            return Err(FontError::OutOfRange);
        }
        let row = self.tile_location(tile)? + y * 2;
        let bit = 7 - x;
        let low = (self.rom[row] >> bit) & 1;
        let high = (self.rom[row + 1] >> bit) & 1;
        Ok(low | (high << 1))
    }

    /// Write one pixel (color 0-3)
    pub fn set_pixel(&mut self, tile: usize, x: usize, y: usize, color: u8) -> Result<(), FontError> {
        if x >= 8 || y >= 8 || color > 3 {
            return Err(FontError::OutOfRange);
        }
        let row = self.tile_location(tile)? + y * 2;
        let mask = 0x80u8 >> x;
        self.rom[row] &= !mask;
        self.rom[row + 1] &= !mask;
        if color & 1 != 0 {
            self.rom[row] |= mask;
        }
        if color & 2 != 0 {
            self.rom[row + 1] |= mask;
        }
        Ok(())
    }

    /// Read a whole tile as a `[y][x]` color grid
    pub fn read_tile(&self, tile: usize) -> Result<[[u8; 8]; 8], FontError> {
        let mut grid = [[0u8; 8]; 8];
        for (y, row) in grid.iter_mut().enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = self.pixel(tile, x, y)?;
            }
        }
        Ok(grid)
    }

    /// Overwrite a whole tile from a `[y][x]` color grid
    pub fn write_tile(&mut self, tile: usize, grid: &[[u8; 8]; 8]) -> Result<(), FontError> {
        for (y, row) in grid.iter().enumerate() {
            for (x, &px) in row.iter().enumerate() {
                self.set_pixel(tile, x, y, px)?;
            }
        }
        Ok(())
    }

    /// Rotate the tile contents a quarter turn: `Down` and `Right` turn
    /// clockwise, `Up` and `Left` counter-clockwise. Four rotations in
    /// the same direction restore the original tile.
    pub fn rotate(&mut self, tile: usize, direction: Direction) -> Result<(), FontError> {
        let src = self.read_tile(tile)?;
        let mut dst = [[0u8; 8]; 8];
        for (y, row) in dst.iter_mut().enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = match direction {
                    Direction::Down | Direction::Right => src[7 - x][y],
                    Direction::Up | Direction::Left => src[x][7 - y],
                };
            }
        }
        self.write_tile(tile, &dst)
    }

    /// Recompute the shaded and inverted bytes of one editable tile from
    /// its plain bytes.
    ///
    /// Shaded: plane 0 is OR-ed with an alternating 0x55/0xaa row pattern,
    /// plane 1 is copied. Inverted: both planes complemented.
    pub fn generate_shaded_and_inverted(&mut self, tile: usize) -> Result<(), FontError> {
        if tile >= TILE_COUNT {
            return Err(FontError::OutOfRange);
        }
        let base = self.data_offset + tile * TILE_BYTES;
        for i in (0..TILE_BYTES).step_by(2) {
            let dither = if i % 4 == 2 { 0xaa } else { 0x55 };
            self.rom[base + SHADED_DELTA + i] = self.rom[base + i] | dither;
            self.rom[base + SHADED_DELTA + i + 1] = self.rom[base + i + 1];
            self.rom[base + INVERTED_DELTA + i] = !self.rom[base + i];
            self.rom[base + INVERTED_DELTA + i + 1] = !self.rom[base + i + 1];
        }
        Ok(())
    }

    /// Regenerate the derived variants of every editable tile. Must run
    /// after any plain-tile mutation before the font is consistent.
    pub fn generate_all_variants(&mut self) {
        for tile in 0..TILE_COUNT {
            // tile is in range by construction
            let _ = self.generate_shaded_and_inverted(tile);
        }
    }

    /// Raw plain tile bytes of this font
    pub fn tile_data(&self) -> &[u8] {
        &self.rom[self.data_offset..self.data_offset + TILE_DATA_SIZE]
    }

    pub(crate) fn tile_data_mut(&mut self) -> &mut [u8] {
        &mut self.rom[self.data_offset..self.data_offset + TILE_DATA_SIZE]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A buffer big enough for three font slots plus a graphics block at
    /// the end, with the font data at slot 0.
    pub(crate) fn test_buffer() -> (Vec<u8>, usize, usize) {
        let gfx_offset = FONT_COUNT * FONT_SIZE;
        let len = gfx_offset + GFX_TILE_COUNT * TILE_BYTES;
        (vec![0u8; len], FONT_HEADER_SIZE, gfx_offset)
    }

    #[test]
    fn pixel_roundtrip() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        for color in 0..4u8 {
            for y in 0..8 {
                for x in 0..8 {
                    font.set_pixel(5, x, y, color).unwrap();
                    assert_eq!(font.pixel(5, x, y).unwrap(), color);
                }
            }
        }
    }

    #[test]
    fn pixel_bounds() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        assert_eq!(font.pixel(0, 8, 0), Err(FontError::OutOfRange));
        assert_eq!(font.pixel(0, 0, 8), Err(FontError::OutOfRange));
        assert_eq!(font.set_pixel(0, 0, 0, 4), Err(FontError::OutOfRange));
        assert_eq!(
            font.pixel(TILE_COUNT + GFX_TILE_COUNT, 0, 0),
            Err(FontError::OutOfRange)
        );
        // Graphics tiles are addressable past the editable block
        assert!(font.pixel(TILE_COUNT, 0, 0).is_ok());
    }

    #[test]
    fn gfx_tiles_need_gfx_offset() {
        let (mut rom, data, _) = test_buffer();
        let font = Font::new(&mut rom, data, None).unwrap();
        assert_eq!(font.tile_count(), TILE_COUNT);
        assert_eq!(font.pixel(TILE_COUNT, 0, 0), Err(FontError::OutOfRange));
    }

    #[test]
    fn rotation_has_period_four() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        // An asymmetric glyph
        font.set_pixel(3, 0, 0, 3).unwrap();
        font.set_pixel(3, 4, 2, 1).unwrap();
        font.set_pixel(3, 7, 6, 2).unwrap();
        let original = font.read_tile(3).unwrap();

        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            for step in 0..4 {
                font.rotate(3, direction).unwrap();
                if step < 3 {
                    assert_ne!(font.read_tile(3).unwrap(), original);
                }
            }
            assert_eq!(font.read_tile(3).unwrap(), original);
        }
    }

    #[test]
    fn rotate_is_a_quarter_turn() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        font.set_pixel(0, 2, 1, 3).unwrap();

        // Clockwise: (x 2, y 1) -> (x 6, y 2)
        font.rotate(0, Direction::Right).unwrap();
        assert_eq!(font.pixel(0, 6, 2).unwrap(), 3);
        assert_eq!(font.pixel(0, 2, 1).unwrap(), 0);

        // Counter-clockwise undoes it
        font.rotate(0, Direction::Left).unwrap();
        assert_eq!(font.pixel(0, 2, 1).unwrap(), 3);
        assert_eq!(font.pixel(0, 6, 2).unwrap(), 0);
    }

    #[test]
    fn derived_variants() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        font.set_pixel(0, 0, 0, 3).unwrap();
        font.generate_all_variants();

        let base = data;
        // Shaded: plane 0 gains the dither bits, plane 1 is copied
        assert_eq!(rom[base + SHADED_DELTA], rom[base] | 0x55);
        assert_eq!(rom[base + SHADED_DELTA + 2], rom[base + 2] | 0xaa);
        assert_eq!(rom[base + SHADED_DELTA + 1], rom[base + 1]);
        // Inverted: both planes complemented
        assert_eq!(rom[base + INVERTED_DELTA], !rom[base]);
        assert_eq!(rom[base + INVERTED_DELTA + 1], !rom[base + 1]);
    }

    #[test]
    fn slot_order_is_fixed() {
        assert_eq!(font_data_offset(0x1000, 0), 0x1000 + FONT_SIZE + FONT_HEADER_SIZE);
        assert_eq!(
            font_data_offset(0x1000, 1),
            0x1000 + 2 * FONT_SIZE + FONT_HEADER_SIZE
        );
        assert_eq!(font_data_offset(0x1000, 2), 0x1000 + FONT_HEADER_SIZE);
    }
}
