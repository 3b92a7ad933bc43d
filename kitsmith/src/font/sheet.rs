//! Font sheet images
//!
//! A font can be exchanged with image editors as a grayscale sheet: an
//! 8×9 grid of 8×8 tiles (64×72 pixels), optionally followed by the
//! graphics character block. The four tile colors map to four gray
//! levels; dark gray exists in the format but is unused by the glyphs.

use image::GrayImage;

use super::{Font, FontError, GFX_TILE_COUNT, TILE_COUNT};

/// Sheet width in pixels (8 tiles)
pub const SHEET_WIDTH: u32 = 64;

/// Sheet height in pixels (9 tile rows)
pub const SHEET_HEIGHT: u32 = 72;

/// Extra tile rows when the graphics characters are appended
const GFX_ROWS: u32 = (GFX_TILE_COUNT as u32).div_ceil(8);

/// Gray level for each tile color: white, light gray, dark gray, black
const GRAY_LEVELS: [u8; 4] = [255, 170, 85, 0];

fn color_from_luma(luma: u8) -> u8 {
    // Nearest of the four levels
    (((255 - u32::from(luma)) * 3 + 127) / 255) as u8
}

impl Font<'_> {
    /// Render the font to a grayscale sheet. With `include_gfx` the
    /// graphics character block is appended below the glyphs (needs the
    /// graphics offset to be set).
    pub fn export_image(&self, include_gfx: bool) -> Result<GrayImage, FontError> {
        let tiles = if include_gfx {
            self.tile_count()
        } else {
            TILE_COUNT
        };
        if include_gfx && tiles == TILE_COUNT {
            return Err(FontError::OutOfRange);
        }
        let height = if include_gfx {
            SHEET_HEIGHT + GFX_ROWS * 8
        } else {
            SHEET_HEIGHT
        };
        let mut img = GrayImage::from_pixel(SHEET_WIDTH, height, image::Luma([255]));

        for tile in 0..tiles {
            // Graphics tiles start on the row after the glyph grid
            let cell = if tile < TILE_COUNT {
                tile
            } else {
                tile - TILE_COUNT + SHEET_HEIGHT as usize / 8 * 8
            };
            let (cx, cy) = ((cell % 8 * 8) as u32, (cell / 8 * 8) as u32);
            for y in 0..8 {
                for x in 0..8 {
                    let color = self.pixel(tile, x, y)?;
                    img.put_pixel(
                        cx + x as u32,
                        cy + y as u32,
                        image::Luma([GRAY_LEVELS[color as usize]]),
                    );
                }
            }
        }
        Ok(img)
    }

    /// Replace the font's plain tiles from a 64×72 grayscale sheet and
    /// regenerate the derived variants. Any other dimensions fail with
    /// [`FontError::WrongDimensions`] and the ROM is left untouched.
    pub fn import_image(&mut self, img: &GrayImage) -> Result<(), FontError> {
        if img.width() != SHEET_WIDTH || img.height() != SHEET_HEIGHT {
            return Err(FontError::WrongDimensions(img.width(), img.height()));
        }
        for tile in 0..TILE_COUNT {
            let (cx, cy) = ((tile % 8 * 8) as u32, (tile / 8 * 8) as u32);
            for y in 0..8 {
                for x in 0..8 {
                    let luma = img.get_pixel(cx + x as u32, cy + y as u32).0[0];
                    self.set_pixel(tile, x, y, color_from_luma(luma))?;
                }
            }
        }
        self.generate_all_variants();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::test_buffer;

    #[test]
    fn luma_mapping() {
        assert_eq!(color_from_luma(255), 0);
        assert_eq!(color_from_luma(170), 1);
        assert_eq!(color_from_luma(85), 2);
        assert_eq!(color_from_luma(0), 3);
    }

    #[test]
    fn export_import_roundtrip() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        for tile in 0..TILE_COUNT {
            for y in 0..8 {
                for x in 0..8 {
                    font.set_pixel(tile, x, y, ((tile + x + y) % 4) as u8).unwrap();
                }
            }
        }
        let sheet = font.export_image(false).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (SHEET_WIDTH, SHEET_HEIGHT));
        let before = font.tile_data().to_vec();

        // Wipe and re-import
        for tile in 0..TILE_COUNT {
            for y in 0..8 {
                for x in 0..8 {
                    font.set_pixel(tile, x, y, 0).unwrap();
                }
            }
        }
        font.import_image(&sheet).unwrap();
        assert_eq!(font.tile_data(), &before[..]);
    }

    #[test]
    fn export_with_gfx_block() {
        let (mut rom, data, gfx) = test_buffer();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        font.set_pixel(TILE_COUNT, 0, 0, 3).unwrap();
        let sheet = font.export_image(true).unwrap();
        assert_eq!(sheet.height(), SHEET_HEIGHT + GFX_ROWS * 8);
        // First graphics tile lands at the top-left of the appended rows
        assert_eq!(sheet.get_pixel(0, SHEET_HEIGHT).0[0], 0);
    }

    #[test]
    fn wrong_dimensions_leave_rom_untouched() {
        let (mut rom, data, gfx) = test_buffer();
        let before = rom.clone();
        let mut font = Font::new(&mut rom, data, Some(gfx)).unwrap();
        let img = GrayImage::new(64, 64);
        assert_eq!(
            font.import_image(&img),
            Err(FontError::WrongDimensions(64, 64))
        );
        assert_eq!(rom, before);
    }
}
