//! Kitsmith: codec and bank-layout engine for tracker cartridge ROMs
//!
//! This crate provides structured read/write access to three sub-formats
//! embedded in a fixed-layout cartridge ROM for a music-tracker program:
//!
//! - **Fonts**: 8×8 2-bits-per-pixel tiles, three fonts of three stored
//!   variants each (plain, shaded, inverted), plus a shared block of
//!   graphics characters.
//! - **Sample kits**: banks of up to 15 samples stored as packed 4-bit PCM
//!   nibble pairs, with an offset table, instrument names and a kit name.
//! - **Metadata tables**: font names and palette names, discovered by
//!   signature scanning.
//!
//! The ROM buffer is owned by the caller ([`RomImage`]); every codec type
//! borrows it per call and mutates it in place. Nothing here retains a
//! private copy, so offsets returned by the [`locator`] functions stay
//! valid exactly until the buffer is replaced.
//!
//! # Usage
//!
//! ```no_run
//! use kitsmith::{RomImage, locator, font::Font};
//!
//! let mut rom = RomImage::load("tracker.gb")?;
//! let font_offset = locator::find_font_offset(rom.bytes())
//!     .expect("unsupported ROM: font data not found");
//! let data = kitsmith::font::font_data_offset(font_offset, 0);
//! let mut font = Font::new(rom.bytes_mut(), data, None)?;
//! font.set_pixel(0, 3, 3, 3)?;
//! font.generate_all_variants();
//! rom.save("tracker.gb")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod font;
pub mod kit;
pub mod locator;
pub mod rom;
pub mod sample;
pub mod wav;

pub use font::{Direction, Font, FontError};
pub use kit::{KitBank, KitError};
pub use rom::{RomError, RomImage};
pub use sample::{Sample, SampleError};

// =============================================================================
// Constants
// =============================================================================

/// Size of one addressable ROM bank in bytes
pub const BANK_SIZE: usize = 0x4000;

/// Number of banks in a ROM image
pub const BANK_COUNT: usize = 64;

/// Total ROM image size in bytes
pub const ROM_SIZE: usize = BANK_COUNT * BANK_SIZE;
