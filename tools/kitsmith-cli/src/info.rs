//! `kitsmith info` - summarize what the locator finds in a ROM

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kitsmith::{BANK_COUNT, KitBank, RomImage, kit, locator};

#[derive(Args)]
pub struct InfoArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let mut rom = RomImage::load(&args.rom)
        .with_context(|| format!("failed to load ROM {:?}", args.rom))?;

    println!("Kits:");
    for bank in 0..BANK_COUNT {
        let slice = rom.bank_mut(bank)?;
        if !kit::is_kit_bank(slice) && !kit::is_empty_kit_bank(slice) {
            continue;
        }
        let bank_view = KitBank::new(slice)?;
        if bank_view.is_empty() {
            println!("  bank {bank:2}: (empty)");
            continue;
        }
        let samples = bank_view.read_samples()?;
        let used = KitBank::total_sample_size(&samples);
        let count = samples.iter().flatten().count();
        println!(
            "  bank {bank:2}: {:6} {count:2} samples, {used:#x}/{:#x} bytes",
            bank_view.kit_name(),
            kit::MAX_SAMPLE_SPACE
        );
    }

    println!("Fonts:");
    match locator::find_font_name_offset(rom.bytes()) {
        Some(name_offset) => {
            for index in 0..kitsmith::font::FONT_COUNT {
                let name = locator::font_name(rom.bytes(), name_offset, index)?;
                println!("  font {index}: {name}");
            }
        }
        None => println!("  (font name table not found)"),
    }

    match locator::find_palette_count(rom.bytes()) {
        Some(count) => println!("Palettes: {count}"),
        None => println!("Palettes: (not found)"),
    }

    Ok(())
}
