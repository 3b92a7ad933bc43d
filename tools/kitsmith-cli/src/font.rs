//! `kitsmith font` - font operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use kitsmith::font::{FONT_COUNT, font_data_offset};
use kitsmith::{Font, RomImage, locator};

#[derive(Subcommand)]
pub enum FontCommand {
    /// Render a font to a grayscale PNG sheet or a text font file
    Export(ExportArgs),

    /// Replace a font from a PNG sheet or a text font file
    Import(ImportArgs),

    /// Rename a font
    Rename(RenameArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// Font number (0-2)
    #[arg(short, long)]
    pub font: usize,
    /// Output file (.png or .lsdfnt)
    #[arg(short, long)]
    pub output: PathBuf,
    /// Append the graphics character block (PNG only)
    #[arg(long)]
    pub gfx: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// Font number (0-2)
    #[arg(short, long)]
    pub font: usize,
    /// Input file (.png or .lsdfnt)
    pub input: PathBuf,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// Font number (0-2)
    #[arg(short, long)]
    pub font: usize,
    /// New font name (up to 4 characters)
    pub name: String,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(command: FontCommand) -> Result<()> {
    match command {
        FontCommand::Export(args) => export(args),
        FontCommand::Import(args) => import(args),
        FontCommand::Rename(args) => rename(args),
    }
}

fn check_font_index(index: usize) -> Result<()> {
    if index >= FONT_COUNT {
        bail!("font number {index} out of range (0-{})", FONT_COUNT - 1);
    }
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Resolve the tile data offsets for a font, or explain which scan failed
fn font_offsets(rom: &[u8], index: usize) -> Result<(usize, usize)> {
    let font_offset =
        locator::find_font_offset(rom).context("font data not found (unsupported ROM?)")?;
    let gfx_offset = locator::find_gfx_font_offset(rom)
        .context("graphics character data not found (unsupported ROM?)")?;
    Ok((font_data_offset(font_offset, index), gfx_offset))
}

fn export(args: ExportArgs) -> Result<()> {
    check_font_index(args.font)?;
    let mut rom = RomImage::load(&args.rom)
        .with_context(|| format!("failed to load ROM {:?}", args.rom))?;
    let (data_offset, gfx_offset) = font_offsets(rom.bytes(), args.font)?;

    match extension(&args.output).as_str() {
        "lsdfnt" => {
            let name_offset = locator::find_font_name_offset(rom.bytes())
                .context("font name table not found (unsupported ROM?)")?;
            let name = locator::font_name(rom.bytes(), name_offset, args.font)?;
            let font = Font::new(rom.bytes_mut(), data_offset, Some(gfx_offset))?;
            std::fs::write(&args.output, font.save_fnt(&name))
                .with_context(|| format!("failed to write {:?}", args.output))?;
        }
        _ => {
            let font = Font::new(rom.bytes_mut(), data_offset, Some(gfx_offset))?;
            let sheet = font.export_image(args.gfx)?;
            sheet
                .save(&args.output)
                .with_context(|| format!("failed to write {:?}", args.output))?;
        }
    }
    tracing::info!("Exported font {} to {:?}", args.font, args.output);
    Ok(())
}

fn import(args: ImportArgs) -> Result<()> {
    check_font_index(args.font)?;
    let mut rom = RomImage::load(&args.rom)
        .with_context(|| format!("failed to load ROM {:?}", args.rom))?;
    let (data_offset, gfx_offset) = font_offsets(rom.bytes(), args.font)?;
    let name_offset = locator::find_font_name_offset(rom.bytes());

    let name = match extension(&args.input).as_str() {
        "lsdfnt" => {
            let text = std::fs::read_to_string(&args.input)
                .with_context(|| format!("failed to read {:?}", args.input))?;
            let mut font = Font::new(rom.bytes_mut(), data_offset, Some(gfx_offset))?;
            font.load_fnt(&text)?
        }
        _ => {
            let sheet = image::open(&args.input)
                .with_context(|| format!("failed to read image {:?}", args.input))?
                .to_luma8();
            let mut font = Font::new(rom.bytes_mut(), data_offset, Some(gfx_offset))?;
            font.import_image(&sheet)?;
            args.input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("FONT")
                .to_string()
        }
    };

    match name_offset {
        Some(offset) => locator::set_font_name(rom.bytes_mut(), offset, args.font, &name)?,
        None => tracing::warn!("font name table not found, keeping the old name"),
    }

    let target = args.output.as_deref().unwrap_or(&args.rom);
    rom.save(target)
        .with_context(|| format!("failed to write ROM {target:?}"))?;
    tracing::info!("Imported {:?} into font {} ({name})", args.input, args.font);
    Ok(())
}

fn rename(args: RenameArgs) -> Result<()> {
    check_font_index(args.font)?;
    let mut rom = RomImage::load(&args.rom)
        .with_context(|| format!("failed to load ROM {:?}", args.rom))?;
    let name_offset = locator::find_font_name_offset(rom.bytes())
        .context("font name table not found (unsupported ROM?)")?;
    locator::set_font_name(rom.bytes_mut(), name_offset, args.font, &args.name)?;

    let target = args.output.as_deref().unwrap_or(&args.rom);
    rom.save(target)
        .with_context(|| format!("failed to write ROM {target:?}"))?;
    tracing::info!("Renamed font {} to {:?}", args.font, args.name);
    Ok(())
}
