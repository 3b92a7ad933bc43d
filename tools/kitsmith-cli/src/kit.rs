//! `kitsmith kit` - kit bank operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use kitsmith::kit::MAX_SAMPLES;
use kitsmith::{KitBank, RomImage, Sample, kit, wav};

#[derive(Subcommand)]
pub enum KitCommand {
    /// Dump a kit bank to a .kit file
    Export(ExportArgs),

    /// Overwrite a kit bank from a .kit file
    Import(ImportArgs),

    /// Rename a kit
    Rename(RenameArgs),

    /// Encode a WAV file into the first free sample slot
    AddSample(AddSampleArgs),

    /// Remove sample slots (higher slots shift down)
    Drop(DropArgs),

    /// Export every sample of a kit as WAV files
    ExportSamples(ExportSamplesArgs),
}

#[derive(Args)]
pub struct ExportArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// Output .kit file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// Input .kit file
    pub input: PathBuf,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// New kit name (up to 6 characters)
    pub name: String,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct AddSampleArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// Input WAV file
    pub wav: PathBuf,
    /// Instrument name (up to 3 characters, defaults to the file name)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Volume adjustment in dB
    #[arg(short, long)]
    pub volume: Option<i32>,
    /// Dither amount in dB
    #[arg(short, long)]
    pub dither: Option<i32>,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DropArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// Slot numbers to drop (0-14)
    #[arg(required = true)]
    pub slots: Vec<usize>,
    /// Where to write the patched ROM (defaults to in-place)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportSamplesArgs {
    /// ROM image (.gb)
    pub rom: PathBuf,
    /// ROM bank number
    #[arg(short, long)]
    pub bank: usize,
    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn execute(command: KitCommand) -> Result<()> {
    match command {
        KitCommand::Export(args) => export(args),
        KitCommand::Import(args) => import(args),
        KitCommand::Rename(args) => rename(args),
        KitCommand::AddSample(args) => add_sample(args),
        KitCommand::Drop(args) => drop_slots(args),
        KitCommand::ExportSamples(args) => export_samples(args),
    }
}

fn load_rom(path: &Path) -> Result<RomImage> {
    RomImage::load(path).with_context(|| format!("failed to load ROM {path:?}"))
}

fn save_rom(rom: &RomImage, input: &Path, output: Option<&Path>) -> Result<()> {
    let target = output.unwrap_or(input);
    rom.save(target)
        .with_context(|| format!("failed to write ROM {target:?}"))?;
    tracing::info!("Wrote {:?}", target);
    Ok(())
}

/// A kit view plus its decoded samples, refusing foreign banks
fn open_kit<'a>(
    rom: &'a mut RomImage,
    bank: usize,
) -> Result<(KitBank<'a>, [Option<Sample>; MAX_SAMPLES])> {
    let slice = rom.bank_mut(bank)?;
    let view = KitBank::new(slice)?;
    let samples = view
        .read_samples()
        .with_context(|| format!("bank {bank} does not hold a kit"))?;
    Ok((view, samples))
}

fn export(args: ExportArgs) -> Result<()> {
    let rom = load_rom(&args.rom)?;
    let bank = rom.bank(args.bank)?;
    if !kit::is_kit_bank(bank) && !kit::is_empty_kit_bank(bank) {
        bail!("bank {} does not hold a kit", args.bank);
    }
    std::fs::write(&args.output, bank)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    tracing::info!("Exported bank {} to {:?}", args.bank, args.output);
    Ok(())
}

fn import(args: ImportArgs) -> Result<()> {
    let mut rom = load_rom(&args.rom)?;
    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;
    kit::import_kit(rom.bank_mut(args.bank)?, &data)?;
    tracing::info!("Imported {:?} into bank {}", args.input, args.bank);
    save_rom(&rom, &args.rom, args.output.as_deref())
}

fn rename(args: RenameArgs) -> Result<()> {
    let mut rom = load_rom(&args.rom)?;
    let (mut view, samples) = open_kit(&mut rom, args.bank)?;
    view.set_kit_name(&args.name);
    view.compile(&samples)?;
    save_rom(&rom, &args.rom, args.output.as_deref())
}

fn add_sample(args: AddSampleArgs) -> Result<()> {
    let mut rom = load_rom(&args.rom)?;

    let pcm = wav::read_wav(&args.wav)
        .with_context(|| format!("failed to read WAV {:?}", args.wav))?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .wav
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("---")
            .to_string(),
    };
    let mut sample = Sample::from_pcm(pcm, name);
    if let Some(db) = args.volume {
        sample.set_volume_db(db);
    }
    if let Some(db) = args.dither {
        sample.set_dither_db(db);
    }

    let (mut view, mut samples) = open_kit(&mut rom, args.bank)?;
    let slot = view.add_sample(&mut samples, sample)?;
    tracing::info!(
        "Added sample to slot {slot} ({:#x}/{:#x} bytes used)",
        KitBank::total_sample_size(&samples),
        kit::MAX_SAMPLE_SPACE
    );
    save_rom(&rom, &args.rom, args.output.as_deref())
}

fn drop_slots(args: DropArgs) -> Result<()> {
    let mut rom = load_rom(&args.rom)?;
    let (mut view, mut samples) = open_kit(&mut rom, args.bank)?;
    view.drop_slots(&mut samples, &args.slots)?;
    tracing::info!("Dropped slots {:?} from bank {}", args.slots, args.bank);
    save_rom(&rom, &args.rom, args.output.as_deref())
}

fn export_samples(args: ExportSamplesArgs) -> Result<()> {
    let mut rom = load_rom(&args.rom)?;
    let (view, samples) = open_kit(&mut rom, args.bank)?;
    let kit_name = match view.kit_name() {
        name if name.is_empty() => format!("untitled-{:02}", args.bank),
        name => name,
    };

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {:?}", args.output))?;
    let mut exported = 0;
    for (slot, sample) in samples.iter().enumerate() {
        let Some(sample) = sample else {
            continue;
        };
        let name = match sample.name() {
            "" => "untitled",
            name => name,
        };
        let path = args
            .output
            .join(format!("{kit_name} - {:02} - {name}.wav", slot + 1));
        wav::write_wav(&path, sample.nibbles())
            .with_context(|| format!("failed to write {path:?}"))?;
        exported += 1;
    }
    tracing::info!("Exported {exported} samples to {:?}", args.output);
    Ok(())
}
