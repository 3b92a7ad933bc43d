//! Kitsmith CLI - edit tracker cartridge ROM fonts and sample kits
//!
//! # Commands
//!
//! - `kitsmith info` - List kits, fonts and palettes found in a ROM
//! - `kitsmith kit ...` - Export/import kit banks, add/drop/export samples
//! - `kitsmith font ...` - Export/import font sheets and text fonts
//!
//! # Usage
//!
//! ```bash
//! # What does this ROM contain?
//! kitsmith info tracker.gb
//!
//! # Pull a kit bank out as a .kit file
//! kitsmith kit export tracker.gb --bank 8 -o drums.kit
//!
//! # Add a WAV sample to a kit, 3 dB quieter
//! kitsmith kit add-sample tracker.gb --bank 8 kick.wav --volume -3
//!
//! # Round-trip a font through an image editor
//! kitsmith font export tracker.gb --font 0 -o font.png
//! kitsmith font import tracker.gb --font 0 font.png
//! ```

mod font;
mod info;
mod kit;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Kitsmith - tracker cartridge ROM editor
#[derive(Parser)]
#[command(name = "kitsmith")]
#[command(about = "Edit tracker cartridge ROM fonts and sample kits")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List kits, fonts and palettes found in a ROM
    Info(info::InfoArgs),

    /// Kit bank operations
    #[command(subcommand)]
    Kit(kit::KitCommand),

    /// Font operations
    #[command(subcommand)]
    Font(font::FontCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Kit(command) => kit::execute(command),
        Commands::Font(command) => font::execute(command),
    }
}
