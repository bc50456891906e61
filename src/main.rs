use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

mod clock;
mod console;
mod constants;
mod controller;
mod engine;
mod error;
mod host;
mod overlay;
mod settings;
mod state;
mod store;
mod words;

#[cfg(test)]
mod testing;

use crate::console::Console;
use crate::constants::DEFAULT_SETTINGS_FILE;
use crate::controller::PlaybackController;
use crate::host::{ConsoleStatus, TerminalHost};
use crate::overlay::raylib_surface::RaylibBackend;
use crate::settings::SharedSettings;
use crate::store::SettingsFile;
use crate::words::{SharedLibrary, WordLibrary};

#[derive(Parser)]
#[command(version, about = "Flashes words from chosen categories as brief full-screen overlays")]
struct Args {
    /// Settings and categories file
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Categories to select on startup
    #[arg(long, num_args = 1..)]
    select: Vec<String>,

    /// Start flashing right away
    #[arg(long)]
    autostart: bool,

    /// Plain overlay window: no transparency, always-on-top or click-through
    #[arg(long)]
    plain_overlay: bool,
}

/// Initialize logging, writing to `log_file` if given, otherwise stderr.
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Some(path) = log_file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file)
                    .init();
                return;
            }
            Err(e) => eprintln!("Failed to open log file {}: {e}", path.display()),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());

    let file = SettingsFile::load_or_default(&args.settings);
    tracing::info!(
        path = %args.settings.display(),
        categories = file.categories.len(),
        "settings loaded"
    );

    let library = SharedLibrary::new(WordLibrary::new(file.categories));
    if !args.select.is_empty() {
        library.write(|lib| lib.select(&args.select))?;
    }
    let settings = SharedSettings::new(file.settings);

    let controller =
        PlaybackController::new(
            RaylibBackend::new(!args.plain_overlay),
            Arc::new(TerminalHost),
            Arc::new(ConsoleStatus),
        );
    let mut console = Console::new(controller, library, settings, args.settings);

    if args.autostart {
        console.respond("start")?;
    }
    console.run()
}
