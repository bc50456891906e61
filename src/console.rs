//! Line-oriented control surface: one command per line, parsed with clap.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::controller::PlaybackController;
use crate::error::FlashError;
use crate::overlay::OverlayBackend;
use crate::settings::{FlashSettings, SettingsProvider, SharedSettings};
use crate::store::SettingsFile;
use crate::words::{SharedLibrary, WordSource, WordsUpdate};

#[derive(Parser)]
#[command(about = "subflash console", disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start flashing the active words
    Start,
    /// Stop flashing
    Stop,
    /// Show playback state and counts
    Status,
    /// List categories, selected ones marked with '*'
    Categories,
    /// Add an empty category
    Add { name: String },
    /// Load a newline-delimited word list as a category
    Load {
        path: PathBuf,
        /// Category name, defaults to the file stem
        #[arg(short, long)]
        name: Option<String>,
        /// Replace an existing category of the same name
        #[arg(long)]
        replace: bool,
    },
    /// Delete categories
    Delete {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Replace the category selection
    Select { names: Vec<String> },
    /// Print the active words
    Words,
    /// Replace the active words
    UpdateWords { words: Vec<String> },
    /// Print the flash settings
    Settings,
    /// Change flash settings
    Set {
        #[arg(long)]
        flash_duration: Option<f64>,
        #[arg(long)]
        interval: Option<f64>,
        #[arg(long)]
        font_size: Option<u32>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Write settings and categories to the settings file
    Save,
    /// Stop, save and leave
    #[command(alias = "exit")]
    Quit,
}

pub struct Console<B: OverlayBackend> {
    controller: PlaybackController<B>,
    library: SharedLibrary,
    settings: SharedSettings,
    settings_path: PathBuf,
}

impl<B: OverlayBackend> Console<B> {
    pub fn new(
        controller: PlaybackController<B>,
        library: SharedLibrary,
        settings: SharedSettings,
        settings_path: PathBuf,
    ) -> Self {
        Self {
            controller,
            library,
            settings,
            settings_path,
        }
    }

    /// Reads commands from stdin until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.summary());
        loop {
            let Some(line) = readline()? else {
                self.shutdown()?;
                return Ok(());
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match self.respond(line) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(err) => println!("{err:#}"),
            }
        }
    }

    /// Executes one command line. Returns true when the console should exit.
    pub fn respond(&mut self, line: &str) -> Result<bool> {
        let mut args = shlex::split(line).context("error: Invalid quoting")?;
        args.insert(0, "subflash".to_string());
        let line = Line::try_parse_from(args)?;

        match line.command {
            Command::Start => self.start(),
            Command::Stop => self.controller.stop(),
            Command::Status => println!("{}", self.summary()),
            Command::Categories => self.list_categories(),
            Command::Add { name } => {
                self.library.write(|lib| lib.add_category(&name))?;
                println!("Added category '{}'", name.trim());
            }
            Command::Load { path, name, replace } => self.load_category(&path, name, replace)?,
            Command::Delete { names } => {
                let deleted = self.library.write(|lib| lib.delete_categories(&names))?;
                println!("Deleted {deleted} category(ies)");
            }
            Command::Select { names } => {
                self.library.write(|lib| lib.select(&names))?;
                println!("{}", self.summary());
            }
            Command::Words => {
                for word in self.library.active_words() {
                    println!("{word}");
                }
            }
            Command::UpdateWords { words } => self.update_words(words),
            Command::Settings => print_settings(&self.settings.snapshot()),
            Command::Set {
                flash_duration,
                interval,
                font_size,
                color,
            } => {
                let mut next = self.settings.snapshot();
                if let Some(v) = flash_duration {
                    next.flash_duration = v;
                }
                if let Some(v) = interval {
                    next.interval = v;
                }
                if let Some(v) = font_size {
                    next.font_size = v;
                }
                if let Some(v) = color {
                    next.text_color = v;
                }
                next.validate().map_err(anyhow::Error::msg)?;
                self.settings.replace(next.clone());
                print_settings(&next);
            }
            Command::Save => self.save()?,
            Command::Quit => {
                self.shutdown()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn start(&mut self) {
        let words: Arc<dyn WordSource> = Arc::new(self.library.clone());
        let settings: Arc<dyn SettingsProvider> = Arc::new(self.settings.clone());
        match self.controller.start(words, settings) {
            Ok(()) => {}
            // Already shown to the user by the controller
            Err(FlashError::EmptyWordList) => {}
            Err(e) => println!("{e}"),
        }
    }

    fn load_category(&mut self, path: &Path, name: Option<String>, replace: bool) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to load file: {}", path.display()))?;
        let name = name.unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let count = self
            .library
            .write(|lib| lib.import_category(&name, &text, replace))?;
        println!("Loaded category '{}' with {count} words", name.trim());
        Ok(())
    }

    fn update_words(&mut self, words: Vec<String>) {
        if self.controller.is_running() {
            self.controller.stop();
        }
        // A stopped session still holds its cursor until joined
        self.controller.join();
        self.controller.reset_cursor();

        let count = words.iter().filter(|w| !w.trim().is_empty()).count();
        let outcome = self.library.write(|lib| {
            let multiple = lib.selected().len() > 1;
            (lib.update_words(words), multiple)
        });
        match outcome {
            (WordsUpdate::Category(name), _) => {
                println!("Updated category '{name}' with {count} words")
            }
            (WordsUpdate::Transient, true) => {
                println!("Updated {count} active words (from multiple categories)")
            }
            (WordsUpdate::Transient, false) => {
                println!("Updated {count} active words (no category selected)")
            }
        }
    }

    fn list_categories(&self) {
        self.library.read(|lib| {
            if lib.categories().is_empty() {
                println!("No categories");
            }
            for (name, words) in lib.categories() {
                let mark = if lib.selected().contains(name) { '*' } else { ' ' };
                println!("{mark} {name} ({} words)", words.len());
            }
        });
    }

    fn summary(&self) -> String {
        let (categories, selected) = self
            .library
            .read(|lib| (lib.categories().len(), lib.selected().len()));
        format!(
            "Categories: {categories} | Selected: {selected} | Words: {} | {:?}",
            self.library.active_words().len(),
            self.controller.state(),
        )
    }

    fn save(&self) -> Result<()> {
        let file = SettingsFile {
            settings: self.settings.snapshot(),
            categories: self.library.read(|lib| lib.categories().clone()),
        };
        file.save(&self.settings_path)?;
        println!("Saved to {}", self.settings_path.display());
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.controller.is_running() {
            self.controller.stop();
        }
        self.controller.join();
        self.save()
    }
}

fn print_settings(settings: &FlashSettings) {
    println!(
        "flash duration: {:.2}s | interval: {:.1}s | font size: {} | color: {}",
        settings.flash_duration, settings.interval, settings.font_size, settings.text_color
    );
}

fn readline() -> Result<Option<String>> {
    print!("> ");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut buffer = String::new();
    let read = io::stdin()
        .read_line(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok((read > 0).then_some(buffer))
}
