use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::FlashError;

/// Display settings for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashSettings {
    pub flash_duration: f64,
    pub interval: f64,
    pub font_size: u32,
    pub text_color: String,
}

impl Default for FlashSettings {
    fn default() -> Self {
        Self {
            flash_duration: DEFAULT_FLASH_DURATION,
            interval: DEFAULT_INTERVAL,
            font_size: DEFAULT_FONT_SIZE,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
        }
    }
}

impl FlashSettings {
    pub fn flash_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.flash_duration).unwrap_or(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval).unwrap_or(Duration::ZERO)
    }

    /// Parsed text colour, or white when `text_color` is not `#RRGGBB`.
    pub fn text_rgb(&self) -> Rgb {
        match self.text_color.parse() {
            Ok(rgb) => rgb,
            Err(e) => {
                tracing::warn!("{e}, falling back to white");
                FALLBACK_TEXT_COLOR
            }
        }
    }

    /// Checks every field, naming the first one that is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.flash_duration.is_finite() || self.flash_duration <= 0.0 {
            return Err(format!("flash duration must be > 0 (got {})", self.flash_duration));
        }
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(format!("interval must be >= 0 (got {})", self.interval));
        }
        if self.font_size == 0 {
            return Err("font size must be > 0".to_string());
        }
        self.text_color
            .parse::<Rgb>()
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Replaces out-of-range fields with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.flash_duration.is_finite() || self.flash_duration <= 0.0 {
            self.flash_duration = defaults.flash_duration;
        }
        if !self.interval.is_finite() || self.interval < 0.0 {
            self.interval = defaults.interval;
        }
        if self.font_size == 0 {
            self.font_size = defaults.font_size;
        }
        if self.text_color.parse::<Rgb>().is_err() {
            self.text_color = defaults.text_color;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = FlashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FlashError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Where the playback loop takes its per-cycle snapshot from.
pub trait SettingsProvider: Send + Sync {
    fn snapshot(&self) -> FlashSettings;
}

/// Settings shared between the console and the playback worker.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<RwLock<FlashSettings>>);

impl SharedSettings {
    pub fn new(settings: FlashSettings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn update(&self, f: impl FnOnce(&mut FlashSettings)) {
        let mut settings = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut settings);
    }

    pub fn replace(&self, settings: FlashSettings) {
        self.update(|current| *current = settings);
    }
}

impl SettingsProvider for SharedSettings {
    fn snapshot(&self) -> FlashSettings {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
