use std::time::Duration;

use crate::settings::Rgb;

pub const OVERLAY_FPS: u32 = 60;                                       // Frames per second while a cue is held
pub const HOLD_POLL: Duration = Duration::from_micros(1_000_000 / OVERLAY_FPS as u64); // Poll step during a flash
pub const WAIT_POLL: Duration = Duration::from_millis(50);              // Poll step between flashes
pub const WINDOW_TITLE: &str = "Subliminal Flash";

pub const TRANSPARENT_KEY: Rgb = Rgb::new(255, 0, 255);                // Background colour keyed out by the host
pub const FALLBACK_TEXT_COLOR: Rgb = Rgb::new(255, 255, 255);          // Used when text_color does not parse

pub const DEFAULT_FLASH_DURATION: f64 = 0.1;                           // Seconds a word stays on screen
pub const DEFAULT_INTERVAL: f64 = 5.0;                                 // Seconds between flashes
pub const DEFAULT_FONT_SIZE: u32 = 36;
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";

pub const DEFAULT_SETTINGS_FILE: &str = "subliminal_settings.json";
