use std::panic::{self, AssertUnwindSafe};

use raylib::ffi::ConfigFlags;
use raylib::prelude::*;

use crate::constants::*;
use crate::error::FlashError;
use crate::overlay::styling::{apply_overlay_styling, NoopStyling, WindowStyling};
use crate::overlay::{OverlayBackend, OverlaySurface};
use crate::settings::Rgb;

/// Opens a borderless raylib window covering the current monitor.
#[derive(Debug, Clone, Copy)]
pub struct RaylibBackend {
    // Ask for transparency, always-on-top and click-through
    styled: bool,
}

impl RaylibBackend {
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }
}

impl OverlayBackend for RaylibBackend {
    type Surface = RaylibSurface;

    fn open(&self) -> Result<RaylibSurface, FlashError> {
        RaylibSurface::open(self.styled)
    }
}

enum Frame {
    Blank,
    Word { text: String, font_size: i32, color: Color },
}

pub struct RaylibSurface {
    rl: RaylibHandle,
    thread: RaylibThread,
    frame: Frame,
}

impl RaylibSurface {
    fn open(styled: bool) -> Result<Self, FlashError> {
        // raylib panics instead of returning an error when no window can be created
        let (mut rl, thread) = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut builder = raylib::init();
            builder.size(640, 480).title(WINDOW_TITLE).undecorated();
            if styled {
                // Must be requested before the window exists
                builder.transparent();
            }
            builder.build()
        }))
        .map_err(|_| FlashError::SurfaceUnavailable("raylib could not create a window".to_string()))?;
        rl.set_trace_log(TraceLogLevel::LOG_ERROR);

        // No target FPS: the renderer paces frames itself
        let monitor = get_current_monitor();
        let (width, height) = (get_monitor_width(monitor), get_monitor_height(monitor));
        rl.set_window_size(width, height);
        rl.set_window_position(0, 0);

        let report = if styled {
            apply_overlay_styling(&mut RaylibStyling { window: &mut rl }, TRANSPARENT_KEY)
        } else {
            apply_overlay_styling(&mut NoopStyling, TRANSPARENT_KEY)
        };
        tracing::info!(width, height, ?report, "overlay window created");

        Ok(Self { rl, thread, frame: Frame::Blank })
    }

    fn present(&mut self) {
        let screen_width = self.rl.get_screen_width();
        let screen_height = self.rl.get_screen_height();

        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(key_color(TRANSPARENT_KEY));
        if let Frame::Word { text, font_size, color } = &self.frame {
            let text_width = d.measure_text(text, *font_size);
            d.draw_text(
                text,
                (screen_width - text_width) / 2,
                (screen_height - font_size) / 2,
                *font_size,
                *color,
            );
        }
    }
}

impl OverlaySurface for RaylibSurface {
    fn draw_word(&mut self, word: &str, font_size: u32, color: Rgb) {
        self.frame = Frame::Word {
            // raylib text calls need a C string
            text: word.replace('\0', ""),
            font_size: i32::try_from(font_size).unwrap_or(i32::MAX),
            color: Color::new(color.r, color.g, color.b, 255),
        };
        self.present();
    }

    fn draw_blank(&mut self) {
        self.frame = Frame::Blank;
        self.present();
    }

    fn pump(&mut self) -> bool {
        // EndDrawing polls input events, so presenting again is what drains them
        self.present();
        !self.rl.window_should_close()
    }
}

// Dropping `rl` closes the window.

fn key_color(key: Rgb) -> Color {
    Color::new(key.r, key.g, key.b, 0)
}

// `RaylibHandle::get_window_state` drops the flags it reads, so ask raylib directly
fn window_flag_set(flag: ConfigFlags) -> bool {
    unsafe { raylib::ffi::IsWindowState(flag as u32) }
}

/// Window flags on the open raylib window.
struct RaylibStyling<'a> {
    window: &'a mut RaylibHandle,
}

fn check(applied: bool, what: &'static str) -> Result<(), FlashError> {
    if applied {
        Ok(())
    } else {
        Err(FlashError::TransparencyUnsupported(what))
    }
}

impl WindowStyling for RaylibStyling<'_> {
    fn set_transparent(&mut self, _key: Rgb) -> Result<(), FlashError> {
        // The alpha framebuffer is requested at init; the key is drawn with alpha 0
        check(window_flag_set(ConfigFlags::FLAG_WINDOW_TRANSPARENT), "no alpha framebuffer")
    }

    fn set_topmost(&mut self) -> Result<(), FlashError> {
        self.window
            .set_window_state(WindowState::default().set_window_topmost(true));
        check(window_flag_set(ConfigFlags::FLAG_WINDOW_TOPMOST), "window manager refused topmost")
    }

    fn set_click_through(&mut self) -> Result<(), FlashError> {
        // WindowState has no passthrough bit
        unsafe { raylib::ffi::SetWindowState(ConfigFlags::FLAG_WINDOW_MOUSE_PASSTHROUGH as u32) };
        check(
            window_flag_set(ConfigFlags::FLAG_WINDOW_MOUSE_PASSTHROUGH),
            "mouse passthrough refused",
        )
    }
}
