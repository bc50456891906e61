//! Full-screen overlay that shows one word at a time.
//!
//! The renderer owns the surface for the whole playback session and is only
//! ever used from the playback worker thread.

pub mod raylib_surface;
pub mod styling;

use std::time::Duration;

use crate::clock::Clock;
use crate::constants::HOLD_POLL;
use crate::error::FlashError;
use crate::settings::{FlashSettings, Rgb};
use crate::state::StateCell;

/// One mounted overlay window.
pub trait OverlaySurface {
    /// Paints `word` centered over the transparent key and presents the frame.
    fn draw_word(&mut self, word: &str, font_size: u32, color: Rgb);
    /// Paints the whole surface with the transparent key and presents it.
    fn draw_blank(&mut self);
    /// Presents the current frame again and drains host events.
    /// Returns false once the host asked the surface to close.
    fn pump(&mut self) -> bool;
}

/// Creates overlay surfaces. Shared with the worker thread, so it must be
/// `Send + Sync`; the surfaces it makes never leave that thread.
pub trait OverlayBackend: Send + Sync + 'static {
    type Surface: OverlaySurface;

    fn open(&self) -> Result<Self::Surface, FlashError>;
}

pub struct OverlayRenderer<'a, B: OverlayBackend, C: Clock> {
    backend: &'a B,
    clock: C,
    state: StateCell,
    surface: Option<B::Surface>,
    closed_by_host: bool,
}

impl<'a, B: OverlayBackend, C: Clock> OverlayRenderer<'a, B, C> {
    pub fn new(backend: &'a B, clock: C, state: StateCell) -> Self {
        Self {
            backend,
            clock,
            state,
            surface: None,
            closed_by_host: false,
        }
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Whether the window system asked the overlay to close.
    pub fn closed_by_host(&self) -> bool {
        self.closed_by_host
    }

    fn surface(&mut self) -> Result<&mut B::Surface, FlashError> {
        if self.surface.is_none() {
            let mut surface = self.backend.open()?;
            surface.draw_blank();
            self.surface = Some(surface);
            tracing::debug!("overlay surface mounted");
        }
        // Just populated above
        self.surface
            .as_mut()
            .ok_or_else(|| FlashError::SurfaceUnavailable("surface vanished".to_string()))
    }

    /// Draws `word` with the snapshot's font size and colour.
    pub fn show(&mut self, word: &str, settings: &FlashSettings) -> Result<(), FlashError> {
        let color = settings.text_rgb();
        let font_size = settings.font_size.max(1);
        self.surface()?.draw_word(word, font_size, color);
        Ok(())
    }

    /// Keeps the current frame up for `duration`, polling at `HOLD_POLL`.
    /// Returns false if playback was stopped or the host closed the overlay.
    pub fn hold(&mut self, duration: Duration) -> bool {
        let deadline = self.clock.now().saturating_add(duration);
        loop {
            if self.state.stop_requested() {
                return false;
            }
            if !self.pump() {
                return false;
            }
            let now = self.clock.now();
            if now >= deadline {
                return true;
            }
            self.clock.sleep(HOLD_POLL.min(deadline - now));
        }
    }

    /// Drains host events. A close request from the host becomes a stop request.
    pub fn pump(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return true;
        };
        if surface.pump() {
            return true;
        }
        tracing::info!("overlay closed by the window system");
        self.closed_by_host = true;
        self.state.request_stop();
        false
    }

    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_blank();
        }
    }

    pub fn teardown(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("overlay surface released");
        }
    }
}

impl<B: OverlayBackend, C: Clock> Drop for OverlayRenderer<'_, B, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
