//! The show-hold-clear-wait cycle that runs on the playback worker.

use std::time::Duration;

use crate::clock::Clock;
use crate::constants::WAIT_POLL;
use crate::overlay::{OverlayBackend, OverlayRenderer};
use crate::settings::SettingsProvider;
use crate::state::{PlaybackState, StateCell};
use crate::words::WordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,          // stop() from the controlling thread
    HostClosed,         // The window system asked the overlay to close
    WordsExhausted,     // The active word list became empty mid-run
    SurfaceUnavailable, // The overlay window could not be created
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycles: u64,
    pub cursor: usize,
    pub reason: StopReason,
}

pub struct CycleLoop<'a, B: OverlayBackend, C: Clock> {
    renderer: OverlayRenderer<'a, B, C>,
    clock: C,
    state: StateCell,
    words: &'a dyn WordSource,
    settings: &'a dyn SettingsProvider,
    cursor: usize,
    cycles: u64,
}

impl<'a, B: OverlayBackend, C: Clock> CycleLoop<'a, B, C> {
    pub fn new(
        backend: &'a B,
        clock: C,
        state: StateCell,
        words: &'a dyn WordSource,
        settings: &'a dyn SettingsProvider,
        cursor: usize,
    ) -> Self {
        Self {
            renderer: OverlayRenderer::new(backend, clock.clone(), state.clone()),
            clock,
            state,
            words,
            settings,
            cursor,
            cycles: 0,
        }
    }

    /// Index of the next word to show.
    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Runs a single cycle. Returns the reason to stop, or `None` to keep going.
    pub fn step(&mut self) -> Option<StopReason> {
        if self.state.stop_requested() {
            return Some(StopReason::Requested);
        }

        // Settings and words are re-read every cycle; edits apply from here on
        let settings = self.settings.snapshot();
        let words = self.words.active_words();
        if words.is_empty() {
            tracing::info!("active word list is empty, stopping");
            return Some(StopReason::WordsExhausted);
        }

        let index = self.cursor % words.len();
        self.cursor = (index + 1) % words.len();
        self.cycles += 1;
        let word = &words[index];
        tracing::debug!(cycle = self.cycles, index, word = %word, "flash");

        if let Err(e) = self.renderer.show(word, &settings) {
            tracing::error!("{e}");
            return Some(StopReason::SurfaceUnavailable);
        }
        let held = self.renderer.hold(settings.flash_duration());
        self.renderer.clear();

        if !held || !self.wait(settings.interval()) {
            return Some(if self.renderer.closed_by_host() {
                StopReason::HostClosed
            } else {
                StopReason::Requested
            });
        }
        None
    }

    /// Sleeps up to `interval` in `WAIT_POLL` steps. Returns false when stopped.
    fn wait(&mut self, interval: Duration) -> bool {
        let deadline = self.clock.now().saturating_add(interval);
        loop {
            if self.state.stop_requested() || !self.renderer.pump() {
                return false;
            }
            let now = self.clock.now();
            if now >= deadline {
                return true;
            }
            self.clock.sleep(WAIT_POLL.min(deadline - now));
        }
    }

    /// Cycles until stopped, then releases the overlay and returns to Idle.
    pub fn run(mut self) -> CycleReport {
        let reason = loop {
            if let Some(reason) = self.step() {
                break reason;
            }
        };
        self.renderer.teardown();
        self.state.set(PlaybackState::Idle);
        tracing::info!(cycles = self.cycles, ?reason, "playback loop finished");

        CycleReport {
            cycles: self.cycles,
            cursor: self.cursor,
            reason,
        }
    }
}
