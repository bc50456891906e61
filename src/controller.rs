//! Start/stop surface of the playback engine.
//!
//! The controller lives on the controlling thread. Each session runs a
//! `CycleLoop` on its own worker thread, which creates and destroys the
//! overlay surface. The only state both threads write is the `StateCell`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::clock::{Clock, SystemClock};
use crate::engine::{CycleLoop, CycleReport, StopReason};
use crate::error::FlashError;
use crate::host::{HostWindow, StatusSink};
use crate::overlay::OverlayBackend;
use crate::settings::SettingsProvider;
use crate::state::{PlaybackState, StateCell};
use crate::words::WordSource;

pub struct PlaybackController<B: OverlayBackend, C: Clock = SystemClock> {
    backend: Arc<B>,
    clock: C,
    state: StateCell,
    host: Arc<dyn HostWindow>,
    status: Arc<dyn StatusSink>,
    worker: Option<JoinHandle<CycleReport>>,
    // Next word index; handed to the worker and taken back on join
    cursor: usize,
    // Set when the cursor was reset while a worker still holds the old one
    cursor_reset: bool,
}

impl<B: OverlayBackend> PlaybackController<B, SystemClock> {
    pub fn new(backend: B, host: Arc<dyn HostWindow>, status: Arc<dyn StatusSink>) -> Self {
        Self::with_clock(backend, SystemClock::new(), host, status)
    }
}

impl<B: OverlayBackend, C: Clock> PlaybackController<B, C> {
    pub fn with_clock(
        backend: B,
        clock: C,
        host: Arc<dyn HostWindow>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            clock,
            state: StateCell::new(),
            host,
            status,
            worker: None,
            cursor: 0,
            cursor_reset: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        self.state() == PlaybackState::Running
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Starts the next session from the first word. Has no effect on a
    /// session that is already running, but wins over the cursor it
    /// reports when joined.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.cursor_reset = self.worker.is_some();
    }

    /// Launches the cycle loop on a worker thread and returns immediately.
    pub fn start(
        &mut self,
        words: Arc<dyn WordSource>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Result<(), FlashError> {
        // A worker that died without clearing the state is reaped here
        if self.worker.as_ref().is_some_and(|w| w.is_finished()) {
            self.join();
        }
        if self.is_running() {
            return Err(FlashError::AlreadyRunning);
        }
        // A stopping session ends within one poll interval
        self.join();

        let count = words.active_words().len();
        if count == 0 {
            self.status.warn("No Words", "Please select categories or add words first!");
            return Err(FlashError::EmptyWordList);
        }
        if !self.state.transition(PlaybackState::Idle, PlaybackState::Running) {
            return Err(FlashError::AlreadyRunning);
        }

        tracing::info!(words = count, cursor = self.cursor, "playback started");
        self.host.minimize();
        self.status.status(&format!("Flashing {count} words..."));

        let backend = Arc::clone(&self.backend);
        let clock = self.clock.clone();
        let state = self.state.clone();
        let host = Arc::clone(&self.host);
        let status = Arc::clone(&self.status);
        let cursor = self.cursor;

        let spawned = thread::Builder::new()
            .name("flash-loop".to_string())
            .spawn(move || {
                let report =
                    CycleLoop::new(&*backend, clock, state, &*words, &*settings, cursor).run();
                match report.reason {
                    StopReason::Requested => {}
                    StopReason::HostClosed | StopReason::WordsExhausted => {
                        host.restore();
                        status.status("Stopped");
                    }
                    StopReason::SurfaceUnavailable => {
                        host.restore();
                        status.status("Overlay unavailable");
                    }
                }
                report
            });

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                self.state.set(PlaybackState::Idle);
                self.host.restore();
                return Err(FlashError::Spawn(e));
            }
        }
        Ok(())
    }

    /// Asks the running session to stop. Does not wait for it.
    pub fn stop(&self) {
        if self.state.request_stop() {
            tracing::info!("playback stop requested");
        }
        self.host.restore();
        self.status.status("Stopped");
    }

    /// Waits for the current worker, if any, and returns its report.
    pub fn join(&mut self) -> Option<CycleReport> {
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(report) => {
                tracing::debug!(cycles = report.cycles, reason = ?report.reason, "playback worker joined");
                if !std::mem::take(&mut self.cursor_reset) {
                    self.cursor = report.cursor;
                }
                Some(report)
            }
            Err(_) => {
                tracing::error!("playback worker panicked");
                self.cursor_reset = false;
                self.state.set(PlaybackState::Idle);
                None
            }
        }
    }
}

impl<B: OverlayBackend, C: Clock> Drop for PlaybackController<B, C> {
    fn drop(&mut self) {
        self.state.request_stop();
        self.join();
    }
}
