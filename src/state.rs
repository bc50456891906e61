use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlaybackState {
    Idle,          // No session, no overlay surface
    Running,       // Worker is cycling words
    StopRequested, // Stop asked for, worker has not wound down yet
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PlaybackState::Running,
            2 => PlaybackState::StopRequested,
            _ => PlaybackState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PlaybackState::Idle => 0,
            PlaybackState::Running => 1,
            PlaybackState::StopRequested => 2,
        }
    }
}

/// The one piece of state shared between the controlling thread and the
/// playback worker. Every read goes to the atomic, nothing is cached.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU8::new(PlaybackState::Idle.as_u8())))
    }

    pub fn get(&self) -> PlaybackState {
        PlaybackState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: PlaybackState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// Moves `from` -> `to` atomically. Returns false if the current state was not `from`.
    pub fn transition(&self, from: PlaybackState, to: PlaybackState) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Running -> StopRequested. Idle and StopRequested are left alone.
    pub fn request_stop(&self) -> bool {
        self.transition(PlaybackState::Running, PlaybackState::StopRequested)
    }

    pub fn stop_requested(&self) -> bool {
        self.get() == PlaybackState::StopRequested
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
