//! Test doubles: a virtual clock and recording overlay, host and status sinks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::Clock;
use crate::error::FlashError;
use crate::host::{HostWindow, StatusSink};
use crate::overlay::{OverlayBackend, OverlaySurface};
use crate::settings::Rgb;

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct FakeClockInner {
    now: Duration,
    sleeps: Vec<Duration>,
    hooks: Vec<(Duration, Hook)>,
}

/// Virtual time that only moves when someone sleeps. Hooks scheduled with
/// `at` run inside the sleep that reaches their time.
#[derive(Clone, Default)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockInner>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(&self, when: Duration, hook: impl FnOnce() + Send + 'static) {
        lock(&self.inner).hooks.push((when, Box::new(hook)));
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.inner).sleeps.clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        lock(&self.inner).now
    }

    fn sleep(&self, duration: Duration) {
        let due: Vec<Hook> = {
            let mut inner = lock(&self.inner);
            inner.now += duration;
            inner.sleeps.push(duration);
            assert!(inner.now < Duration::from_secs(3600), "fake clock ran away");

            let now = inner.now;
            let (due, pending): (Vec<_>, Vec<_>) =
                inner.hooks.drain(..).partition(|(when, _)| *when <= now);
            inner.hooks = pending;
            due.into_iter().map(|(_, hook)| hook).collect()
        };
        // Outside the lock so hooks may read the clock
        for hook in due {
            hook();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Word { word: String, font_size: u32, color: Rgb },
    Blank,
}

#[derive(Default)]
struct SurfaceLog {
    events: Vec<(Duration, SurfaceEvent)>,
    opened: usize,
    closed: usize,
    pumps: usize,
}

/// Backend whose surfaces record every frame with a timestamp.
#[derive(Clone)]
pub struct RecordingBackend<C: Clock> {
    clock: C,
    log: Arc<Mutex<SurfaceLog>>,
    close_after_pumps: Option<usize>,
    failing: bool,
}

impl<C: Clock> RecordingBackend<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            log: Arc::default(),
            close_after_pumps: None,
            failing: false,
        }
    }

    /// Host asks the surface to close on pump number `pumps + 1`.
    pub fn close_after_pumps(mut self, pumps: usize) -> Self {
        self.close_after_pumps = Some(pumps);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        lock(&self.log).events.iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn words(&self) -> Vec<String> {
        lock(&self.log)
            .events
            .iter()
            .filter_map(|(_, e)| match e {
                SurfaceEvent::Word { word, .. } => Some(word.clone()),
                SurfaceEvent::Blank => None,
            })
            .collect()
    }

    /// When each word appeared.
    pub fn shown_at(&self) -> Vec<Duration> {
        lock(&self.log)
            .events
            .iter()
            .filter(|(_, e)| matches!(e, SurfaceEvent::Word { .. }))
            .map(|(at, _)| *at)
            .collect()
    }

    /// When each word was blanked out again.
    pub fn cleared_at(&self) -> Vec<Duration> {
        lock(&self.log)
            .events
            .windows(2)
            .filter(|pair| {
                matches!(pair[0].1, SurfaceEvent::Word { .. }) && pair[1].1 == SurfaceEvent::Blank
            })
            .map(|pair| pair[1].0)
            .collect()
    }

    pub fn opened(&self) -> usize {
        lock(&self.log).opened
    }

    pub fn closed(&self) -> usize {
        lock(&self.log).closed
    }

    pub fn pumps(&self) -> usize {
        lock(&self.log).pumps
    }
}

impl<C: Clock + Sync> OverlayBackend for RecordingBackend<C> {
    type Surface = RecordingSurface<C>;

    fn open(&self) -> Result<Self::Surface, FlashError> {
        if self.failing {
            return Err(FlashError::SurfaceUnavailable("no display".to_string()));
        }
        lock(&self.log).opened += 1;
        Ok(RecordingSurface {
            clock: self.clock.clone(),
            log: Arc::clone(&self.log),
            close_after_pumps: self.close_after_pumps,
        })
    }
}

pub struct RecordingSurface<C: Clock> {
    clock: C,
    log: Arc<Mutex<SurfaceLog>>,
    close_after_pumps: Option<usize>,
}

impl<C: Clock> RecordingSurface<C> {
    fn record(&self, event: SurfaceEvent) {
        let at = self.clock.now();
        lock(&self.log).events.push((at, event));
    }
}

impl<C: Clock> OverlaySurface for RecordingSurface<C> {
    fn draw_word(&mut self, word: &str, font_size: u32, color: Rgb) {
        self.record(SurfaceEvent::Word {
            word: word.to_string(),
            font_size,
            color,
        });
    }

    fn draw_blank(&mut self) {
        self.record(SurfaceEvent::Blank);
    }

    fn pump(&mut self) -> bool {
        let mut log = lock(&self.log);
        log.pumps += 1;
        self.close_after_pumps.is_none_or(|limit| log.pumps <= limit)
    }
}

impl<C: Clock> Drop for RecordingSurface<C> {
    fn drop(&mut self) {
        lock(&self.log).closed += 1;
    }
}

#[derive(Default)]
pub struct RecordingHost {
    minimized: AtomicUsize,
    restored: AtomicUsize,
}

impl RecordingHost {
    pub fn minimized(&self) -> usize {
        self.minimized.load(Ordering::SeqCst)
    }

    pub fn restored(&self) -> usize {
        self.restored.load(Ordering::SeqCst)
    }
}

impl HostWindow for RecordingHost {
    fn minimize(&self) {
        self.minimized.fetch_add(1, Ordering::SeqCst);
    }

    fn restore(&self) {
        self.restored.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingStatus {
    statuses: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn statuses(&self) -> Vec<String> {
        lock(&self.statuses).clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        lock(&self.warnings).clone()
    }
}

impl StatusSink for RecordingStatus {
    fn status(&self, text: &str) {
        lock(&self.statuses).push(text.to_string());
    }

    fn warn(&self, title: &str, text: &str) {
        lock(&self.warnings).push(format!("{title}: {text}"));
    }
}
