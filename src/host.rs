//! Notifications from playback back to the controlling application.

/// The application window that hides while cues are flashing.
pub trait HostWindow: Send + Sync {
    fn minimize(&self);
    fn restore(&self);
}

/// Receives status text and user-facing warnings.
pub trait StatusSink: Send + Sync {
    fn status(&self, text: &str);
    fn warn(&self, title: &str, text: &str);
}

/// A terminal has no window to iconify, so the requests are only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalHost;

impl HostWindow for TerminalHost {
    fn minimize(&self) {
        tracing::debug!("host window minimize requested");
    }

    fn restore(&self) {
        tracing::debug!("host window restore requested");
    }
}

/// Prints status lines for the console user.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn status(&self, text: &str) {
        println!("{text}");
    }

    fn warn(&self, title: &str, text: &str) {
        tracing::warn!("{title}: {text}");
        println!("{title}: {text}");
    }
}
