use thiserror::Error;

/// Failures and recoverable conditions of the playback engine.
#[derive(Debug, Error)]
pub enum FlashError {
    #[error("no active words, select a category or add words first")]
    EmptyWordList,

    #[error("playback is already running")]
    AlreadyRunning,

    #[error("invalid text color {0:?}")]
    InvalidColor(String),

    #[error("window styling unsupported: {0}")]
    TransparencyUnsupported(&'static str),

    #[error("overlay surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("failed to spawn playback worker")]
    Spawn(#[source] std::io::Error),
}

/// Errors raised while editing the category library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("category name must not be empty")]
    EmptyName,

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("the selected file contains no words")]
    EmptyFile,
}
