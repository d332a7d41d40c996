use thiserror::Error;

use crate::track::TrackId;

/// Errors raised by the tracker registry and its configuration.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The named identity is not live (never registered, or already evicted).
    #[error("unknown identity {0}")]
    UnknownIdentity(TrackId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A thread panicked while holding the shared registry lock.
    #[error("tracker lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
