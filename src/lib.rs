//! Multi-object identity tracking with a single-item claim protocol.
//!
//! Feed per-frame detections into an [`ObjectTracker`]; it keeps stable
//! [`TrackId`]s across frames, evicts objects that stop appearing, and hands
//! tracked objects out one at a time through [`ObjectTracker::top`].

pub mod config;
pub mod detection;
pub mod error;
pub mod matching;
pub mod shared;
pub mod track;
pub mod tracker;
pub mod utils;

// Re-export main types
pub use crate::config::{Config, RankingMode, SelectionPolicy};
pub use crate::detection::{Detection, Trackable};
pub use crate::error::{Result, TrackerError};
pub use crate::shared::SharedTracker;
pub use crate::track::{ClaimOutcome, TrackId, TrackedObject};
pub use crate::tracker::{ObjectTracker, UpdateSummary};
