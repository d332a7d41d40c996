use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, TrackerError};

/// Order in which `top()` scans live identities for an unclaimed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Lowest (oldest) track id first.
    #[default]
    OldestFirst,
    /// Priority order first, as returned by `active_objects()`.
    RankFirst,
}

/// How the priority order over live identities is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Rank is fixed when the identity is registered and never revisited.
    #[default]
    RegistrationTime,
    /// Rank is recomputed from current values on every read.
    CurrentValue,
}

/// Tracker configuration, fixed for the lifetime of a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// A detection matches an identity only when strictly closer than this.
    pub distance_tolerance: f64,
    /// An identity is evicted once its missed count exceeds this.
    pub max_missed_frames: u32,
    pub selection_policy: SelectionPolicy,
    pub ranking: RankingMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance_tolerance: 5.0,
            max_missed_frames: 10,
            selection_policy: SelectionPolicy::default(),
            ranking: RankingMode::default(),
        }
    }
}

impl Config {
    pub fn new(distance_tolerance: f64, max_missed_frames: u32) -> Self {
        Self {
            distance_tolerance,
            max_missed_frames,
            ..Default::default()
        }
    }

    /// Load from a JSON file. Missing fields fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }

    pub fn with_ranking(mut self, ranking: RankingMode) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.distance_tolerance.is_finite() || self.distance_tolerance <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "distance_tolerance must be finite and positive, got {}",
                self.distance_tolerance
            )));
        }
        Ok(())
    }
}
