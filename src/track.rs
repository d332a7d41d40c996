use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for one tracked identity. Allocated in increasing order and
/// never reused by a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Claim state of an identity: `Free -> Claimed -> {Free | removed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimState {
    #[default]
    Free,
    Claimed,
}

/// What the consumer reports after acting on a claimed identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// Action succeeded; the identity is removed.
    Success,
    /// Action failed; the claim is dropped so the identity can be handed out again.
    Retry,
    /// Object is unreachable; the identity is force-evicted.
    Abandon,
}

/// Everything the registry knows about one live identity.
#[derive(Debug, Clone)]
pub(crate) struct TrackRecord<T> {
    pub value: T,
    pub missed_frames: u32,
    pub claim: ClaimState,
}

impl<T> TrackRecord<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            missed_frames: 0,
            claim: ClaimState::Free,
        }
    }

    /// Matched this frame: take the new value and clear the miss streak.
    pub fn hit(&mut self, value: T) {
        self.value = value;
        self.missed_frames = 0;
    }

    pub fn miss(&mut self) {
        self.missed_frames = self.missed_frames.saturating_add(1);
    }

    pub fn is_claimed(&self) -> bool {
        self.claim == ClaimState::Claimed
    }

    /// Returns `false` if the record was already claimed.
    pub fn claim(&mut self) -> bool {
        if self.is_claimed() {
            return false;
        }
        self.claim = ClaimState::Claimed;
        true
    }

    pub fn release(&mut self) {
        self.claim = ClaimState::Free;
    }
}

/// Read-only snapshot of a live identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject<T> {
    pub id: TrackId,
    pub value: T,
    pub missed_frames: u32,
    pub claimed: bool,
}

impl<T: Clone> TrackedObject<T> {
    pub(crate) fn snapshot(id: TrackId, record: &TrackRecord<T>) -> Self {
        Self {
            id,
            value: record.value.clone(),
            missed_frames: record.missed_frames,
            claimed: record.is_claimed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_initialization() {
        let record = TrackRecord::new(7u32);
        assert_eq!(record.value, 7);
        assert_eq!(record.missed_frames, 0);
        assert_eq!(record.claim, ClaimState::Free);
    }

    #[test]
    fn test_hit_resets_misses() {
        let mut record = TrackRecord::new(1u32);
        record.miss();
        record.miss();
        assert_eq!(record.missed_frames, 2);

        record.hit(2);
        assert_eq!(record.value, 2);
        assert_eq!(record.missed_frames, 0);
    }

    #[test]
    fn test_claim_state_machine() {
        let mut record = TrackRecord::new(());
        assert!(record.claim());
        assert!(record.is_claimed());
        assert!(!record.claim(), "double claim must be refused");

        record.release();
        assert!(!record.is_claimed());
        assert!(record.claim());
    }

    #[test]
    fn test_misses_do_not_touch_claim() {
        let mut record = TrackRecord::new(());
        assert!(record.claim());
        record.miss();
        record.hit(());
        assert!(record.is_claimed());
    }

    #[test]
    fn test_track_id_display() {
        assert_eq!(TrackId(42).to_string(), "T42");
        assert!(TrackId(1) < TrackId(2));
    }
}
