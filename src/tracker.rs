use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::config::{Config, RankingMode, SelectionPolicy};
use crate::detection::{Detection, Trackable};
use crate::error::{Result, TrackerError};
use crate::matching;
use crate::track::{ClaimOutcome, TrackId, TrackRecord, TrackedObject};
use crate::utils;

/// What one `update()` call did to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Identities that matched a detection this frame.
    pub matched: Vec<TrackId>,
    /// Identities created from unmatched detections.
    pub registered: Vec<TrackId>,
    /// Identities with no matching detection this frame.
    pub missed: Vec<TrackId>,
    /// Identities removed because their miss streak exceeded the limit.
    pub evicted: Vec<TrackId>,
}

/// Registry of tracked identities.
///
/// Correlates anonymous per-frame detections with stable `TrackId`s, evicts
/// identities that stop appearing, and hands identities out one at a time
/// through the claim protocol (`top`, `release`, `complete`).
///
/// Not synchronised: use [`crate::SharedTracker`] to share one registry
/// between threads.
pub struct ObjectTracker<T: Trackable = Detection> {
    config: Config,
    /// One record per live identity, ordered by allocation.
    records: BTreeMap<TrackId, TrackRecord<T>>,
    /// Live identities sorted by registration-time rank.
    priority_order: Vec<TrackId>,
    next_id: u64,
}

impl<T: Trackable> ObjectTracker<T> {
    /// Create an empty registry.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            records: BTreeMap::new(),
            priority_order: Vec::new(),
            next_id: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Feed one frame of detections.
    ///
    /// An empty frame counts as a miss for every identity. Into an empty
    /// registry every detection is registered in input order. Otherwise
    /// detections are assigned to identities with [`matching::greedy_assign`];
    /// leftover identities take a miss and leftover detections are
    /// registered. Identities whose miss count exceeds
    /// `max_missed_frames` are then evicted.
    pub fn update(&mut self, detections: &[T]) -> UpdateSummary {
        let mut summary = UpdateSummary::default();

        if detections.is_empty() {
            for (id, record) in self.records.iter_mut() {
                record.miss();
                summary.missed.push(*id);
            }
        } else if self.records.is_empty() {
            for det in detections {
                summary.registered.push(self.register_object(det.clone()));
            }
        } else {
            self.associate(detections, &mut summary);
        }

        summary.evicted = self.evict_missing();
        summary
    }

    fn associate(&mut self, detections: &[T], summary: &mut UpdateSummary) {
        let rows = self.ranked_ids();
        let distances = utils::distance_matrix(
            rows.iter().map(|id| &self.records[id].value),
            detections,
        );
        let assignment = matching::greedy_assign(&distances, self.config.distance_tolerance);

        for &(row, col) in &assignment.matches {
            let id = rows[row];
            if let Some(record) = self.records.get_mut(&id) {
                record.hit(detections[col].clone());
                debug!(track = %id, detection = col, distance = distances[(row, col)], "matched");
                summary.matched.push(id);
            }
        }

        for &row in &assignment.unmatched_rows {
            let id = rows[row];
            if let Some(record) = self.records.get_mut(&id) {
                record.miss();
                summary.missed.push(id);
            }
        }

        for &col in &assignment.unmatched_cols {
            summary.registered.push(self.register_object(detections[col].clone()));
        }
    }

    fn evict_missing(&mut self) -> Vec<TrackId> {
        let limit = self.config.max_missed_frames;
        let stale: Vec<TrackId> = self
            .records
            .iter()
            .filter(|(_, record)| record.missed_frames > limit)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            self.remove(*id);
            info!(track = %id, "evicted after {} missed frames", limit + 1);
        }
        stale
    }

    fn remove(&mut self, id: TrackId) -> Option<TrackRecord<T>> {
        let record = self.records.remove(&id)?;
        self.priority_order.retain(|other| *other != id);
        Some(record)
    }

    /// Register `value` as a new identity and return its id.
    ///
    /// The id is placed in the priority order by comparing `value` against
    /// the other identities' current values; it lands ahead of any values
    /// that compare equal. The rank is not revisited when the value changes.
    pub fn register_object(&mut self, value: T) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;

        let records = &self.records;
        let slot = self
            .priority_order
            .partition_point(|other| records[other].value.priority_cmp(&value) == Ordering::Less);
        self.priority_order.insert(slot, id);

        debug!(track = %id, position = ?value.position(), "registered object");
        self.records.insert(id, TrackRecord::new(value));
        id
    }

    /// Remove `id` from the registry and return its last known value.
    pub fn deregister_object(&mut self, id: TrackId) -> Result<T> {
        let record = self.remove(id).ok_or(TrackerError::UnknownIdentity(id))?;
        debug!(track = %id, "deregistered object");
        Ok(record.value)
    }

    /// Claim the next unclaimed identity under the configured
    /// [`SelectionPolicy`]. Returns `None` when every identity is claimed.
    pub fn top(&mut self) -> Option<TrackedObject<T>> {
        let id = match self.config.selection_policy {
            SelectionPolicy::OldestFirst => self
                .records
                .iter()
                .find(|(_, record)| !record.is_claimed())
                .map(|(id, _)| *id),
            SelectionPolicy::RankFirst => self
                .ranked_ids()
                .into_iter()
                .find(|id| !self.records[id].is_claimed()),
        }?;

        let record = self.records.get_mut(&id)?;
        let newly_claimed = record.claim();
        debug_assert!(newly_claimed, "selected an already claimed identity");
        debug!(track = %id, "claimed");
        Some(TrackedObject::snapshot(id, record))
    }

    /// Drop the claim on `id` so `top()` can hand it out again. The value and
    /// miss count are left alone.
    pub fn release(&mut self, id: TrackId) -> Result<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(TrackerError::UnknownIdentity(id))?;
        record.release();
        debug!(track = %id, "released");
        Ok(())
    }

    /// Settle a claim with the consumer's outcome.
    pub fn complete(&mut self, id: TrackId, outcome: ClaimOutcome) -> Result<()> {
        match outcome {
            ClaimOutcome::Success => {
                self.deregister_object(id)?;
                info!(track = %id, "claim completed");
            }
            ClaimOutcome::Retry => self.release(id)?,
            ClaimOutcome::Abandon => {
                self.deregister_object(id)?;
                info!(track = %id, "claim abandoned");
            }
        }
        Ok(())
    }

    pub fn get(&self, id: TrackId) -> Option<TrackedObject<T>> {
        self.records
            .get(&id)
            .map(|record| TrackedObject::snapshot(id, record))
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.records.contains_key(&id)
    }

    /// Live identities in priority order.
    pub fn active_objects(&self) -> Vec<TrackedObject<T>> {
        self.ranked_ids()
            .into_iter()
            .map(|id| TrackedObject::snapshot(id, &self.records[&id]))
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the priority order holds exactly the live identities, once each.
    pub fn is_consistent(&self) -> bool {
        let mut seen = BTreeSet::new();
        self.priority_order.len() == self.records.len()
            && self
                .priority_order
                .iter()
                .all(|id| self.records.contains_key(id) && seen.insert(*id))
    }

    fn ranked_ids(&self) -> Vec<TrackId> {
        match self.config.ranking {
            RankingMode::RegistrationTime => self.priority_order.clone(),
            RankingMode::CurrentValue => {
                let mut ids: Vec<TrackId> = self.records.keys().copied().collect();
                ids.sort_by(|a, b| self.records[a].value.priority_cmp(&self.records[b].value));
                ids
            }
        }
    }
}
