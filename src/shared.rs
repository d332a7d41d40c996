use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::detection::{Detection, Trackable};
use crate::error::{Result, TrackerError};
use crate::track::{ClaimOutcome, TrackId, TrackedObject};
use crate::tracker::{ObjectTracker, UpdateSummary};

/// Cloneable, thread-safe handle to one [`ObjectTracker`].
///
/// The whole registry sits behind a single lock, held for the full duration
/// of every call.
pub struct SharedTracker<T: Trackable = Detection> {
    inner: Arc<Mutex<ObjectTracker<T>>>,
}

impl<T: Trackable> Clone for SharedTracker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Trackable> SharedTracker<T> {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_tracker(ObjectTracker::new(config)?))
    }

    pub fn from_tracker(tracker: ObjectTracker<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ObjectTracker<T>>> {
        self.inner.lock().map_err(|_| TrackerError::Poisoned)
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut ObjectTracker<T>) -> R) -> Result<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn update(&self, detections: &[T]) -> Result<UpdateSummary> {
        Ok(self.lock()?.update(detections))
    }

    pub fn top(&self) -> Result<Option<TrackedObject<T>>> {
        Ok(self.lock()?.top())
    }

    pub fn release(&self, id: TrackId) -> Result<()> {
        self.lock()?.release(id)
    }

    pub fn complete(&self, id: TrackId, outcome: ClaimOutcome) -> Result<()> {
        self.lock()?.complete(id, outcome)
    }

    pub fn deregister_object(&self, id: TrackId) -> Result<T> {
        self.lock()?.deregister_object(id)
    }

    pub fn get(&self, id: TrackId) -> Result<Option<TrackedObject<T>>> {
        Ok(self.lock()?.get(id))
    }

    pub fn active_objects(&self) -> Result<Vec<TrackedObject<T>>> {
        Ok(self.lock()?.active_objects())
    }

    pub fn object_count(&self) -> Result<usize> {
        Ok(self.lock()?.object_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let shared: SharedTracker = SharedTracker::new(Config::new(5.0, 10)).unwrap();
        let other = shared.clone();

        shared.update(&[Detection::at(0.0, 0.0, 0.0)]).unwrap();
        assert_eq!(other.object_count().unwrap(), 1);

        let claimed = other.top().unwrap().unwrap();
        assert!(shared.get(claimed.id).unwrap().unwrap().claimed);
    }

    #[test]
    fn test_concurrent_claims_are_exclusive() {
        let shared: SharedTracker = SharedTracker::new(Config::new(5.0, 10)).unwrap();
        let frame: Vec<Detection> = (0..32)
            .map(|i| Detection::at(i as f64 * 100.0, 0.0, 0.0))
            .collect();
        shared.update(&frame).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    while let Some(obj) = shared.top().unwrap() {
                        ids.push(obj.id);
                    }
                    ids
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(all.len(), 32);
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_with_exposes_registry() {
        let shared: SharedTracker = SharedTracker::new(Config::default()).unwrap();
        let id = shared
            .with(|tracker| tracker.register_object(Detection::at(1.0, 1.0, 1.0)))
            .unwrap();
        assert_eq!(shared.deregister_object(id).unwrap(), Detection::at(1.0, 1.0, 1.0));
        assert!(shared.release(id).is_err());
    }
}
