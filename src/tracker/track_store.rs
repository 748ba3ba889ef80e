//! Per-frame reconciliation of observed objects into live tracks.
//!
//! Identity comes from the upstream detector, so reconciliation is a plain
//! keyed update: known ids are refreshed, unknown ids are registered, and ids
//! missing for more than `max_disappeared` consecutive frames are evicted.
//! An evicted id that shows up again starts over with a fresh history.

use std::collections::HashMap;

use tracing::debug;

use crate::tracker::tracked_object::TrackedObject;

/// Consecutive absent frames tolerated before a track is evicted.
pub const DEFAULT_MAX_DISAPPEARED: u32 = 30;

/// Outcome of a single reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Tracks created this frame
    pub registered: usize,
    /// Existing tracks refreshed this frame
    pub updated: usize,
    /// Ids evicted this frame
    pub evicted: Vec<String>,
}

/// Live tracks keyed by external id, with a consecutive-absence counter each.
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: HashMap<String, TrackedObject>,
    disappeared: HashMap<String, u32>,
    /// Ids in registration order, for deterministic iteration.
    order: Vec<String>,
    max_disappeared: u32,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISAPPEARED)
    }
}

impl TrackStore {
    pub fn new(max_disappeared: u32) -> Self {
        Self {
            tracks: HashMap::new(),
            disappeared: HashMap::new(),
            order: Vec::new(),
            max_disappeared,
        }
    }

    pub fn max_disappeared(&self) -> u32 {
        self.max_disappeared
    }

    /// Fold one frame's observations into the store.
    ///
    /// Each observation carries exactly one centroid. When the store is empty
    /// every observation is registered and a repeated id keeps only its last
    /// sighting. Otherwise a repeated id counts as a second sighting.
    pub fn reconcile(&mut self, observed: Vec<TrackedObject>) -> Reconciliation {
        let mut outcome = Reconciliation::default();

        if self.tracks.is_empty() {
            for candidate in observed {
                self.register(candidate);
            }
            outcome.registered = self.tracks.len();
            return outcome;
        }

        for candidate in observed {
            if self.upsert(candidate) {
                outcome.registered += 1;
            } else {
                outcome.updated += 1;
            }
        }

        let mut evicted = Vec::new();
        for id in &self.order {
            let Some(track) = self.tracks.get_mut(id) else {
                continue;
            };
            if track.seen_this_frame {
                track.seen_this_frame = false;
                continue;
            }
            let absent = self.disappeared.entry(id.clone()).or_insert(0);
            *absent += 1;
            if *absent > self.max_disappeared {
                evicted.push(id.clone());
            }
        }
        for id in &evicted {
            self.evict(id);
        }
        outcome.evicted = evicted;
        outcome
    }

    /// Insert a new track or refresh an existing one. Returns `true` when the
    /// id was not live before.
    fn upsert(&mut self, mut candidate: TrackedObject) -> bool {
        if let Some(track) = self.tracks.get_mut(&candidate.id) {
            track.observe(&candidate);
            self.disappeared.insert(candidate.id, 0);
            return false;
        }

        debug!(track_id = %candidate.id, centroid = ?candidate.centroid(), "Registered track");
        candidate.seen_this_frame = true;
        candidate.reported = None;
        self.disappeared.insert(candidate.id.clone(), 0);
        self.order.push(candidate.id.clone());
        self.tracks.insert(candidate.id.clone(), candidate);
        true
    }

    /// Register a fresh track, replacing any track already under that id.
    /// Nothing was expected this frame, so it is not marked as seen.
    fn register(&mut self, mut candidate: TrackedObject) {
        debug!(track_id = %candidate.id, centroid = ?candidate.centroid(), "Registered track");
        candidate.seen_this_frame = false;
        candidate.reported = None;
        self.disappeared.insert(candidate.id.clone(), 0);
        if !self.tracks.contains_key(&candidate.id) {
            self.order.push(candidate.id.clone());
        }
        self.tracks.insert(candidate.id.clone(), candidate);
    }

    fn evict(&mut self, id: &str) {
        if let Some(track) = self.tracks.remove(id) {
            debug!(
                track_id = %id,
                samples = track.centroid_history().len(),
                "Evicted track"
            );
        }
        self.disappeared.remove(id);
        self.order.retain(|o| o != id);
    }

    /// Live tracks in registration order.
    pub fn tracks(&self) -> impl Iterator<Item = (&str, &TrackedObject)> {
        self.order
            .iter()
            .filter_map(|id| self.tracks.get(id).map(|t| (id.as_str(), t)))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut TrackedObject> {
        self.tracks.get_mut(id)
    }

    pub fn get(&self, id: &str) -> Option<&TrackedObject> {
        self.tracks.get(id)
    }

    /// Consecutive frames the id has been missing, if it is live.
    pub fn absence(&self, id: &str) -> Option<u32> {
        self.disappeared.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Evict every track.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.disappeared.clear();
        self.order.clear();
    }

    /// Track map and absence map hold exactly the same ids.
    pub fn is_consistent(&self) -> bool {
        self.tracks.len() == self.disappeared.len()
            && self.order.len() == self.tracks.len()
            && self.tracks.keys().all(|id| self.disappeared.contains_key(id))
            && self.order.iter().all(|id| self.tracks.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::rect::Rect;

    fn obs(id: &str, y: i32) -> TrackedObject {
        TrackedObject::new(id, Rect::new(90, y - 10, 110, y + 10))
    }

    #[test]
    fn test_first_frame_registers_all() {
        let mut store = TrackStore::default();
        let outcome = store.reconcile(vec![obs("a", 10), obs("b", 20)]);

        assert_eq!(outcome.registered, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.absence("a"), Some(0));
        assert!(!store.get("a").unwrap().seen_this_frame());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_reobserved_track_appends_centroid() {
        let mut store = TrackStore::default();
        store.reconcile(vec![obs("a", 10)]);
        let outcome = store.reconcile(vec![obs("a", 20)]);

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.registered, 0);
        let track = store.get("a").unwrap();
        assert_eq!(track.centroid_history(), &[(100, 10), (100, 20)]);
        assert_eq!(track.bbox, Rect::new(90, 10, 110, 30));
        assert!(!track.seen_this_frame());
    }

    #[test]
    fn test_new_id_in_later_frame_is_registered() {
        let mut store = TrackStore::default();
        store.reconcile(vec![obs("a", 10)]);
        let outcome = store.reconcile(vec![obs("a", 12), obs("b", 50)]);

        assert_eq!(outcome.registered, 1);
        assert_eq!(outcome.updated, 1);
        assert_eq!(store.absence("b"), Some(0));
        let ids: Vec<_> = store.tracks().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_frames_evict_after_limit() {
        let mut store = TrackStore::new(3);
        store.reconcile(vec![obs("a", 10)]);

        for frame in 1..=3 {
            let outcome = store.reconcile(vec![]);
            assert!(outcome.evicted.is_empty());
            assert_eq!(store.absence("a"), Some(frame));
        }
        let outcome = store.reconcile(vec![]);
        assert_eq!(outcome.evicted, vec!["a".to_string()]);
        assert!(store.is_empty());
        assert!(store.is_consistent());
    }

    #[test]
    fn test_unseen_track_ages_while_others_update() {
        let mut store = TrackStore::new(2);
        store.reconcile(vec![obs("a", 10), obs("b", 10)]);

        store.reconcile(vec![obs("a", 11)]);
        store.reconcile(vec![obs("a", 12)]);
        assert_eq!(store.absence("b"), Some(2));
        assert_eq!(store.absence("a"), Some(0));

        let outcome = store.reconcile(vec![obs("a", 13)]);
        assert_eq!(outcome.evicted, vec!["b".to_string()]);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_reobservation_resets_absence_and_keeps_history() {
        let mut store = TrackStore::new(5);
        store.reconcile(vec![obs("a", 10)]);
        store.reconcile(vec![obs("a", 20)]);
        for _ in 0..5 {
            store.reconcile(vec![]);
        }
        assert_eq!(store.absence("a"), Some(5));

        store.reconcile(vec![obs("a", 30)]);
        assert_eq!(store.absence("a"), Some(0));
        assert_eq!(
            store.get("a").unwrap().centroid_history(),
            &[(100, 10), (100, 20), (100, 30)]
        );
    }

    #[test]
    fn test_evicted_id_starts_fresh() {
        let mut store = TrackStore::new(1);
        store.reconcile(vec![obs("a", 10)]);
        store.reconcile(vec![obs("a", 20)]);
        store.reconcile(vec![]);
        store.reconcile(vec![]);
        assert!(!store.contains("a"));

        store.reconcile(vec![obs("a", 300)]);
        assert_eq!(store.get("a").unwrap().centroid_history(), &[(100, 300)]);
    }

    #[test]
    fn test_duplicate_id_on_registration_keeps_last() {
        let mut store = TrackStore::default();
        let outcome = store.reconcile(vec![obs("a", 10), obs("a", 14)]);
        assert_eq!(outcome.registered, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().centroid_history(), &[(100, 14)]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_duplicate_id_in_later_frame_is_second_sighting() {
        let mut store = TrackStore::default();
        store.reconcile(vec![obs("a", 10)]);
        store.reconcile(vec![obs("a", 12), obs("a", 14)]);
        assert_eq!(
            store.get("a").unwrap().centroid_history(),
            &[(100, 10), (100, 12), (100, 14)]
        );
    }

    #[test]
    fn test_clear() {
        let mut store = TrackStore::default();
        store.reconcile(vec![obs("a", 10), obs("b", 10)]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.absence("a"), None);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_invariant_holds_over_mixed_sequence() {
        let mut store = TrackStore::new(2);
        let frames: Vec<Vec<&str>> = vec![
            vec!["a", "b"],
            vec!["b", "c"],
            vec![],
            vec!["c"],
            vec![],
            vec!["d", "a"],
            vec![],
            vec![],
            vec![],
        ];
        for (i, ids) in frames.into_iter().enumerate() {
            store.reconcile(ids.into_iter().map(|id| obs(id, i as i32)).collect());
            assert!(store.is_consistent());
            for (id, _) in store.tracks() {
                assert!(store.absence(id).unwrap() <= store.max_disappeared());
            }
        }
        assert!(store.is_empty());
    }
}
