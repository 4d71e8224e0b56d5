//! De-duplicated working set of points of interest.
//!
//! The store holds every POI the session has seen, keyed by [`PoiId`],
//! together with the set of ids already materialized for display. Merges
//! are additive and idempotent: the first version of a record wins
//! permanently, and an id never appears twice. Only a full clear (forced
//! refresh) discards anything.

use std::collections::{HashMap, HashSet};

use crate::poi::{Poi, PoiId};

/// Working set of known POIs plus the displayed-id guard.
#[derive(Debug, Default)]
pub struct EntityStore {
    pois: HashMap<PoiId, Poi>,
    displayed_ids: HashSet<PoiId>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fetch batch, returning how many POIs became displayed.
    ///
    /// Ids already in `displayed_ids` are skipped entirely. New ids enter
    /// the working set (first occurrence wins, including within the batch)
    /// and are marked displayed. The displayed check runs against the live
    /// set at call time, so a merge that lands after a clear re-partitions
    /// against the cleared state rather than a stale snapshot.
    pub fn merge_batch(&mut self, batch: Vec<Poi>) -> usize {
        let mut added = 0;
        for poi in batch {
            if self.displayed_ids.contains(&poi.id) {
                continue;
            }
            let id = poi.id;
            self.pois.entry(id).or_insert(poi);
            self.displayed_ids.insert(id);
            added += 1;
        }
        added
    }

    /// Mark already-known POIs as displayed, returning how many were new.
    ///
    /// Used by the cache-hit path: ids that resolve in the working set but
    /// are not yet displayed become displayed. Unknown ids are ignored.
    pub fn mark_displayed(&mut self, ids: &HashSet<PoiId>) -> usize {
        let mut added = 0;
        for id in ids {
            if self.pois.contains_key(id) && self.displayed_ids.insert(*id) {
                added += 1;
            }
        }
        added
    }

    /// Resolve a set of ids against the working set.
    ///
    /// Ids with no record are silently dropped.
    pub fn resolve(&self, ids: &HashSet<PoiId>) -> Vec<Poi> {
        ids.iter()
            .filter_map(|id| self.pois.get(id))
            .cloned()
            .collect()
    }

    /// All displayed POIs, in arbitrary order.
    pub fn displayed(&self) -> Vec<Poi> {
        self.resolve(&self.displayed_ids)
    }

    /// Look up a single POI.
    pub fn get(&self, id: PoiId) -> Option<&Poi> {
        self.pois.get(&id)
    }

    /// Whether the working set knows this id.
    pub fn contains(&self, id: PoiId) -> bool {
        self.pois.contains_key(&id)
    }

    /// Whether this id is already displayed.
    pub fn is_displayed(&self, id: PoiId) -> bool {
        self.displayed_ids.contains(&id)
    }

    /// Number of known POIs.
    pub fn len(&self) -> usize {
        self.pois.len()
    }

    /// Number of displayed POIs.
    pub fn displayed_len(&self) -> usize {
        self.displayed_ids.len()
    }

    /// True when the working set is empty.
    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Drop everything: working set and displayed ids.
    pub fn clear(&mut self) {
        self.pois.clear();
        self.displayed_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;

    fn poi(id: i64, name: &str) -> Poi {
        Poi::new(PoiId(id), name, LatLon::new(37.7749, -122.4194))
    }

    #[test]
    fn test_merge_adds_new_pois() {
        let mut store = EntityStore::new();

        let added = store.merge_batch(vec![poi(1, "a"), poi(2, "b"), poi(3, "c")]);

        assert_eq!(added, 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.displayed_len(), 3);
        assert!(store.is_displayed(PoiId(2)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = EntityStore::new();
        let batch = vec![poi(1, "a"), poi(2, "b")];

        assert_eq!(store.merge_batch(batch.clone()), 2);
        assert_eq!(store.merge_batch(batch), 0);

        assert_eq!(store.len(), 2);
        assert_eq!(store.displayed_len(), 2);
    }

    #[test]
    fn test_no_id_appears_twice_across_overlapping_batches() {
        let mut store = EntityStore::new();

        store.merge_batch(vec![poi(1, "a"), poi(2, "b"), poi(3, "c")]);
        store.merge_batch(vec![poi(2, "b"), poi(3, "c"), poi(4, "d"), poi(5, "e")]);

        assert_eq!(store.len(), 5);
        assert_eq!(store.displayed_len(), 5);
    }

    #[test]
    fn test_first_seen_version_wins() {
        let mut store = EntityStore::new();

        store.merge_batch(vec![poi(1, "original")]);
        store.merge_batch(vec![poi(1, "newer")]);

        assert_eq!(store.get(PoiId(1)).map(|p| p.name.as_str()), Some("original"));
    }

    #[test]
    fn test_duplicate_ids_within_one_batch() {
        let mut store = EntityStore::new();

        let added = store.merge_batch(vec![poi(7, "first"), poi(7, "second")]);

        assert_eq!(added, 1);
        assert_eq!(store.get(PoiId(7)).map(|p| p.name.as_str()), Some("first"));
    }

    #[test]
    fn test_resolve_drops_unknown_ids() {
        let mut store = EntityStore::new();
        store.merge_batch(vec![poi(1, "a"), poi(2, "b")]);

        let ids: HashSet<PoiId> = [PoiId(1), PoiId(99)].into_iter().collect();
        let resolved = store.resolve(&ids);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, PoiId(1));
    }

    #[test]
    fn test_mark_displayed_ignores_unknown_ids() {
        let mut store = EntityStore::new();
        store.merge_batch(vec![poi(1, "a")]);

        let ids: HashSet<PoiId> = [PoiId(1), PoiId(50)].into_iter().collect();
        assert_eq!(store.mark_displayed(&ids), 0);
        assert!(!store.is_displayed(PoiId(50)));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = EntityStore::new();
        store.merge_batch(vec![poi(1, "a"), poi(2, "b")]);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.displayed_len(), 0);
        assert!(!store.is_displayed(PoiId(1)));
    }

    #[test]
    fn test_merge_after_clear_repartitions_against_live_state() {
        let mut store = EntityStore::new();
        store.merge_batch(vec![poi(1, "a"), poi(2, "b")]);
        store.clear();

        // A batch that completes after the clear sees the cleared set
        let added = store.merge_batch(vec![poi(1, "a"), poi(3, "c")]);

        assert_eq!(added, 2);
        assert_eq!(store.len(), 2);
    }
}
