//! Shared engine status for the presentation layer.
//!
//! The coordinator and resolver publish into this handle; UI code reads
//! consistent snapshots out of it. This is the only state the engine
//! exposes for display.

use std::sync::{Arc, RwLock};

use crate::poi::Poi;
use crate::position::AuthorizationState;

/// Thread-safe status handle shared between the engine and its consumers.
#[derive(Debug, Default)]
pub struct SharedEngineStatus {
    inner: RwLock<EngineStatusSnapshot>,
}

impl SharedEngineStatus {
    /// Create a new shared status.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(EngineStatusSnapshot::default()),
        })
    }

    /// Replace the displayed POI list.
    pub fn update_pois(&self, pois: Vec<Poi>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.pois = pois;
        }
    }

    /// Set or clear the loading flag.
    pub fn set_loading(&self, loading: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.loading = loading;
        }
    }

    /// Publish a loading-progress fraction (0.0 to 1.0).
    pub fn set_progress(&self, progress: f64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Publish the resolved area name.
    pub fn set_area_name(&self, name: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.area_name = name.into();
        }
    }

    /// Publish the current search query and its results.
    pub fn set_search(&self, query: String, results: Vec<Poi>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.search_query = query;
            inner.search_results = results;
        }
    }

    /// Record whether a filter predicate is active.
    pub fn set_filter_active(&self, active: bool) {
        if let Ok(mut inner) = self.inner.write() {
            inner.filter_active = active;
        }
    }

    /// Publish the positioning authorization state.
    pub fn set_authorization(&self, authorization: AuthorizationState) {
        if let Ok(mut inner) = self.inner.write() {
            inner.authorization = authorization;
        }
    }

    /// Get a snapshot of the current status.
    pub fn snapshot(&self) -> EngineStatusSnapshot {
        self.inner.read().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Snapshot of engine status for display.
#[derive(Debug, Clone, Default)]
pub struct EngineStatusSnapshot {
    /// Displayed POIs in presentation order.
    pub pois: Vec<Poi>,
    /// Whether a remote fetch is in flight.
    pub loading: bool,
    /// Coarse loading progress (0.0 to 1.0), stepped during forced refresh.
    pub progress: f64,
    /// Resolved name of the current area, or the unknown sentinel.
    pub area_name: String,
    /// Current search query, empty when not searching.
    pub search_query: String,
    /// Search results for the current query, capped.
    pub search_results: Vec<Poi>,
    /// Whether a filter predicate is applied to `pois`.
    pub filter_active: bool,
    /// Positioning authorization as last observed.
    pub authorization: AuthorizationState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLon;
    use crate::poi::PoiId;

    fn poi(id: i64) -> Poi {
        Poi::new(PoiId(id), format!("poi-{id}"), LatLon::new(0.0, 0.0))
    }

    #[test]
    fn test_default_snapshot_is_idle() {
        let status = SharedEngineStatus::new();
        let snap = status.snapshot();

        assert!(snap.pois.is_empty());
        assert!(!snap.loading);
        assert_eq!(snap.progress, 0.0);
        assert!(snap.area_name.is_empty());
        assert!(!snap.filter_active);
    }

    #[test]
    fn test_updates_are_visible_in_snapshot() {
        let status = SharedEngineStatus::new();

        status.update_pois(vec![poi(1), poi(2)]);
        status.set_loading(true);
        status.set_area_name("Mission District");
        status.set_authorization(AuthorizationState::Authorized);

        let snap = status.snapshot();
        assert_eq!(snap.pois.len(), 2);
        assert!(snap.loading);
        assert_eq!(snap.area_name, "Mission District");
        assert_eq!(snap.authorization, AuthorizationState::Authorized);
    }

    #[test]
    fn test_progress_is_clamped() {
        let status = SharedEngineStatus::new();

        status.set_progress(1.7);
        assert_eq!(status.snapshot().progress, 1.0);

        status.set_progress(-0.3);
        assert_eq!(status.snapshot().progress, 0.0);
    }

    #[test]
    fn test_search_state_round_trip() {
        let status = SharedEngineStatus::new();

        status.set_search("noodle".to_string(), vec![poi(3)]);

        let snap = status.snapshot();
        assert_eq!(snap.search_query, "noodle");
        assert_eq!(snap.search_results.len(), 1);
    }

    #[test]
    fn test_snapshots_are_independent_copies() {
        let status = SharedEngineStatus::new();
        status.update_pois(vec![poi(1)]);

        let before = status.snapshot();
        status.update_pois(vec![poi(1), poi(2), poi(3)]);

        assert_eq!(before.pois.len(), 1);
        assert_eq!(status.snapshot().pois.len(), 3);
    }
}
