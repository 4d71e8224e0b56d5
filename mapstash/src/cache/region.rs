//! A single cached geographic region.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::coord::{great_circle_distance_m, LatLon};
use crate::poi::PoiId;

/// A previously fetched geographic area.
///
/// Records where a fetch was centered, how far it reached, when it
/// happened, and which POI ids the batch contained. Radius is in meters;
/// the kilometer-denominated fetch parameter is converted exactly once,
/// at the remote call boundary.
#[derive(Debug, Clone)]
pub struct CachedRegion {
    /// Center of the originating fetch.
    pub center: LatLon,
    /// Reach of the originating fetch, in meters.
    pub radius_m: f64,
    /// Ids of every POI the originating batch contained.
    pub member_ids: HashSet<PoiId>,
    created_at: Instant,
}

impl CachedRegion {
    /// Create a region stamped with the current time.
    pub fn new(center: LatLon, radius_m: f64, member_ids: HashSet<PoiId>) -> Self {
        Self {
            center,
            radius_m,
            member_ids,
            created_at: Instant::now(),
        }
    }

    /// Whether the coordinate falls inside this region.
    ///
    /// Inside means the great-circle distance to the center is at most the
    /// region's radius.
    pub fn contains(&self, coord: LatLon) -> bool {
        great_circle_distance_m(coord, self.center) <= self.radius_m
    }

    /// Time since this region was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Whether this region has outlived the expiry window.
    pub fn is_expired(&self, expiry_window: Duration) -> bool {
        self.age() > expiry_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_at(lat: f64, lon: f64, radius_m: f64) -> CachedRegion {
        CachedRegion::new(LatLon::new(lat, lon), radius_m, HashSet::new())
    }

    #[test]
    fn test_contains_center() {
        let region = region_at(37.7749, -122.4194, 3000.0);
        assert!(region.contains(LatLon::new(37.7749, -122.4194)));
    }

    #[test]
    fn test_contains_point_inside_radius() {
        let region = region_at(37.7749, -122.4194, 3000.0);

        // ~1.1km north of center
        assert!(region.contains(LatLon::new(37.7849, -122.4194)));
    }

    #[test]
    fn test_excludes_point_outside_radius() {
        let region = region_at(37.7749, -122.4194, 3000.0);

        // ~5.5km north of center
        assert!(!region.contains(LatLon::new(37.8249, -122.4194)));
    }

    #[test]
    fn test_fresh_region_is_not_expired() {
        let region = region_at(0.0, 0.0, 1000.0);
        assert!(!region.is_expired(Duration::from_secs(30 * 60)));
    }

    #[test]
    fn test_region_expires_after_window() {
        let region = region_at(0.0, 0.0, 1000.0);

        std::thread::sleep(Duration::from_millis(30));
        assert!(region.is_expired(Duration::from_millis(10)));
    }
}
