//! Region cache with first-match lookup and lazy expiry.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::cache::region::CachedRegion;
use crate::coord::LatLon;
use crate::poi::PoiId;

/// Configuration for the region cache.
#[derive(Debug, Clone)]
pub struct RegionCacheConfig {
    /// How long a region stays valid for lookup.
    pub expiry_window: Duration,
}

impl Default for RegionCacheConfig {
    fn default() -> Self {
        Self {
            expiry_window: Duration::from_secs(30 * 60),
        }
    }
}

impl RegionCacheConfig {
    /// Set the expiry window.
    pub fn with_expiry_window(mut self, expiry_window: Duration) -> Self {
        self.expiry_window = expiry_window;
        self
    }
}

/// Ordered collection of previously fetched regions.
///
/// Lookup first purges every expired region, then scans the remainder in
/// insertion order and answers with the first region containing the
/// coordinate. Overlapping regions are tolerated; whichever was inserted
/// first is authoritative for the overlap. Regions only leave through the
/// lazy expiry purge or a full clear.
#[derive(Debug)]
pub struct RegionCache {
    regions: Vec<CachedRegion>,
    expiry_window: Duration,
}

impl RegionCache {
    /// Create an empty cache with the given configuration.
    pub fn new(config: RegionCacheConfig) -> Self {
        Self {
            regions: Vec::new(),
            expiry_window: config.expiry_window,
        }
    }

    /// Find the member ids of the first non-expired region containing the
    /// coordinate.
    ///
    /// Expired regions are dropped before the scan, so an expired region is
    /// never returned even when it spatially contains the coordinate.
    pub fn lookup(&mut self, coord: LatLon) -> Option<&HashSet<PoiId>> {
        let before = self.regions.len();
        let window = self.expiry_window;
        self.regions.retain(|region| !region.is_expired(window));

        let purged = before - self.regions.len();
        if purged > 0 {
            debug!(purged, remaining = self.regions.len(), "Purged expired regions");
        }

        self.regions
            .iter()
            .find(|region| region.contains(coord))
            .map(|region| &region.member_ids)
    }

    /// Append a region. No overlap merging is performed.
    pub fn insert(&mut self, region: CachedRegion) {
        debug!(
            center = %region.center,
            radius_m = region.radius_m,
            members = region.member_ids.len(),
            "Caching fetched region"
        );
        self.regions.push(region);
    }

    /// Drop every region unconditionally.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Number of regions currently held, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when no regions are held.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
