//! Spatial cache of previously fetched regions.
//!
//! A fetch leaves behind a [`CachedRegion`]; later requests that land
//! inside a fresh region are served from the working set instead of the
//! network. Expiry is lazy: regions are only dropped during a lookup or a
//! full clear.

mod region;
mod region_cache;

pub use region::CachedRegion;
pub use region_cache::{RegionCache, RegionCacheConfig};
