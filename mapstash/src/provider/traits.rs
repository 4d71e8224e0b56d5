//! Collaborator traits for dependency injection.
//!
//! The engine never talks to the network itself; it is handed these as
//! `Arc<dyn …>` at construction. All three are object-safe, returning
//! boxed futures, so tests can substitute counting mocks and production
//! code can pick transports freely.

use std::future::Future;
use std::pin::Pin;

use crate::coord::LatLon;
use crate::poi::Poi;
use crate::provider::types::{FetchError, GeocodeError};

/// Boxed future type for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote POI search service.
///
/// `fetch_nearby` is idempotent and safe to call repeatedly for the same
/// coordinate. The radius is in kilometers; this is the only place in the
/// crate where kilometers appear.
pub trait PoiSource: Send + Sync {
    /// Fetch the POIs within `radius_km` of `center`.
    fn fetch_nearby(&self, center: LatLon, radius_km: f64)
        -> BoxFuture<'_, Result<Vec<Poi>, FetchError>>;
}

/// Reverse geocoder: coordinate to human-readable place name.
pub trait Geocoder: Send + Sync {
    /// Resolve a coordinate to a place name.
    fn resolve(&self, coord: LatLon) -> BoxFuture<'_, Result<String, GeocodeError>>;
}

/// Lookup for per-POI extended data availability (e.g. nutrition records).
///
/// Consulted for at most a small prefix of each fetch batch, so
/// implementations do not need their own rate limiting. Implementations
/// must not hold on to the `name` borrow across the returned future.
pub trait ExtendedDataSource: Send + Sync {
    /// Whether extended data exists for a POI with this name.
    fn has_extended_data(&self, name: &str) -> BoxFuture<'_, bool>;
}

/// Extended-data source that reports nothing for anyone.
///
/// Useful when wiring the engine without an extended-data backend, and in
/// tests that do not care about the flag.
#[derive(Debug, Clone, Default)]
pub struct NoExtendedData;

impl ExtendedDataSource for NoExtendedData {
    fn has_extended_data(&self, _name: &str) -> BoxFuture<'_, bool> {
        Box::pin(async { false })
    }
}
