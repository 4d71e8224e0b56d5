//! External collaborator interfaces.
//!
//! Everything the engine consumes from the outside world comes through
//! here: the remote POI search, the reverse geocoder, and the
//! extended-data lookup. The traits are object-safe so the coordinator
//! holds them as injected `Arc<dyn …>` collaborators.

mod extended;
mod traits;
mod types;

pub use extended::CachedExtendedData;
pub use traits::{BoxFuture, ExtendedDataSource, Geocoder, NoExtendedData, PoiSource};
pub use types::{FetchError, GeocodeError};
