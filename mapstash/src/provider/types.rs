//! Error types for the external collaborators.

use thiserror::Error;

/// Errors surfaced by the remote POI search service.
///
/// All of these are transient from the engine's point of view: a failed
/// fetch clears the loading flag and leaves cached state untouched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service could not be reached at all
    #[error("POI service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with an error
    #[error("POI service error: {0}")]
    Service(String),

    /// The response payload could not be decoded
    #[error("Malformed POI payload: {0}")]
    Malformed(String),
}

/// Errors surfaced by the reverse geocoder.
///
/// Recovered by publishing the unknown-location sentinel instead of a
/// stale name.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The geocoder could not be reached
    #[error("Geocoder unreachable: {0}")]
    Unreachable(String),

    /// The geocoder answered with an error
    #[error("Geocoder error: {0}")]
    Service(String),

    /// No place name exists for the coordinate
    #[error("No place name for coordinate")]
    NoResult,
}
