//! Coordinate type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic coordinate in degrees.
///
/// Latitude is positive north of the equator, longitude positive east of
/// the prime meridian. All distance and containment checks in the crate
/// operate on these through [`great_circle_distance_m`](super::great_circle_distance_m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl LatLon {
    /// Create a coordinate from latitude/longitude degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The angular extent of a map viewport, in degrees.
///
/// Mirrors the span reported by the map surface: how many degrees of
/// latitude and longitude are visible. Smaller spans mean tighter zoom.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportSpan {
    /// Visible latitude extent in degrees
    pub latitude_delta: f64,
    /// Visible longitude extent in degrees
    pub longitude_delta: f64,
}

impl ViewportSpan {
    /// Create a span from latitude/longitude deltas.
    pub fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }

    /// The larger of the two deltas, used for zoom-level checks.
    pub fn max_delta(&self) -> f64 {
        self.latitude_delta.max(self.longitude_delta)
    }
}

impl fmt::Display for ViewportSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}° x {:.4}°", self.latitude_delta, self.longitude_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_display() {
        let coord = LatLon::new(37.7749, -122.4194);
        assert_eq!(coord.to_string(), "37.7749, -122.4194");
    }

    #[test]
    fn test_viewport_span_max_delta() {
        let span = ViewportSpan::new(0.02, 0.05);
        assert_eq!(span.max_delta(), 0.05);

        let span = ViewportSpan::new(0.1, 0.03);
        assert_eq!(span.max_delta(), 0.1);
    }

    #[test]
    fn test_viewport_span_default_is_zero() {
        let span = ViewportSpan::default();
        assert_eq!(span.max_delta(), 0.0);
    }
}
