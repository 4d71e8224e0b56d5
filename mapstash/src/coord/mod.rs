//! Geographic coordinate module
//!
//! Provides the coordinate and viewport-span types plus the great-circle
//! distance used for every containment and threshold check in the crate.

mod types;

pub use types::{LatLon, ViewportSpan, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Computes the great-circle distance between two coordinates, in meters.
///
/// Uses the haversine formula over a spherical Earth. Accurate to well
/// under 0.5% for the sub-100km distances this crate deals in, which is
/// far tighter than any of the thresholds compared against it.
#[inline]
pub fn great_circle_distance_m(a: LatLon, b: LatLon) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let coord = LatLon::new(37.7749, -122.4194);
        assert_eq!(great_circle_distance_m(coord, coord), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = LatLon::new(37.7749, -122.4194);
        let b = LatLon::new(37.8044, -122.2712);

        let ab = great_circle_distance_m(a, b);
        let ba = great_circle_distance_m(b, a);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_latitude() {
        // One degree of latitude is ~111.2 km everywhere
        let a = LatLon::new(0.0, 0.0);
        let b = LatLon::new(1.0, 0.0);

        let d = great_circle_distance_m(a, b);
        assert!((d - 111_195.0).abs() < 10.0, "Expected ~111195m, got {}", d);
    }

    #[test]
    fn test_one_degree_longitude_shrinks_with_latitude() {
        // At the equator one degree of longitude is ~111.2 km
        let equator = great_circle_distance_m(LatLon::new(0.0, 0.0), LatLon::new(0.0, 1.0));
        assert!((equator - 111_195.0).abs() < 10.0);

        // At 60°N it is about half that
        let north = great_circle_distance_m(LatLon::new(60.0, 0.0), LatLon::new(60.0, 1.0));
        assert!((north - 55_597.0).abs() < 30.0, "Expected ~55597m, got {}", north);
    }

    #[test]
    fn test_san_francisco_to_los_angeles() {
        // Known great-circle distance: ~559 km
        let sf = LatLon::new(37.7749, -122.4194);
        let la = LatLon::new(34.0522, -118.2437);

        let d = great_circle_distance_m(sf, la);
        assert!(
            (d - 559_100.0).abs() < 2_000.0,
            "Expected ~559km, got {}m",
            d
        );
    }

    #[test]
    fn test_short_distance_precision() {
        // 0.0045° of latitude is ~500m; threshold checks depend on this scale
        let a = LatLon::new(37.7749, -122.4194);
        let b = LatLon::new(37.7749 + 0.0045, -122.4194);

        let d = great_circle_distance_m(a, b);
        assert!((d - 500.4).abs() < 2.0, "Expected ~500m, got {}", d);
    }
}
