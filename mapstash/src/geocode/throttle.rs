//! Attempt throttle for reverse geocoding.

use std::time::{Duration, Instant};

use crate::coord::{great_circle_distance_m, LatLon};

/// Suppresses geocode attempts that are too recent and too close.
///
/// An attempt is permitted only when the minimum interval has elapsed
/// since the last attempt and the coordinate has moved past the minimum
/// distance. Attempt state records when the resolve is spawned, so failed
/// attempts count too.
#[derive(Debug)]
pub struct GeocodeThrottle {
    min_interval: Duration,
    min_distance_m: f64,
    last_attempt: Option<(Instant, LatLon)>,
}

impl GeocodeThrottle {
    /// Create a throttle with the given interval and distance floors.
    pub fn new(min_interval: Duration, min_distance_m: f64) -> Self {
        Self {
            min_interval,
            min_distance_m,
            last_attempt: None,
        }
    }

    /// Whether an attempt at `coord` is currently permitted.
    pub fn permits(&self, coord: LatLon) -> bool {
        match self.last_attempt {
            Some((at, origin)) => {
                at.elapsed() >= self.min_interval
                    && great_circle_distance_m(origin, coord) > self.min_distance_m
            }
            None => true,
        }
    }

    /// Record an attempt at `coord`.
    pub fn record_attempt(&mut self, coord: LatLon) {
        self.last_attempt = Some((Instant::now(), coord));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn throttle_ms(interval_ms: u64, distance_m: f64) -> GeocodeThrottle {
        GeocodeThrottle::new(Duration::from_millis(interval_ms), distance_m)
    }

    #[test]
    fn test_first_attempt_is_permitted() {
        let throttle = GeocodeThrottle::new(Duration::from_secs(30), 5_000.0);
        assert!(throttle.permits(LatLon::new(37.7749, -122.4194)));
    }

    #[test]
    fn test_rejects_immediate_repeat() {
        let mut throttle = GeocodeThrottle::new(Duration::from_secs(30), 5_000.0);
        let here = LatLon::new(37.7749, -122.4194);

        throttle.record_attempt(here);

        // Far enough, but the interval has not elapsed
        assert!(!throttle.permits(LatLon::new(38.0, -122.4194)));
    }

    #[test]
    fn test_rejects_nearby_coordinate_after_interval() {
        let mut throttle = throttle_ms(10, 5_000.0);
        let here = LatLon::new(0.0, 0.0);

        throttle.record_attempt(here);
        thread::sleep(Duration::from_millis(20));

        // 0.01 deg of latitude is roughly 1.1 km, well under the floor
        assert!(!throttle.permits(LatLon::new(0.01, 0.0)));
    }

    #[test]
    fn test_permits_distant_coordinate_after_interval() {
        let mut throttle = throttle_ms(10, 5_000.0);

        throttle.record_attempt(LatLon::new(0.0, 0.0));
        thread::sleep(Duration::from_millis(20));

        // 0.054 deg of latitude is roughly 6 km
        assert!(throttle.permits(LatLon::new(0.054, 0.0)));
    }

    #[test]
    fn test_failed_attempts_still_arm_the_throttle() {
        let mut throttle = GeocodeThrottle::new(Duration::from_secs(30), 5_000.0);
        let here = LatLon::new(0.0, 0.0);

        // Recording happens at spawn time regardless of outcome
        throttle.record_attempt(here);
        assert!(!throttle.permits(here));
    }
}
