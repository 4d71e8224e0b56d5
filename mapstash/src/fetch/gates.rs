//! Admission gates for the fetch pipeline.
//!
//! Each gate is a small piece of session state owned by the coordinator.
//! Rejections are silent no-ops; callers keep whatever results they
//! already have.

use std::time::{Duration, Instant};

use crate::coord::{great_circle_distance_m, LatLon, ViewportSpan};

/// Coarse cooldown between accepted fetch requests.
///
/// Arms at acceptance, so a request that later fails the zoom or movement
/// gate still consumes the window.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Accept a request if the cooldown has elapsed, arming the window.
    pub fn try_accept(&mut self) -> bool {
        match self.last_accepted {
            Some(at) if at.elapsed() < self.cooldown => false,
            _ => {
                self.last_accepted = Some(Instant::now());
                true
            }
        }
    }

    /// Clear the window so the next request is immediately eligible.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

/// Requires meaningful movement since the last completed fetch.
#[derive(Debug)]
pub struct MovementGate {
    threshold_m: f64,
    origin: Option<LatLon>,
}

impl MovementGate {
    /// Create a gate with the given movement threshold in meters.
    pub fn new(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            origin: None,
        }
    }

    /// Whether a fetch at `center` clears the movement threshold.
    ///
    /// With no recorded origin every request is eligible.
    pub fn permits(&self, center: LatLon) -> bool {
        match self.origin {
            Some(origin) => great_circle_distance_m(origin, center) >= self.threshold_m,
            None => true,
        }
    }

    /// Record the center of a fetch that completed successfully.
    pub fn record(&mut self, center: LatLon) {
        self.origin = Some(center);
    }

    /// Forget the recorded origin.
    pub fn reset(&mut self) {
        self.origin = None;
    }
}

/// Suppresses fetches when the viewport is zoomed out too far.
#[derive(Debug)]
pub struct ZoomGate {
    max_span: f64,
}

impl ZoomGate {
    /// Create a gate with the given maximum span in degrees.
    pub fn new(max_span: f64) -> Self {
        Self { max_span }
    }

    /// Whether the viewport is tight enough to fetch for.
    pub fn permits(&self, span: ViewportSpan) -> bool {
        span.max_delta() <= self.max_span
    }
}
