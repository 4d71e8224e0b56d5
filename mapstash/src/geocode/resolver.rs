//! Debounced reverse geocoding of the viewport center.
//!
//! The resolver listens to viewport centers forwarded by the fetch
//! coordinator. Each center re-arms a short debounce; once movement
//! pauses, a single geocode attempt fires, subject to the
//! [`GeocodeThrottle`]. Failures publish a sentinel name instead of
//! leaving a stale one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::coord::LatLon;
use crate::geocode::throttle::GeocodeThrottle;
use crate::provider::{GeocodeError, Geocoder};
use crate::status::SharedEngineStatus;

/// Name published when no area name can be resolved.
pub const UNKNOWN_AREA: &str = "Unknown location";

/// Capacity of the geocode-completion channel.
const OUTCOME_CHANNEL_CAPACITY: usize = 4;

/// Tunables for the area-name resolver.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Minimum interval between geocode attempts.
    pub min_interval: Duration,
    /// Minimum movement in meters between geocode attempts.
    pub min_distance_m: f64,
    /// Pause length that ends a burst of viewport movement.
    pub debounce_delay: Duration,
}

impl GeocodeConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            min_interval: Duration::from_secs(30),
            min_distance_m: 5_000.0,
            debounce_delay: Duration::from_secs(3),
        }
    }

    /// Set the minimum interval between attempts.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the minimum movement between attempts, in meters.
    pub fn with_min_distance_m(mut self, distance_m: f64) -> Self {
        self.min_distance_m = distance_m;
        self
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion message delivered by a spawned geocode task.
#[derive(Debug)]
struct GeocodeOutcome {
    center: LatLon,
    result: Result<String, GeocodeError>,
}

/// Resolves viewport centers into human-readable area names.
pub struct AreaNameResolver {
    config: GeocodeConfig,
    throttle: GeocodeThrottle,
    geocoder: Option<Arc<dyn Geocoder>>,
    status: Option<Arc<SharedEngineStatus>>,
    outcome_tx: mpsc::Sender<GeocodeOutcome>,
    outcome_rx: Option<mpsc::Receiver<GeocodeOutcome>>,
    pending: Option<LatLon>,
    deadline: Option<Instant>,
    in_flight: bool,
}

impl AreaNameResolver {
    /// Create a resolver with no collaborators attached.
    pub fn new(config: GeocodeConfig) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            throttle: GeocodeThrottle::new(config.min_interval, config.min_distance_m),
            config,
            geocoder: None,
            status: None,
            outcome_tx,
            outcome_rx: Some(outcome_rx),
            pending: None,
            deadline: None,
            in_flight: false,
        }
    }

    /// Attach the reverse geocoder.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Attach the shared status the area name is published to.
    pub fn with_status(mut self, status: Arc<SharedEngineStatus>) -> Self {
        self.status = Some(status);
        self
    }

    /// Run the resolver until the token is cancelled.
    pub async fn run(mut self, mut centers: mpsc::Receiver<LatLon>, token: CancellationToken) {
        let Some(mut outcomes) = self.outcome_rx.take() else {
            warn!("area-name resolver already running");
            return;
        };

        info!("area-name resolver started");
        loop {
            let deadline = self.deadline;
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("area-name resolver stopping");
                    break;
                }
                Some(outcome) = outcomes.recv() => {
                    self.handle_outcome(outcome);
                }
                Some(center) = centers.recv() => {
                    self.handle_center(center);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire();
                }
            }
        }
    }

    /// Re-arm the debounce for a new viewport center.
    fn handle_center(&mut self, center: LatLon) {
        trace!(%center, "viewport center received, re-arming debounce");
        self.pending = Some(center);
        self.deadline = Some(Instant::now() + self.config.debounce_delay);
    }

    /// The debounce elapsed: attempt a resolve for the pending center.
    fn fire(&mut self) {
        self.deadline = None;
        let Some(center) = self.pending.take() else {
            return;
        };
        if self.in_flight {
            debug!(%center, "geocode already in flight, dropping trigger");
            return;
        }
        if !self.throttle.permits(center) {
            debug!(%center, "geocode suppressed by throttle");
            return;
        }
        self.spawn_resolve(center);
    }

    /// Spawn the single geocode allowed in flight.
    fn spawn_resolve(&mut self, center: LatLon) {
        let Some(geocoder) = self.geocoder.clone() else {
            warn!("no geocoder attached, dropping resolve");
            return;
        };
        self.throttle.record_attempt(center);
        self.in_flight = true;

        let outcome_tx = self.outcome_tx.clone();
        debug!(%center, "resolving area name");
        tokio::spawn(async move {
            let result = geocoder.resolve(center).await;
            let outcome = GeocodeOutcome { center, result };
            if outcome_tx.send(outcome).await.is_err() {
                debug!("resolver gone, dropping geocode result");
            }
        });
    }

    /// Publish a completed resolve.
    fn handle_outcome(&mut self, outcome: GeocodeOutcome) {
        self.in_flight = false;
        match outcome.result {
            Ok(name) => {
                info!(center = %outcome.center, %name, "area name resolved");
                self.set_area_name(name);
            }
            Err(error) => {
                warn!(center = %outcome.center, %error, "geocode failed, publishing sentinel");
                self.set_area_name(UNKNOWN_AREA.to_string());
            }
        }
    }

    fn set_area_name(&self, name: String) {
        if let Some(status) = &self.status {
            status.set_area_name(name);
        }
    }

    /// Await the next geocode completion. Test-only: production
    /// completions are consumed by [`run`](Self::run).
    #[cfg(test)]
    async fn next_outcome(&mut self) -> Option<GeocodeOutcome> {
        match self.outcome_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}
