//! Engine lifecycle: construction, wiring, and shutdown.
//!
//! [`MapstashService`] assembles the fetch coordinator and the area-name
//! resolver, spawns their run loops, and hands out the command sender and
//! status handle the embedding application talks to.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::RegionCacheConfig;
use crate::fetch::{EngineCommand, FetchConfig, FetchCoordinator};
use crate::geocode::{AreaNameResolver, GeocodeConfig};
use crate::position::{PositionBroadcaster, SharedDevicePosition};
use crate::provider::{ExtendedDataSource, Geocoder, PoiSource};
use crate::status::SharedEngineStatus;

/// Capacity of the engine command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 32;
/// Capacity of the viewport-center channel feeding the resolver.
const CENTER_CHANNEL_CAPACITY: usize = 16;

/// Aggregated configuration for the whole engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Fetch coordinator and gate tunables.
    pub fetch: FetchConfig,
    /// Region cache tunables.
    pub cache: RegionCacheConfig,
    /// Area-name resolver tunables.
    pub geocode: GeocodeConfig,
}

impl EngineConfig {
    /// Create a config with default values throughout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the fetch configuration.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Replace the region cache configuration.
    pub fn with_cache(mut self, cache: RegionCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the geocode configuration.
    pub fn with_geocode(mut self, geocode: GeocodeConfig) -> Self {
        self.geocode = geocode;
        self
    }
}

/// External collaborators the engine is built around.
///
/// Only the POI source is required; everything else degrades gracefully
/// when absent.
pub struct EngineSources {
    poi_source: Arc<dyn PoiSource>,
    geocoder: Option<Arc<dyn Geocoder>>,
    extended_data: Option<Arc<dyn ExtendedDataSource>>,
    position: Option<Arc<SharedDevicePosition>>,
}

impl EngineSources {
    /// Create a source bundle around the required POI source.
    pub fn new(poi_source: Arc<dyn PoiSource>) -> Self {
        Self {
            poi_source,
            geocoder: None,
            extended_data: None,
            position: None,
        }
    }

    /// Attach a reverse geocoder for area names.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Attach an extended-data source.
    pub fn with_extended_data(mut self, source: Arc<dyn ExtendedDataSource>) -> Self {
        self.extended_data = Some(source);
        self
    }

    /// Attach the device position feed.
    pub fn with_position(mut self, position: Arc<SharedDevicePosition>) -> Self {
        self.position = Some(position);
        self
    }
}

/// Running engine instance.
pub struct MapstashService {
    commands: mpsc::Sender<EngineCommand>,
    status: Arc<SharedEngineStatus>,
    cancel: CancellationToken,
    coordinator_handle: JoinHandle<()>,
    resolver_handle: Option<JoinHandle<()>>,
}

impl MapstashService {
    /// Wire the engine together and spawn its run loops.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: EngineConfig, sources: EngineSources) -> Self {
        let status = SharedEngineStatus::new();
        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (center_tx, center_rx) = mpsc::channel(CENTER_CHANNEL_CAPACITY);

        let mut coordinator = FetchCoordinator::new(config.fetch, config.cache)
            .with_poi_source(sources.poi_source)
            .with_status(status.clone())
            .with_geocode_channel(center_tx);
        if let Some(extended) = sources.extended_data {
            coordinator = coordinator.with_extended_data(extended);
        }

        // A silent stand-in feed keeps the run loop signature uniform
        // when no position provider is attached.
        let positions = match &sources.position {
            Some(position) => position.subscribe(),
            None => broadcast::channel(1).1,
        };
        if let Some(position) = sources.position {
            coordinator = coordinator.with_position_provider(position);
        }

        let coordinator_handle =
            tokio::spawn(coordinator.run(command_rx, positions, cancel.clone()));

        let resolver_handle = sources.geocoder.map(|geocoder| {
            let resolver = AreaNameResolver::new(config.geocode)
                .with_geocoder(geocoder)
                .with_status(status.clone());
            tokio::spawn(resolver.run(center_rx, cancel.clone()))
        });

        info!("mapstash engine started");
        Self {
            commands: command_tx,
            status,
            cancel,
            coordinator_handle,
            resolver_handle,
        }
    }

    /// Sender for engine commands.
    pub fn commands(&self) -> mpsc::Sender<EngineCommand> {
        self.commands.clone()
    }

    /// Shared status handle for the presentation layer.
    pub fn status(&self) -> Arc<SharedEngineStatus> {
        self.status.clone()
    }

    /// Send a single command, logging if the engine is gone.
    pub async fn send(&self, command: EngineCommand) {
        if self.commands.send(command).await.is_err() {
            warn!("engine command dropped, coordinator not running");
        }
    }

    /// Stop both run loops and wait for them to finish.
    pub async fn shutdown(self) {
        info!("mapstash engine stopping");
        self.cancel.cancel();
        if self.coordinator_handle.await.is_err() {
            warn!("fetch coordinator task panicked");
        }
        if let Some(handle) = self.resolver_handle {
            if handle.await.is_err() {
                warn!("area-name resolver task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::coord::{LatLon, ViewportSpan};
    use crate::poi::{Poi, PoiId};
    use crate::provider::{BoxFuture, FetchError, GeocodeError};

    struct StaticPoiSource {
        calls: AtomicUsize,
    }

    impl PoiSource for StaticPoiSource {
        fn fetch_nearby(
            &self,
            center: LatLon,
            _radius_km: f64,
        ) -> BoxFuture<'_, Result<Vec<Poi>, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(vec![
                    Poi::new(PoiId(1), "One", center),
                    Poi::new(PoiId(2), "Two", center),
                ])
            })
        }
    }

    struct StaticGeocoder;

    impl Geocoder for StaticGeocoder {
        fn resolve(&self, _coord: LatLon) -> BoxFuture<'_, Result<String, GeocodeError>> {
            Box::pin(async move { Ok("Testville".to_string()) })
        }
    }

    async fn wait_for<F: Fn() -> bool>(check: F) -> bool {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_service_fetches_and_publishes() {
        let source = Arc::new(StaticPoiSource {
            calls: AtomicUsize::new(0),
        });
        let service = MapstashService::start(
            EngineConfig::new(),
            EngineSources::new(source.clone()),
        );

        service
            .send(EngineCommand::ViewportChanged {
                center: LatLon::new(37.7749, -122.4194),
                span: ViewportSpan::new(0.01, 0.01),
            })
            .await;

        let status = service.status();
        assert!(wait_for(|| status.snapshot().pois.len() == 2).await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_service_resolves_area_name() {
        let source = Arc::new(StaticPoiSource {
            calls: AtomicUsize::new(0),
        });
        let config = EngineConfig::new().with_geocode(
            GeocodeConfig::new().with_debounce_delay(Duration::from_millis(20)),
        );
        let service = MapstashService::start(
            config,
            EngineSources::new(source).with_geocoder(Arc::new(StaticGeocoder)),
        );

        service
            .send(EngineCommand::ViewportChanged {
                center: LatLon::new(37.7749, -122.4194),
                span: ViewportSpan::new(0.01, 0.01),
            })
            .await;

        let status = service.status();
        assert!(wait_for(|| status.snapshot().area_name == "Testville").await);

        service.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_the_command_channel() {
        let source = Arc::new(StaticPoiSource {
            calls: AtomicUsize::new(0),
        });
        let service =
            MapstashService::start(EngineConfig::new(), EngineSources::new(source));
        let commands = service.commands();

        service.shutdown().await;

        assert!(commands
            .send(EngineCommand::ClearSearch)
            .await
            .is_err());
    }
}
