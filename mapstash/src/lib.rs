//! mapstash - Region-based POI caching and fetch coordination
//!
//! This library implements the caching engine behind a location-aware
//! browsing app: it turns viewport movements into at most one remote
//! fetch, remembers which map regions have already been fetched, and
//! keeps a de-duplicated working set of points of interest for display
//! and search.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides the assembled
//! engine:
//!
//! ```ignore
//! use mapstash::fetch::EngineCommand;
//! use mapstash::service::{EngineConfig, EngineSources, MapstashService};
//!
//! let sources = EngineSources::new(poi_source).with_geocoder(geocoder);
//! let service = MapstashService::start(EngineConfig::new(), sources);
//!
//! // Drive it from the map view
//! service.send(EngineCommand::ViewportChanged { center, span }).await;
//! let snapshot = service.status().snapshot();
//! ```

pub mod cache;
pub mod coord;
pub mod fetch;
pub mod geocode;
pub mod logging;
pub mod poi;
pub mod position;
pub mod provider;
pub mod service;
pub mod status;
pub mod store;
pub mod view;

/// Version of the mapstash library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
