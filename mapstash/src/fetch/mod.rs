//! Fetch coordination: admission gates and the coordinator run loop.
//!
//! A viewport movement becomes at most one remote fetch. The
//! [`FetchCoordinator`] consults the region cache first, then applies the
//! cooldown, zoom, and movement gates, and finally spawns a cancellable
//! fetch task whose result is merged on the coordinator's own loop.

mod config;
mod coordinator;
mod gates;

pub use config::FetchConfig;
pub use coordinator::{EngineCommand, FetchCoordinator};
pub use gates::{MovementGate, RateLimiter, ZoomGate};
