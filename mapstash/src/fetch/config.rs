//! Fetch coordinator configuration.

use std::time::Duration;

/// Tunables for the fetch coordinator and its admission gates.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Radius in meters used for cache containment and remote queries.
    pub search_radius_m: f64,
    /// Minimum movement in meters before a new fetch is considered.
    pub movement_threshold_m: f64,
    /// Minimum interval between accepted fetch requests.
    pub fetch_cooldown: Duration,
    /// Largest viewport span (degrees, larger delta) that still fetches.
    pub max_viewport_span: f64,
    /// How many batch entries to probe for extended data per fetch.
    pub extended_probe_limit: usize,
}

impl FetchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            search_radius_m: 3_000.0,
            movement_threshold_m: 500.0,
            fetch_cooldown: Duration::from_secs(3),
            max_viewport_span: 0.05,
            extended_probe_limit: 5,
        }
    }

    /// Set the search radius in meters.
    pub fn with_search_radius_m(mut self, radius_m: f64) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    /// Set the movement threshold in meters.
    pub fn with_movement_threshold_m(mut self, threshold_m: f64) -> Self {
        self.movement_threshold_m = threshold_m;
        self
    }

    /// Set the cooldown between accepted fetches.
    pub fn with_fetch_cooldown(mut self, cooldown: Duration) -> Self {
        self.fetch_cooldown = cooldown;
        self
    }

    /// Set the maximum viewport span in degrees.
    pub fn with_max_viewport_span(mut self, span: f64) -> Self {
        self.max_viewport_span = span;
        self
    }

    /// Set the extended-data probe limit per fetch.
    pub fn with_extended_probe_limit(mut self, limit: usize) -> Self {
        self.extended_probe_limit = limit;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();

        assert_eq!(config.search_radius_m, 3_000.0);
        assert_eq!(config.movement_threshold_m, 500.0);
        assert_eq!(config.fetch_cooldown, Duration::from_secs(3));
        assert_eq!(config.max_viewport_span, 0.05);
        assert_eq!(config.extended_probe_limit, 5);
    }

    #[test]
    fn test_builder_methods() {
        let config = FetchConfig::new()
            .with_search_radius_m(1_000.0)
            .with_movement_threshold_m(50.0)
            .with_fetch_cooldown(Duration::from_millis(100))
            .with_max_viewport_span(0.1)
            .with_extended_probe_limit(2);

        assert_eq!(config.search_radius_m, 1_000.0);
        assert_eq!(config.movement_threshold_m, 50.0);
        assert_eq!(config.fetch_cooldown, Duration::from_millis(100));
        assert_eq!(config.max_viewport_span, 0.1);
        assert_eq!(config.extended_probe_limit, 2);
    }
}
