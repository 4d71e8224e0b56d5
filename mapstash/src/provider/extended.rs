//! Caching decorator for the extended-data lookup.
//!
//! Extended-data availability is stable for a given POI name, so the
//! answer is cached on first lookup and served lock-free after that. The
//! fetch task probes several names concurrently; DashMap keeps that safe
//! without a coordinator round-trip.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::provider::traits::{BoxFuture, ExtendedDataSource};

/// Wraps any [`ExtendedDataSource`] with a per-name answer cache.
pub struct CachedExtendedData {
    inner: Arc<dyn ExtendedDataSource>,
    known: DashMap<String, bool>,
}

impl CachedExtendedData {
    /// Decorate a source with a cache.
    pub fn new(inner: Arc<dyn ExtendedDataSource>) -> Self {
        Self {
            inner,
            known: DashMap::new(),
        }
    }

    /// Number of cached answers.
    pub fn cached_len(&self) -> usize {
        self.known.len()
    }
}

impl ExtendedDataSource for CachedExtendedData {
    fn has_extended_data(&self, name: &str) -> BoxFuture<'_, bool> {
        let name = name.to_string();
        Box::pin(async move {
            if let Some(cached) = self.known.get(&name) {
                trace!(%name, "Extended-data answer served from cache");
                return *cached;
            }
            let answer = self.inner.has_extended_data(&name).await;
            self.known.insert(name, answer);
            answer
        })
    }
}
