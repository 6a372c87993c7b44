//! Time-limited caching of aggregated distributions.

use crate::buckets::Distribution;
use crate::error::QuakeVizError;
use crate::models::{MagnitudeDepth, Quake};
use crate::store::QuakeStore;

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::future::Future;
use tokio::sync::Mutex;
use tracing::{event, Level};

/// A [QuakeStore] that caches the distributions of an inner store for a fixed lifespan.
///
/// Distributions are the only results that do not depend on request parameters, and the only ones
/// that scan the whole table. Lists and health checks go straight to the inner store.
pub struct CachingStore<S> {
    inner: S,
    /// Distributions keyed by range table column.
    distributions: Mutex<TimedCache<&'static str, Distribution>>,
}

impl<S: QuakeStore> CachingStore<S> {
    /// Returns a new CachingStore wrapping `inner`.
    ///
    /// # Arguments
    ///
    /// * `inner`: The store to cache
    /// * `lifespan`: Time in seconds for which a distribution is served from the cache
    pub fn new(inner: S, lifespan: u64) -> Self {
        Self {
            inner,
            distributions: Mutex::new(TimedCache::with_lifespan(lifespan)),
        }
    }

    /// Returns the number of cache hits and misses so far.
    pub async fn hits_and_misses(&self) -> (u64, u64) {
        let cache = self.distributions.lock().await;
        (
            cache.cache_hits().unwrap_or_default(),
            cache.cache_misses().unwrap_or_default(),
        )
    }

    async fn cached<F, Fut>(
        &self,
        key: &'static str,
        load: F,
    ) -> Result<Distribution, QuakeVizError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Distribution, QuakeVizError>>,
    {
        if let Some(distribution) = self.distributions.lock().await.cache_get(&key) {
            return Ok(distribution.clone());
        }
        // The lock is not held while loading. Concurrent misses may both load.
        let distribution = load().await?;
        event!(Level::DEBUG, key, "caching distribution");
        self.distributions
            .lock()
            .await
            .cache_set(key, distribution.clone());
        Ok(distribution)
    }
}

#[async_trait]
impl<S: QuakeStore> QuakeStore for CachingStore<S> {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn magnitude_distribution(&self) -> Result<Distribution, QuakeVizError> {
        self.cached("magnitude", || self.inner.magnitude_distribution())
            .await
    }

    async fn depth_distribution(&self) -> Result<Distribution, QuakeVizError> {
        self.cached("depth", || self.inner.depth_distribution())
            .await
    }

    async fn magnitude_vs_depth(&self, limit: u32) -> Result<Vec<MagnitudeDepth>, QuakeVizError> {
        self.inner.magnitude_vs_depth(limit).await
    }

    async fn recent_quakes(&self, limit: u32) -> Result<Vec<Quake>, QuakeVizError> {
        self.inner.recent_quakes(limit).await
    }

    async fn ping(&self) -> Result<(), QuakeVizError> {
        self.inner.ping().await
    }
}
