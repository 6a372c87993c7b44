//! Earthquake record stores.
//!
//! The [QuakeStore] trait forms the contract between the API layer and the data backends.
//! [MemoryStore] serves a fixed dataset and is used when no database is configured.

use crate::buckets::{Distribution, DEPTH, MAGNITUDE};
use crate::error::QuakeVizError;
use crate::metrics;
use crate::models::{MagnitudeDepth, Quake};

use async_trait::async_trait;
use time::macros::datetime;

/// Read-only access to earthquake records and their aggregations.
///
/// List operations return the newest events first.
#[async_trait]
pub trait QuakeStore: Send + Sync {
    /// Name of the backend, reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Count events per magnitude range.
    async fn magnitude_distribution(&self) -> Result<Distribution, QuakeVizError>;

    /// Count events per depth range.
    async fn depth_distribution(&self) -> Result<Distribution, QuakeVizError>;

    /// Return the magnitude and depth of up to `limit` events.
    async fn magnitude_vs_depth(&self, limit: u32) -> Result<Vec<MagnitudeDepth>, QuakeVizError>;

    /// Return up to `limit` events.
    async fn recent_quakes(&self, limit: u32) -> Result<Vec<Quake>, QuakeVizError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), QuakeVizError>;
}

/// A [QuakeStore] backed by an in-memory list of events.
#[derive(Debug)]
pub struct MemoryStore {
    /// Events sorted newest first.
    quakes: Vec<Quake>,
}

impl MemoryStore {
    /// Returns a new MemoryStore holding `quakes`.
    pub fn new(mut quakes: Vec<Quake>) -> Self {
        quakes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Self { quakes }
    }

    /// Returns a MemoryStore holding the built-in sample dataset.
    pub fn sample() -> Self {
        Self::new(sample_quakes())
    }

    fn take(&self, limit: u32) -> impl Iterator<Item = &Quake> {
        // u32 always fits in usize on supported targets.
        self.quakes.iter().take(limit as usize)
    }
}

#[async_trait]
impl QuakeStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn magnitude_distribution(&self) -> Result<Distribution, QuakeVizError> {
        let _timer = metrics::query_timer("magnitude_distribution", self.backend());
        Ok(Distribution::from_values(
            &MAGNITUDE,
            self.quakes.iter().map(|quake| quake.magnitude),
        ))
    }

    async fn depth_distribution(&self) -> Result<Distribution, QuakeVizError> {
        let _timer = metrics::query_timer("depth_distribution", self.backend());
        Ok(Distribution::from_values(
            &DEPTH,
            self.quakes.iter().map(|quake| quake.depth),
        ))
    }

    async fn magnitude_vs_depth(&self, limit: u32) -> Result<Vec<MagnitudeDepth>, QuakeVizError> {
        let _timer = metrics::query_timer("magnitude_vs_depth", self.backend());
        Ok(self.take(limit).map(MagnitudeDepth::from).collect())
    }

    async fn recent_quakes(&self, limit: u32) -> Result<Vec<Quake>, QuakeVizError> {
        let _timer = metrics::query_timer("recent_quakes", self.backend());
        Ok(self.take(limit).cloned().collect())
    }

    async fn ping(&self) -> Result<(), QuakeVizError> {
        Ok(())
    }
}

/// Returns the built-in sample dataset of ten central California events.
pub fn sample_quakes() -> Vec<Quake> {
    let quake = |id, magnitude, depth, latitude, longitude, timestamp| Quake {
        id,
        magnitude,
        depth,
        latitude,
        longitude,
        timestamp,
    };
    vec![
        quake(1, 0.5, 5.2, 35.5, -120.3, datetime!(2024-11-01 10:23:45)),
        quake(2, 1.2, 8.5, 36.1, -121.0, datetime!(2024-11-01 11:15:30)),
        quake(3, 2.1, 10.3, 35.8, -120.7, datetime!(2024-11-01 12:45:22)),
        quake(4, 1.8, 6.7, 36.3, -121.5, datetime!(2024-11-01 14:20:10)),
        quake(5, 3.2, 15.1, 35.2, -119.8, datetime!(2024-11-01 15:30:55)),
        quake(6, 0.8, 4.2, 36.5, -120.2, datetime!(2024-11-01 16:10:30)),
        quake(7, 2.5, 12.8, 35.7, -121.2, datetime!(2024-11-02 08:45:15)),
        quake(8, 1.5, 7.3, 36.2, -120.9, datetime!(2024-11-02 09:22:40)),
        quake(9, 4.1, 18.5, 35.4, -120.5, datetime!(2024-11-02 10:55:20)),
        quake(10, 1.1, 5.8, 36.0, -121.1, datetime!(2024-11-02 12:15:45)),
    ]
}
