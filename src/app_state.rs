use crate::cli::CommandLineArgs;
use crate::error::QuakeVizError;
use crate::store::{MemoryStore, QuakeStore};
use crate::store_cache::CachingStore;
use crate::store_postgres::PgStore;

use std::sync::Arc;
use tracing::{event, Level};

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Earthquake store.
    pub store: Box<dyn QuakeStore>,
}

impl AppState {
    /// Create and return an [AppState], connecting to the database if one is configured.
    pub async fn new(args: &CommandLineArgs) -> Result<Self, QuakeVizError> {
        let store: Box<dyn QuakeStore> = match &args.database_url {
            Some(url) => {
                event!(
                    Level::INFO,
                    url = %args.redacted_database_url().unwrap_or_default(),
                    "connecting to PostgreSQL"
                );
                let store = PgStore::connect(args, url).await?;
                with_cache(store, args.cache_ttl)
            }
            None => {
                event!(Level::WARN, "no database configured, serving sample data");
                with_cache(MemoryStore::sample(), args.cache_ttl)
            }
        };
        Ok(Self::with_store(args, store))
    }

    /// Create and return an [AppState] using an existing store.
    pub fn with_store(args: &CommandLineArgs, store: Box<dyn QuakeStore>) -> Self {
        Self {
            args: args.clone(),
            store,
        }
    }
}

/// Wrap `store` in a [CachingStore] unless `ttl` is zero.
fn with_cache<S: QuakeStore + 'static>(store: S, ttl: u64) -> Box<dyn QuakeStore> {
    if ttl == 0 {
        Box::new(store)
    } else {
        event!(Level::INFO, ttl, "caching distributions");
        Box::new(CachingStore::new(store, ttl))
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
