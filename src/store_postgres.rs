//! PostgreSQL-backed earthquake store.

use crate::buckets::{Distribution, RangeTable, DEPTH, MAGNITUDE};
use crate::cli::CommandLineArgs;
use crate::error::QuakeVizError;
use crate::metrics;
use crate::models::{MagnitudeDepth, Quake};
use crate::store::QuakeStore;

use async_trait::async_trait;
use lazy_static::lazy_static;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{event, Level};
use url::Url;

/// Table holding one row per event.
const TABLE: &str = "earthquakes";

/// Returns a grouped query counting the rows of [TABLE] per range of `table`.
fn distribution_sql(table: &RangeTable) -> String {
    format!(
        "SELECT {} AS bucket, COUNT(*) AS count FROM {} WHERE {} IS NOT NULL GROUP BY bucket",
        table.sql_case(),
        TABLE,
        table.column
    )
}

lazy_static! {
    static ref MAGNITUDE_DISTRIBUTION_SQL: String = distribution_sql(&MAGNITUDE);
    static ref DEPTH_DISTRIBUTION_SQL: String = distribution_sql(&DEPTH);
    static ref MAGNITUDE_VS_DEPTH_SQL: String = format!(
        "SELECT magnitude::float8 AS magnitude, depth::float8 AS depth, id::bigint AS id \
         FROM {TABLE} WHERE magnitude IS NOT NULL AND depth IS NOT NULL \
         ORDER BY \"timestamp\" DESC NULLS LAST, id DESC LIMIT $1"
    );
    static ref RECENT_QUAKES_SQL: String = format!(
        "SELECT id::bigint AS id, magnitude::float8 AS magnitude, depth::float8 AS depth, \
         latitude::float8 AS latitude, longitude::float8 AS longitude, \
         \"timestamp\"::timestamp AS \"timestamp\" \
         FROM {TABLE} WHERE magnitude IS NOT NULL AND depth IS NOT NULL \
         AND latitude IS NOT NULL AND longitude IS NOT NULL AND \"timestamp\" IS NOT NULL \
         ORDER BY \"timestamp\" DESC NULLS LAST, id DESC LIMIT $1"
    );
}

/// A [QuakeStore] reading from the `earthquakes` table of a PostgreSQL database.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database at `url` and check that it responds.
    ///
    /// # Arguments
    ///
    /// * `args`: Command line arguments holding the pool settings
    /// * `url`: PostgreSQL connection URL
    pub async fn connect(args: &CommandLineArgs, url: &Url) -> Result<Self, QuakeVizError> {
        let pool = Self::pool_options(args)
            .connect(url.as_str())
            .await
            .map_err(QuakeVizError::StoreUnavailable)?;
        let store = Self::from_pool(pool);
        store.ping().await?;
        event!(Level::INFO, "PostgreSQL connected successfully");
        Ok(store)
    }

    /// Returns a new PgStore using an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool_options(args: &CommandLineArgs) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(args.db_max_connections)
            .acquire_timeout(Duration::from_secs(args.db_acquire_timeout))
    }

    async fn distribution(
        &self,
        table: &'static RangeTable,
        sql: &str,
    ) -> Result<Distribution, QuakeVizError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Distribution::from_counts(table, rows)
    }
}

#[async_trait]
impl QuakeStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn magnitude_distribution(&self) -> Result<Distribution, QuakeVizError> {
        let _timer = metrics::query_timer("magnitude_distribution", self.backend());
        self.distribution(&MAGNITUDE, &MAGNITUDE_DISTRIBUTION_SQL)
            .await
    }

    async fn depth_distribution(&self) -> Result<Distribution, QuakeVizError> {
        let _timer = metrics::query_timer("depth_distribution", self.backend());
        self.distribution(&DEPTH, &DEPTH_DISTRIBUTION_SQL).await
    }

    async fn magnitude_vs_depth(&self, limit: u32) -> Result<Vec<MagnitudeDepth>, QuakeVizError> {
        let _timer = metrics::query_timer("magnitude_vs_depth", self.backend());
        let points = sqlx::query_as(&MAGNITUDE_VS_DEPTH_SQL)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(points)
    }

    async fn recent_quakes(&self, limit: u32) -> Result<Vec<Quake>, QuakeVizError> {
        let _timer = metrics::query_timer("recent_quakes", self.backend());
        let quakes = sqlx::query_as(&RECENT_QUAKES_SQL)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(quakes)
    }

    async fn ping(&self) -> Result<(), QuakeVizError> {
        sqlx::query("SELECT NOW()")
            .execute(&self.pool)
            .await
            .map_err(QuakeVizError::StoreUnavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils;

    // A pool that never connects until used. Nothing listens on port 1.
    fn unreachable_store() -> PgStore {
        let mut args = test_utils::get_test_args();
        args.db_acquire_timeout = 1;
        let pool = PgStore::pool_options(&args)
            .connect_lazy("postgres://quakeviz@127.0.0.1:1/earthquakes")
            .unwrap();
        PgStore::from_pool(pool)
    }

    #[test]
    fn magnitude_distribution_sql() {
        assert_eq!(
            "SELECT CASE WHEN magnitude < 1 THEN 'Below 1' WHEN magnitude < 2 THEN '1 to 2' \
             WHEN magnitude < 3 THEN '2 to 3' WHEN magnitude < 4 THEN '3 to 4' \
             WHEN magnitude < 5 THEN '4 to 5' ELSE 'Above 5' END AS bucket, COUNT(*) AS count \
             FROM earthquakes WHERE magnitude IS NOT NULL GROUP BY bucket",
            *MAGNITUDE_DISTRIBUTION_SQL
        );
    }

    #[test]
    fn depth_distribution_sql() {
        assert!(DEPTH_DISTRIBUTION_SQL.starts_with("SELECT CASE WHEN depth < 5 THEN '0-5 km'"));
        assert!(DEPTH_DISTRIBUTION_SQL.ends_with("WHERE depth IS NOT NULL GROUP BY bucket"));
    }

    #[test]
    fn list_sql_newest_first() {
        for sql in [&*MAGNITUDE_VS_DEPTH_SQL, &*RECENT_QUAKES_SQL] {
            assert!(sql.contains("FROM earthquakes"), "{sql}");
            assert!(
                sql.ends_with("ORDER BY \"timestamp\" DESC NULLS LAST, id DESC LIMIT $1"),
                "{sql}"
            );
        }
    }

    #[test]
    fn recent_quakes_sql_skips_incomplete_rows() {
        for column in ["magnitude", "depth", "latitude", "longitude", "\"timestamp\""] {
            assert!(
                RECENT_QUAKES_SQL.contains(&format!("{column} IS NOT NULL")),
                "{column}: {}",
                *RECENT_QUAKES_SQL
            );
        }
    }

    #[tokio::test]
    async fn ping_unreachable() {
        let store = unreachable_store();
        let error = store.ping().await.unwrap_err();
        assert!(matches!(error, QuakeVizError::StoreUnavailable(_)), "{error:?}");
    }

    #[tokio::test]
    async fn query_unreachable() {
        let store = unreachable_store();
        let error = store.magnitude_distribution().await.unwrap_err();
        assert!(matches!(error, QuakeVizError::Database(_)), "{error:?}");
        assert_eq!("postgres", store.backend());
    }
}
