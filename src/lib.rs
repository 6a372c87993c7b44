//! This crate provides an earthquake statistics server. It serves pre-aggregated summaries of an
//! earthquake catalogue as JSON: counts per magnitude range, counts per depth range, magnitude
//! against depth, and the most recent events. A small browser client draws them as pie, bar and
//! scatter charts.
//!
//! Aggregation is a single pass classifying each value into a fixed table of half-open ranges
//! (see [buckets]). When a database is configured the same classification runs in SQL, generated
//! from the same range tables.
//!
//! The server is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs serialisation of JSON response data.
//! * [SQLx](sqlx) queries a PostgreSQL earthquake catalogue.
//! * [ndarray] computes the summary statistics shown alongside each chart.

pub mod app;
pub mod app_state;
pub mod buckets;
pub mod charts;
pub mod cli;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod stats;
pub mod store;
pub mod store_cache;
pub mod store_postgres;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod validated_query;
