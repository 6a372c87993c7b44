//! This file defines the quakeviz binary entry point.

use quakeviz::app;
use quakeviz::app_state::AppState;
use quakeviz::cli;
use quakeviz::metrics;
use quakeviz::server;
use quakeviz::tracing;

use std::process::exit;
use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    if let Err(err) = metrics::register_metrics() {
        ::tracing::error!(error = %err, "failed to register metrics");
        exit(1)
    }
    let state = match AppState::new(&args).await {
        Ok(state) => Arc::new(state),
        Err(err) => {
            ::tracing::error!(error = %err, "failed to initialise earthquake store");
            tracing::shutdown_tracing();
            exit(1)
        }
    };
    let service = app::service(state);
    if let Err(err) = server::serve(&args, service).await {
        ::tracing::error!(error = %err, "server error");
        tracing::shutdown_tracing();
        exit(1)
    }
    tracing::shutdown_tracing();
}
