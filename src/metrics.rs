//! Prometheus metrics

use crate::error::QuakeVizError;

use axum::{body::Body, http::Request, response::Response};
use lazy_static::lazy_static;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, Opts, Registry,
};
use tracing::Span;

lazy_static! {
    // Registry for holding metric state
    pub static ref REGISTRY: Registry = Registry::new();
    // Simple request counter
    pub static ref INCOMING_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("incoming_requests", "The number of HTTP requests received"),
        &["http_method"]
    ).expect("valid incoming_requests metric");
    // Request counter by status code
    pub static ref RESPONSE_CODE_COLLECTOR: IntCounterVec = IntCounterVec::new(
        Opts::new("outgoing_response", "The number of responses sent."),
        &["status_code"]
    ).expect("valid outgoing_response metric");
    // Request histogram by response time
    pub static ref RESPONSE_TIME_COLLECTOR: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new("response_time", "The time taken to respond to each request"),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &[],
    ).expect("valid response_time metric");
    // Store query histogram by query and backend
    pub static ref STORE_QUERY_TIME_COLLECTOR: HistogramVec = HistogramVec::new(
        HistogramOpts{
            common_opts: Opts::new(
                "store_query_time",
                "The time taken by each earthquake store query"
            ),
            buckets: prometheus::DEFAULT_BUCKETS.to_vec(),
        },
        &["query", "backend"],
    ).expect("valid store_query_time metric");
}

/// Register all metrics with [REGISTRY].
///
/// Must be called once at startup, before metrics are served.
pub fn register_metrics() -> Result<(), QuakeVizError> {
    REGISTRY.register(Box::new(INCOMING_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(RESPONSE_CODE_COLLECTOR.clone()))?;
    REGISTRY.register(Box::new(RESPONSE_TIME_COLLECTOR.clone()))?;
    REGISTRY.register(Box::new(STORE_QUERY_TIME_COLLECTOR.clone()))?;
    Ok(())
}

/// Render all registered metrics in the Prometheus text format.
pub async fn metrics_handler() -> Result<String, QuakeVizError> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    // The text encoder only writes UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Increments the prometheus counter on all incoming requests, labelled by http method
pub fn request_counter(request: &Request<Body>, _span: &Span) {
    INCOMING_REQUESTS
        .with_label_values(&[&request.method().to_string().to_ascii_uppercase()])
        .inc();
}

/// Increment the prometheus counter on all outgoing responses, labelled by status code
pub fn record_response_metrics<B>(
    response: &Response<B>,
    latency: std::time::Duration,
    _span: &Span,
) {
    RESPONSE_CODE_COLLECTOR
        .with_label_values(&[response.status().as_str()])
        .inc();

    RESPONSE_TIME_COLLECTOR
        .with_label_values(&[])
        .observe(latency.as_secs_f64());
}

/// Start timing a store query. The time is recorded when the returned timer is dropped.
pub fn query_timer(query: &str, backend: &str) -> HistogramTimer {
    STORE_QUERY_TIME_COLLECTOR
        .with_label_values(&[query, backend])
        .start_timer()
}
