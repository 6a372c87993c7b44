//! Routes and request handlers.

use crate::app_state::SharedAppState;
use crate::buckets::Distribution;
use crate::charts::{self, Chart, ChartKind};
use crate::error::QuakeVizError;
use crate::metrics;
use crate::models::{
    Health, LimitQuery, MagnitudeDepth, Quake, DEFAULT_RECENT_LIMIT, DEFAULT_SCATTER_LIMIT,
};
use crate::validated_query::ValidatedQuery;

use axum::{
    body::BoxBody,
    extract::{Path, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Browser client. Loads D3 from a CDN and draws whatever the chart endpoint returns.
static INDEX_HTML: &str = include_str!("../static/index.html");

/// The quakeviz service: the router with trailing slashes removed from request paths.
pub type Service = NormalizePath<Router>;

/// Returns a [Router] serving the API, the metrics endpoint and the browser client.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    fn api() -> Router<SharedAppState> {
        Router::new()
            .route("/magnitude-distribution", get(magnitude_distribution))
            .route("/depth-distribution", get(depth_distribution))
            .route("/magnitude-vs-depth", get(magnitude_vs_depth))
            .route("/recent-quakes", get(recent_quakes))
            .route("/health", get(health))
            .route("/charts/:kind", get(chart))
            .layer(
                ServiceBuilder::new()
                    .layer(
                        TraceLayer::new_for_http()
                            .on_request(metrics::request_counter)
                            .on_response(metrics::record_response_metrics::<BoxBody>),
                    )
                    .layer(CorsLayer::permissive()),
            )
    }

    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api", api())
        .with_state(state)
}

/// Returns the [Service] for `state`.
pub fn service(state: SharedAppState) -> Service {
    ServiceBuilder::new()
        .layer(NormalizePathLayer::trim_trailing_slash())
        .service(router(state))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn magnitude_distribution(
    State(state): State<SharedAppState>,
) -> Result<Json<Distribution>, QuakeVizError> {
    Ok(Json(state.store.magnitude_distribution().await?))
}

async fn depth_distribution(
    State(state): State<SharedAppState>,
) -> Result<Json<Distribution>, QuakeVizError> {
    Ok(Json(state.store.depth_distribution().await?))
}

async fn magnitude_vs_depth(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Result<Json<Vec<MagnitudeDepth>>, QuakeVizError> {
    let limit = query.limit_or(DEFAULT_SCATTER_LIMIT);
    Ok(Json(state.store.magnitude_vs_depth(limit).await?))
}

async fn recent_quakes(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Result<Json<Vec<Quake>>, QuakeVizError> {
    let limit = query.limit_or(DEFAULT_RECENT_LIMIT);
    Ok(Json(state.store.recent_quakes(limit).await?))
}

async fn health(State(state): State<SharedAppState>) -> Result<Json<Health>, QuakeVizError> {
    state.store.ping().await?;
    Ok(Json(Health {
        status: "ok".to_string(),
        timestamp: OffsetDateTime::now_utc().format(&Rfc3339)?,
        backend: state.store.backend().to_string(),
    }))
}

async fn chart(
    State(state): State<SharedAppState>,
    Path(kind): Path<String>,
    ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Result<Json<Chart>, QuakeVizError> {
    let kind: ChartKind = kind.parse()?;
    let limit = query.limit_or(DEFAULT_SCATTER_LIMIT);
    Ok(Json(
        charts::build_chart(state.store.as_ref(), kind, limit).await?,
    ))
}
