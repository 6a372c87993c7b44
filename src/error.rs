//! Error handling.

use axum::{
    extract::rejection::QueryRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

/// quakeviz server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum QuakeVizError {
    /// Error running a query against the earthquake database
    #[error("error querying earthquake database")]
    Database(#[from] sqlx::Error),

    /// Error encoding Prometheus metrics
    #[error("failed to encode metrics")]
    Metrics(#[from] prometheus::Error),

    /// Error deserialising query parameters
    #[error("query parameters are not valid")]
    QueryRejection(#[from] QueryRejection),

    /// Error validating query parameters
    #[error("query parameters are not valid")]
    QueryValidation(#[from] validator::ValidationErrors),

    /// The earthquake store could not be reached
    #[error("earthquake store is unavailable")]
    StoreUnavailable(#[source] sqlx::Error),

    /// Error formatting a timestamp
    #[error("failed to format timestamp")]
    TimeFormat(#[from] time::error::Format),

    /// Error converting between integer types
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// A grouped query returned a bucket the range table does not know
    #[error("unexpected {column} bucket {label}")]
    UnknownBucket { column: &'static str, label: String },

    /// Unsupported chart requested
    #[error("unsupported chart {kind}")]
    UnsupportedChart { kind: String },
}

impl IntoResponse for QuakeVizError {
    /// Convert from a `QuakeVizError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 404 not found ErrorResponse
    fn not_found<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Return a 503 service unavailable ErrorResponse
    fn service_unavailable<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, error)
    }
}

impl From<QuakeVizError> for ErrorResponse {
    /// Convert from a `QuakeVizError` into an `ErrorResponse`.
    fn from(error: QuakeVizError) -> Self {
        let response = match &error {
            // Bad request
            QuakeVizError::QueryRejection(_) | QuakeVizError::QueryValidation(_) => {
                Self::bad_request(&error)
            }

            // Not found
            QuakeVizError::UnsupportedChart { kind: _ } => Self::not_found(&error),

            // Service unavailable
            QuakeVizError::StoreUnavailable(_) => Self::service_unavailable(&error),

            // A pool timeout means the database is unreachable or saturated.
            QuakeVizError::Database(sqlx::Error::PoolTimedOut) => {
                Self::service_unavailable(&error)
            }

            // Internal server error
            QuakeVizError::Database(_)
            | QuakeVizError::Metrics(_)
            | QuakeVizError::TimeFormat(_)
            | QuakeVizError::TryFromInt(_)
            | QuakeVizError::UnknownBucket {
                column: _,
                label: _,
            } => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
