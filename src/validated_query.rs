//! Axum extractor that deserialises and validates query parameters

use crate::error::QuakeVizError;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// An axum extractor based on the Query extractor that also performs validation using the
/// validator crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = QuakeVizError;

    /// Extract a `ValidatedQuery` from request parts.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    // https://github.com/tokio-rs/axum/blob/main/examples/testing/src/main.rs

    use super::*;
    use crate::models::{LimitQuery, DEFAULT_RECENT_LIMIT};
    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
        response::Response,
        routing::get,
        Router,
    };
    use regex::Regex;
    use serde::Deserialize;
    use tower::ServiceExt; // for `oneshot` and `ready`

    #[derive(Deserialize, Validate)]
    struct TestParams {
        #[validate(length(min = 1, max = 3))]
        pub foo: String,
        pub bar: Option<u32>,
    }

    // Handler function that accepts a ValidatedQuery extractor.
    async fn test_handler(ValidatedQuery(params): ValidatedQuery<TestParams>) -> String {
        format!("foo: {} bar: {:?}", params.foo, params.bar)
    }

    // Build a router and make a oneshot request.
    async fn request(uri: &str) -> Response {
        Router::new()
            .route("/", get(test_handler))
            .oneshot(
                Request::builder()
                    .method(http::Method::GET)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ok() {
        let response = request("/?foo=abc&bar=123").await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: abc bar: Some(123)");
    }

    #[tokio::test]
    async fn missing_optional() {
        let response = request("/?foo=a").await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert_eq!(&body[..], "foo: a bar: None");
    }

    #[tokio::test]
    async fn invalid_bar_type() {
        let response = request("/?foo=abc&bar=xyz").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        let re = Regex::new(r".*query parameters are not valid.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}");
        let re = Regex::new(r".*Failed to deserialize query string.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}")
    }

    #[tokio::test]
    async fn missing_foo() {
        let response = request("/").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        let re = Regex::new(r".*missing field `foo`.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}")
    }

    #[tokio::test]
    async fn invalid_foo_too_long() {
        let response = request("/?foo=abcd").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_string(response).await;
        let re = Regex::new(r".*query parameters are not valid.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}");
        let re = Regex::new(r".*foo: Validation error: length.*").unwrap();
        assert!(re.is_match(&body[..]), "body: {body}");
    }

    async fn limit_handler(ValidatedQuery(query): ValidatedQuery<LimitQuery>) -> String {
        query.limit_or(DEFAULT_RECENT_LIMIT).to_string()
    }

    async fn limit_request(uri: &str) -> Response {
        Router::new()
            .route("/", get(limit_handler))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn limit_default() {
        let response = limit_request("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "50");
    }

    #[tokio::test]
    async fn limit_at_max() {
        let response = limit_request("/?limit=10000").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "10000");
    }

    #[tokio::test]
    async fn limit_out_of_range() {
        for uri in ["/?limit=0", "/?limit=10001"] {
            let response = limit_request(uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

            let body = body_string(response).await;
            let re = Regex::new(r".*query parameters are not valid.*").unwrap();
            assert!(re.is_match(&body[..]), "body: {body}");
            let re = Regex::new(r".*limit must be between 1 and 10000.*").unwrap();
            assert!(re.is_match(&body[..]), "body: {body}");
        }
    }
}
