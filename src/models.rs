//! Data types and associated functions and methods

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use validator::Validate;

/// Default number of points returned for a magnitude vs depth scatter plot.
pub const DEFAULT_SCATTER_LIMIT: u32 = 100;

/// Default number of events returned by the recent earthquakes endpoint.
pub const DEFAULT_RECENT_LIMIT: u32 = 50;

/// Upper bound on any requested limit.
pub const MAX_LIMIT: u32 = 10_000;

// Timestamps are exchanged as "YYYY-MM-DD HH:MM:SS" without a UTC offset.
time::serde::format_description!(
    quake_timestamp,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

/// A single recorded earthquake.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Quake {
    /// Event identifier
    pub id: i64,
    /// Magnitude on the scale used by the source catalogue
    pub magnitude: f64,
    /// Hypocentre depth in kilometres
    pub depth: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Origin time
    #[serde(with = "quake_timestamp")]
    pub timestamp: PrimitiveDateTime,
}

/// A point on the magnitude vs depth scatter plot.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct MagnitudeDepth {
    pub magnitude: f64,
    pub depth: f64,
    pub id: i64,
}

impl From<&Quake> for MagnitudeDepth {
    fn from(quake: &Quake) -> Self {
        Self {
            magnitude: quake.magnitude,
            depth: quake.depth,
            id: quake.id,
        }
    }
}

/// Query parameters accepted by the list endpoints.
///
/// Other parameters, such as cache busters, are ignored.
#[derive(Debug, Default, Deserialize, PartialEq, Validate)]
pub struct LimitQuery {
    /// Maximum number of records to return
    #[validate(range(min = 1, max = 10000, message = "limit must be between 1 and 10000"))]
    pub limit: Option<u32>,
}

impl LimitQuery {
    /// Returns the requested limit, or `default` if none was given.
    pub fn limit_or(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default)
    }
}

/// Service health report.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct Health {
    /// Always "ok" when returned with a success status
    pub status: String,
    /// Time of the check in RFC 3339 format
    pub timestamp: String,
    /// Name of the store backend serving requests
    pub backend: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils;
    use serde_test::{assert_de_tokens, Token};
    use time::macros::datetime;

    #[test]
    fn test_limit_query_empty() {
        let query = LimitQuery::default();
        assert_de_tokens(
            &query,
            &[
                Token::Struct {
                    name: "LimitQuery",
                    len: 0,
                },
                Token::StructEnd,
            ],
        );
        query.validate().unwrap();
        assert_eq!(100, query.limit_or(DEFAULT_SCATTER_LIMIT));
    }

    #[test]
    fn test_limit_query() {
        let query = LimitQuery { limit: Some(7) };
        assert_de_tokens(
            &query,
            &[
                Token::Struct {
                    name: "LimitQuery",
                    len: 1,
                },
                Token::Str("limit"),
                Token::Some,
                Token::U32(7),
                Token::StructEnd,
            ],
        );
        query.validate().unwrap();
        assert_eq!(7, query.limit_or(DEFAULT_RECENT_LIMIT));
    }

    #[test]
    fn test_limit_query_unknown_field_ignored() {
        assert_de_tokens(
            &LimitQuery { limit: Some(3) },
            &[
                Token::Struct {
                    name: "LimitQuery",
                    len: 2,
                },
                Token::Str("_"),
                Token::Str("1730549745"),
                Token::Str("limit"),
                Token::Some,
                Token::U32(3),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_limit_query_zero() {
        let query = LimitQuery { limit: Some(0) };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_limit_query_too_large() {
        let query = LimitQuery {
            limit: Some(MAX_LIMIT + 1),
        };
        assert!(query.validate().is_err());
        let query = LimitQuery {
            limit: Some(MAX_LIMIT),
        };
        query.validate().unwrap();
    }

    #[test]
    fn test_quake_json() {
        let quake = test_utils::get_test_quake();
        let json = serde_json::to_value(&quake).unwrap();
        assert_eq!(
            serde_json::json!({
                "id": 1,
                "magnitude": 0.5,
                "depth": 5.2,
                "latitude": 35.5,
                "longitude": -120.3,
                "timestamp": "2024-11-01 10:23:45",
            }),
            json
        );
    }

    #[test]
    fn test_quake_json_parse() {
        let quake: Quake = serde_json::from_str(
            r#"{"id": 3, "magnitude": 2.1, "depth": 10.3, "latitude": 35.8,
                "longitude": -120.7, "timestamp": "2024-11-01 12:45:22"}"#,
        )
        .unwrap();
        assert_eq!(datetime!(2024-11-01 12:45:22), quake.timestamp);
    }

    #[test]
    fn test_quake_json_bad_timestamp() {
        let result: Result<Quake, _> = serde_json::from_str(
            r#"{"id": 3, "magnitude": 2.1, "depth": 10.3, "latitude": 35.8,
                "longitude": -120.7, "timestamp": "2024-11-01T12:45:22Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_magnitude_depth_from_quake() {
        let quake = test_utils::get_test_quake();
        let point = MagnitudeDepth::from(&quake);
        assert_eq!(
            MagnitudeDepth {
                magnitude: 0.5,
                depth: 5.2,
                id: 1
            },
            point
        );
        assert_eq!(
            r#"{"magnitude":0.5,"depth":5.2,"id":1}"#,
            serde_json::to_string(&point).unwrap()
        );
    }
}
