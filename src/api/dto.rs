//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::aggregate::{RankedEntry, Series};
use crate::api::error::{ApiError, ApiResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest `n` accepted by the ranking endpoints
pub const MAX_TOP_N: usize = 500;

// ============================================
// QUERY PARAMETERS
// ============================================

/// Query string shared by pages and API routes
///
/// Built from the decoded pairs of a `Query<Vec<(String, String)>>` so that
/// `country`, which the dashboard form repeats once per selected option
/// (`?country=India&country=Brazil&metric=new_cases`), keeps every value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    /// `country` values in the order given
    pub countries: Vec<String>,
    pub metric: Option<String>,
    pub n: Option<usize>,
}

impl DashboardQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> ApiResult<Self> {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "country" => {
                    let country = value.trim();
                    if !country.is_empty() {
                        query.countries.push(country.to_string());
                    }
                }
                "metric" => {
                    let metric = value.trim();
                    if metric.is_empty() {
                        return Err(ApiError::Validation("metric must not be empty".to_string()));
                    }
                    query.metric = Some(metric.to_string());
                }
                "n" => {
                    let n: usize = value.trim().parse().map_err(|_| {
                        ApiError::Validation(format!("n must be a non-negative integer, got {:?}", value))
                    })?;
                    if n > MAX_TOP_N {
                        return Err(ApiError::Validation(format!("n must be at most {}", MAX_TOP_N)));
                    }
                    query.n = Some(n);
                }
                _ => {}
            }
        }

        Ok(query)
    }
}

// ============================================
// SUMMARY DTOs
// ============================================

/// Country → summarized value for one metric
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub metric: String,
    pub countries: usize,
    pub max: Option<f64>,
    pub values: BTreeMap<String, f64>,
}

/// Top-N ranking
#[derive(Debug, Serialize)]
pub struct TopResponse {
    pub metric: String,
    pub n: usize,
    pub entries: Vec<RankedEntry>,
}

/// Single country lookup
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub country: String,
    pub metric: String,
    pub value: f64,
    /// False when the country has no data and `value` is the default 0
    pub found: bool,
}

// ============================================
// SERIES DTOs
// ============================================

/// Per-country series in request order
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub metric: String,
    pub series: Vec<Series>,
}

/// One selectable metric
#[derive(Debug, Serialize)]
pub struct MetricInfo {
    pub name: String,
    pub label: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
    pub countries: usize,
    pub features: usize,
    pub metrics: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(uri: &str) -> ApiResult<DashboardQuery> {
        let uri: Uri = uri.parse().unwrap();
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        DashboardQuery::from_pairs(pairs)
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("/").unwrap(), DashboardQuery::default());
        assert_eq!(parse("/?").unwrap(), DashboardQuery::default());
    }

    #[test]
    fn test_parse_repeated_countries() {
        let query = parse("/?country=India&country=United+States&metric=new_cases").unwrap();
        assert_eq!(query.countries, vec!["India", "United States"]);
        assert_eq!(query.metric.as_deref(), Some("new_cases"));
        assert_eq!(query.n, None);
    }

    #[test]
    fn test_parse_percent_encoding() {
        let query = parse("/?country=C%C3%B4te%20d%27Ivoire&n=5").unwrap();
        assert_eq!(query.countries, vec!["Côte d'Ivoire"]);
        assert_eq!(query.n, Some(5));
    }

    #[test]
    fn test_comma_stays_in_country_name() {
        let query = parse("/?country=Korea%2C+South&country=France").unwrap();
        assert_eq!(query.countries, vec!["Korea, South", "France"]);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let query = parse("/?foo=bar&&country=").unwrap();
        assert!(query.countries.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(parse("/?n=ten"), Err(ApiError::Validation(_))));
        assert!(matches!(parse("/?n=100000"), Err(ApiError::Validation(_))));
        assert!(matches!(parse("/?metric="), Err(ApiError::Validation(_))));
    }
}
