//! Summary Routes
//!
//! - GET /api/v1/summary?metric= - Country → value map
//! - GET /api/v1/top?metric=&n= - Top-N ranking
//! - GET /api/v1/lookup/:country?metric= - Single country value

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::aggregate::top_n;
use crate::api::dto::{DashboardQuery, LookupResponse, SummaryResponse, TopResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<SummaryResponse>> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let summary = state.summary_for(query.metric.as_deref());

    Ok(Json(SummaryResponse {
        metric: summary.metric().to_string(),
        countries: summary.len(),
        max: summary.max_value(),
        values: summary.to_map(),
    }))
}

/// GET /api/v1/top
pub async fn get_top(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<TopResponse>> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let n = query.n.unwrap_or(state.top_n);
    let summary = state.summary_for(query.metric.as_deref());

    Ok(Json(TopResponse {
        metric: summary.metric().to_string(),
        n,
        entries: top_n(&summary, n),
    }))
}

/// GET /api/v1/lookup/:country
///
/// Unknown countries are not an error: they report `value: 0, found: false`.
pub async fn lookup_country(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<LookupResponse>> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let summary = state.summary_for(query.metric.as_deref());
    let found = summary.get(&country);

    Ok(Json(LookupResponse {
        metric: summary.metric().to_string(),
        value: found.unwrap_or(0.0),
        found: found.is_some(),
        country,
    }))
}
