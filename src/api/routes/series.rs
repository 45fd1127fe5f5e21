//! Series Routes
//!
//! - GET /api/v1/series?country=..&country=..&metric= - Per-country series
//! - GET /api/v1/countries - Selectable countries
//! - GET /api/v1/metrics - Selectable metrics

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DashboardQuery, MetricInfo, SeriesResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::render::metric_label;

/// GET /api/v1/series
///
/// Without `country` the default selection is used. Countries with no data
/// still get an entry with no points.
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<SeriesResponse>> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let view = state.view(query.countries, query.metric);

    Ok(Json(SeriesResponse {
        metric: view.selection().metric.clone(),
        series: view.series().to_vec(),
    }))
}

/// GET /api/v1/countries
pub async fn list_countries(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dashboard.countries())
}

/// GET /api/v1/metrics
pub async fn list_metrics(State(state): State<Arc<AppState>>) -> Json<Vec<MetricInfo>> {
    let metrics = state
        .dashboard
        .metrics()
        .iter()
        .map(|name| MetricInfo {
            name: name.clone(),
            label: metric_label(name),
        })
        .collect();
    Json(metrics)
}
