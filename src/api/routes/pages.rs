//! Page Routes
//!
//! - GET / - Dashboard page with selection controls
//! - GET /map.svg?metric= - Choropleth
//! - GET /bars.svg?metric=&n= - Top-N bar chart
//! - GET /lines.svg?country=..&metric= - Line chart

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::aggregate::top_n;
use crate::api::dto::DashboardQuery;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::render::{metric_label, render_bar_chart, render_choropleth};

fn svg(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml; charset=utf-8")], body)
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Html<String>> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let view = state.view(query.countries, query.metric);
    Ok(Html(view.render_page(&state.render)?))
}

/// GET /map.svg
pub async fn map_svg(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let summary = state.summary_for(query.metric.as_deref());
    let dashboard = &state.dashboard;

    let body = render_choropleth(
        &dashboard.data().features,
        &summary,
        dashboard.aliases(),
        &state.render.map,
    )?;
    Ok(svg(body))
}

/// GET /bars.svg
pub async fn bars_svg(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let summary = state.summary_for(query.metric.as_deref());
    let entries = top_n(&summary, query.n.unwrap_or(state.top_n));

    let body = render_bar_chart(&entries, &metric_label(summary.metric()), &state.render.bars)?;
    Ok(svg(body))
}

/// GET /lines.svg
pub async fn lines_svg(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let query = DashboardQuery::from_pairs(pairs)?;
    let view = state.view(query.countries, query.metric);
    Ok(svg(view.render_lines(&state.render)?))
}
