//! covid-atlas HTTP API
//!
//! Read-only HTTP surface over the loaded dataset, built with Axum. Every
//! response is computed per request from the shared dataset; nothing is
//! written back.
//!
//! # Endpoints
//!
//! ## Pages
//! - `GET /` - Dashboard page with country/metric controls
//! - `GET /map.svg` - Choropleth of the summary metric
//! - `GET /bars.svg` - Top-N bar chart
//! - `GET /lines.svg` - Line chart for a country selection
//!
//! ## Data
//! - `GET /api/v1/summary` - Country → value map
//! - `GET /api/v1/top` - Top-N ranking
//! - `GET /api/v1/lookup/:country` - One country's value (0 when unknown)
//! - `GET /api/v1/series` - Per-country series
//! - `GET /api/v1/countries` - Selectable countries
//! - `GET /api/v1/metrics` - Selectable metrics
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Dataset status
//!
//! # Example
//!
//! ```rust,ignore
//! use covid_atlas::api::{serve, AppState};
//! use covid_atlas::config::Config;
//! use covid_atlas::dashboard::Dashboard;
//! use covid_atlas::dataset::load_dashboard_data;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let data = Arc::new(load_dashboard_data(&config.data).await?);
//!     let dashboard = Dashboard::new(data, config.join.join_aliases(), &config.dashboard);
//!
//!     let state = AppState::new(dashboard, config.render, config.api.clone(), config.dashboard.top_n);
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::ApiConfig;
use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// CORS for the configured origins, or any origin when none are listed
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/summary", get(routes::summary::get_summary))
        .route("/top", get(routes::summary::get_top))
        .route("/lookup/:country", get(routes::summary::lookup_country))
        .route("/series", get(routes::series::get_series))
        .route("/countries", get(routes::series::list_countries))
        .route("/metrics", get(routes::series::list_metrics));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::pages::index))
        .route("/map.svg", get(routes::pages::map_svg))
        .route("/bars.svg", get(routes::pages::bars_svg))
        .route("/lines.svg", get(routes::pages::lines_svg))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Start the server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("covid-atlas listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("covid-atlas shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
