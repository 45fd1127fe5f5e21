//! # covid-atlas
//!
//! COVID-19 dashboard built from two static inputs: a per-country-per-day
//! case table (OWID layout) and a TopoJSON world map.
//!
//! ## Features
//!
//! - **Choropleth**: world map colored by each country's total cases
//! - **Ranking**: top-N countries as a horizontal bar chart
//! - **Series**: per-country time series for a selectable metric
//! - **Outputs**: static SVG/HTML bundle, CLI tables, read-only HTTP server
//!
//! ## Modules
//!
//! - [`dataset`]: Loading the case table and the world topology
//! - [`aggregate`]: Summary, ranking and series derivations
//! - [`render`]: SVG charts and the HTML page
//! - [`dashboard`]: Selection state tying data to views
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_atlas::config::Config;
//! use covid_atlas::dashboard::{Dashboard, SelectionEvent};
//! use covid_atlas::dataset::load_dashboard_data;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let data = Arc::new(load_dashboard_data(&config.data).await?);
//!
//!     let mut dashboard = Dashboard::new(data, config.join.join_aliases(), &config.dashboard);
//!     println!("India: {}", dashboard.summary().lookup("India"));
//!
//!     dashboard.apply(SelectionEvent::Metric("new_cases".to_string()));
//!     let svg = dashboard.render_lines(&config.render)?;
//!     std::fs::write("lines.svg", svg)?;
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod render;

// Re-export top-level types for convenience
pub use aggregate::{
    extract_multi_series, extract_series, lookup, summarize, top_n, CaseSummary, CountryKey,
    JoinAliases, RankedEntry, Series, SeriesPoint,
};

pub use dataset::{
    load_dashboard_data, CaseLoader, CaseRecord, CountryFeature, DashboardData, DatasetError,
    DatasetResult, Topology,
};

pub use render::{RenderConfig, RenderError, RenderResult};

pub use dashboard::{export_static, Dashboard, ExportError, Selection, SelectionEvent};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, DataConfig, LoggingConfig};
