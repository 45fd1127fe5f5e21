//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::aggregate::{summarize, CaseSummary};
use crate::config::ApiConfig;
use crate::dashboard::{Dashboard, Selection};
use crate::render::RenderConfig;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
///
/// Everything here is read-only after startup; per-request views are built
/// from clones of the base dashboard.
#[derive(Clone)]
pub struct AppState {
    /// Dashboard with the configured default selection
    pub dashboard: Arc<Dashboard>,
    /// Chart rendering configuration
    pub render: Arc<RenderConfig>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Default `n` for the ranking endpoints
    pub top_n: usize,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(dashboard: Dashboard, render: RenderConfig, config: ApiConfig, top_n: usize) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            render: Arc::new(render),
            config: Arc::new(config),
            top_n,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Summary for `metric`, reusing the precomputed one when it matches
    pub fn summary_for(&self, metric: Option<&str>) -> Cow<'_, CaseSummary> {
        let cached = self.dashboard.summary();
        match metric {
            Some(metric) if metric != cached.metric() => {
                Cow::Owned(summarize(&self.dashboard.data().records, metric))
            }
            _ => Cow::Borrowed(cached),
        }
    }

    /// Dashboard view for a request's selection
    ///
    /// Missing parts of the selection fall back to the defaults.
    pub fn view(&self, countries: Vec<String>, metric: Option<String>) -> Dashboard {
        let mut view = Dashboard::clone(&self.dashboard);
        if countries.is_empty() && metric.is_none() {
            return view;
        }

        let current = view.selection().clone();
        view.select(Selection {
            countries: if countries.is_empty() {
                current.countries
            } else {
                countries
            },
            metric: metric.unwrap_or(current.metric),
        });
        view
    }
}
