//! Dashboard session
//!
//! Ties the loaded dataset to the three derived views. The summary and the
//! ranking are computed once when the session is created; the line chart
//! series are recomputed from scratch on every selection change.
//!
//! ```text
//!   DashboardData ──► summarize ──► CaseSummary ──► top_n ──► ranking
//!         │
//!         └── Selection ──► extract_multi_series ──► series
//!                 ▲
//!           SelectionEvent
//! ```

pub mod export;

pub use export::{export_static, ExportError};

use crate::aggregate::{
    extract_multi_series, summarize, top_n, CaseSummary, CountryKey, JoinAliases, RankedEntry,
    Series,
};
use crate::config::DashboardConfig;
use crate::dataset::DashboardData;
use crate::render::{
    metric_label, render_bar_chart, render_choropleth, render_line_chart, render_page,
    PageContext, RenderConfig, RenderResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Countries and metric driving the line chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// In selection order, which also fixes legend colors
    pub countries: Vec<String>,
    pub metric: String,
}

impl Selection {
    pub fn new(countries: Vec<String>, metric: impl Into<String>) -> Self {
        Self {
            countries,
            metric: metric.into(),
        }
    }

    /// Add `country` if it isn't selected, remove it if it is
    ///
    /// Matching ignores case and spacing; a newly added country goes last.
    fn toggle(&mut self, country: &str) {
        let key = CountryKey::new(country);
        if key.is_empty() {
            return;
        }
        let before = self.countries.len();
        self.countries.retain(|c| CountryKey::new(c) != key);
        if self.countries.len() == before {
            self.countries.push(country.trim().to_string());
        }
    }
}

/// A change coming from the selection controls
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// Replace the whole country selection
    Countries(Vec<String>),
    /// Switch the plotted metric
    Metric(String),
    /// Add or remove one country
    ToggleCountry(String),
}

/// One viewer's dashboard state
#[derive(Debug, Clone)]
pub struct Dashboard {
    data: Arc<DashboardData>,
    aliases: Arc<JoinAliases>,
    summary: Arc<CaseSummary>,
    ranking: Arc<Vec<RankedEntry>>,
    title: String,
    selection: Selection,
    series: Vec<Series>,
}

impl Dashboard {
    /// Build the session and compute every view for the default selection
    pub fn new(data: Arc<DashboardData>, aliases: JoinAliases, config: &DashboardConfig) -> Self {
        let summary = summarize(&data.records, &config.summary_metric);
        let ranking = top_n(&summary, config.top_n);

        tracing::info!(
            metric = %config.summary_metric,
            countries = summary.len(),
            ranked = ranking.len(),
            "Summary computed"
        );

        let selection = Selection::new(config.default_countries.clone(), &config.default_metric);
        let series = extract_multi_series(&data.records, &selection.countries, &selection.metric);

        Self {
            data,
            aliases: Arc::new(aliases),
            summary: Arc::new(summary),
            ranking: Arc::new(ranking),
            title: config.title.clone(),
            selection,
            series,
        }
    }

    /// Apply a selection change and recompute the series
    pub fn apply(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::Countries(countries) => self.selection.countries = countries,
            SelectionEvent::Metric(metric) => {
                if !self.data.has_metric(&metric) {
                    tracing::debug!(metric = %metric, "Selected metric is not in the dataset");
                }
                self.selection.metric = metric;
            }
            SelectionEvent::ToggleCountry(country) => self.selection.toggle(&country),
        }
        self.recompute();
    }

    /// Replace the whole selection with a single recompute
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.series = extract_multi_series(
            &self.data.records,
            &self.selection.countries,
            &self.selection.metric,
        );

        tracing::debug!(
            countries = self.selection.countries.len(),
            metric = %self.selection.metric,
            points = self.series.iter().map(Series::len).sum::<usize>(),
            "Series recomputed"
        );
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn aliases(&self) -> &JoinAliases {
        &self.aliases
    }

    pub fn summary(&self) -> &CaseSummary {
        &self.summary
    }

    pub fn ranking(&self) -> &[RankedEntry] {
        &self.ranking
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Countries available for selection, sorted and unique
    pub fn countries(&self) -> Vec<String> {
        self.data.countries()
    }

    /// Metric columns in dataset order
    pub fn metrics(&self) -> &[String] {
        &self.data.metric_names
    }

    pub fn render_map(&self, config: &RenderConfig) -> RenderResult<String> {
        render_choropleth(&self.data.features, &self.summary, &self.aliases, &config.map)
    }

    pub fn render_bars(&self, config: &RenderConfig) -> RenderResult<String> {
        render_bar_chart(&self.ranking, &metric_label(self.summary.metric()), &config.bars)
    }

    pub fn render_lines(&self, config: &RenderConfig) -> RenderResult<String> {
        render_line_chart(&self.series, &metric_label(&self.selection.metric), &config.lines)
    }

    /// Full HTML page with all three charts and the selection controls
    pub fn render_page(&self, config: &RenderConfig) -> RenderResult<String> {
        render_page(&PageContext {
            title: self.title.clone(),
            map_svg: self.render_map(config)?,
            bars_svg: self.render_bars(config)?,
            lines_svg: self.render_lines(config)?,
            countries: self.countries(),
            selected_countries: self.selection.countries.clone(),
            metrics: self.data.metric_names.clone(),
            selected_metric: self.selection.metric.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CaseRecord, CountryFeature};
    use chrono::NaiveDate;
    use geo::{polygon, MultiPolygon};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn data() -> Arc<DashboardData> {
        let records = vec![
            CaseRecord::new("France", day(1)).metric("total_cases", 10.0).metric("new_cases", 10.0),
            CaseRecord::new("France", day(2)).metric("total_cases", 15.0).metric("new_cases", 5.0),
            CaseRecord::new("India", day(1)).metric("total_cases", 30.0).metric("new_cases", 30.0),
            CaseRecord::new("India", day(2)).raw_metric("total_cases", "").metric("new_cases", 2.0),
            CaseRecord::new("United States", day(1)).metric("total_cases", 50.0),
        ];
        let square = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)
        ]]);
        let features = vec![
            CountryFeature::new("France", square.clone()),
            CountryFeature::new("United States of America", square),
        ];
        Arc::new(DashboardData::new(
            records,
            vec!["total_cases".to_string(), "new_cases".to_string()],
            features,
        ))
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            top_n: 2,
            default_countries: vec!["India".to_string(), "France".to_string()],
            ..DashboardConfig::default()
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(data(), JoinAliases::world_atlas(), &config())
    }

    #[test]
    fn test_initial_views() {
        let dashboard = dashboard();

        assert_eq!(dashboard.summary().lookup("France"), 15.0);
        assert_eq!(dashboard.summary().lookup("India"), 30.0);

        let ranked: Vec<&str> = dashboard.ranking().iter().map(|e| e.country.as_str()).collect();
        assert_eq!(ranked, vec!["United States", "India"]);

        let series = dashboard.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].country, "India");
        // the empty total_cases cell is not plotted
        assert_eq!(series[0].len(), 1);
        assert_eq!(series[1].len(), 2);
    }

    #[test]
    fn test_metric_event() {
        let mut dashboard = dashboard();
        dashboard.apply(SelectionEvent::Metric("new_cases".to_string()));

        assert_eq!(dashboard.selection().metric, "new_cases");
        assert_eq!(dashboard.series()[0].len(), 2);
        assert_eq!(dashboard.series()[0].points[1].value, 2.0);
        // summary stays on the configured metric
        assert_eq!(dashboard.summary().metric(), "total_cases");
    }

    #[test]
    fn test_unknown_metric_yields_empty_series() {
        let mut dashboard = dashboard();
        dashboard.apply(SelectionEvent::Metric("hosp_patients".to_string()));

        assert_eq!(dashboard.series().len(), 2);
        assert!(dashboard.series().iter().all(Series::is_empty));
    }

    #[test]
    fn test_countries_event_replaces_selection() {
        let mut dashboard = dashboard();
        dashboard.apply(SelectionEvent::Countries(vec![
            "United States".to_string(),
            "Atlantis".to_string(),
        ]));

        let series = dashboard.series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].country, "United States");
        assert_eq!(series[0].len(), 1);
        assert!(series[1].is_empty());
    }

    #[test]
    fn test_toggle_country() {
        let mut dashboard = dashboard();

        dashboard.apply(SelectionEvent::ToggleCountry("india".to_string()));
        assert_eq!(dashboard.selection().countries, vec!["France".to_string()]);
        assert_eq!(dashboard.series().len(), 1);

        dashboard.apply(SelectionEvent::ToggleCountry(" United States ".to_string()));
        assert_eq!(
            dashboard.selection().countries,
            vec!["France".to_string(), "United States".to_string()]
        );
        assert_eq!(dashboard.series()[1].len(), 1);

        dashboard.apply(SelectionEvent::ToggleCountry("   ".to_string()));
        assert_eq!(dashboard.selection().countries.len(), 2);
    }

    #[test]
    fn test_select_replaces_everything() {
        let mut dashboard = dashboard();
        dashboard.select(Selection::new(vec!["France".to_string()], "new_cases"));

        assert_eq!(dashboard.series().len(), 1);
        assert_eq!(dashboard.series()[0].points[0].value, 10.0);
    }

    #[test]
    fn test_clones_are_independent() {
        let base = dashboard();
        let mut view = base.clone();
        view.apply(SelectionEvent::Countries(Vec::new()));

        assert!(view.series().is_empty());
        assert_eq!(base.series().len(), 2);
    }

    #[test]
    fn test_available_options() {
        let dashboard = dashboard();
        assert_eq!(dashboard.countries(), vec!["France", "India", "United States"]);
        assert_eq!(dashboard.metrics(), ["total_cases", "new_cases"]);
    }

    #[test]
    fn test_render_page() {
        let dashboard = dashboard();
        let html = dashboard.render_page(&RenderConfig::default()).unwrap();

        assert!(html.contains("<title>COVID-19 Dashboard</title>"));
        // aliased feature picks up the United States total
        assert!(html.contains("United States of America&#10;Total Cases: 50"));
        assert!(html.contains("Top 2 by Total Cases"));
        assert!(html.contains(r#"<option value="India" selected>"#));
        assert!(html.contains(r#"data-country="France""#));
    }
}
