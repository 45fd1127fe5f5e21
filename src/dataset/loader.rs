//! Dataset loading join point
//!
//! Loads the case table and the world topology concurrently and only hands
//! back a `DashboardData` once both have succeeded. A failure on either side
//! aborts the whole load; there is no partial-data mode.

use super::csv_loader::CaseLoader;
use super::error::DatasetResult;
use super::topology::Topology;
use super::types::{CaseRecord, CountryFeature};
use crate::config::DataConfig;
use std::collections::BTreeSet;
use std::time::Instant;

/// The read-only in-memory dataset shared by every derivation
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    /// Case records in source row order
    pub records: Vec<CaseRecord>,
    /// Metric column names in header order
    pub metric_names: Vec<String>,
    /// Country shapes in topology order
    pub features: Vec<CountryFeature>,
}

impl DashboardData {
    pub fn new(
        records: Vec<CaseRecord>,
        metric_names: Vec<String>,
        features: Vec<CountryFeature>,
    ) -> Self {
        Self {
            records,
            metric_names,
            features,
        }
    }

    /// Distinct non-blank locations, sorted
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.has_location())
            .map(|r| r.location.trim().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// True when `metric` is one of the loaded metric columns
    pub fn has_metric(&self, metric: &str) -> bool {
        self.metric_names.iter().any(|m| m == metric)
    }
}

impl DataConfig {
    /// Build the case loader described by this configuration
    pub fn case_loader(&self) -> CaseLoader {
        let mut loader = CaseLoader::new()
            .with_location_column(&self.location_column)
            .with_date_column(&self.date_column)
            .with_date_format(&self.date_format);
        for metric in &self.metrics {
            loader = loader.with_metric_column(metric);
        }
        for location in &self.exclude_locations {
            loader = loader.exclude_location(location);
        }
        loader
    }
}

/// Load both inputs concurrently and join them
pub async fn load_dashboard_data(config: &DataConfig) -> DatasetResult<DashboardData> {
    let start = Instant::now();

    let loader = config.case_loader();
    let cases_path = config.cases_path.clone();
    let cases = tokio::task::spawn_blocking(move || loader.load(&cases_path));

    let world_path = config.world_path.clone();
    let object = config.geo_object.clone();
    let name_property = config.name_property.clone();
    let world = tokio::task::spawn_blocking(move || {
        Topology::from_path(&world_path)?.features(&object, &name_property)
    });

    let (cases, features) = tokio::try_join!(cases, world)?;
    let cases = cases?;
    let features = features?;

    tracing::info!(
        records = cases.records.len(),
        rows_skipped = cases.rows_skipped,
        metrics = cases.metric_names.len(),
        features = features.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Dataset loaded"
    );

    Ok(DashboardData::new(cases.records, cases.metric_names, features))
}
