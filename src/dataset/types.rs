//! Core data types for the dashboard inputs
//!
//! This module defines the two raw input entities:
//! - `CaseRecord`: one row of the per-country-per-day case table
//! - `CountryFeature`: one country shape from the world topology

use chrono::NaiveDate;
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single row of the case table
///
/// Metric cells that were empty or not numeric are simply not present in
/// `metrics`, so "absent" and "unparseable" are the same thing downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseRecord {
    /// Country (or region) name, the join key against feature names
    pub location: String,
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Numeric metric values keyed by column name
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
}

impl CaseRecord {
    /// Create a record with no metric values
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            date,
            metrics: HashMap::new(),
        }
    }

    /// Builder method: set a numeric metric value
    pub fn metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Builder method: set a metric from its raw cell text
    ///
    /// Cells that do not hold a finite number are dropped.
    pub fn raw_metric(mut self, name: impl Into<String>, cell: &str) -> Self {
        if let Some(value) = parse_metric_value(cell) {
            self.metrics.insert(name.into(), value);
        }
        self
    }

    /// Numeric value of `metric` for this row, if present
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }

    /// True when the row carries a usable location
    pub fn has_location(&self) -> bool {
        !self.location.trim().is_empty()
    }
}

/// Parse a metric cell
///
/// Empty cells, text, `NaN` and infinities all count as absent rather than zero.
pub fn parse_metric_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One country shape from the world topology
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Feature id from the topology (ISO numeric code in the world atlas)
    pub id: Option<String>,
    /// Value of the join property, matched against `CaseRecord::location`
    pub name: String,
    /// Decoded lon/lat geometry; empty for null geometries
    pub geometry: MultiPolygon<f64>,
}

impl CountryFeature {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            geometry,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// True when the feature has no drawable polygons
    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_record_builder() {
        let record = CaseRecord::new("France", day(1))
            .metric("total_cases", 12.0)
            .raw_metric("new_cases", "3");

        assert_eq!(record.value("total_cases"), Some(12.0));
        assert_eq!(record.value("new_cases"), Some(3.0));
        assert_eq!(record.value("total_deaths"), None);
        assert!(record.has_location());
    }

    #[test]
    fn test_parse_metric_value() {
        assert_eq!(parse_metric_value("10"), Some(10.0));
        assert_eq!(parse_metric_value(" 2.5 "), Some(2.5));
        assert_eq!(parse_metric_value(""), None);
        assert_eq!(parse_metric_value("   "), None);
        assert_eq!(parse_metric_value("n/a"), None);
        assert_eq!(parse_metric_value("NaN"), None);
        assert_eq!(parse_metric_value("inf"), None);
    }

    #[test]
    fn test_empty_cell_is_absent_not_zero() {
        let record = CaseRecord::new("X", day(1)).raw_metric("total_cases", "");
        assert!(record.metrics.is_empty());
    }

    #[test]
    fn test_blank_location() {
        let record = CaseRecord::new("  ", day(1));
        assert!(!record.has_location());
    }
}
