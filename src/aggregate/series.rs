//! Per-country time series extraction

use super::join_key::CountryKey;
use crate::dataset::CaseRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One plotted observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// The points of one metric for one country, in source row order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Country as requested by the caller
    pub country: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            points: Vec::new(),
        }
    }

    /// An empty series means "nothing to plot", not an error
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }

    pub fn min_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::min)
    }

    /// Earliest and latest date among the points
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.points.first()?.date;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.date), hi.max(p.date))
        }))
    }
}

/// Points of `metric` for `country`
///
/// Rows where the metric is absent or was not numeric are left out. Points
/// keep source order; the table is assumed chronological and is not re-sorted.
pub fn extract_series(records: &[CaseRecord], country: &str, metric: &str) -> Series {
    let key = CountryKey::new(country);
    let mut series = Series::new(country);
    if key.is_empty() {
        return series;
    }

    series.points = records
        .iter()
        .filter(|r| CountryKey::new(&r.location) == key)
        .filter_map(|r| {
            r.value(metric).map(|value| SeriesPoint {
                date: r.date,
                value,
            })
        })
        .collect();
    series
}

/// `extract_series` for each requested country, in the requested order
///
/// Countries without data still get an (empty) entry so legend colors stay
/// tied to selection position. Done in a single pass over the records.
pub fn extract_multi_series<S: AsRef<str>>(
    records: &[CaseRecord],
    countries: &[S],
    metric: &str,
) -> Vec<Series> {
    let mut result: Vec<Series> = countries
        .iter()
        .map(|c| Series::new(c.as_ref()))
        .collect();

    let mut slots: HashMap<CountryKey, Vec<usize>> = HashMap::new();
    for (idx, country) in countries.iter().enumerate() {
        let key = CountryKey::new(country.as_ref());
        if !key.is_empty() {
            slots.entry(key).or_default().push(idx);
        }
    }
    if slots.is_empty() {
        return result;
    }

    for record in records {
        let value = match record.value(metric) {
            Some(v) => v,
            None => continue,
        };
        if let Some(indices) = slots.get(&CountryKey::new(&record.location)) {
            for &idx in indices {
                result[idx].points.push(SeriesPoint {
                    date: record.date,
                    value,
                });
            }
        }
    }

    result
}
