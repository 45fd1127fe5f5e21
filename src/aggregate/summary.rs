//! Per-country max reduction
//!
//! `CaseSummary` maps each country to the maximum value of one metric seen
//! across all of that country's records. It is built with an explicit
//! max-reduce: `observe` folds one value in, `merge` combines two partial
//! summaries. Both are commutative and associative, so the result does not
//! depend on record order or on how the input is split.

use super::join_key::CountryKey;
use crate::dataset::CaseRecord;
use std::collections::BTreeMap;

/// Summarized value for one country
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    /// Display name (smallest raw spelling seen for this key)
    pub country: String,
    /// Maximum observed metric value
    pub value: f64,
}

impl SummaryEntry {
    /// Combine two entries for the same key
    fn combine(self, other: SummaryEntry) -> SummaryEntry {
        SummaryEntry {
            country: if other.country < self.country {
                other.country
            } else {
                self.country
            },
            value: self.value.max(other.value),
        }
    }
}

/// Country → maximum metric value
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    metric: String,
    entries: BTreeMap<CountryKey, SummaryEntry>,
}

impl CaseSummary {
    /// Empty accumulator for `metric`
    pub fn empty(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Fold one observation into the summary
    ///
    /// Blank country names are ignored.
    pub fn observe(&mut self, country: &str, value: f64) {
        let key = CountryKey::new(country);
        if key.is_empty() {
            return;
        }

        let entry = SummaryEntry {
            country: country.trim().to_string(),
            value,
        };
        let combined = match self.entries.remove(&key) {
            Some(existing) => existing.combine(entry),
            None => entry,
        };
        self.entries.insert(key, combined);
    }

    /// Combine two partial summaries of the same metric
    pub fn merge(mut self, other: CaseSummary) -> CaseSummary {
        for (key, entry) in other.entries {
            let combined = match self.entries.remove(&key) {
                Some(existing) => existing.combine(entry),
                None => entry,
            };
            self.entries.insert(key, combined);
        }
        self
    }

    /// Summarized value, or `None` if the country never had a numeric value
    pub fn get(&self, country: &str) -> Option<f64> {
        self.entries.get(&CountryKey::new(country)).map(|e| e.value)
    }

    /// Summarized value, or `0` for unknown countries
    pub fn lookup(&self, country: &str) -> f64 {
        self.get(country).unwrap_or(0.0)
    }

    /// Metric this summary was built for
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Entries in join key order
    pub fn iter(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.values()
    }

    /// Largest value across all countries
    pub fn max_value(&self) -> Option<f64> {
        self.entries.values().map(|e| e.value).reduce(f64::max)
    }

    /// Display name → value
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.entries
            .values()
            .map(|e| (e.country.clone(), e.value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reduce records to the per-country maximum of `metric`
///
/// Records without a location, and records where `metric` is absent or was
/// not numeric, contribute nothing.
pub fn summarize(records: &[CaseRecord], metric: &str) -> CaseSummary {
    records
        .iter()
        .filter_map(|r| r.value(metric).map(|v| (r.location.as_str(), v)))
        .fold(CaseSummary::empty(metric), |mut acc, (country, value)| {
            acc.observe(country, value);
            acc
        })
}
