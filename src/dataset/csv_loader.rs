//! Case table loader
//!
//! Reads the delimited per-country-per-day table into `CaseRecord`s.
//! Column names are configurable. Without an allow-list, every column other
//! than the location and date columns that holds at least one numeric cell is
//! a metric; text columns like `iso_code` or `continent` are left out.

use super::error::{DatasetError, DatasetResult};
use super::types::{parse_metric_value, CaseRecord};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Maximum number of row errors retained in a `LoadedCases`
const MAX_REPORTED_ERRORS: usize = 100;

/// Case table loader with configurable column mapping
#[derive(Debug, Clone)]
pub struct CaseLoader {
    /// Header of the location (join key) column
    location_column: String,
    /// Header of the date column
    date_column: String,
    /// Format string for parsing dates
    date_format: String,
    /// Metric columns to keep (empty = all remaining columns)
    metric_columns: Vec<String>,
    /// Locations dropped while loading
    exclude_locations: HashSet<String>,
    /// Field delimiter
    delimiter: u8,
}

/// Result of loading a case table
#[derive(Debug, Default)]
pub struct LoadedCases {
    /// Records in source row order
    pub records: Vec<CaseRecord>,
    /// Metric column names in header order
    pub metric_names: Vec<String>,
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
}

impl Default for CaseLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseLoader {
    /// Create a loader for the OWID column layout
    pub fn new() -> Self {
        Self {
            location_column: "location".to_string(),
            date_column: "date".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            metric_columns: Vec::new(),
            exclude_locations: HashSet::new(),
            delimiter: b',',
        }
    }

    /// Set the location column header
    pub fn with_location_column(mut self, column: &str) -> Self {
        self.location_column = column.to_string();
        self
    }

    /// Set the date column header
    pub fn with_date_column(mut self, column: &str) -> Self {
        self.date_column = column.to_string();
        self
    }

    /// Set the date format string
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Restrict loading to the given metric column
    pub fn with_metric_column(mut self, column: &str) -> Self {
        self.metric_columns.push(column.to_string());
        self
    }

    /// Drop rows for the given location (e.g. continent aggregates)
    pub fn exclude_location(mut self, location: &str) -> Self {
        self.exclude_locations.insert(location.to_string());
        self
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load records from a file
    pub fn load(&self, path: &Path) -> DatasetResult<LoadedCases> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read(file)
    }

    /// Load records from an in-memory string (useful for testing)
    pub fn load_str(&self, data: &str) -> DatasetResult<LoadedCases> {
        self.read(data.as_bytes())
    }

    /// Load records from any reader
    pub fn read<R: Read>(&self, input: R) -> DatasetResult<LoadedCases> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let columns: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name, idx))
            .collect();

        let location_idx = *columns
            .get(self.location_column.as_str())
            .ok_or_else(|| DatasetError::MissingColumn(self.location_column.clone()))?;
        let date_idx = *columns
            .get(self.date_column.as_str())
            .ok_or_else(|| DatasetError::MissingColumn(self.date_column.clone()))?;

        let metric_columns = self.resolve_metric_columns(&headers, location_idx, date_idx)?;

        let mut loaded = LoadedCases {
            metric_names: metric_columns.iter().map(|(_, name)| name.clone()).collect(),
            ..Default::default()
        };

        let mut numeric = vec![false; metric_columns.len()];

        for (line_num, result) in reader.records().enumerate() {
            // header is line 1
            let actual_line = line_num + 2;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    loaded.push_error(format!("Line {}: {}", actual_line, e));
                    continue;
                }
            };

            let location = record.get(location_idx).unwrap_or("").trim();
            if self.exclude_locations.contains(location) {
                continue;
            }

            let date_str = record.get(date_idx).unwrap_or("").trim();
            let date = match self.parse_date(date_str) {
                Some(d) => d,
                None => {
                    loaded.push_error(format!(
                        "Line {}: could not parse date '{}'",
                        actual_line, date_str
                    ));
                    continue;
                }
            };

            let mut row = CaseRecord::new(location, date);
            for (slot, (idx, name)) in metric_columns.iter().enumerate() {
                if let Some(value) = record.get(*idx).and_then(parse_metric_value) {
                    row.metrics.insert(name.clone(), value);
                    numeric[slot] = true;
                }
            }

            loaded.records.push(row);
            loaded.rows_processed += 1;
        }

        if self.metric_columns.is_empty() {
            let dropped: Vec<&str> = metric_columns
                .iter()
                .zip(&numeric)
                .filter(|(_, seen)| !**seen)
                .map(|((_, name), _)| name.as_str())
                .collect();
            if !dropped.is_empty() {
                tracing::debug!(columns = ?dropped, "Ignoring columns without numeric values");
            }
            loaded.metric_names = metric_columns
                .iter()
                .zip(&numeric)
                .filter(|(_, seen)| **seen)
                .map(|((_, name), _)| name.clone())
                .collect();
        }

        if loaded.rows_skipped > 0 {
            tracing::warn!(
                rows_skipped = loaded.rows_skipped,
                "Skipped unreadable rows in case table"
            );
        }

        Ok(loaded)
    }

    /// Pick the (index, name) pairs of metric columns
    fn resolve_metric_columns(
        &self,
        headers: &csv::StringRecord,
        location_idx: usize,
        date_idx: usize,
    ) -> DatasetResult<Vec<(usize, String)>> {
        if self.metric_columns.is_empty() {
            return Ok(headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != location_idx && *idx != date_idx)
                .map(|(idx, name)| (idx, name.to_string()))
                .collect());
        }

        self.metric_columns
            .iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|h| h == name)
                    .map(|idx| (idx, name.clone()))
                    .ok_or_else(|| DatasetError::MissingColumn(name.clone()))
            })
            .collect()
    }

    /// Parse a date with the configured format only
    fn parse_date(&self, date_str: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(date_str, &self.date_format).ok()
    }
}

impl LoadedCases {
    fn push_error(&mut self, message: String) {
        self.rows_skipped += 1;
        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(message);
        }
    }
}
