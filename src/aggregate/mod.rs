//! Aggregator
//!
//! Pure reductions from raw case records to the structures each chart needs:
//!
//! - **summary**: country → maximum metric value (`summarize`, `lookup`)
//! - **ranking**: top-N entries of a summary (`top_n`)
//! - **series**: per-country points of a metric (`extract_series`,
//!   `extract_multi_series`)
//! - **join_key**: name normalization and aliases shared by all of the above
//!
//! Every function here is stateless; callers recompute from scratch whenever
//! the dataset or the selection changes.
//!
//! # Example
//!
//! ```rust
//! use covid_atlas::aggregate::{lookup, summarize, top_n};
//! use covid_atlas::dataset::CaseRecord;
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let records = vec![
//!     CaseRecord::new("X", day).raw_metric("total_cases", "10"),
//!     CaseRecord::new("X", day.succ_opt().unwrap()).raw_metric("total_cases", "5"),
//! ];
//!
//! let summary = summarize(&records, "total_cases");
//! assert_eq!(lookup(&summary, "X"), 10.0);
//! assert_eq!(lookup(&summary, "Y"), 0.0);
//! assert_eq!(top_n(&summary, 10).len(), 1);
//! ```

pub mod join_key;
pub mod ranking;
pub mod series;
pub mod summary;

pub use join_key::{CountryKey, JoinAliases};
pub use ranking::{top_n, RankedEntry};
pub use series::{extract_multi_series, extract_series, Series, SeriesPoint};
pub use summary::{summarize, CaseSummary, SummaryEntry};

/// Summarized value for `country`, or `0` when it has no data
pub fn lookup(summary: &CaseSummary, country: &str) -> f64 {
    summary.lookup(country)
}
