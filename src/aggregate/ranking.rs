//! Top-N ranking of a summary

use super::summary::CaseSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One bar of the ranking chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub country: String,
    pub value: f64,
}

/// Value descending, then country name ascending
fn rank_order(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.country.cmp(&b.country))
}

/// The `n` largest entries of `summary`, largest first
///
/// Returns every entry when the summary has fewer than `n`, and nothing for
/// `n == 0`. Equal values are ordered by country name so repeated renders of
/// the same summary always draw the same bars.
pub fn top_n(summary: &CaseSummary, n: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = summary
        .iter()
        .map(|e| RankedEntry {
            country: e.country.clone(),
            value: e.value,
        })
        .collect();

    entries.sort_by(rank_order);
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_of(values: &[(&str, f64)]) -> CaseSummary {
        let mut summary = CaseSummary::empty("total_cases");
        for (country, value) in values {
            summary.observe(country, *value);
        }
        summary
    }

    #[test]
    fn test_top_n_sorted_descending() {
        let summary = summary_of(&[("A", 5.0), ("B", 50.0), ("C", 20.0), ("D", 1.0)]);
        let top = top_n(&summary, 3);

        let countries: Vec<&str> = top.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, vec!["B", "C", "A"]);
        assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_top_n_length() {
        let values: Vec<(String, f64)> = (0..25).map(|i| (format!("C{:02}", i), i as f64)).collect();
        let mut summary = CaseSummary::empty("total_cases");
        for (country, value) in &values {
            summary.observe(country, *value);
        }

        assert_eq!(top_n(&summary, 10).len(), 10);
        assert_eq!(top_n(&summary, 10)[0].country, "C24");
        assert_eq!(top_n(&summary, 100).len(), 25);
    }

    #[test]
    fn test_fewer_than_n() {
        let summary = summary_of(&[("A", 1.0), ("B", 2.0)]);
        assert_eq!(top_n(&summary, 10).len(), 2);
    }

    #[test]
    fn test_zero_and_empty() {
        let summary = summary_of(&[("A", 1.0)]);
        assert!(top_n(&summary, 0).is_empty());
        assert!(top_n(&CaseSummary::empty("total_cases"), 10).is_empty());
    }

    #[test]
    fn test_ties_broken_by_name() {
        let summary = summary_of(&[("Peru", 7.0), ("Chile", 7.0), ("Brazil", 9.0), ("Angola", 7.0)]);
        let top = top_n(&summary, 3);

        let countries: Vec<&str> = top.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(countries, vec!["Brazil", "Angola", "Chile"]);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let summary = summary_of(&[("A", 3.0), ("B", 3.0), ("C", 3.0)]);
        assert_eq!(top_n(&summary, 2), top_n(&summary, 2));
    }
}
