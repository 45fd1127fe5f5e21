//! Horizontal top-N bar chart

use super::format::{format_compact, format_count, nice_ticks};
use super::svg::{escape_xml, SvgDocument};
use super::{BarChartConfig, RenderResult};
use crate::aggregate::RankedEntry;
use std::fmt::Write;

/// Render `entries` as horizontal bars, largest at the top
///
/// Bars share a linear x scale from 0 to the largest value. Entries are drawn
/// in the order given, so pass the output of `top_n` unchanged.
pub fn render_bar_chart(
    entries: &[RankedEntry],
    metric_label: &str,
    config: &BarChartConfig,
) -> RenderResult<String> {
    let margin = config.margin;
    let inner_width = (config.width - margin.left - margin.right).max(0.0);
    let inner_height = (config.height - margin.top - margin.bottom).max(0.0);

    let mut doc = SvgDocument::new(config.width, config.height, "bar-chart")?;
    doc.style(".bar-chart text{font:11px sans-serif}.axis line{stroke:#ccc}.title{font-weight:bold}")?;
    doc.centered_text(
        config.width / 2.0,
        margin.top / 2.0 + 5.0,
        "title",
        &format!("Top {} by {}", entries.len(), metric_label),
    )?;

    if entries.is_empty() {
        doc.centered_text(config.width / 2.0, config.height / 2.0, "empty", "No data")?;
        return doc.finish();
    }

    let max = entries
        .iter()
        .map(|e| e.value)
        .fold(0.0_f64, f64::max);
    let x = |value: f64| {
        if max > 0.0 {
            (value.max(0.0) / max) * inner_width
        } else {
            0.0
        }
    };

    // band scale: equal slots, `padding` of each left empty
    let band = inner_height / entries.len() as f64;
    let padding = config.padding.clamp(0.0, 0.9);
    let bar_height = band * (1.0 - padding);

    writeln!(
        doc,
        r#"<g class="plot" transform="translate({},{})">"#,
        margin.left, margin.top
    )?;

    writeln!(doc, r#"<g class="axis">"#)?;
    for tick in nice_ticks(max, 4) {
        let tx = x(tick);
        writeln!(
            doc,
            r#"<line x1="{tx:.1}" x2="{tx:.1}" y1="0" y2="{inner_height:.1}"/><text x="{tx:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            inner_height + 14.0,
            format_compact(tick)
        )?;
    }
    writeln!(doc, "</g>")?;

    for (i, entry) in entries.iter().enumerate() {
        let y = band * i as f64 + band * padding / 2.0;
        let width = x(entry.value);
        let mid = y + bar_height / 2.0;
        let country = escape_xml(&entry.country);
        writeln!(
            doc,
            r#"<g class="bar"><rect x="0" y="{y:.1}" width="{width:.1}" height="{bar_height:.1}" fill="{}"><title>{}: {}</title></rect>"#,
            escape_xml(&config.bar_color),
            country,
            format_count(entry.value)
        )?;
        writeln!(
            doc,
            r#"<text class="label" x="-6" y="{mid:.1}" dy="0.35em" text-anchor="end">{}</text><text class="value" x="{:.1}" y="{mid:.1}" dy="0.35em">{}</text></g>"#,
            country,
            width + 4.0,
            format_compact(entry.value)
        )?;
    }

    writeln!(doc, "</g>")?;
    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(country: &str, value: f64) -> RankedEntry {
        RankedEntry {
            country: country.to_string(),
            value,
        }
    }

    fn bar_widths(svg: &str) -> Vec<f64> {
        svg.match_indices(r#"<rect x="0""#)
            .map(|(i, _)| {
                let rest = &svg[i..];
                let start = rest.find("width=\"").unwrap() + 7;
                let end = start + rest[start..].find('"').unwrap();
                rest[start..end].parse().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_bars_scale_to_max() {
        let config = BarChartConfig::default();
        let entries = vec![entry("United States", 100.0), entry("India", 50.0)];
        let svg = render_bar_chart(&entries, "Total Cases", &config).unwrap();

        let inner = config.width - config.margin.left - config.margin.right;
        let widths = bar_widths(&svg);
        assert_eq!(widths.len(), 2);
        assert!((widths[0] - inner).abs() < 0.1);
        assert!((widths[1] - inner / 2.0).abs() < 0.1);
        assert!(svg.contains("Top 2 by Total Cases"));
    }

    #[test]
    fn test_labels_follow_entry_order() {
        let entries = vec![entry("B", 9.0), entry("A", 9.0), entry("C", 1.0)];
        let svg = render_bar_chart(&entries, "Total Cases", &BarChartConfig::default()).unwrap();

        let b = svg.find(">B</text>").unwrap();
        let a = svg.find(">A</text>").unwrap();
        let c = svg.find(">C</text>").unwrap();
        assert!(b < a && a < c);
        assert!(svg.contains("B: 9</title>"));
    }

    #[test]
    fn test_empty_ranking() {
        let svg = render_bar_chart(&[], "Total Cases", &BarChartConfig::default()).unwrap();
        assert!(svg.contains(">No data</text>"));
        assert!(!svg.contains("<rect x=\"0\""));
    }

    #[test]
    fn test_all_zero_values() {
        let entries = vec![entry("A", 0.0), entry("B", 0.0)];
        let svg = render_bar_chart(&entries, "Total Cases", &BarChartConfig::default()).unwrap();
        assert_eq!(bar_widths(&svg), vec![0.0, 0.0]);
    }
}
