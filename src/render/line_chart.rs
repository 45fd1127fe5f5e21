//! Multi-series line chart

use super::format::{format_compact, nice_range_ticks};
use super::svg::{escape_xml, SvgDocument};
use super::{LineChartConfig, RenderResult};
use crate::aggregate::Series;
use chrono::{Duration, NaiveDate};
use std::fmt::Write;

const DATE_TICKS: i64 = 5;
const LEGEND_ROW: f64 = 18.0;

/// Shared x/y domain of every non-empty series
///
/// The value range always includes 0 and stretches below it when a series
/// goes negative (data corrections show up as negative daily counts).
struct Domain {
    start: NaiveDate,
    days: i64,
    min: f64,
    max: f64,
}

impl Domain {
    fn of(series: &[Series]) -> Option<Self> {
        let (start, end) = series
            .iter()
            .filter_map(Series::date_range)
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))?;
        let min = series
            .iter()
            .filter_map(Series::min_value)
            .fold(0.0_f64, f64::min);
        let max = series
            .iter()
            .filter_map(Series::max_value)
            .fold(0.0_f64, f64::max);
        Some(Self {
            start,
            days: (end - start).num_days(),
            min,
            max,
        })
    }

    /// Fraction of the date span, 0.5 when every point shares one date
    fn x(&self, date: NaiveDate) -> f64 {
        if self.days == 0 {
            return 0.5;
        }
        (date - self.start).num_days() as f64 / self.days as f64
    }

    /// Fraction of the value span, 0 at `min` and 1 at `max`
    fn y(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        (value - self.min) / span
    }
}

/// Render one line per series over a shared date and value domain
///
/// A series' color is picked by its position in `series`, and every series
/// gets a legend row even when it has no points, so colors don't shift as the
/// selection changes. When no series has points, the plot area shows
/// "No data for selection".
pub fn render_line_chart(
    series: &[Series],
    metric_label: &str,
    config: &LineChartConfig,
) -> RenderResult<String> {
    let margin = config.margin;
    let width = (config.width - margin.left - margin.right).max(0.0);
    let height = (config.height - margin.top - margin.bottom).max(0.0);

    let mut doc = SvgDocument::new(config.width, config.height, "line-chart")?;
    doc.style(
        ".line-chart text{font:11px sans-serif}.axis line{stroke:#ccc}\
         .series{fill:none;stroke-linejoin:round}.title{font-weight:bold}.empty{fill:#777}",
    )?;
    doc.centered_text(
        margin.left + width / 2.0,
        margin.top / 2.0 + 5.0,
        "title",
        &format!("{} over time", metric_label),
    )?;

    writeln!(
        doc,
        r#"<g class="plot" transform="translate({},{})">"#,
        margin.left, margin.top
    )?;

    match Domain::of(series) {
        None => {
            doc.centered_text(width / 2.0, height / 2.0, "empty", "No data for selection")?;
        }
        Some(domain) => {
            write_axes(&mut doc, &domain, width, height)?;
            for (index, s) in series.iter().enumerate() {
                if s.is_empty() {
                    continue;
                }
                let mut d = String::new();
                for (i, point) in s.points.iter().enumerate() {
                    let px = domain.x(point.date) * width;
                    let py = height - domain.y(point.value) * height;
                    d.push_str(&format!("{}{px:.2},{py:.2}", if i == 0 { 'M' } else { 'L' }));
                }
                writeln!(
                    doc,
                    r#"<path class="series" d="{}" stroke="{}" stroke-width="{}" data-country="{}"/>"#,
                    d,
                    escape_xml(config.color(index)),
                    config.stroke_width,
                    escape_xml(&s.country)
                )?;
            }
        }
    }
    writeln!(doc, "</g>")?;

    write_legend(&mut doc, series, config)?;
    doc.finish()
}

fn write_axes(doc: &mut SvgDocument, domain: &Domain, width: f64, height: f64) -> RenderResult<()> {
    writeln!(doc, r#"<g class="axis">"#)?;

    for tick in nice_range_ticks(domain.min, domain.max, 5) {
        let y = height - domain.y(tick) * height;
        writeln!(
            doc,
            r#"<line x1="0" x2="{width:.1}" y1="{y:.1}" y2="{y:.1}"/><text x="-6" y="{y:.1}" dy="0.35em" text-anchor="end">{}</text>"#,
            format_compact(tick)
        )?;
    }

    let steps = domain.days.min(DATE_TICKS).max(1);
    let mut last = None;
    for i in 0..=steps {
        let date = domain.start + Duration::days(domain.days * i / steps);
        if last == Some(date) {
            continue;
        }
        last = Some(date);
        let x = domain.x(date) * width;
        writeln!(
            doc,
            r#"<line x1="{x:.1}" x2="{x:.1}" y1="{height:.1}" y2="{:.1}"/><text x="{x:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            height + 4.0,
            height + 18.0,
            date.format("%Y-%m-%d")
        )?;
    }

    writeln!(doc, "</g>")?;
    Ok(())
}

fn write_legend(doc: &mut SvgDocument, series: &[Series], config: &LineChartConfig) -> RenderResult<()> {
    let x = config.width - config.margin.right + 16.0;
    writeln!(
        doc,
        r#"<g class="legend" transform="translate({x:.1},{:.1})">"#,
        config.margin.top
    )?;
    for (index, s) in series.iter().enumerate() {
        let y = index as f64 * LEGEND_ROW;
        let suffix = if s.is_empty() { " (no data)" } else { "" };
        writeln!(
            doc,
            r#"<rect x="0" y="{y:.1}" width="12" height="12" fill="{}"/><text x="18" y="{:.1}">{}{}</text>"#,
            escape_xml(config.color(index)),
            y + 10.0,
            escape_xml(&s.country),
            suffix
        )?;
    }
    writeln!(doc, "</g>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SeriesPoint;
    use crate::render::CATEGORY10;

    fn series(country: &str, points: &[(u32, f64)]) -> Series {
        let mut s = Series::new(country);
        s.points = points
            .iter()
            .map(|(day, value)| SeriesPoint {
                date: NaiveDate::from_ymd_opt(2020, 4, *day).unwrap(),
                value: *value,
            })
            .collect();
        s
    }

    #[test]
    fn test_one_path_per_non_empty_series() {
        let data = vec![
            series("France", &[(1, 10.0), (2, 20.0), (3, 40.0)]),
            series("Atlantis", &[]),
            series("India", &[(2, 5.0)]),
        ];
        let svg = render_line_chart(&data, "Total Cases", &LineChartConfig::default()).unwrap();

        assert_eq!(svg.matches(r#"class="series""#).count(), 2);
        assert!(svg.contains(r#"data-country="France""#));
        assert!(!svg.contains(r#"data-country="Atlantis""#));
        assert!(!svg.contains("No data for selection"));
    }

    #[test]
    fn test_colors_follow_selection_position() {
        let data = vec![
            series("Atlantis", &[]),
            series("France", &[(1, 10.0), (2, 20.0)]),
        ];
        let svg = render_line_chart(&data, "Total Cases", &LineChartConfig::default()).unwrap();

        // the empty first series still owns the first color
        let france = format!(r#"stroke="{}" stroke-width="2" data-country="France""#, CATEGORY10[1]);
        assert!(svg.contains(&france));
        assert!(svg.contains("Atlantis (no data)"));
        assert!(svg.contains(&format!(r#"fill="{}"/><text x="18" y="10.0">Atlantis"#, CATEGORY10[0])));
    }

    #[test]
    fn test_shared_domain() {
        let config = LineChartConfig::default();
        let data = vec![
            series("A", &[(1, 0.0), (11, 100.0)]),
            series("B", &[(6, 50.0)]),
        ];
        let svg = render_line_chart(&data, "Total Cases", &config).unwrap();

        let width = config.width - config.margin.left - config.margin.right;
        let height = config.height - config.margin.top - config.margin.bottom;
        // B sits halfway along both axes
        let expected = format!("M{:.2},{:.2}", width / 2.0, height / 2.0);
        assert!(svg.contains(&expected), "missing {expected}");
        assert!(svg.contains(">2020-04-01</text>"));
        assert!(svg.contains(">2020-04-11</text>"));
    }

    /// Every y coordinate in a series path, in order
    fn path_ys(svg: &str, country: &str) -> Vec<f64> {
        let marker = format!(r#"data-country="{}""#, country);
        let line = svg.lines().find(|l| l.contains(&marker)).unwrap();
        let d = line.split(r#"d=""#).nth(1).unwrap().split('"').next().unwrap();
        d.split(['M', 'L'])
            .filter(|p| !p.is_empty())
            .map(|p| p.split(',').nth(1).unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_negative_values_stay_inside_plot() {
        let config = LineChartConfig::default();
        let height = config.height - config.margin.top - config.margin.bottom;
        let data = vec![series("X", &[(1, 100.0), (2, -400.0)])];
        let svg = render_line_chart(&data, "New Cases", &config).unwrap();

        let ys = path_ys(&svg, "X");
        assert_eq!(ys.len(), 2);
        assert!(ys.iter().all(|y| (0.0..=height + 1e-6).contains(y)), "{ys:?}");
        // 100 is the top of the domain, -400 the bottom
        assert!(ys[0].abs() < 0.01);
        assert!((ys[1] - height).abs() < 0.01);
        assert!(svg.contains(">-400</text>"));
        assert!(svg.contains(">0</text>"));
    }

    #[test]
    fn test_nothing_to_plot() {
        let data = vec![series("Atlantis", &[]), series("Lemuria", &[])];
        let svg = render_line_chart(&data, "Total Cases", &LineChartConfig::default()).unwrap();

        assert!(svg.contains("No data for selection"));
        assert!(svg.contains("Lemuria (no data)"));
        assert!(!svg.contains(r#"class="series""#));
    }

    #[test]
    fn test_empty_selection() {
        let svg = render_line_chart(&[], "Total Cases", &LineChartConfig::default()).unwrap();
        assert!(svg.contains("No data for selection"));
    }

    #[test]
    fn test_single_date() {
        let data = vec![series("A", &[(3, 7.0)])];
        let svg = render_line_chart(&data, "New Cases", &LineChartConfig::default()).unwrap();
        assert!(svg.contains(">2020-04-03</text>"));
        assert_eq!(svg.matches(">2020-04-03</text>").count(), 1);
    }
}
