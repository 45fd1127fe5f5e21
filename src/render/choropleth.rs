//! World choropleth

use super::color::{interpolate_reds, SequentialScale};
use super::format::{format_compact, format_count, metric_label};
use super::projection::Mercator;
use super::svg::{escape_xml, multipolygon_to_path, SvgDocument};
use super::{MapConfig, RenderResult};
use crate::aggregate::{CaseSummary, JoinAliases};
use crate::dataset::CountryFeature;
use std::fmt::Write;

const LEGEND_WIDTH: f64 = 240.0;
const LEGEND_HEIGHT: f64 = 10.0;
const LEGEND_STOPS: usize = 10;

/// Color domain for a render: fixed `[0, color_max]` or the summary's maximum
fn color_scale(summary: &CaseSummary, config: &MapConfig) -> SequentialScale {
    let max = if config.auto_domain {
        summary.max_value().filter(|m| *m > 0.0).unwrap_or(config.color_max)
    } else {
        config.color_max
    };
    SequentialScale::new(0.0, max)
}

/// Render every feature filled by its summarized value
///
/// Feature names go through `aliases` before the lookup; countries without
/// data get the bottom of the ramp.
pub fn render_choropleth(
    features: &[CountryFeature],
    summary: &CaseSummary,
    aliases: &JoinAliases,
    config: &MapConfig,
) -> RenderResult<String> {
    let mercator = Mercator::from_config(config);
    let project = |c: &geo::Coord<f64>| mercator.project(c);
    let scale = color_scale(summary, config);
    let label = metric_label(summary.metric());

    let mut doc = SvgDocument::new(config.width, config.height, "choropleth")?;
    doc.style(&format!(
        ".country{{stroke:{};stroke-width:0.5}}.country:hover{{fill:{}}}\
         .legend text{{font:10px sans-serif}}",
        config.stroke, config.highlight
    ))?;

    writeln!(doc, r#"<g class="countries">"#)?;
    for feature in features {
        if feature.is_empty() {
            continue;
        }
        let value = summary.lookup(aliases.resolve(&feature.name));
        let name = escape_xml(&feature.name);
        writeln!(
            doc,
            r#"<path class="country" d="{}" fill="{}" data-name="{}" data-value="{}"><title>{}&#10;{}: {}</title></path>"#,
            multipolygon_to_path(&feature.geometry, &project),
            scale.color(value),
            name,
            value,
            name,
            escape_xml(&label),
            format_count(value),
        )?;
    }
    writeln!(doc, "</g>")?;

    if config.legend {
        write_legend(&mut doc, &scale, &label, config)?;
    }

    doc.finish()
}

/// Horizontal gradient bar with min/mid/max labels, bottom left corner
fn write_legend(
    doc: &mut SvgDocument,
    scale: &SequentialScale,
    label: &str,
    config: &MapConfig,
) -> RenderResult<()> {
    let (min, max) = scale.domain();
    let x = 20.0;
    let y = config.height - 40.0;

    writeln!(doc, r#"<defs><linearGradient id="legend-ramp">"#)?;
    for i in 0..=LEGEND_STOPS {
        let t = i as f64 / LEGEND_STOPS as f64;
        writeln!(
            doc,
            r#"<stop offset="{:.0}%" stop-color="{}"/>"#,
            t * 100.0,
            interpolate_reds(t)
        )?;
    }
    writeln!(doc, "</linearGradient></defs>")?;

    writeln!(doc, r#"<g class="legend" transform="translate({x},{y})">"#)?;
    writeln!(doc, r#"<text x="0" y="-6">{}</text>"#, escape_xml(label))?;
    writeln!(
        doc,
        r#"<rect width="{LEGEND_WIDTH}" height="{LEGEND_HEIGHT}" fill="url(#legend-ramp)" stroke="{}"/>"#,
        escape_xml(&config.stroke)
    )?;
    for (offset, value) in [(0.0, min), (0.5, (min + max) / 2.0), (1.0, max)] {
        writeln!(
            doc,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            offset * LEGEND_WIDTH,
            LEGEND_HEIGHT + 12.0,
            format_compact(value)
        )?;
    }
    writeln!(doc, "</g>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + 5.0, y: y),
            (x: x + 5.0, y: y + 5.0),
            (x: x, y: y + 5.0),
            (x: x, y: y),
        ]])
    }

    fn summary() -> CaseSummary {
        let mut summary = CaseSummary::empty("total_cases");
        summary.observe("United States", 40_000_000.0);
        summary.observe("France", 1_234_567.0);
        summary
    }

    #[test]
    fn test_one_path_per_feature() {
        let features = vec![
            CountryFeature::new("France", square(0.0, 45.0)),
            CountryFeature::new("Atlantis", square(-30.0, 10.0)),
            CountryFeature::new("Nowhere", MultiPolygon::new(vec![])),
        ];
        let svg = render_choropleth(&features, &summary(), &JoinAliases::empty(), &MapConfig::default())
            .unwrap();

        assert_eq!(svg.matches(r#"class="country""#).count(), 2);
        assert!(svg.contains("France&#10;Total Cases: 1,234,567"));
        assert!(svg.contains("Atlantis&#10;Total Cases: 0"));
        // missing data falls to the light end of the ramp
        assert!(svg.contains(r##"fill="#fff5f0" data-name="Atlantis""##));
    }

    #[test]
    fn test_alias_resolves_feature_name() {
        let features = vec![CountryFeature::new("United States of America", square(-100.0, 35.0))];
        let svg = render_choropleth(&features, &summary(), &JoinAliases::world_atlas(), &MapConfig::default())
            .unwrap();

        assert!(svg.contains("Total Cases: 40,000,000"));
        assert!(svg.contains(r##"fill="#67000d""##));
    }

    #[test]
    fn test_auto_domain_uses_summary_max() {
        let features = vec![CountryFeature::new("France", square(0.0, 45.0))];
        let mut small = CaseSummary::empty("total_cases");
        small.observe("France", 2_000_000.0);
        let config = MapConfig {
            auto_domain: true,
            ..MapConfig::default()
        };
        let svg = render_choropleth(&features, &small, &JoinAliases::empty(), &config).unwrap();

        assert!(svg.contains(">2M</text>"));
        assert!(svg.contains(">1M</text>"));
        assert!(svg.contains(r##"fill="#67000d" data-name="France""##));
    }

    #[test]
    fn test_hover_and_legend_toggle() {
        let config = MapConfig {
            legend: false,
            highlight: "gold".to_string(),
            ..MapConfig::default()
        };
        let svg = render_choropleth(&[], &summary(), &JoinAliases::empty(), &config).unwrap();

        assert!(svg.contains(".country:hover{fill:gold}"));
        assert!(!svg.contains("legend-ramp"));
    }

    #[test]
    fn test_names_are_escaped() {
        let features = vec![CountryFeature::new("Trinidad & Tobago", square(-61.0, 10.0))];
        let svg = render_choropleth(&features, &summary(), &JoinAliases::empty(), &MapConfig::default())
            .unwrap();

        assert!(svg.contains(r#"data-name="Trinidad &amp; Tobago""#));
        assert!(!svg.contains("Trinidad & Tobago"));
    }
}
