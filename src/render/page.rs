//! HTML dashboard page

use super::svg::escape_xml;
use super::RenderResult;
use crate::aggregate::CountryKey;
use std::collections::HashSet;
use std::fmt::Write;

/// Everything the page needs: the rendered charts and the control state
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub title: String,
    pub map_svg: String,
    pub bars_svg: String,
    pub lines_svg: String,
    /// Every country that can be selected, sorted
    pub countries: Vec<String>,
    pub selected_countries: Vec<String>,
    /// Metric columns in dataset order
    pub metrics: Vec<String>,
    pub selected_metric: String,
}

const STYLE: &str = "body{font-family:sans-serif;margin:16px;color:#222}\
main{display:grid;grid-template-columns:1fr 1fr;gap:16px}\
.map{grid-column:1/3}\
form{display:flex;gap:12px;align-items:flex-start;margin:8px 0}\
select[multiple]{min-width:220px;height:140px}";

fn option(value: &str, selected: bool) -> String {
    let value = escape_xml(value);
    let selected = if selected { " selected" } else { "" };
    format!(r#"<option value="{value}"{selected}>{value}</option>"#)
}

/// Assemble the dashboard page
///
/// The controls are a plain GET form; submitting it reloads the page with
/// `country=..&country=..&metric=..` in the query string.
pub fn render_page(ctx: &PageContext) -> RenderResult<String> {
    let mut html = String::new();
    let title = escape_xml(&ctx.title);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, r#"<html lang="en"><head><meta charset="utf-8">"#)?;
    writeln!(html, "<title>{title}</title><style>{STYLE}</style></head><body>")?;
    writeln!(html, "<h1>{title}</h1>")?;

    writeln!(html, r#"<form method="get" action="/">"#)?;
    writeln!(html, r#"<label>Countries <select name="country" multiple>"#)?;
    let selected: HashSet<CountryKey> = ctx
        .selected_countries
        .iter()
        .map(|c| CountryKey::new(c))
        .collect();
    for country in &ctx.countries {
        html.push_str(&option(country, selected.contains(&CountryKey::new(country))));
    }
    writeln!(html, "</select></label>")?;

    writeln!(html, r#"<label>Metric <select name="metric">"#)?;
    for metric in &ctx.metrics {
        html.push_str(&option(metric, *metric == ctx.selected_metric));
    }
    writeln!(html, "</select></label>")?;
    writeln!(html, r#"<button type="submit">Update</button></form>"#)?;

    writeln!(html, "<main>")?;
    writeln!(html, r#"<section class="map">{}</section>"#, ctx.map_svg)?;
    writeln!(html, r#"<section class="bars">{}</section>"#, ctx.bars_svg)?;
    writeln!(html, r#"<section class="lines">{}</section>"#, ctx.lines_svg)?;
    writeln!(html, "</main></body></html>")?;

    Ok(html)
}
