//! Chart rendering
//!
//! Pure SVG renderers for the three dashboard views plus the HTML page that
//! hosts them. Every renderer is a function of `(data, config)`; projections,
//! scales and palettes are built from the config passed in rather than kept
//! around between renders.
//!
//! - **choropleth**: world map filled by the case summary
//! - **bar_chart**: horizontal top-N ranking
//! - **line_chart**: overlaid per-country series with a legend
//! - **page**: HTML document with the selection controls
//! - **projection** / **color** / **format** / **svg**: shared helpers

pub mod bar_chart;
pub mod choropleth;
pub mod color;
pub mod format;
pub mod line_chart;
pub mod page;
pub mod projection;
pub mod svg;

pub use bar_chart::render_bar_chart;
pub use choropleth::render_choropleth;
pub use color::{interpolate_reds, Rgb, SequentialScale, CATEGORY10};
pub use format::{format_compact, format_count, metric_label};
pub use line_chart::render_line_chart;
pub use page::{render_page, PageContext};
pub use projection::Mercator;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing into the output buffer failed
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type alias for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Rendering configuration for all three charts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub bars: BarChartConfig,

    #[serde(default)]
    pub lines: LineChartConfig,
}

/// Chart margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Choropleth map configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: f64,

    #[serde(default = "default_map_height")]
    pub height: f64,

    /// Mercator scale factor
    #[serde(default = "default_map_scale")]
    pub scale: f64,

    /// Projection center in pixels; defaults to `[width / 2, height / 1.5]`
    #[serde(default)]
    pub translate: Option<[f64; 2]>,

    /// Upper end of the color domain
    #[serde(default = "default_color_max")]
    pub color_max: f64,

    /// Use the summary's maximum as the upper end instead of `color_max`
    #[serde(default)]
    pub auto_domain: bool,

    #[serde(default = "default_map_stroke")]
    pub stroke: String,

    /// Fill while hovering a country
    #[serde(default = "default_map_highlight")]
    pub highlight: String,

    #[serde(default = "default_true")]
    pub legend: bool,
}

fn default_map_width() -> f64 {
    960.0
}

fn default_map_height() -> f64 {
    600.0
}

fn default_map_scale() -> f64 {
    130.0
}

fn default_color_max() -> f64 {
    40_000_000.0
}

fn default_map_stroke() -> String {
    "#999".to_string()
}

fn default_map_highlight() -> String {
    "orange".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
            scale: default_map_scale(),
            translate: None,
            color_max: default_color_max(),
            auto_domain: false,
            stroke: default_map_stroke(),
            highlight: default_map_highlight(),
            legend: true,
        }
    }
}

impl MapConfig {
    /// Projection center, falling back to `[width / 2, height / 1.5]`
    pub fn translate(&self) -> [f64; 2] {
        self.translate
            .unwrap_or([self.width / 2.0, self.height / 1.5])
    }
}

/// Horizontal bar chart configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BarChartConfig {
    #[serde(default = "default_bar_width")]
    pub width: f64,

    #[serde(default = "default_bar_height")]
    pub height: f64,

    #[serde(default = "default_bar_margin")]
    pub margin: Margin,

    #[serde(default = "default_bar_color")]
    pub bar_color: String,

    /// Fraction of each band left empty between bars
    #[serde(default = "default_bar_padding")]
    pub padding: f64,
}

fn default_bar_width() -> f64 {
    640.0
}

fn default_bar_height() -> f64 {
    400.0
}

fn default_bar_margin() -> Margin {
    Margin::new(30.0, 80.0, 30.0, 150.0)
}

fn default_bar_color() -> String {
    "#cb181d".to_string()
}

fn default_bar_padding() -> f64 {
    0.1
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            width: default_bar_width(),
            height: default_bar_height(),
            margin: default_bar_margin(),
            bar_color: default_bar_color(),
            padding: default_bar_padding(),
        }
    }
}

/// Multi-series line chart configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LineChartConfig {
    #[serde(default = "default_line_width")]
    pub width: f64,

    #[serde(default = "default_line_height")]
    pub height: f64,

    #[serde(default = "default_line_margin")]
    pub margin: Margin,

    /// Series colors, assigned by selection position
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_line_width() -> f64 {
    800.0
}

fn default_line_height() -> f64 {
    400.0
}

fn default_line_margin() -> Margin {
    Margin::new(30.0, 160.0, 40.0, 80.0)
}

fn default_palette() -> Vec<String> {
    CATEGORY10.iter().map(|c| c.to_string()).collect()
}

fn default_stroke_width() -> f64 {
    2.0
}

impl Default for LineChartConfig {
    fn default() -> Self {
        Self {
            width: default_line_width(),
            height: default_line_height(),
            margin: default_line_margin(),
            palette: default_palette(),
            stroke_width: default_stroke_width(),
        }
    }
}

impl LineChartConfig {
    /// Color for the series at `index` in the selection
    pub fn color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return CATEGORY10[index % CATEGORY10.len()];
        }
        &self.palette[index % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_translate() {
        let config = MapConfig::default();
        assert_eq!(config.translate(), [480.0, 400.0]);

        let pinned = MapConfig {
            translate: Some([10.0, 20.0]),
            ..MapConfig::default()
        };
        assert_eq!(pinned.translate(), [10.0, 20.0]);
    }

    #[test]
    fn test_palette_wraps() {
        let config = LineChartConfig {
            palette: vec!["#000".to_string(), "#fff".to_string()],
            ..LineChartConfig::default()
        };
        assert_eq!(config.color(0), "#000");
        assert_eq!(config.color(3), "#fff");

        let empty = LineChartConfig {
            palette: Vec::new(),
            ..LineChartConfig::default()
        };
        assert_eq!(empty.color(1), CATEGORY10[1]);
    }

    #[test]
    fn test_partial_toml() {
        let config: RenderConfig = toml::from_str(
            r#"
            [map]
            color_max = 1000.0
            [lines]
            palette = ["red"]
            "#,
        )
        .unwrap();

        assert_eq!(config.map.color_max, 1000.0);
        assert_eq!(config.map.scale, 130.0);
        assert_eq!(config.lines.color(5), "red");
        assert_eq!(config.bars.width, 640.0);
    }
}
