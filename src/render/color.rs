//! Color scales
//!
//! Sequential "Reds" ramp for the choropleth (ColorBrewer 9-class, smoothed
//! with a uniform B-spline) and a categorical palette for line series.

use std::fmt;

/// ColorBrewer Reds, 9 classes
const REDS: [(u8, u8, u8); 9] = [
    (0xff, 0xf5, 0xf0),
    (0xfe, 0xe0, 0xd2),
    (0xfc, 0xbb, 0xa1),
    (0xfc, 0x92, 0x72),
    (0xfb, 0x6a, 0x4a),
    (0xef, 0x3b, 0x2c),
    (0xcb, 0x18, 0x1d),
    (0xa5, 0x0f, 0x15),
    (0x67, 0x00, 0x0d),
];

/// Categorical palette for series
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Uniform cubic B-spline segment
fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// B-spline through `values`, passing exactly through both ends
fn spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let t = t.clamp(0.0, 1.0);
    let i = if t >= 1.0 {
        n - 1
    } else {
        (t * n as f64).floor() as usize
    };

    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Sample the Reds ramp at `t` in `[0, 1]` (values outside are clamped)
pub fn interpolate_reds(t: f64) -> Rgb {
    let r: Vec<f64> = REDS.iter().map(|c| c.0 as f64).collect();
    let g: Vec<f64> = REDS.iter().map(|c| c.1 as f64).collect();
    let b: Vec<f64> = REDS.iter().map(|c| c.2 as f64).collect();

    Rgb(
        channel(spline(&r, t)),
        channel(spline(&g, t)),
        channel(spline(&b, t)),
    )
}

/// Linear domain mapped onto the Reds ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    min: f64,
    max: f64,
}

impl SequentialScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `value` in the domain, clamped to `[0, 1]`
    ///
    /// A degenerate domain maps everything to the middle of the ramp.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        interpolate_reds(self.normalize(value))
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}
