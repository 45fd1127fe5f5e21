//! Mercator projection

use super::MapConfig;
use geo::Coord;
use std::f64::consts::FRAC_PI_4;

/// Latitude where the Mercator square ends
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Mercator: lon/lat degrees → SVG pixels (Y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    scale: f64,
    translate: [f64; 2],
}

impl Mercator {
    pub fn new(scale: f64, translate: [f64; 2]) -> Self {
        Self { scale, translate }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.scale, config.translate())
    }

    /// Project one coordinate; latitudes beyond the poles' cutoff are clamped
    pub fn project(&self, coord: &Coord<f64>) -> (f64, f64) {
        let lambda = coord.x.to_radians();
        let phi = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let y = (FRAC_PI_4 + phi / 2.0).tan().ln();

        (
            self.translate[0] + self.scale * lambda,
            self.translate[1] - self.scale * y,
        )
    }
}
