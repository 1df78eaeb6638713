//! Spherical Mercator projection into map pixel space.

use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use super::Vec2;

/// Default pixel scale: the full 360° of longitude spans 961 px.
pub const MERCATOR_DEFAULT_SCALE: f64 = 961.0 / TAU;

/// Latitude at which the square Mercator world ends.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MercatorProjection {
    pub scale: f64,
    /// Pixel position of (0°, 0°).
    pub translate: Vec2,
}

impl MercatorProjection {
    pub fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// Default scale, prime meridian centered, equator at two thirds of the height.
    pub fn for_viewport(width: f64, height: f64) -> Self {
        Self::new(
            MERCATOR_DEFAULT_SCALE,
            Vec2::new(width / 2.0, height / 1.5),
        )
    }

    pub fn project(&self, p: LonLat) -> Vec2 {
        let lambda = p.lon_deg.to_radians();
        let phi = p
            .lat_deg
            .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
            .to_radians();
        let y = (FRAC_PI_4 + phi / 2.0).tan().ln();
        Vec2::new(
            self.translate.x + self.scale * lambda,
            self.translate.y - self.scale * y,
        )
    }

    pub fn invert(&self, px: Vec2) -> LonLat {
        let lambda = (px.x - self.translate.x) / self.scale;
        let y = (self.translate.y - px.y) / self.scale;
        let phi = 2.0 * y.exp().atan() - FRAC_PI_2;
        LonLat::new(lambda.to_degrees(), phi.to_degrees())
    }
}
