// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic to scene coordinate transforms.

use core::f64::consts::{FRAC_PI_4, PI, TAU};

use kurbo::{Point, Vec2};

/// Size in scene units of the whole world at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Maps `(longitude, latitude)` in degrees to scene coordinates.
///
/// Features hand their source coordinates to a projection once per frame and
/// only when their geometry is dirty. A projection is treated as changed
/// when its [`scale`](Self::scale) or [`translate`](Self::translate) changes.
pub trait Projection {
    /// Projects a `(longitude, latitude)` point into scene space.
    fn project(&self, lonlat: Point) -> Point;

    /// Returns the scale factor (scene units per radian).
    fn scale(&self) -> f64;

    /// Returns the scene-space offset applied after scaling.
    fn translate(&self) -> Vec2;
}

/// Spherical Web Mercator with `k = 256 · 2^zoom / 2π`.
///
/// Latitudes are clamped to [`MAX_LATITUDE`] so that poles stay finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WebMercator {
    k: f64,
    translate: Vec2,
}

impl WebMercator {
    /// Creates a projection with an explicit scale and offset.
    #[must_use]
    pub const fn new(k: f64, translate: Vec2) -> Self {
        Self { k, translate }
    }

    /// Creates a projection for the given zoom level and offset.
    #[must_use]
    pub fn from_zoom(zoom: f64, translate: Vec2) -> Self {
        Self::new(scale_for_zoom(zoom), translate)
    }

    /// Returns the zoom level that corresponds to this projection's scale.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        (self.k * TAU / TILE_SIZE).log2()
    }

    /// Returns a copy with a different offset.
    #[must_use]
    pub const fn with_translate(self, translate: Vec2) -> Self {
        Self { translate, ..self }
    }

    /// Maps a scene point back to `(longitude, latitude)` in degrees.
    #[must_use]
    pub fn invert(&self, p: Point) -> Point {
        let x = (p.x - self.translate.x) / self.k;
        let y = -(p.y - self.translate.y) / self.k;
        let lat = 2.0 * y.exp().atan() - PI / 2.0;
        Point::new(x.to_degrees(), lat.to_degrees())
    }
}

impl Projection for WebMercator {
    fn project(&self, lonlat: Point) -> Point {
        let lambda = lonlat.x.to_radians();
        let phi = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = lambda * self.k + self.translate.x;
        let y = -(FRAC_PI_4 + phi / 2.0).tan().ln() * self.k + self.translate.y;
        Point::new(x, y)
    }

    fn scale(&self) -> f64 {
        self.k
    }

    fn translate(&self) -> Vec2 {
        self.translate
    }
}

/// Returns the Web Mercator scale factor for a zoom level.
#[must_use]
pub fn scale_for_zoom(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2() / TAU
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn origin_maps_to_translate() {
        let proj = WebMercator::from_zoom(17.0, Vec2::new(100.0, 50.0));
        assert!(close(proj.project(Point::ZERO), Point::new(100.0, 50.0)));
    }

    #[test]
    fn north_is_up() {
        let proj = WebMercator::from_zoom(0.0, Vec2::ZERO);
        let north = proj.project(Point::new(0.0, 10.0));
        let south = proj.project(Point::new(0.0, -10.0));
        assert!(north.y < 0.0);
        assert!(south.y > 0.0);
    }

    #[test]
    fn world_width_at_zoom_zero_is_one_tile() {
        let proj = WebMercator::from_zoom(0.0, Vec2::ZERO);
        let west = proj.project(Point::new(-180.0, 0.0));
        let east = proj.project(Point::new(180.0, 0.0));
        assert!((east.x - west.x - TILE_SIZE).abs() < 1e-9);
    }

    #[test]
    fn invert_round_trips() {
        let proj = WebMercator::from_zoom(16.5, Vec2::new(-3.0, 7.0));
        let lonlat = Point::new(-77.03, 38.89);
        assert!(close(proj.invert(proj.project(lonlat)), lonlat));
        assert!((proj.zoom() - 16.5).abs() < 1e-9);
    }

    #[test]
    fn poles_stay_finite() {
        let proj = WebMercator::from_zoom(2.0, Vec2::ZERO);
        let p = proj.project(Point::new(0.0, 90.0));
        assert!(p.y.is_finite());
    }
}
