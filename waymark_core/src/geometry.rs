// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source coordinates and their projected scene-space counterparts.

use kurbo::{Point, Rect};

use crate::projection::Projection;
use crate::scene::points_bbox;

/// Coordinates owned by a single feature.
///
/// `orig_coords` are the source `(longitude, latitude)` pairs; `coords` are
/// their projections, valid after [`update`](Self::update). A new geometry,
/// or one given new source coordinates, starts dirty.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    orig_coords: Vec<Point>,
    coords: Vec<Point>,
    extent: Rect,
    area: f64,
    dirty: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    /// Creates an empty, dirty geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orig_coords: Vec::new(),
            coords: Vec::new(),
            extent: Rect::ZERO,
            area: 0.0,
            dirty: true,
        }
    }

    /// Creates a geometry from source coordinates.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is not finite.
    #[must_use]
    pub fn from_coords(orig_coords: Vec<Point>) -> Self {
        let mut geometry = Self::new();
        geometry.set_coords(orig_coords);
        geometry
    }

    /// Replaces the source coordinates and marks the geometry dirty.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is not finite.
    pub fn set_coords(&mut self, orig_coords: Vec<Point>) {
        assert!(
            orig_coords.iter().all(|p| p.is_finite()),
            "non-finite source coordinate"
        );
        self.orig_coords = orig_coords;
        self.dirty = true;
    }

    /// Replaces the source coordinates with a single point.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is not finite.
    pub fn set_point(&mut self, lonlat: Point) {
        self.set_coords(vec![lonlat]);
    }

    /// Forces reprojection on the next [`update`](Self::update).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the projected coordinates are stale.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Reprojects the source coordinates if dirty, then clears the flag.
    ///
    /// Returns whether any work was done.
    pub fn update(&mut self, projection: &dyn Projection) -> bool {
        if !self.dirty {
            return false;
        }
        self.coords.clear();
        self.coords
            .extend(self.orig_coords.iter().map(|&p| projection.project(p)));
        self.extent = points_bbox(self.coords.iter().copied()).unwrap_or(Rect::ZERO);
        self.area = ring_area(&self.coords);
        self.dirty = false;
        true
    }

    /// Returns the source `(longitude, latitude)` coordinates.
    #[must_use]
    pub fn orig_coords(&self) -> &[Point] {
        &self.orig_coords
    }

    /// Returns the projected scene coordinates.
    #[must_use]
    pub fn coords(&self) -> &[Point] {
        &self.coords
    }

    /// Returns the first source coordinate (the location of a point feature).
    #[must_use]
    pub fn orig_coord(&self) -> Option<Point> {
        self.orig_coords.first().copied()
    }

    /// Returns the first projected coordinate.
    #[must_use]
    pub fn coord(&self) -> Option<Point> {
        self.coords.first().copied()
    }

    /// Returns the source latitude of the first coordinate, or `0.0` if
    /// there are no coordinates.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.orig_coord().map_or(0.0, |p| p.y)
    }

    /// Returns the bounding box of the projected coordinates.
    #[must_use]
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Returns the area enclosed by the projected coordinates treated as a
    /// closed ring, in square scene units. Fewer than three points enclose
    /// nothing.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Shoelace area of a ring (implicitly closed), unsigned.
fn ring_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    (twice / 2.0).abs()
}
