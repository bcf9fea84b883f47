// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction shapes attached to feature containers.
//!
//! A hit area lives in its node's local space. It is what pointer handling
//! tests against (see [`NodeStore::hit_test`](crate::scene::NodeStore::hit_test))
//! and what the selection halo outlines.

use kurbo::{BezPath, Circle, Line, ParamCurveNearest, Point, Rect, Shape};

/// Smallest interactive target, in scene units, for point markers.
pub const MIN_HIT_SIZE: f64 = 20.0;

/// Extra radius added around circular markers after growing to
/// [`MIN_HIT_SIZE`].
pub const CIRCLE_PADDING: f64 = 2.0;

/// Extra margin added on every side of rectangular markers after growing to
/// [`MIN_HIT_SIZE`].
pub const RECT_PADDING: f64 = 4.0;

/// Smallest stroke width used for line hit testing.
pub const MIN_LINE_HIT_WIDTH: f64 = 10.0;

/// Number of segments used to approximate a circle outline.
pub const CIRCLE_OUTLINE_SEGMENTS: usize = 20;

/// Accuracy passed to curve-nearest queries on straight segments.
const NEAREST_ACCURACY: f64 = 1e-6;

/// A shape that receives pointer hits.
#[derive(Clone, Debug, PartialEq)]
pub enum HitArea {
    /// A circle (round markers).
    Circle(Circle),
    /// An axis-aligned rectangle (pins and other markers).
    Rect(Rect),
    /// A closed polygon ring (areas).
    Polygon(Vec<Point>),
    /// A stroked polyline of the given total width (lines).
    Polyline {
        /// Polyline vertices.
        points: Vec<Point>,
        /// Total hit width; a point hits within `width / 2` of the line.
        width: f64,
    },
}

impl HitArea {
    /// Returns whether `p` (in the same local space) hits this area.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Circle(circle) => (p - circle.center).hypot() <= circle.radius,
            Self::Rect(rect) => {
                p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
            }
            Self::Polygon(ring) => ring.len() >= 3 && ring_path(ring).contains(p),
            Self::Polyline { points, width } => {
                let reach_sq = (width / 2.0) * (width / 2.0);
                match points.as_slice() {
                    [] => false,
                    [only] => (p - *only).hypot2() <= reach_sq,
                    _ => points.windows(2).any(|w| {
                        Line::new(w[0], w[1]).nearest(p, NEAREST_ACCURACY).distance_sq <= reach_sq
                    }),
                }
            }
        }
    }

    /// Returns the axis-aligned bounding box of this area.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Circle(circle) => circle.bounding_box(),
            Self::Rect(rect) => *rect,
            Self::Polygon(ring) => crate::scene::points_bbox(ring.iter().copied()).unwrap_or(Rect::ZERO),
            Self::Polyline { points, width } => crate::scene::points_bbox(points.iter().copied())
                .map(|r| r.inflate(width / 2.0, width / 2.0))
                .unwrap_or(Rect::ZERO),
        }
    }

    /// Returns the outline vertices of this area and whether the outline is
    /// closed. Circles are approximated with [`CIRCLE_OUTLINE_SEGMENTS`]
    /// vertices starting at angle zero.
    #[must_use]
    pub fn outline(&self) -> (Vec<Point>, bool) {
        match self {
            Self::Circle(circle) => {
                let step = core::f64::consts::TAU / CIRCLE_OUTLINE_SEGMENTS as f64;
                let points = (0..CIRCLE_OUTLINE_SEGMENTS)
                    .map(|i| {
                        let (s, c) = (step * i as f64).sin_cos();
                        Point::new(
                            circle.center.x + circle.radius * c,
                            circle.center.y + circle.radius * s,
                        )
                    })
                    .collect();
                (points, true)
            }
            Self::Rect(rect) => (
                vec![
                    Point::new(rect.x0, rect.y0),
                    Point::new(rect.x1, rect.y0),
                    Point::new(rect.x1, rect.y1),
                    Point::new(rect.x0, rect.y1),
                ],
                true,
            ),
            Self::Polygon(ring) => (ring.clone(), true),
            Self::Polyline { points, .. } => (points.clone(), false),
        }
    }
}

/// Computes the hit area for a point marker from the marker's natural
/// (unscaled) local bounds.
///
/// The area only ever grows: a marker smaller than [`MIN_HIT_SIZE`] is grown
/// to it, then padded by [`CIRCLE_PADDING`] or [`RECT_PADDING`]. Circular
/// areas are centered on the node origin.
#[must_use]
pub fn marker_hit_area(marker_bounds: Rect, circular: bool) -> HitArea {
    if circular {
        let radius = (marker_bounds.width() / 2.0).max(MIN_HIT_SIZE / 2.0) + CIRCLE_PADDING;
        HitArea::Circle(Circle::new(Point::ZERO, radius))
    } else {
        let mut rect = marker_bounds;
        if rect.width() < MIN_HIT_SIZE {
            rect = rect.inflate((MIN_HIT_SIZE - rect.width()) / 2.0, 0.0);
        }
        if rect.height() < MIN_HIT_SIZE {
            rect = rect.inflate(0.0, (MIN_HIT_SIZE - rect.height()) / 2.0);
        }
        HitArea::Rect(rect.inflate(RECT_PADDING, RECT_PADDING))
    }
}

fn ring_path(ring: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(ring[0]);
    for &p in &ring[1..] {
        path.line_to(p);
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_rect_marker_grows_to_minimum_plus_padding() {
        let area = marker_hit_area(Rect::new(-2.0, -2.0, 2.0, 2.0), false);
        let HitArea::Rect(r) = area else {
            panic!("expected a rectangle");
        };
        assert_eq!(r.width(), MIN_HIT_SIZE + 2.0 * RECT_PADDING);
        assert_eq!(r.height(), MIN_HIT_SIZE + 2.0 * RECT_PADDING);
        assert_eq!(r.center(), Point::ZERO);
    }

    #[test]
    fn large_rect_marker_is_not_shrunk() {
        let area = marker_hit_area(Rect::new(-20.0, -40.0, 20.0, 0.0), false);
        assert_eq!(area, HitArea::Rect(Rect::new(-24.0, -44.0, 24.0, 4.0)));
    }

    #[test]
    fn tiny_circle_marker_grows_to_minimum_radius() {
        let area = marker_hit_area(Rect::new(-2.0, -2.0, 2.0, 2.0), true);
        assert_eq!(area, HitArea::Circle(Circle::new(Point::ZERO, 12.0)));
    }

    #[test]
    fn large_circle_marker_keeps_radius() {
        let area = marker_hit_area(Rect::new(-20.0, -20.0, 20.0, 20.0), true);
        assert_eq!(area, HitArea::Circle(Circle::new(Point::ZERO, 22.0)));
    }

    #[test]
    fn contains_checks_each_shape() {
        let circle = HitArea::Circle(Circle::new(Point::ZERO, 5.0));
        assert!(circle.contains(Point::new(3.0, 3.0)));
        assert!(!circle.contains(Point::new(4.0, 4.0)));

        let square = HitArea::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(square.contains(Point::new(5.0, 5.0)));
        assert!(!square.contains(Point::new(15.0, 5.0)));

        let line = HitArea::Polyline {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            width: 10.0,
        };
        assert!(line.contains(Point::new(50.0, 4.0)));
        assert!(!line.contains(Point::new(50.0, 6.0)));
    }

    #[test]
    fn circle_outline_has_twenty_vertices() {
        let (points, closed) = HitArea::Circle(Circle::new(Point::ZERO, 10.0)).outline();
        assert!(closed);
        assert_eq!(points.len(), CIRCLE_OUTLINE_SEGMENTS);
        assert!((points[0] - Point::new(10.0, 0.0)).hypot() < 1e-9);
    }
}
