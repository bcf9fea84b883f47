// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover and selection decorations.
//!
//! Two independent decorations exist per feature:
//!
//! - the **hover glow**, a [`GlowFilter`] attached directly to the feature's
//!   container while it is hovered;
//! - the **selection halo**, a dashed outline of the feature's hit area drawn
//!   in a separate node that lives in the scene's
//!   [`OverlayLayer`](crate::overlay::OverlayLayer), so that it draws above all
//!   feature content.
//!
//! Visual parameters are fixed: [`HOVER_GLOW`] and [`SELECTION_HALO`].

use kurbo::{BezPath, Line, PathEl, Point};

use crate::hit_area::HitArea;
use crate::scene::{Color, DrawCommand, Graphics, Stroke};

/// A glow post-effect applied to a node and its subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowFilter {
    /// Glow reach in scene units.
    pub distance: f64,
    /// Strength of the outer glow.
    pub outer_strength: f64,
    /// Glow color.
    pub color: Color,
    /// Render-target resolution multiplier.
    pub resolution: f64,
}

/// Stroke and dash parameters for a selection halo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HaloStyle {
    /// Halo opacity.
    pub alpha: f32,
    /// Dash pattern as `[on, off]` lengths.
    pub dash: [f64; 2],
    /// Stroke width.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
}

/// Glow applied to hovered features.
pub const HOVER_GLOW: GlowFilter = GlowFilter {
    distance: 15.0,
    outer_strength: 3.0,
    color: Color::YELLOW,
    resolution: 2.0,
};

/// Dashed outline drawn around selected features.
pub const SELECTION_HALO: HaloStyle = HaloStyle {
    alpha: 0.9,
    dash: [6.0, 3.0],
    width: 2.0,
    color: Color::YELLOW,
};

/// Which decoration an event or predicate refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HaloKind {
    /// Hover glow on the feature container.
    Hover,
    /// Dashed selection outline in the overlay layer.
    Select,
}

/// What happened to a decoration during one update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HaloChange {
    /// No change.
    #[default]
    None,
    /// The decoration was created.
    Attached,
    /// The decoration was removed.
    Released,
}

/// Builds the selection halo graphics for a hit area.
///
/// The outline is dashed with `style.dash` starting at phase zero. Dashes
/// that run around a corner produce one segment per side of the corner. A
/// missing hit area (e.g. while drawing) yields empty graphics.
#[must_use]
pub fn selection_graphics(hit_area: Option<&HitArea>, style: &HaloStyle) -> Graphics {
    let mut graphics = Graphics::new();
    let Some(area) = hit_area else {
        return graphics;
    };
    let lines = dash_segments(&outline_path(area), &style.dash);
    if !lines.is_empty() {
        graphics.push(DrawCommand::Segments {
            lines,
            stroke: Stroke {
                width: style.width,
                color: style.color,
                alpha: style.alpha,
            },
        });
    }
    graphics
}

fn outline_path(area: &HitArea) -> BezPath {
    let (points, closed) = area.outline();
    let mut path = BezPath::new();
    let mut points = points.into_iter();
    if let Some(first) = points.next() {
        path.move_to(first);
        for p in points {
            path.line_to(p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

/// Runs `path` through [`kurbo::dash`] and flattens the dashes into line
/// segments. Zero-length pieces are dropped.
fn dash_segments(path: &BezPath, pattern: &[f64]) -> Vec<Line> {
    let mut lines = Vec::new();
    if pattern.iter().all(|&d| d <= 0.0) {
        return lines;
    }
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;
    let mut push = |from: Point, to: Point| {
        if from != to {
            lines.push(Line::new(from, to));
        }
    };
    for el in kurbo::dash(path.iter(), 0.0, pattern) {
        match el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                push(current, p);
                current = p;
            }
            PathEl::ClosePath => {
                push(current, start);
                current = start;
            }
            // Not produced for polygonal outlines.
            PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                push(current, p);
                current = p;
            }
        }
    }
    lines
}
