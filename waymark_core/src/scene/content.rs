// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable node content: sprites, vector graphics and colors.

use core::fmt;

use kurbo::{Line, Point, Rect, Size, Vec2};

use crate::texture::Texture;

/// A packed `0xRRGGBB` color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Opaque white, the neutral tint.
    pub const WHITE: Self = Self(0xff_ff_ff);
    /// Yellow used by hover and selection halos.
    pub const YELLOW: Self = Self(0xff_ff_00);
    /// Light gray used for labels.
    pub const LIGHT_GRAY: Self = Self(0xee_ee_ee);
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:06x})", self.0)
    }
}

/// What a node draws on its own (children are drawn separately).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeContent {
    /// A grouping node with nothing of its own to draw.
    #[default]
    Empty,
    /// A textured quad placed according to the node's anchor.
    Sprite(Texture),
    /// Vector strokes and fills in the node's local space.
    Graphics(Graphics),
}

impl NodeContent {
    /// Returns the local-space bounds of this content, if it draws anything.
    ///
    /// Sprite bounds are the texture rectangle shifted by `anchor` (a fraction
    /// of the texture size), before the node's own scale is applied.
    #[must_use]
    pub fn bounds(&self, anchor: Vec2) -> Option<Rect> {
        match self {
            Self::Empty => None,
            Self::Sprite(texture) => Some(sprite_rect(texture.size, anchor)),
            Self::Graphics(graphics) => graphics.bounds(),
        }
    }
}

/// Returns the rectangle covered by a sprite of `size` with the given anchor.
#[must_use]
pub fn sprite_rect(size: Size, anchor: Vec2) -> Rect {
    let x0 = -anchor.x * size.width;
    let y0 = -anchor.y * size.height;
    Rect::new(x0, y0, x0 + size.width, y0 + size.height)
}

/// Stroke parameters for outlines and dashed decorations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Line width in scene units.
    pub width: f64,
    /// Stroke color.
    pub color: Color,
    /// Stroke opacity (0.0–1.0).
    pub alpha: f32,
}

/// A single vector drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// A connected polyline, optionally closed back to its first point.
    Polyline {
        /// Vertices in local coordinates.
        points: Vec<Point>,
        /// Whether the last vertex connects back to the first.
        closed: bool,
        /// Stroke style.
        stroke: Stroke,
    },
    /// A filled polygon ring.
    Fill {
        /// Ring vertices in local coordinates.
        points: Vec<Point>,
        /// Fill color.
        color: Color,
        /// Fill opacity (0.0–1.0).
        alpha: f32,
    },
    /// Independent line segments (used for dashed outlines).
    Segments {
        /// Segments in local coordinates.
        lines: Vec<Line>,
        /// Stroke style.
        stroke: Stroke,
    },
}

impl DrawCommand {
    fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Polyline { points, stroke, .. } => {
                points_bbox(points.iter().copied()).map(|r| r.inflate(stroke.width / 2.0, stroke.width / 2.0))
            }
            Self::Fill { points, .. } => points_bbox(points.iter().copied()),
            Self::Segments { lines, stroke } => {
                points_bbox(lines.iter().flat_map(|l| [l.p0, l.p1]))
                    .map(|r| r.inflate(stroke.width / 2.0, stroke.width / 2.0))
            }
        }
    }
}

/// A retained list of vector drawing commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graphics {
    commands: Vec<DrawCommand>,
}

impl Graphics {
    /// Creates an empty graphics list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Removes every command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns the recorded commands in draw order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the union of all command bounds, including stroke widths.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.commands
            .iter()
            .filter_map(DrawCommand::bounds)
            .reduce(|a, b| a.union(b))
    }
}

/// Bounding box of a point sequence, or `None` if it is empty.
pub(crate) fn points_bbox(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::TextureId;

    #[test]
    fn sprite_bounds_follow_anchor() {
        let texture = Texture::new(TextureId(1), Size::new(20.0, 30.0));
        let content = NodeContent::Sprite(texture);
        assert_eq!(
            content.bounds(Vec2::new(0.5, 0.5)),
            Some(Rect::new(-10.0, -15.0, 10.0, 15.0))
        );
        assert_eq!(
            content.bounds(Vec2::new(0.5, 1.0)),
            Some(Rect::new(-10.0, -30.0, 10.0, 0.0))
        );
    }

    #[test]
    fn empty_content_has_no_bounds() {
        assert_eq!(NodeContent::Empty.bounds(Vec2::ZERO), None);
        assert_eq!(Graphics::new().bounds(), None);
    }

    #[test]
    fn graphics_bounds_include_stroke_width() {
        let mut g = Graphics::new();
        g.push(DrawCommand::Polyline {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            closed: false,
            stroke: Stroke {
                width: 4.0,
                color: Color::WHITE,
                alpha: 1.0,
            },
        });
        assert_eq!(g.bounds(), Some(Rect::new(-2.0, -2.0, 12.0, 2.0)));
    }

    #[test]
    fn color_debug_is_hex() {
        assert_eq!(format!("{:?}", Color::YELLOW), "Color(#ffff00)");
    }
}
