// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style records and their resolution from partial updates.
//!
//! Callers describe a style as a partial record ([`PointStyleUpdate`],
//! [`PathStyleUpdate`]) where every field is optional. Resolution fills each
//! missing field from a fixed default record, so renderers only ever see a
//! complete [`PointStyle`] or [`PathStyle`]. Resolution always starts from
//! the defaults, never from the previously resolved style.

use crate::scene::{Color, Stroke};
use crate::texture::Texture;

/// Fully resolved style of a point marker.
#[derive(Clone, Debug, PartialEq)]
pub struct PointStyle {
    /// Marker texture name.
    pub marker_name: String,
    /// Explicit marker texture; overrides `marker_name` and disables the
    /// circular hit shape.
    pub marker_texture: Option<Texture>,
    /// Marker tint.
    pub marker_tint: Color,
    /// Viewfield directions in degrees, clockwise from north.
    pub viewfield_angles: Vec<f64>,
    /// Viewfield texture name.
    pub viewfield_name: String,
    /// Explicit viewfield texture; overrides `viewfield_name`.
    pub viewfield_texture: Option<Texture>,
    /// Viewfield tint.
    pub viewfield_tint: Color,
    /// Icon name; empty for no icon.
    pub icon_name: String,
    /// Explicit icon texture; overrides `icon_name`.
    pub icon_texture: Option<Texture>,
    /// Icon opacity.
    pub icon_alpha: f32,
    /// Label tint, carried for label renderers.
    pub label_tint: Color,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            marker_name: "smallCircle".to_owned(),
            marker_texture: None,
            marker_tint: Color::WHITE,
            viewfield_angles: Vec::new(),
            viewfield_name: "viewfield".to_owned(),
            viewfield_texture: None,
            viewfield_tint: Color::WHITE,
            icon_name: String::new(),
            icon_texture: None,
            icon_alpha: 1.0,
            label_tint: Color::LIGHT_GRAY,
        }
    }
}

impl PointStyle {
    /// Returns whether the marker is one of the pin shapes.
    #[must_use]
    pub fn is_pin(&self) -> bool {
        is_pin_name(&self.marker_name)
    }

    /// Returns whether an icon should be drawn.
    #[must_use]
    pub fn has_icon(&self) -> bool {
        self.icon_texture.is_some() || !self.icon_name.is_empty()
    }
}

/// A partial [`PointStyle`]; `None` fields take their default.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointStyleUpdate {
    /// See [`PointStyle::marker_name`].
    pub marker_name: Option<String>,
    /// See [`PointStyle::marker_texture`].
    pub marker_texture: Option<Texture>,
    /// See [`PointStyle::marker_tint`].
    pub marker_tint: Option<Color>,
    /// See [`PointStyle::viewfield_angles`].
    pub viewfield_angles: Option<Vec<f64>>,
    /// See [`PointStyle::viewfield_name`].
    pub viewfield_name: Option<String>,
    /// See [`PointStyle::viewfield_texture`].
    pub viewfield_texture: Option<Texture>,
    /// See [`PointStyle::viewfield_tint`].
    pub viewfield_tint: Option<Color>,
    /// See [`PointStyle::icon_name`].
    pub icon_name: Option<String>,
    /// See [`PointStyle::icon_texture`].
    pub icon_texture: Option<Texture>,
    /// See [`PointStyle::icon_alpha`].
    pub icon_alpha: Option<f32>,
    /// See [`PointStyle::label_tint`].
    pub label_tint: Option<Color>,
}

impl PointStyleUpdate {
    /// Sets the marker texture name.
    #[must_use]
    pub fn marker(mut self, name: &str) -> Self {
        self.marker_name = Some(name.to_owned());
        self
    }

    /// Sets the viewfield angles, in degrees.
    #[must_use]
    pub fn viewfields(mut self, angles: &[f64]) -> Self {
        self.viewfield_angles = Some(angles.to_vec());
        self
    }

    /// Sets the icon name.
    #[must_use]
    pub fn icon(mut self, name: &str) -> Self {
        self.icon_name = Some(name.to_owned());
        self
    }

    /// Merges this update over the default record.
    #[must_use]
    pub fn resolve(self) -> PointStyle {
        let d = PointStyle::default();
        PointStyle {
            marker_name: self.marker_name.unwrap_or(d.marker_name),
            marker_texture: self.marker_texture.or(d.marker_texture),
            marker_tint: self.marker_tint.unwrap_or(d.marker_tint),
            viewfield_angles: self.viewfield_angles.unwrap_or(d.viewfield_angles),
            viewfield_name: self.viewfield_name.unwrap_or(d.viewfield_name),
            viewfield_texture: self.viewfield_texture.or(d.viewfield_texture),
            viewfield_tint: self.viewfield_tint.unwrap_or(d.viewfield_tint),
            icon_name: self.icon_name.unwrap_or(d.icon_name),
            icon_texture: self.icon_texture.or(d.icon_texture),
            icon_alpha: self.icon_alpha.unwrap_or(d.icon_alpha),
            label_tint: self.label_tint.unwrap_or(d.label_tint),
        }
    }
}

/// Marker names drawn as pins at full detail.
pub const PIN_MARKERS: [&str; 4] = ["pin", "boldPin", "improveosm", "osmose"];

/// Texture substituted for pins when they cannot be drawn as pins.
pub const PIN_SUBSTITUTE: &str = "largeCircle";

/// Returns whether `name` is one of [`PIN_MARKERS`].
#[must_use]
pub fn is_pin_name(name: &str) -> bool {
    PIN_MARKERS.contains(&name)
}

/// Returns whether a marker texture name denotes a round marker (ends with
/// `circle` or `midpoint`, ignoring case).
#[must_use]
pub fn is_circular_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with("circle") || lower.ends_with("midpoint")
}

/// Fill parameters for areas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fill {
    /// Fill color.
    pub color: Color,
    /// Fill opacity.
    pub alpha: f32,
}

/// Fully resolved style of a line or area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStyle {
    /// Wide underlay stroke (lines only).
    pub casing: Stroke,
    /// Main stroke.
    pub stroke: Stroke,
    /// Interior fill (areas only).
    pub fill: Fill,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            casing: Stroke {
                width: 5.0,
                color: Color(0x44_44_44),
                alpha: 1.0,
            },
            stroke: Stroke {
                width: 3.0,
                color: Color(0xcc_cc_cc),
                alpha: 1.0,
            },
            fill: Fill {
                color: Color(0xaa_aa_aa),
                alpha: 0.3,
            },
        }
    }
}

/// A partial [`PathStyle`]; `None` records take their default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathStyleUpdate {
    /// See [`PathStyle::casing`].
    pub casing: Option<Stroke>,
    /// See [`PathStyle::stroke`].
    pub stroke: Option<Stroke>,
    /// See [`PathStyle::fill`].
    pub fill: Option<Fill>,
}

impl PathStyleUpdate {
    /// Merges this update over the default record.
    #[must_use]
    pub fn resolve(self) -> PathStyle {
        let d = PathStyle::default();
        PathStyle {
            casing: self.casing.unwrap_or(d.casing),
            stroke: self.stroke.unwrap_or(d.stroke),
            fill: self.fill.unwrap_or(d.fill),
        }
    }
}
