// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderable map features.
//!
//! A feature reconciles a [`Geometry`] and a resolved style against the
//! scene graph. Every variant follows the same per-frame contract:
//!
//! 1. If nothing is dirty, [`update`](Feature::update) returns immediately.
//! 2. Otherwise geometry is reprojected (if dirty), the style is reapplied
//!    (if dirty) together with the level of detail for the current zoom,
//!    then scene bounds, hit area and halos are recomputed, in that order.
//!
//! Three independent flags drive this: geometry dirtiness (owned by the
//! [`Geometry`]), style dirtiness (set only by style assignment) and
//! interaction dirtiness (set when hover, selection, virtual or drawing
//! state actually changes).
//!
//! Variants are [`PointFeature`], [`LineFeature`] and [`PolygonFeature`],
//! unified by the [`Feature`] enum. State shared by all variants lives in
//! [`FeatureCore`].

mod line;
mod point;
mod polygon;

use core::borrow::Borrow;
use core::fmt;

use kurbo::{Point, Rect};

pub use line::LineFeature;
pub use point::{ICON_SIZE, PIN_ICON_OFFSET, PointFeature, SIMPLIFIED_SCALE, VIEWFIELD_Z_BOOST};
pub use polygon::PolygonFeature;

use crate::geometry::Geometry;
use crate::halo::{HOVER_GLOW, HaloChange, SELECTION_HALO, selection_graphics};
use crate::hit_area::HitArea;
use crate::projection::Projection;
use crate::scene::{Graphics, NodeId, NodeStore, Scene};

/// Stable string identity of a feature, unique within a scene.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(String);

impl FeatureId {
    /// Creates an identity from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({:?})", self.0)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for FeatureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Feature variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// A point marker.
    Point,
    /// An open polyline.
    Line,
    /// A closed area.
    Polygon,
}

/// Level of detail chosen for the current zoom. Advisory for callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Lod {
    /// Not drawn; no hit testing and no halo.
    #[default]
    Hidden = 0,
    /// Drawn with reduced detail.
    Simplified = 1,
    /// Drawn with full detail.
    Full = 2,
}

impl Lod {
    /// Returns the numeric tier (0, 1 or 2).
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Returns the tier for a numeric level, if valid.
    #[must_use]
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Hidden),
            1 => Some(Self::Simplified),
            2 => Some(Self::Full),
            _ => None,
        }
    }
}

/// Zoom thresholds separating the [`Lod`] tiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodThresholds {
    /// Below this zoom features are hidden.
    pub min_zoom: f64,
    /// At or above this zoom features get full detail (unless wireframe).
    pub full_zoom: f64,
}

impl LodThresholds {
    /// Hidden below 16, simplified below 17, full from 17.
    pub const STANDARD: Self = Self {
        min_zoom: 16.0,
        full_zoom: 17.0,
    };

    /// Picks the tier for an effective zoom. Wireframe mode caps visible
    /// features at [`Lod::Simplified`].
    #[must_use]
    pub fn classify(&self, zoom: f64, wireframe: bool) -> Lod {
        if zoom < self.min_zoom {
            Lod::Hidden
        } else if zoom < self.full_zoom || wireframe {
            Lod::Simplified
        } else {
            Lod::Full
        }
    }
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// What one [`update`](Feature::update) call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// `false` if the feature was clean and nothing ran.
    pub updated: bool,
    /// Whether geometry was reprojected.
    pub geometry: bool,
    /// Whether the style was reapplied.
    pub style: bool,
    /// Level of detail after the update.
    pub lod: Lod,
    /// Whether the feature is visible after the update.
    pub visible: bool,
    /// Hover glow transition.
    pub hover: HaloChange,
    /// Selection halo transition.
    pub select: HaloChange,
}

/// State and behavior shared by every feature variant.
#[derive(Debug)]
pub struct FeatureCore {
    id: FeatureId,
    geometry: Geometry,
    container: NodeId,
    halo: Option<NodeId>,
    scene_bounds: Rect,
    lod: Lod,
    visible: bool,
    style_dirty: bool,
    interaction_dirty: bool,
    hovered: bool,
    selected: bool,
    is_virtual: bool,
    drawing: bool,
    destroyed: bool,
}

impl FeatureCore {
    /// Creates the feature's container under `layer`.
    ///
    /// The style starts dirty so that the first update applies the defaults.
    fn new(scene: &mut Scene, layer: NodeId, id: FeatureId) -> Self {
        let container = scene.nodes.create_container(id.as_str());
        scene.nodes.add_child(layer, container);
        Self {
            id,
            geometry: Geometry::new(),
            container,
            halo: None,
            scene_bounds: Rect::ZERO,
            lod: Lod::Hidden,
            visible: true,
            style_dirty: true,
            interaction_dirty: false,
            hovered: false,
            selected: false,
            is_virtual: false,
            drawing: false,
            destroyed: false,
        }
    }

    /// Returns the feature identity.
    #[must_use]
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// Returns the geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Returns the geometry for mutation.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        self.check_alive();
        &mut self.geometry
    }

    /// Replaces the source coordinates, marking geometry dirty.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed or a coordinate is not finite.
    pub fn set_coords(&mut self, orig_coords: Vec<Point>) {
        self.geometry_mut().set_coords(orig_coords);
    }

    /// Returns the container node owned by this feature.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Returns the selection halo node, while one exists. The node is owned
    /// by the scene's [`OverlayLayer`](crate::overlay::OverlayLayer).
    #[must_use]
    pub fn halo(&self) -> Option<NodeId> {
        self.halo
    }

    /// Returns the scene-space bounds computed by the last update that did
    /// work.
    #[must_use]
    pub fn scene_bounds(&self) -> Rect {
        self.scene_bounds
    }

    /// Returns the level of detail chosen by the last style application.
    #[must_use]
    pub fn lod(&self) -> Lod {
        self.lod
    }

    /// Returns whether the feature is drawn at the current level of detail.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Returns whether the next update has work to do.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.geometry.dirty() || self.style_dirty || self.interaction_dirty
    }

    /// Returns whether the style is waiting to be reapplied.
    #[must_use]
    pub fn style_dirty(&self) -> bool {
        self.style_dirty
    }

    /// Forces reprojection and style reapplication on the next update.
    ///
    /// Frame drivers call this when the zoom or projection changes.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn mark_dirty(&mut self) {
        self.check_alive();
        self.geometry.mark_dirty();
        self.style_dirty = true;
    }

    /// Returns the hover flag.
    #[must_use]
    pub fn hovered(&self) -> bool {
        self.hovered
    }

    /// Returns the selection flag.
    #[must_use]
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Returns the virtual flag (virtual features are never selection-haloed).
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Returns the drawing flag (drawing features have no hit area).
    #[must_use]
    pub fn drawing(&self) -> bool {
        self.drawing
    }

    /// Sets the hover flag, consumed at the next update.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.check_alive();
        if self.hovered != hovered {
            self.hovered = hovered;
            self.interaction_dirty = true;
        }
    }

    /// Sets the selection flag, consumed at the next update.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_selected(&mut self, selected: bool) {
        self.check_alive();
        if self.selected != selected {
            self.selected = selected;
            self.interaction_dirty = true;
        }
    }

    /// Sets the virtual flag, consumed at the next update.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_virtual(&mut self, is_virtual: bool) {
        self.check_alive();
        if self.is_virtual != is_virtual {
            self.is_virtual = is_virtual;
            self.interaction_dirty = true;
        }
    }

    /// Sets the drawing flag, consumed at the next update.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_drawing(&mut self, drawing: bool) {
        self.check_alive();
        if self.drawing != drawing {
            self.drawing = drawing;
            self.interaction_dirty = true;
        }
    }

    /// Returns whether [`destroy`](Feature::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Returns the hit area of the container.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    #[must_use]
    pub fn hit_area<'a>(&self, scene: &'a Scene) -> Option<&'a HitArea> {
        self.check_alive();
        scene.nodes.hit_area(self.container)
    }

    // -- Update steps shared by the variants --

    fn check_alive(&self) {
        assert!(!self.destroyed, "feature {} used after destroy", self.id);
    }

    /// Returns whether the update has anything to do.
    fn begin_update(&self) -> bool {
        self.check_alive();
        self.is_dirty()
    }

    fn clean_report(&self) -> UpdateReport {
        UpdateReport {
            lod: self.lod,
            visible: self.visible,
            ..UpdateReport::default()
        }
    }

    fn set_visible(&mut self, nodes: &mut NodeStore, visible: bool) {
        self.visible = visible;
        nodes.set_visible(self.container, visible);
    }

    /// Container local bounds moved to the container's position.
    fn update_bounds(&mut self, nodes: &NodeStore) {
        let position = nodes.position(self.container);
        self.scene_bounds = nodes.local_bounds(self.container) + position.to_vec2();
    }

    /// Applies a freshly computed hit area. Hidden features keep their
    /// previous area; drawing features get none.
    fn apply_hit_area(&self, nodes: &mut NodeStore, compute: impl FnOnce() -> HitArea) {
        if !self.visible {
            return;
        }
        let area = if self.drawing { None } else { Some(compute()) };
        if nodes.hit_area(self.container) != area.as_ref() {
            nodes.set_hit_area(self.container, area);
        }
    }

    /// Attaches or releases the hover glow and the selection halo.
    fn update_halo(&mut self, scene: &mut Scene) -> (HaloChange, HaloChange) {
        let container = self.container;

        let show_hover = self.visible && self.hovered;
        let has_glow = scene.nodes.glow(container).is_some();
        let hover = match (show_hover, has_glow) {
            (true, false) => {
                scene.nodes.set_glow(container, Some(HOVER_GLOW));
                HaloChange::Attached
            }
            (false, true) => {
                scene.nodes.set_glow(container, None);
                HaloChange::Released
            }
            _ => HaloChange::None,
        };

        let show_select = self.visible && self.selected && !self.is_virtual;
        let select = if show_select {
            let (halo, change) = match self.halo {
                Some(halo) => (halo, HaloChange::None),
                None => {
                    let label = format!("{}-halo", self.id);
                    let halo = scene.nodes.create_graphics(Graphics::new(), &label);
                    scene.overlay.attach(&mut scene.nodes, &self.id, halo);
                    self.halo = Some(halo);
                    (halo, HaloChange::Attached)
                }
            };
            let graphics = selection_graphics(scene.nodes.hit_area(container), &SELECTION_HALO);
            scene.nodes.set_graphics(halo, graphics);
            let position = scene.nodes.position(container);
            scene.nodes.set_position(halo, position);
            change
        } else if self.halo.take().is_some() {
            scene.overlay.release(&mut scene.nodes, &self.id);
            HaloChange::Released
        } else {
            HaloChange::None
        };

        (hover, select)
    }

    fn finish_update(
        &mut self,
        geometry: bool,
        style: bool,
        (hover, select): (HaloChange, HaloChange),
    ) -> UpdateReport {
        self.interaction_dirty = false;
        UpdateReport {
            updated: true,
            geometry,
            style,
            lod: self.lod,
            visible: self.visible,
            hover,
            select,
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.check_alive();
        if self.halo.take().is_some() {
            scene.overlay.release(&mut scene.nodes, &self.id);
        }
        scene.nodes.destroy_subtree(self.container);
        self.destroyed = true;
    }
}

/// A renderable feature of any kind.
#[derive(Debug)]
pub enum Feature {
    /// A point marker.
    Point(PointFeature),
    /// An open polyline.
    Line(LineFeature),
    /// A closed area.
    Polygon(PolygonFeature),
}

impl Feature {
    /// Returns the variant tag.
    #[must_use]
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Point(_) => FeatureKind::Point,
            Self::Line(_) => FeatureKind::Line,
            Self::Polygon(_) => FeatureKind::Polygon,
        }
    }

    /// Returns the shared state.
    #[must_use]
    pub fn core(&self) -> &FeatureCore {
        match self {
            Self::Point(f) => f.core(),
            Self::Line(f) => f.core(),
            Self::Polygon(f) => f.core(),
        }
    }

    /// Returns the shared state for mutation.
    pub fn core_mut(&mut self) -> &mut FeatureCore {
        match self {
            Self::Point(f) => f.core_mut(),
            Self::Line(f) => f.core_mut(),
            Self::Polygon(f) => f.core_mut(),
        }
    }

    /// Returns the feature identity.
    #[must_use]
    pub fn id(&self) -> &FeatureId {
        self.core().id()
    }

    /// Returns the scene-space bounds computed by the last update.
    #[must_use]
    pub fn scene_bounds(&self) -> Rect {
        self.core().scene_bounds()
    }

    /// Returns the hit area of the feature's container.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    #[must_use]
    pub fn hit_area<'a>(&self, scene: &'a Scene) -> Option<&'a HitArea> {
        self.core().hit_area(scene)
    }

    /// Brings the scene objects in line with the feature's state.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        projection: &dyn Projection,
        zoom: f64,
    ) -> UpdateReport {
        match self {
            Self::Point(f) => f.update(scene, projection, zoom),
            Self::Line(f) => f.update(scene, projection, zoom),
            Self::Polygon(f) => f.update(scene, projection, zoom),
        }
    }

    /// Releases the container, halo and all children.
    ///
    /// # Panics
    ///
    /// Panics if the feature has already been destroyed.
    pub fn destroy(&mut self, scene: &mut Scene) {
        self.core_mut().destroy(scene);
    }

    /// Returns the point variant, if this is one.
    #[must_use]
    pub fn as_point(&self) -> Option<&PointFeature> {
        match self {
            Self::Point(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the point variant for mutation, if this is one.
    pub fn as_point_mut(&mut self) -> Option<&mut PointFeature> {
        match self {
            Self::Point(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the line variant, if this is one.
    #[must_use]
    pub fn as_line(&self) -> Option<&LineFeature> {
        match self {
            Self::Line(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the line variant for mutation, if this is one.
    pub fn as_line_mut(&mut self) -> Option<&mut LineFeature> {
        match self {
            Self::Line(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the polygon variant, if this is one.
    #[must_use]
    pub fn as_polygon(&self) -> Option<&PolygonFeature> {
        match self {
            Self::Polygon(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the polygon variant for mutation, if this is one.
    pub fn as_polygon_mut(&mut self) -> Option<&mut PolygonFeature> {
        match self {
            Self::Polygon(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lod_thresholds_are_half_open() {
        let t = LodThresholds::STANDARD;
        assert_eq!(t.classify(15.9, false), Lod::Hidden);
        assert_eq!(t.classify(16.0, false), Lod::Simplified);
        assert_eq!(t.classify(16.99, false), Lod::Simplified);
        assert_eq!(t.classify(17.0, false), Lod::Full);
        assert_eq!(t.classify(22.0, true), Lod::Simplified);
        assert_eq!(t.classify(10.0, true), Lod::Hidden);
    }

    #[test]
    fn lod_levels() {
        assert_eq!(Lod::Hidden.level(), 0);
        assert_eq!(Lod::Full.level(), 2);
        assert_eq!(Lod::from_level(1), Some(Lod::Simplified));
        assert_eq!(Lod::from_level(3), None);
    }

    #[test]
    fn feature_id_displays_plainly() {
        let id = FeatureId::from("n123");
        assert_eq!(id.to_string(), "n123");
        assert_eq!(id.as_str(), "n123");
        assert_eq!(format!("{id:?}"), "FeatureId(\"n123\")");
    }
}
