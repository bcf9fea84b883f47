// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point markers with optional viewfields and icon.

use kurbo::{Point, Vec2};

use super::{FeatureCore, FeatureId, Lod, UpdateReport};
use crate::hit_area::marker_hit_area;
use crate::projection::Projection;
use crate::scene::{NodeId, NodeStore, Scene};
use crate::style::{PIN_SUBSTITUTE, PointStyle, PointStyleUpdate, is_circular_name};
use crate::texture::{Texture, TextureAtlas};

/// Side length of point icons, in scene units.
pub const ICON_SIZE: f64 = 11.0;

/// Marker scale at [`Lod::Simplified`].
pub const SIMPLIFIED_SCALE: f64 = 0.8;

/// Icon position inside the head of a pin marker.
pub const PIN_ICON_OFFSET: Vec2 = Vec2::new(0.0, -14.0);

/// Added to the sort key of markers that carry viewfields.
pub const VIEWFIELD_Z_BOOST: f64 = 1000.0;

const CENTER: Vec2 = Vec2::new(0.5, 0.5);
const BOTTOM_CENTER: Vec2 = Vec2::new(0.5, 1.0);

/// A point marker.
///
/// The container holds three children, back to front: a `viewfields` group
/// of direction sprites, the `marker` sprite and the `icon` sprite. The
/// container sits at the projected location; its z-index is the negated
/// latitude, raised by [`VIEWFIELD_Z_BOOST`] while viewfields are present.
#[derive(Debug)]
pub struct PointFeature {
    core: FeatureCore,
    style: PointStyle,
    viewfields: NodeId,
    marker: NodeId,
    icon: NodeId,
    viewfield_count: usize,
    is_circular: bool,
}

impl PointFeature {
    /// Creates a point feature with an empty container under `layer`.
    pub fn new(scene: &mut Scene, layer: NodeId, id: FeatureId) -> Self {
        let core = FeatureCore::new(scene, layer, id);
        let nodes = &mut scene.nodes;

        let viewfields = nodes.create_container("viewfields");
        nodes.set_visible(viewfields, false);
        let marker = nodes.create_sprite(Texture::WHITE, "marker");
        let icon = nodes.create_sprite(Texture::WHITE, "icon");
        nodes.set_visible(icon, false);
        for child in [viewfields, marker, icon] {
            nodes.add_child(core.container, child);
        }

        Self {
            core,
            style: PointStyle::default(),
            viewfields,
            marker,
            icon,
            viewfield_count: 0,
            is_circular: false,
        }
    }

    /// Returns the shared state.
    #[must_use]
    pub fn core(&self) -> &FeatureCore {
        &self.core
    }

    /// Returns the shared state for mutation.
    pub fn core_mut(&mut self) -> &mut FeatureCore {
        &mut self.core
    }

    /// Returns the last resolved style.
    #[must_use]
    pub fn style(&self) -> &PointStyle {
        &self.style
    }

    /// Resolves `update` over the defaults and marks the style dirty.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_style(&mut self, update: PointStyleUpdate) {
        self.core.check_alive();
        self.style = update.resolve();
        self.core.style_dirty = true;
    }

    /// Moves the point to a new `(longitude, latitude)`.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed or the coordinate is not
    /// finite.
    pub fn set_location(&mut self, lonlat: Point) {
        self.core.geometry_mut().set_point(lonlat);
    }

    /// Returns the marker sprite node.
    #[must_use]
    pub fn marker(&self) -> NodeId {
        self.marker
    }

    /// Returns the icon sprite node.
    #[must_use]
    pub fn icon(&self) -> NodeId {
        self.icon
    }

    /// Returns the group node holding the viewfield sprites.
    #[must_use]
    pub fn viewfields(&self) -> NodeId {
        self.viewfields
    }

    /// Returns whether the marker (and so its hit area and halo) is round.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        self.is_circular
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
        if !self.core.begin_update() {
            return self.core.clean_report();
        }

        let geometry = self.update_geometry(&mut scene.nodes, projection);
        let style = self.update_style(scene, zoom);

        self.core.update_bounds(&scene.nodes);
        self.update_hit_area(&mut scene.nodes);
        let halos = self.core.update_halo(scene);
        self.core.finish_update(geometry, style, halos)
    }

    /// Releases the container, halo and all children.
    ///
    /// # Panics
    ///
    /// Panics if the feature has already been destroyed.
    pub fn destroy(&mut self, scene: &mut Scene) {
        self.core.destroy(scene);
    }

    fn sort_key(&self, with_viewfields: bool) -> f64 {
        let z = -self.core.geometry.latitude();
        if with_viewfields { z + VIEWFIELD_Z_BOOST } else { z }
    }

    fn update_geometry(&mut self, nodes: &mut NodeStore, projection: &dyn Projection) -> bool {
        if !self.core.geometry.update(projection) {
            return false;
        }
        let container = self.core.container;
        if let Some(position) = self.core.geometry.coord() {
            nodes.set_position(container, position);
        }
        nodes.set_z_index(container, self.sort_key(self.viewfield_count > 0));
        true
    }

    fn update_style(&mut self, scene: &mut Scene, zoom: f64) -> bool {
        if !self.core.style_dirty {
            return false;
        }
        let Scene {
            nodes,
            textures,
            options,
            ..
        } = scene;
        let container = self.core.container;
        let has_viewfields = !self.style.viewfield_angles.is_empty();

        nodes.set_texture(self.marker, marker_texture(&self.style, textures, &self.style.marker_name));
        nodes.set_tint(self.marker, self.style.marker_tint);

        nodes.set_z_index(container, self.sort_key(has_viewfields));
        self.update_viewfields(nodes, textures);
        self.update_icon(nodes, textures);

        let lod = options.lod.classify(zoom, options.wireframe);
        self.core.lod = lod;
        match lod {
            Lod::Hidden => self.core.set_visible(nodes, false),
            Lod::Simplified => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.viewfields, false);
                nodes.set_renderable(self.marker, true);
                nodes.set_scale(self.marker, Vec2::new(SIMPLIFIED_SCALE, SIMPLIFIED_SCALE));

                let name = if self.style.is_pin() {
                    PIN_SUBSTITUTE
                } else {
                    self.style.marker_name.as_str()
                };
                self.is_circular = self.style.marker_texture.is_none() && is_circular_name(name);
                nodes.set_texture(self.marker, marker_texture(&self.style, textures, name));
                nodes.set_anchor(self.marker, CENTER);
                nodes.set_position(self.icon, Point::ZERO);
            }
            Lod::Full => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.viewfields, true);
                nodes.set_renderable(self.marker, true);
                nodes.set_scale(self.marker, Vec2::new(1.0, 1.0));

                // Pins cannot host viewfields.
                let name = if self.style.is_pin() && has_viewfields {
                    PIN_SUBSTITUTE
                } else {
                    self.style.marker_name.as_str()
                };
                self.is_circular = self.style.marker_texture.is_none() && is_circular_name(name);
                nodes.set_texture(self.marker, marker_texture(&self.style, textures, name));
                if self.style.is_pin() && !self.is_circular {
                    nodes.set_anchor(self.marker, BOTTOM_CENTER);
                    nodes.set_position(self.icon, PIN_ICON_OFFSET.to_point());
                } else {
                    nodes.set_anchor(self.marker, CENTER);
                    nodes.set_position(self.icon, Point::ZERO);
                }
            }
        }

        self.core.style_dirty = false;
        true
    }

    /// Replaces the viewfield sprites when their count changes, otherwise
    /// updates each one in place.
    fn update_viewfields(&mut self, nodes: &mut NodeStore, textures: &TextureAtlas) {
        let angles = &self.style.viewfield_angles;
        if angles.is_empty() {
            nodes.destroy_children(self.viewfields);
            nodes.set_visible(self.viewfields, false);
            self.viewfield_count = 0;
            return;
        }

        let texture = self
            .style
            .viewfield_texture
            .unwrap_or_else(|| textures.resolve(&self.style.viewfield_name));
        if angles.len() != self.viewfield_count {
            nodes.destroy_children(self.viewfields);
            for _ in angles {
                let sprite = nodes.create_sprite(texture, "viewfield");
                nodes.set_anchor(sprite, CENTER);
                nodes.add_child(self.viewfields, sprite);
            }
            self.viewfield_count = angles.len();
        }

        let sprites: Vec<NodeId> = nodes.children(self.viewfields).collect();
        for (sprite, angle) in sprites.into_iter().zip(angles) {
            nodes.set_texture(sprite, texture);
            nodes.set_tint(sprite, self.style.viewfield_tint);
            nodes.set_rotation(sprite, angle.to_radians());
        }
        nodes.set_visible(self.viewfields, true);
    }

    fn update_icon(&self, nodes: &mut NodeStore, textures: &TextureAtlas) {
        if !self.style.has_icon() {
            nodes.set_visible(self.icon, false);
            return;
        }
        let texture = self
            .style
            .icon_texture
            .unwrap_or_else(|| textures.resolve_icon(&self.style.icon_name));
        nodes.set_texture(self.icon, texture);
        nodes.set_anchor(self.icon, CENTER);
        // Degenerate icon sizes scale as the placeholder.
        let natural = if texture.size.width > 0.0 && texture.size.height > 0.0 {
            texture.size
        } else {
            Texture::WHITE.size
        };
        nodes.set_scale(
            self.icon,
            Vec2::new(ICON_SIZE / natural.width, ICON_SIZE / natural.height),
        );
        nodes.set_alpha(self.icon, self.style.icon_alpha);
        nodes.set_visible(self.icon, true);
    }

    /// Derives the hit area from the marker's natural (unscaled) bounds.
    fn update_hit_area(&self, nodes: &mut NodeStore) {
        let marker_bounds = nodes.local_bounds(self.marker);
        let circular = self.is_circular;
        self.core
            .apply_hit_area(nodes, || marker_hit_area(marker_bounds, circular));
    }
}

fn marker_texture(style: &PointStyle, textures: &TextureAtlas, name: &str) -> Texture {
    style
        .marker_texture
        .unwrap_or_else(|| textures.resolve(name))
}
