// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed areas drawn as a translucent fill and an outline.

use super::line::WIREFRAME_WIDTH;
use super::{FeatureCore, FeatureId, Lod, UpdateReport};
use crate::hit_area::HitArea;
use crate::projection::Projection;
use crate::scene::{DrawCommand, Graphics, NodeId, NodeStore, Scene};
use crate::style::{PathStyle, PathStyleUpdate};

/// A polygon feature.
///
/// The container stays at the scene origin and holds `fill` below `stroke`,
/// both drawn in scene coordinates. Its z-index is the negated projected
/// area, so smaller areas draw above the larger ones they overlap.
#[derive(Debug)]
pub struct PolygonFeature {
    core: FeatureCore,
    style: PathStyle,
    fill: NodeId,
    stroke: NodeId,
    wireframe: bool,
}

impl PolygonFeature {
    /// Creates a polygon feature with an empty container under `layer`.
    pub fn new(scene: &mut Scene, layer: NodeId, id: FeatureId) -> Self {
        let core = FeatureCore::new(scene, layer, id);
        let fill = scene.nodes.create_graphics(Graphics::new(), "fill");
        let stroke = scene.nodes.create_graphics(Graphics::new(), "stroke");
        scene.nodes.add_child(core.container, fill);
        scene.nodes.add_child(core.container, stroke);
        Self {
            core,
            style: PathStyle::default(),
            fill,
            stroke,
            wireframe: false,
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
    pub fn style(&self) -> &PathStyle {
        &self.style
    }

    /// Resolves `update` over the defaults and marks the style dirty.
    ///
    /// # Panics
    ///
    /// Panics if the feature has been destroyed.
    pub fn set_style(&mut self, update: PathStyleUpdate) {
        self.core.check_alive();
        self.style = update.resolve();
        self.core.style_dirty = true;
    }

    /// Returns the fill graphics node.
    #[must_use]
    pub fn fill(&self) -> NodeId {
        self.fill
    }

    /// Returns the outline graphics node.
    #[must_use]
    pub fn stroke(&self) -> NodeId {
        self.stroke
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

        let geometry = self.core.geometry.update(projection);
        if geometry {
            scene
                .nodes
                .set_z_index(self.core.container, -self.core.geometry.area());
        }
        let style = self.core.style_dirty;
        if style {
            let lod = scene.options.lod.classify(zoom, scene.options.wireframe);
            self.apply_lod(&mut scene.nodes, lod);
            self.wireframe = scene.options.wireframe;
            self.core.style_dirty = false;
        }
        if geometry || style {
            self.redraw(&mut scene.nodes);
        }

        self.core.update_bounds(&scene.nodes);
        let ring = self.core.geometry.coords();
        self.core
            .apply_hit_area(&mut scene.nodes, || HitArea::Polygon(ring.to_vec()));
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

    fn apply_lod(&mut self, nodes: &mut NodeStore, lod: Lod) {
        self.core.lod = lod;
        match lod {
            Lod::Hidden => self.core.set_visible(nodes, false),
            Lod::Simplified => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.fill, false);
            }
            Lod::Full => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.fill, true);
            }
        }
    }

    fn redraw(&self, nodes: &mut NodeStore) {
        let ring = self.core.geometry.coords();
        let mut fill = Graphics::new();
        let mut outline = Graphics::new();
        if ring.len() >= 3 {
            fill.push(DrawCommand::Fill {
                points: ring.to_vec(),
                color: self.style.fill.color,
                alpha: self.style.fill.alpha,
            });
            let mut stroke = self.style.stroke;
            if self.wireframe {
                stroke.width = WIREFRAME_WIDTH;
            }
            outline.push(DrawCommand::Polyline {
                points: ring.to_vec(),
                closed: true,
                stroke,
            });
        }
        nodes.set_graphics(self.fill, fill);
        nodes.set_graphics(self.stroke, outline);
    }
}
