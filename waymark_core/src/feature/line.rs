// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open polylines drawn as a casing underlay and a stroke.

use kurbo::Point;

use super::{FeatureCore, FeatureId, Lod, UpdateReport};
use crate::hit_area::{HitArea, MIN_LINE_HIT_WIDTH};
use crate::projection::Projection;
use crate::scene::{DrawCommand, Graphics, NodeId, NodeStore, Scene, Stroke};
use crate::style::{PathStyle, PathStyleUpdate};

/// Stroke width used for every path in wireframe mode.
pub(super) const WIREFRAME_WIDTH: f64 = 1.0;

/// A line feature.
///
/// The container stays at the scene origin and holds two graphics children,
/// `casing` below `stroke`, both drawn in scene coordinates.
#[derive(Debug)]
pub struct LineFeature {
    core: FeatureCore,
    style: PathStyle,
    casing: NodeId,
    stroke: NodeId,
    wireframe: bool,
}

impl LineFeature {
    /// Creates a line feature with an empty container under `layer`.
    pub fn new(scene: &mut Scene, layer: NodeId, id: FeatureId) -> Self {
        let core = FeatureCore::new(scene, layer, id);
        let casing = scene.nodes.create_graphics(Graphics::new(), "casing");
        let stroke = scene.nodes.create_graphics(Graphics::new(), "stroke");
        scene.nodes.add_child(core.container, casing);
        scene.nodes.add_child(core.container, stroke);
        Self {
            core,
            style: PathStyle::default(),
            casing,
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

    /// Returns the casing graphics node.
    #[must_use]
    pub fn casing(&self) -> NodeId {
        self.casing
    }

    /// Returns the stroke graphics node.
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
        let style = self.core.style_dirty;
        if style {
            self.apply_lod(&mut scene.nodes, scene.options.lod.classify(zoom, scene.options.wireframe));
            self.wireframe = scene.options.wireframe;
            self.core.style_dirty = false;
        }
        if geometry || style {
            self.redraw(&mut scene.nodes);
        }

        self.core.update_bounds(&scene.nodes);
        let width = self.hit_width();
        let coords = self.core.geometry.coords();
        self.core.apply_hit_area(&mut scene.nodes, || HitArea::Polyline {
            points: coords.to_vec(),
            width,
        });
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

    /// Hit width: the wider of casing and stroke, never below
    /// [`MIN_LINE_HIT_WIDTH`].
    fn hit_width(&self) -> f64 {
        self.style
            .casing
            .width
            .max(self.style.stroke.width)
            .max(MIN_LINE_HIT_WIDTH)
    }

    fn apply_lod(&mut self, nodes: &mut NodeStore, lod: Lod) {
        self.core.lod = lod;
        match lod {
            Lod::Hidden => self.core.set_visible(nodes, false),
            Lod::Simplified => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.casing, false);
            }
            Lod::Full => {
                self.core.set_visible(nodes, true);
                nodes.set_renderable(self.casing, true);
            }
        }
    }

    fn redraw(&self, nodes: &mut NodeStore) {
        let points = self.core.geometry.coords();
        let mut stroke = self.style.stroke;
        if self.wireframe {
            stroke.width = WIREFRAME_WIDTH;
        }
        nodes.set_graphics(self.casing, polyline(points, self.style.casing));
        nodes.set_graphics(self.stroke, polyline(points, stroke));
    }
}

fn polyline(points: &[Point], stroke: Stroke) -> Graphics {
    let mut graphics = Graphics::new();
    if points.len() >= 2 {
        graphics.push(DrawCommand::Polyline {
            points: points.to_vec(),
            closed: false,
            stroke,
        });
    }
    graphics
}
