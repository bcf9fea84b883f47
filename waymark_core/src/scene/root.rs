// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene root: node storage, textures, named layers and the overlay.

use std::collections::BTreeMap;

use kurbo::Point;

use super::evaluate::FrameChanges;
use super::id::NodeId;
use super::store::{NodeFlags, NodeStore};
use crate::feature::LodThresholds;
use crate::overlay::OverlayLayer;
use crate::texture::TextureAtlas;
use crate::trace::Tracer;

/// Label of the overlay container that hosts selection halos.
pub const OVERLAY_LABEL: &str = "map-ui";

/// Scene-wide rendering options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneOptions {
    /// Draw every feature in its simplified form with hairline strokes.
    pub wireframe: bool,
    /// Zoom thresholds for level of detail.
    pub lod: LodThresholds,
}

/// A complete scene: the node tree plus what features need to draw into it.
///
/// The tree is `root → [layers…, map-ui]`. Layers are added in order and
/// always sit below the overlay; each layer sorts its children by z-index.
#[derive(Debug)]
pub struct Scene {
    /// Node storage.
    pub nodes: NodeStore,
    /// Texture and icon lookup.
    pub textures: TextureAtlas,
    /// Selection halo registry.
    pub overlay: OverlayLayer,
    /// Rendering options.
    pub options: SceneOptions,
    root: NodeId,
    layers: BTreeMap<String, NodeId>,
}

impl Scene {
    /// Creates a scene with an empty root and overlay.
    #[must_use]
    pub fn new(textures: TextureAtlas, options: SceneOptions) -> Self {
        let mut nodes = NodeStore::new();
        let root = nodes.create_container("root");
        let overlay = nodes.create_container(OVERLAY_LABEL);
        nodes.add_child(root, overlay);
        Self {
            nodes,
            textures,
            overlay: OverlayLayer::new(overlay),
            options,
            root,
            layers: BTreeMap::new(),
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a named layer container directly below the overlay.
    ///
    /// # Panics
    ///
    /// Panics if a layer with this name already exists.
    pub fn add_layer(&mut self, name: &str) -> NodeId {
        assert!(
            !self.layers.contains_key(name),
            "layer {name} already exists"
        );
        let layer = self.nodes.create_container(name);
        self.nodes.set_flags(
            layer,
            NodeFlags {
                sortable_children: true,
                ..NodeFlags::default()
            },
        );
        self.nodes.insert_before(layer, self.overlay.container());
        self.layers.insert(name.to_owned(), layer);
        layer
    }

    /// Returns the layer container with the given name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<NodeId> {
        self.layers.get(name).copied()
    }

    /// Evaluates the node tree. See [`NodeStore::evaluate`].
    pub fn evaluate(&mut self) -> FrameChanges {
        self.nodes.evaluate()
    }

    /// Evaluates the node tree and reports per-node changes to `tracer`.
    ///
    /// Node change events are only produced with the `trace-rich` feature.
    pub fn evaluate_traced(&mut self, frame_index: u64, tracer: &mut Tracer<'_>) -> FrameChanges {
        let changes = self.nodes.evaluate();
        #[cfg(feature = "trace-rich")]
        tracer.node_changes(frame_index, &crate::trace::NodeChange::collect(&changes));
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = (frame_index, tracer);
        }
        changes
    }

    /// Returns the topmost hit node at scene point `p`. Requires a prior
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        self.nodes.hit_test(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_stack_below_overlay() {
        let mut scene = Scene::new(TextureAtlas::new(), SceneOptions::default());
        let areas = scene.add_layer("areas");
        let points = scene.add_layer("points");
        let children: Vec<_> = scene.nodes.children(scene.root()).collect();
        assert_eq!(children, vec![areas, points, scene.overlay.container()]);
        assert_eq!(scene.nodes.label(scene.overlay.container()), OVERLAY_LABEL);
        assert!(scene.nodes.flags(points).sortable_children);
        assert_eq!(scene.layer("points"), Some(points));
        assert_eq!(scene.layer("lines"), None);
    }

    #[test]
    #[should_panic(expected = "layer points already exists")]
    fn duplicate_layer_panics() {
        let mut scene = Scene::new(TextureAtlas::new(), SceneOptions::default());
        let _ = scene.add_layer("points");
        let _ = scene.add_layer("points");
    }

    #[test]
    fn evaluate_traced_matches_evaluate() {
        let mut scene = Scene::new(TextureAtlas::new(), SceneOptions::default());
        let _ = scene.add_layer("points");
        let changes = scene.evaluate_traced(0, &mut Tracer::none());
        assert!(changes.topology_changed);
        assert!(scene.evaluate().is_empty());
    }
}
