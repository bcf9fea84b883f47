// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the scene graph and whatever draws it.
//!
//! A map frame runs in three steps:
//!
//! - **Update**: [`FeatureLayer::render`] brings every dirty feature's nodes
//!   up to date for the current zoom and projection.
//! - **Evaluate**: [`Scene::evaluate`] drains the dirty channels, recomputes
//!   world transforms and effective visibility and returns [`FrameChanges`].
//! - **Present**: a [`Presenter`] applies those changes to its own
//!   representation (a GPU scene, a canvas, a damage tracker).
//!
//! `waymark_core` owns the first two steps. Drawing crates such as
//! `waymark_render` implement the third.
//!
//! [`FeatureLayer::render`]: crate::layer::FeatureLayer::render
//! [`Scene::evaluate`]: crate::scene::Scene::evaluate

use crate::scene::{FrameChanges, NodeStore};

/// Applies evaluated frame changes to a presentation target.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame(zoom: f64) {
///     let projection = WebMercator::from_zoom(zoom, viewport_center);
///
///     // Update: reconcile dirty features with the node tree
///     points.render(&mut scene, &projection, zoom, &mut tracer);
///
///     // Evaluate: drain dirty channels, recompute world properties
///     let changes = scene.evaluate();
///
///     // Present: apply incremental changes
///     presenter.apply(&scene.nodes, &changes);
/// }
/// ```
pub trait Presenter {
    /// Applies the given [`FrameChanges`], reading current property values
    /// from `nodes` as needed.
    fn apply(&mut self, nodes: &NodeStore, changes: &FrameChanges);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, SceneOptions};
    use crate::texture::TextureAtlas;

    /// Counts how many nodes each frame touched.
    #[derive(Default)]
    struct Counter {
        frames: usize,
        touched: usize,
    }

    impl Presenter for Counter {
        fn apply(&mut self, _nodes: &NodeStore, changes: &FrameChanges) {
            self.frames += 1;
            self.touched += changes.transforms.len() + changes.content.len();
        }
    }

    #[test]
    fn presenter_sees_only_changed_nodes() {
        let mut scene = Scene::new(TextureAtlas::new(), SceneOptions::default());
        let mut counter = Counter::default();

        let changes = scene.evaluate();
        counter.apply(&scene.nodes, &changes);
        assert_eq!(counter.touched, 2);

        let changes = scene.evaluate();
        counter.apply(&scene.nodes, &changes);
        assert_eq!(counter.frames, 2);
        assert_eq!(counter.touched, 2);
    }
}
