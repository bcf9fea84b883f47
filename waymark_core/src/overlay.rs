// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of per-feature decorations hosted above all feature layers.

use std::collections::BTreeMap;

use crate::feature::FeatureId;
use crate::scene::{NodeId, NodeStore};

/// The shared overlay container and its halo registry.
///
/// Each feature owns at most one entry, keyed by its [`FeatureId`]. The
/// overlay owns the halo nodes; features only remember the handle.
#[derive(Debug)]
pub struct OverlayLayer {
    container: NodeId,
    halos: BTreeMap<FeatureId, NodeId>,
}

impl OverlayLayer {
    pub(crate) fn new(container: NodeId) -> Self {
        Self {
            container,
            halos: BTreeMap::new(),
        }
    }

    /// Returns the overlay container node.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Parents `halo` under the overlay and registers it for `feature`.
    ///
    /// # Panics
    ///
    /// Panics if `feature` already has a halo, or if `halo` already has a
    /// parent.
    pub fn attach(&mut self, nodes: &mut NodeStore, feature: &FeatureId, halo: NodeId) {
        assert!(
            !self.halos.contains_key(feature),
            "feature {feature} already has a halo"
        );
        nodes.add_child(self.container, halo);
        self.halos.insert(feature.clone(), halo);
    }

    /// Returns the halo registered for `feature`.
    #[must_use]
    pub fn get(&self, feature: &FeatureId) -> Option<NodeId> {
        self.halos.get(feature).copied()
    }

    /// Returns whether `feature` has a registered halo.
    #[must_use]
    pub fn contains(&self, feature: &FeatureId) -> bool {
        self.halos.contains_key(feature)
    }

    /// Destroys the halo registered for `feature`, if any.
    ///
    /// Returns whether an entry was removed.
    pub fn release(&mut self, nodes: &mut NodeStore, feature: &FeatureId) -> bool {
        match self.halos.remove(feature) {
            Some(halo) => {
                nodes.destroy_subtree(halo);
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered halos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.halos.len()
    }

    /// Returns `true` if no halos are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.halos.is_empty()
    }

    /// Iterates over `(feature, halo)` pairs in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (&FeatureId, NodeId)> + '_ {
        self.halos.iter().map(|(id, &halo)| (id, halo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Graphics;

    fn overlay(nodes: &mut NodeStore) -> OverlayLayer {
        OverlayLayer::new(nodes.create_container("map-ui"))
    }

    #[test]
    fn attach_and_release() {
        let mut nodes = NodeStore::new();
        let mut overlay = overlay(&mut nodes);
        let id = FeatureId::from("n1");
        let halo = nodes.create_graphics(Graphics::new(), "n1-halo");

        overlay.attach(&mut nodes, &id, halo);
        assert!(overlay.contains(&id));
        assert_eq!(overlay.get(&id), Some(halo));
        assert_eq!(nodes.parent(halo), Some(overlay.container()));
        assert_eq!(overlay.iter().collect::<Vec<_>>(), vec![(&id, halo)]);

        assert!(overlay.release(&mut nodes, &id));
        assert!(overlay.is_empty());
        assert!(!nodes.is_alive(halo));
        assert!(!overlay.release(&mut nodes, &id));
    }

    #[test]
    #[should_panic(expected = "feature n1 already has a halo")]
    fn second_halo_for_same_feature_panics() {
        let mut nodes = NodeStore::new();
        let mut overlay = overlay(&mut nodes);
        let id = FeatureId::from("n1");
        let a = nodes.create_graphics(Graphics::new(), "a");
        let b = nodes.create_graphics(Graphics::new(), "b");
        overlay.attach(&mut nodes, &id, a);
        overlay.attach(&mut nodes, &id, b);
    }
}
