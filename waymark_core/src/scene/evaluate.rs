// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **TRANSFORM**: drain dirty indices, recompute each node's
//!    `world_transform` as `parent_world * local_transform` and
//!    `effective_visible` as `parent_effective_visible && flags.visible`.
//! 2. **CONTENT** / **EFFECTS**: drain dirty indices (no recomputation;
//!    presenters read the current values directly from the store).
//! 3. **TOPOLOGY**: drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`FrameChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that presenters can index directly into the store's arrays via
//! the `*_at()` accessors (e.g.
//! [`world_transform_at`](super::NodeStore::world_transform_at)) without
//! paying for generation checks on every access.
//!
//! [`NodeId`]: super::NodeId

use kurbo::Affine;

use super::id::INVALID;
use super::store::NodeStore;
use crate::dirty;

/// The set of changes produced by a single [`NodeStore::evaluate`] call.
///
/// Each field contains the raw slot indices of nodes that changed in the
/// corresponding category.
#[derive(Clone, Debug, Default)]
pub struct FrameChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose content, tint, opacity or anchor changed.
    pub content: Vec<u32>,
    /// Nodes whose hit area or glow filter changed.
    pub effects: Vec<u32>,
    /// Nodes that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes that transitioned from effectively hidden to visible.
    pub unhidden: Vec<u32>,
    /// Nodes added since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the draw order was rebuilt.
    pub topology_changed: bool,
}

impl FrameChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.content.clear();
        self.effects.clear();
        self.hidden.clear();
        self.unhidden.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.content.is_empty()
            && self.effects.is_empty()
            && self.hidden.is_empty()
            && self.unhidden.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Evaluates the node tree, recomputing dirty properties and returning
    /// the set of changes.
    pub fn evaluate(&mut self) -> FrameChanges {
        let mut changes = FrameChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut FrameChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        // Affected iteration yields parents before children.
        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let i = idx as usize;
            let parent_idx = self.parent[i];
            let (parent_world, parent_visible) = if parent_idx != INVALID {
                (
                    self.world_transform[parent_idx as usize],
                    self.effective_visible[parent_idx as usize],
                )
            } else {
                (Affine::IDENTITY, true)
            };
            self.world_transform[i] = parent_world * self.local_transform_at(idx);

            let new_visible = parent_visible && self.flags[i].visible;
            if new_visible != self.effective_visible[i] {
                if new_visible {
                    changes.unhidden.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
                self.effective_visible[i] = new_visible;
            }
        }
        changes.transforms = dirty_transforms;

        changes.content = self
            .dirty
            .drain(dirty::CONTENT)
            .deterministic()
            .run()
            .collect();

        changes.effects = self
            .dirty
            .drain(dirty::EFFECTS)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current draw order (depth-first pre-order, with sortable
    /// children ordered by z-index).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut kids = Vec::new();
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            kids.push(child);
            child = self.next_sibling[child as usize];
        }
        if self.flags[idx as usize].sortable_children {
            // Stable: equal z-indices keep insertion order.
            kids.sort_by(|a, b| {
                self.z_index[*a as usize].total_cmp(&self.z_index[*b as usize])
            });
        }
        for kid in kids {
            self.dfs_collect(kid);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::*;
    use crate::hit_area::HitArea;
    use crate::scene::{Color, NodeFlags};

    #[test]
    fn evaluate_computes_world_transforms() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");

        store.set_position(parent, Point::new(10.0, 0.0));
        store.set_position(child, Point::new(0.0, 5.0));
        store.add_child(parent, child);

        let _ = store.evaluate();

        assert_eq!(
            store.world_transform(parent),
            Affine::translate((10.0, 0.0))
        );
        assert_eq!(
            store.world_transform(child) * Point::ZERO,
            Point::new(10.0, 5.0)
        );
    }

    #[test]
    fn world_transform_applies_scale_after_translation() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");
        store.add_child(parent, child);
        store.set_position(parent, Point::new(100.0, 0.0));
        store.set_scale(parent, Vec2::new(2.0, 2.0));
        store.set_position(child, Point::new(0.0, -14.0));

        let _ = store.evaluate();
        assert_eq!(
            store.world_transform(child) * Point::ZERO,
            Point::new(100.0, -28.0)
        );
    }

    #[test]
    fn no_change_evaluate_returns_empty() {
        let mut store = NodeStore::new();
        let _root = store.create_container("root");

        let _ = store.evaluate();

        let changes = store.evaluate();
        assert!(changes.is_empty());
    }

    #[test]
    fn traversal_order_is_depth_first() {
        let mut store = NodeStore::new();
        let a = store.create_container("a");
        let b = store.create_container("b");
        let c = store.create_container("c");
        let d = store.create_container("d");

        // Tree: a -> [b -> [d], c]
        store.add_child(a, b);
        store.add_child(a, c);
        store.add_child(b, d);

        let _ = store.evaluate();

        assert_eq!(store.traversal_order(), &[a.idx, b.idx, d.idx, c.idx]);
    }

    #[test]
    fn sortable_children_follow_z_index() {
        let mut store = NodeStore::new();
        let layer = store.create_container("layer");
        store.set_flags(
            layer,
            NodeFlags {
                sortable_children: true,
                ..NodeFlags::default()
            },
        );
        let big = store.create_container("big");
        let small = store.create_container("small");
        let tie = store.create_container("tie");
        store.add_child(layer, big);
        store.add_child(layer, small);
        store.add_child(layer, tie);
        store.set_z_index(big, -500.0);
        store.set_z_index(small, -20.0);
        store.set_z_index(tie, -20.0);

        let _ = store.evaluate();
        assert_eq!(
            store.traversal_order(),
            &[layer.idx, big.idx, small.idx, tie.idx]
        );

        store.set_z_index(big, 0.0);
        let changes = store.evaluate();
        assert!(changes.topology_changed);
        assert_eq!(
            store.traversal_order(),
            &[layer.idx, small.idx, tie.idx, big.idx]
        );
    }

    #[test]
    fn evaluate_tracks_content_and_effect_changes() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");
        let _ = store.evaluate();

        store.set_tint(id, Color::YELLOW);
        store.set_hit_area(id, Some(HitArea::Rect(kurbo::Rect::new(0.0, 0.0, 5.0, 5.0))));
        let changes = store.evaluate();
        assert!(changes.content.contains(&id.idx));
        assert!(changes.effects.contains(&id.idx));
        assert!(changes.transforms.is_empty());
    }

    #[test]
    fn evaluate_added_and_removed_lifecycle() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");

        let changes = store.evaluate();
        assert!(changes.added.contains(&id.idx));
        assert!(changes.removed.is_empty());

        let changes = store.evaluate();
        assert!(changes.added.is_empty());
        assert!(changes.removed.is_empty());

        store.destroy_node(id);
        let changes = store.evaluate();
        assert!(changes.removed.contains(&id.idx));
        assert!(changes.added.is_empty());
        assert!(store.traversal_order().is_empty());
    }

    #[test]
    fn hidden_propagates_to_children() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");
        store.add_child(parent, child);
        let _ = store.evaluate();

        store.set_visible(parent, false);
        let changes = store.evaluate();

        assert!(!store.effective_visible(parent));
        assert!(!store.effective_visible(child));
        assert!(changes.hidden.contains(&parent.idx));
        assert!(changes.hidden.contains(&child.idx));

        store.set_visible(parent, true);
        let changes = store.evaluate();
        assert!(store.effective_visible(child));
        assert!(changes.unhidden.contains(&child.idx));
        assert!(changes.hidden.is_empty());
    }

    #[test]
    fn reattached_subtree_inherits_new_parent() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");
        let grandchild = store.create_container("grandchild");
        store.add_child(child, grandchild);
        store.set_position(parent, Point::new(10.0, 0.0));
        store.set_visible(parent, false);
        let _ = store.evaluate();

        store.add_child(parent, child);
        let changes = store.evaluate();

        assert!(changes.transforms.contains(&child.idx));
        assert!(changes.transforms.contains(&grandchild.idx));
        assert!(changes.hidden.contains(&grandchild.idx));
        assert_eq!(
            store.world_transform(grandchild),
            Affine::translate((10.0, 0.0))
        );

        store.remove_from_parent(child);
        let changes = store.evaluate();
        assert!(changes.unhidden.contains(&grandchild.idx));
        assert_eq!(store.world_transform(grandchild), Affine::IDENTITY);
    }

    #[test]
    fn evaluate_into_reuses_buffer() {
        let mut store = NodeStore::new();
        let a = store.create_container("a");
        let b = store.create_container("b");

        let mut changes = FrameChanges::default();
        store.evaluate_into(&mut changes);
        assert_eq!(changes.added.len(), 2);

        store.set_alpha(a, 0.5);
        store.evaluate_into(&mut changes);

        assert!(changes.added.is_empty(), "added should be cleared");
        assert!(changes.content.contains(&a.idx));
        assert!(!changes.content.contains(&b.idx));
    }
}
