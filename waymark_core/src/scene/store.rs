// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use kurbo::{Affine, Point, Rect, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::content::{Color, Graphics, NodeContent};
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;
use crate::halo::GlowFilter;
use crate::hit_area::HitArea;
use crate::texture::Texture;

/// Per-node boolean flags.
///
/// A node that is not [`visible`](Self::visible) contributes nothing, and
/// neither does its subtree; it is skipped by bounds, hit testing and
/// rendering. A node that is visible but not [`renderable`](Self::renderable)
/// is skipped in the same places but keeps its subtree's state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is shown.
    pub visible: bool,
    /// Whether the node (and its subtree) is drawn.
    pub renderable: bool,
    /// Whether children are drawn in z-index order rather than insertion order.
    pub sortable_children: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            visible: true,
            renderable: true,
            sortable_children: false,
        }
    }
}

/// Struct-of-arrays storage for all scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) position: Vec<Point>,
    pub(crate) scale: Vec<Vec2>,
    pub(crate) rotation: Vec<f64>,
    pub(crate) anchor: Vec<Vec2>,
    pub(crate) z_index: Vec<f64>,
    pub(crate) alpha: Vec<f32>,
    pub(crate) tint: Vec<Color>,
    pub(crate) content: Vec<NodeContent>,
    pub(crate) hit_area: Vec<Option<HitArea>>,
    pub(crate) glow: Vec<Option<GlowFilter>>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) label: Vec<String>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            position: Vec::new(),
            scale: Vec::new(),
            rotation: Vec::new(),
            anchor: Vec::new(),
            z_index: Vec::new(),
            alpha: Vec::new(),
            tint: Vec::new(),
            content: Vec::new(),
            hit_area: Vec::new(),
            glow: Vec::new(),
            flags: Vec::new(),
            label: Vec::new(),
            world_transform: Vec::new(),
            effective_visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new node with the given content and label, and returns its
    /// handle.
    ///
    /// The node starts at the origin with unit scale, no rotation, a top-left
    /// anchor, full opacity, a white tint, no hit area, no glow, and no
    /// parent.
    pub fn create_node(&mut self, content: NodeContent, label: &str) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.position[i] = Point::ZERO;
            self.scale[i] = Vec2::new(1.0, 1.0);
            self.rotation[i] = 0.0;
            self.anchor[i] = Vec2::ZERO;
            self.z_index[i] = 0.0;
            self.alpha[i] = 1.0;
            self.tint[i] = Color::WHITE;
            self.content[i] = content;
            self.hit_area[i] = None;
            self.glow[i] = None;
            self.flags[i] = NodeFlags::default();
            label.clone_into(&mut self.label[i]);
            self.world_transform[i] = Affine::IDENTITY;
            self.effective_visible[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.position.push(Point::ZERO);
            self.scale.push(Vec2::new(1.0, 1.0));
            self.rotation.push(0.0);
            self.anchor.push(Vec2::ZERO);
            self.z_index.push(0.0);
            self.alpha.push(1.0);
            self.tint.push(Color::WHITE);
            self.content.push(content);
            self.hit_area.push(None);
            self.glow.push(None);
            self.flags.push(NodeFlags::default());
            self.label.push(label.to_owned());
            self.world_transform.push(Affine::IDENTITY);
            self.effective_visible.push(true);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates an empty grouping node.
    pub fn create_container(&mut self, label: &str) -> NodeId {
        self.create_node(NodeContent::Empty, label)
    }

    /// Creates a sprite node showing `texture`.
    pub fn create_sprite(&mut self, texture: Texture, label: &str) -> NodeId {
        self.create_node(NodeContent::Sprite(texture), label)
    }

    /// Creates a vector graphics node.
    pub fn create_graphics(&mut self, graphics: Graphics, label: &str) -> NodeId {
        self.create_node(NodeContent::Graphics(graphics), label)
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first, or use
    /// [`destroy_subtree`](Self::destroy_subtree)) or if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        // Remove from parent's child list if attached.
        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        // Remove dirty tracking dependencies.
        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.content[idx as usize] = NodeContent::Empty;
        self.hit_area[idx as usize] = None;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Destroys a node together with all of its descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        self.validate(id);
        self.destroy_children(id);
        self.destroy_node(id);
    }

    /// Destroys every descendant of a node, leaving the node itself alive and
    /// childless.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_children(&mut self, id: NodeId) {
        self.validate(id);
        while self.first_child[id.idx as usize] != INVALID {
            let c = self.first_child[id.idx as usize];
            let child = NodeId {
                idx: c,
                generation: self.generation[c as usize],
            };
            self.destroy_subtree(child);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks the inherited channel for `child`'s subtree so world transforms
    /// and effective visibility are recomputed under the new ancestry.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.link_last_child(p, c);

        // Child depends on parent for TRANSFORM.
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, or `sibling`
    /// has no parent.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);

        self.dirty.mark_with(c, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of a node, in insertion
    /// order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children of a node.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns the `index`-th direct child of a node.
    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    // -- Property getters (read-only, no dirty marking) --

    /// Returns the local position of a node within its parent.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Returns the local scale of a node.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> Vec2 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Returns the local rotation of a node, in radians.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.rotation[id.idx as usize]
    }

    /// Returns the content anchor of a node (fractions of its content size).
    #[must_use]
    pub fn anchor(&self, id: NodeId) -> Vec2 {
        self.validate(id);
        self.anchor[id.idx as usize]
    }

    /// Returns the z-index used to order a node among sortable siblings.
    #[must_use]
    pub fn z_index(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.z_index[id.idx as usize]
    }

    /// Returns the local opacity of a node.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.alpha[id.idx as usize]
    }

    /// Returns the tint of a node.
    #[must_use]
    pub fn tint(&self, id: NodeId) -> Color {
        self.validate(id);
        self.tint[id.idx as usize]
    }

    /// Returns the content of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &NodeContent {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Returns the texture of a sprite node, or `None` for other content.
    #[must_use]
    pub fn texture(&self, id: NodeId) -> Option<Texture> {
        match self.content(id) {
            NodeContent::Sprite(texture) => Some(*texture),
            _ => None,
        }
    }

    /// Returns the hit area of a node, in its local space.
    #[must_use]
    pub fn hit_area(&self, id: NodeId) -> Option<&HitArea> {
        self.validate(id);
        self.hit_area[id.idx as usize].as_ref()
    }

    /// Returns the glow filter attached to a node.
    #[must_use]
    pub fn glow(&self, id: NodeId) -> Option<GlowFilter> {
        self.validate(id);
        self.glow[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns whether a node's own visible flag is set.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.flags(id).visible
    }

    /// Returns the diagnostic label of a node.
    #[must_use]
    pub fn label(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.label[id.idx as usize]
    }

    /// Returns the computed world transform of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns whether the node is effectively visible (including by an
    /// ancestor's visible flag).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_visible[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the local position of a node.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to descendants.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.validate(id);
        self.position[id.idx as usize] = position;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the local scale of a node.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        self.validate(id);
        self.scale[id.idx as usize] = scale;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the local rotation of a node, in radians.
    pub fn set_rotation(&mut self, id: NodeId, radians: f64) {
        self.validate(id);
        self.rotation[id.idx as usize] = radians;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the content anchor of a node.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Vec2) {
        self.validate(id);
        self.anchor[id.idx as usize] = anchor;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the z-index of a node.
    ///
    /// Siblings under a parent with
    /// [`sortable_children`](NodeFlags::sortable_children) are drawn in
    /// ascending z-index order (ties keep insertion order).
    pub fn set_z_index(&mut self, id: NodeId, z_index: f64) {
        self.validate(id);
        if self.z_index[id.idx as usize] == z_index {
            return;
        }
        self.z_index[id.idx as usize] = z_index;
        self.traversal_dirty = true;
        self.dirty.mark(id.idx, dirty::TOPOLOGY);
    }

    /// Sets the local opacity of a node.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        self.validate(id);
        self.alpha[id.idx as usize] = alpha;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Sets the tint of a node.
    pub fn set_tint(&mut self, id: NodeId, tint: Color) {
        self.validate(id);
        self.tint[id.idx as usize] = tint;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Replaces the content of a node.
    pub fn set_content(&mut self, id: NodeId, content: NodeContent) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Makes a node a sprite showing `texture`.
    pub fn set_texture(&mut self, id: NodeId, texture: Texture) {
        self.set_content(id, NodeContent::Sprite(texture));
    }

    /// Makes a node a vector graphics node.
    pub fn set_graphics(&mut self, id: NodeId, graphics: Graphics) {
        self.set_content(id, NodeContent::Graphics(graphics));
    }

    /// Sets (or clears) the hit area of a node.
    pub fn set_hit_area(&mut self, id: NodeId, hit_area: Option<HitArea>) {
        self.validate(id);
        self.hit_area[id.idx as usize] = hit_area;
        self.dirty.mark(id.idx, dirty::EFFECTS);
    }

    /// Attaches (or removes) a glow filter.
    pub fn set_glow(&mut self, id: NodeId, glow: Option<GlowFilter>) {
        self.validate(id);
        self.glow[id.idx as usize] = glow;
        self.dirty.mark(id.idx, dirty::EFFECTS);
    }

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        let old = self.flags[id.idx as usize];
        self.flags[id.idx as usize] = flags;
        if old.sortable_children != flags.sortable_children {
            self.traversal_dirty = true;
            self.dirty.mark(id.idx, dirty::TOPOLOGY);
        }
        // Visibility is inherited through the transform pass.
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Shows or hides a node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        let flags = self.flags(id);
        if flags.visible != visible {
            self.set_flags(id, NodeFlags { visible, ..flags });
        }
    }

    /// Enables or disables drawing of a node and its subtree.
    pub fn set_renderable(&mut self, id: NodeId, renderable: bool) {
        let flags = self.flags(id);
        if flags.renderable != renderable {
            self.set_flags(id, NodeFlags { renderable, ..flags });
        }
    }

    /// Sets the diagnostic label of a node.
    pub fn set_label(&mut self, id: NodeId, label: &str) {
        self.validate(id);
        label.clone_into(&mut self.label[id.idx as usize]);
    }

    // -- Bounds --

    /// Returns the local transform of a node (position, rotation, scale).
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.local_transform_at(id.idx)
    }

    /// Returns the bounds of a node's content and drawn descendants in the
    /// node's own coordinate space (the node's transform is not applied).
    ///
    /// Children that are hidden or not renderable are skipped. A node that
    /// draws nothing has zero-sized bounds at the origin.
    #[must_use]
    pub fn local_bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.subtree_bounds(id.idx).unwrap_or(Rect::ZERO)
    }

    /// Returns the bounds of a node's subtree in scene space, using the
    /// world transforms computed by the last [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.subtree_bounds(id.idx)
            .map(|r| self.world_transform[id.idx as usize].transform_rect_bbox(r))
    }

    // -- Hit testing --

    /// Returns the topmost effectively visible node whose hit area contains
    /// the scene-space point `p`.
    ///
    /// Uses the traversal order and world transforms computed by the last
    /// [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn hit_test(&self, p: Point) -> Option<NodeId> {
        self.hits(p).next()
    }

    /// Iterates over every node hit by the scene-space point `p`, topmost
    /// first.
    pub fn hits(&self, p: Point) -> impl Iterator<Item = NodeId> + '_ {
        self.traversal_order.iter().rev().filter_map(move |&idx| {
            let i = idx as usize;
            let area = self.hit_area[i].as_ref()?;
            if !self.effective_visible[i] || !self.flags[i].renderable {
                return None;
            }
            let local = self.world_transform[i].inverse() * p;
            area.contains(local).then_some(NodeId {
                idx,
                generation: self.generation[i],
            })
        })
    }

    // -- Raw-index accessors for backends --
    //
    // These accept raw slot indices (as found in `FrameChanges`) rather than
    // `NodeId` handles, skipping generation validation. Only use with indices
    // that came from `FrameChanges` or `traversal_order()`.

    /// Returns the computed world transform at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Affine {
        self.check_index(idx);
        self.world_transform[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` is effectively visible.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_visible_at(&self, idx: u32) -> bool {
        self.check_index(idx);
        self.effective_visible[idx as usize]
    }

    /// Returns the content at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &NodeContent {
        self.check_index(idx);
        &self.content[idx as usize]
    }

    /// Returns the anchor at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn anchor_at(&self, idx: u32) -> Vec2 {
        self.check_index(idx);
        self.anchor[idx as usize]
    }

    /// Returns the tint at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn tint_at(&self, idx: u32) -> Color {
        self.check_index(idx);
        self.tint[idx as usize]
    }

    /// Returns the glow filter at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn glow_at(&self, idx: u32) -> Option<GlowFilter> {
        self.check_index(idx);
        self.glow[idx as usize]
    }

    /// Returns the flags at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn flags_at(&self, idx: u32) -> NodeFlags {
        self.check_index(idx);
        self.flags[idx as usize]
    }

    /// Returns the product of local opacities from the root down to raw slot
    /// `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_alpha_at(&self, idx: u32) -> f32 {
        self.check_index(idx);
        let mut alpha = 1.0;
        let mut cur = idx;
        while cur != INVALID {
            alpha *= self.alpha[cur as usize];
            cur = self.parent[cur as usize];
        }
        alpha
    }

    /// Returns whether raw slot `idx` and every ancestor are renderable.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_renderable_at(&self, idx: u32) -> bool {
        self.check_index(idx);
        let mut cur = idx;
        while cur != INVALID {
            if !self.flags[cur as usize].renderable {
                return false;
            }
            cur = self.parent[cur as usize];
        }
        true
    }

    /// Returns the scene-space bounds of the content at raw slot `idx`
    /// (children excluded).
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn content_world_bounds_at(&self, idx: u32) -> Option<Rect> {
        self.check_index(idx);
        let i = idx as usize;
        self.content[i]
            .bounds(self.anchor[i])
            .map(|r| self.world_transform[i].transform_rect_bbox(r))
    }

    /// Returns a handle for a raw slot index that came from this store.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> NodeId {
        self.check_index(idx);
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn check_index(&self, idx: u32) {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
    }

    pub(crate) fn local_transform_at(&self, idx: u32) -> Affine {
        let i = idx as usize;
        let scale = self.scale[i];
        Affine::translate(self.position[i].to_vec2())
            * Affine::rotate(self.rotation[i])
            * Affine::scale_non_uniform(scale.x, scale.y)
    }

    /// Bounds of `idx`'s content and drawn descendants, in `idx`'s space.
    fn subtree_bounds(&self, idx: u32) -> Option<Rect> {
        let i = idx as usize;
        let mut bounds = self.content[i].bounds(self.anchor[i]);
        let mut child = self.first_child[i];
        while child != INVALID {
            let flags = self.flags[child as usize];
            if flags.visible && flags.renderable {
                if let Some(r) = self.subtree_bounds(child) {
                    let r = self.local_transform_at(child).transform_rect_bbox(r);
                    bounds = Some(bounds.map_or(r, |b| b.union(r)));
                }
            }
            child = self.next_sibling[child as usize];
        }
        bounds
    }

    fn link_last_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Circle, Size};

    use super::*;
    use crate::scene::TextureId;

    fn texture(w: f64, h: f64) -> Texture {
        Texture::new(TextureId(7), Size::new(w, h))
    }

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");
        assert!(store.is_alive(id));
        assert_eq!(store.live_count(), 1);
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_container("a");
        store.destroy_node(id1);
        let id2 = store.create_container("b");
        // id2 reuses the same slot but has a different generation.
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
        assert_eq!(store.label(id2), "b");
    }

    #[test]
    fn add_child_and_query() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child1 = store.create_container("c1");
        let child2 = store.create_container("c2");

        store.add_child(parent, child1);
        store.add_child(parent, child2);

        assert_eq!(store.parent(child1), Some(parent));
        assert_eq!(store.child_count(parent), 2);
        assert_eq!(store.child_at(parent, 0), Some(child1));
        assert_eq!(store.child_at(parent, 1), Some(child2));
        assert_eq!(store.child_at(parent, 2), None);
    }

    #[test]
    fn remove_from_parent_works() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");

        store.add_child(parent, child);
        store.remove_from_parent(child);
        assert_eq!(store.parent(child), None);
        assert!(store.children(parent).next().is_none());
    }

    #[test]
    fn insert_before_works() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let a = store.create_container("a");
        let b = store.create_container("b");
        let c = store.create_container("c");

        store.add_child(parent, a);
        store.add_child(parent, c);
        store.insert_before(b, c);

        let kids: Vec<_> = store.children(parent).collect();
        assert_eq!(kids, vec![a, b, c]);
    }

    #[test]
    fn destroy_subtree_frees_descendants() {
        let mut store = NodeStore::new();
        let root = store.create_container("root");
        let group = store.create_container("group");
        let leaf = store.create_sprite(texture(4.0, 4.0), "leaf");
        store.add_child(root, group);
        store.add_child(group, leaf);

        store.destroy_subtree(group);
        assert!(!store.is_alive(group));
        assert!(!store.is_alive(leaf));
        assert!(store.is_alive(root));
        assert_eq!(store.child_count(root), 0);
    }

    #[test]
    fn destroy_children_keeps_parent() {
        let mut store = NodeStore::new();
        let group = store.create_container("group");
        for _ in 0..3 {
            let s = store.create_sprite(texture(1.0, 1.0), "s");
            store.add_child(group, s);
        }
        store.destroy_children(group);
        assert!(store.is_alive(group));
        assert_eq!(store.child_count(group), 0);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_position() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");
        store.destroy_node(id);
        store.set_position(id, Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");
        store.destroy_node(id);
        let _ = store.parent(id);
    }

    #[test]
    fn local_bounds_include_scaled_children() {
        let mut store = NodeStore::new();
        let container = store.create_container("container");
        let marker = store.create_sprite(texture(20.0, 20.0), "marker");
        store.add_child(container, marker);
        store.set_anchor(marker, Vec2::new(0.5, 0.5));
        store.set_scale(marker, Vec2::new(0.8, 0.8));
        store.set_position(container, Point::new(100.0, 50.0));

        // The container's own translation is not part of its local bounds.
        assert_eq!(store.local_bounds(container), Rect::new(-8.0, -8.0, 8.0, 8.0));
        // The marker's local bounds ignore its own scale.
        assert_eq!(store.local_bounds(marker), Rect::new(-10.0, -10.0, 10.0, 10.0));
    }

    #[test]
    fn local_bounds_skip_hidden_and_unrenderable_children() {
        let mut store = NodeStore::new();
        let container = store.create_container("container");
        let a = store.create_sprite(texture(10.0, 10.0), "a");
        let b = store.create_sprite(texture(100.0, 100.0), "b");
        let c = store.create_sprite(texture(200.0, 200.0), "c");
        store.add_child(container, a);
        store.add_child(container, b);
        store.add_child(container, c);
        store.set_visible(b, false);
        store.set_renderable(c, false);

        assert_eq!(store.local_bounds(container), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn empty_node_has_zero_bounds() {
        let mut store = NodeStore::new();
        let container = store.create_container("container");
        assert_eq!(store.local_bounds(container), Rect::ZERO);
    }

    #[test]
    fn hit_test_finds_topmost_visible_node() {
        let mut store = NodeStore::new();
        let root = store.create_container("root");
        let a = store.create_container("a");
        let b = store.create_container("b");
        store.add_child(root, a);
        store.add_child(root, b);
        for id in [a, b] {
            store.set_position(id, Point::new(50.0, 50.0));
            store.set_hit_area(id, Some(HitArea::Circle(Circle::new(Point::ZERO, 10.0))));
        }
        let _ = store.evaluate();

        assert_eq!(store.hit_test(Point::new(55.0, 50.0)), Some(b));
        assert_eq!(store.hit_test(Point::new(80.0, 50.0)), None);

        store.set_visible(b, false);
        let _ = store.evaluate();
        assert_eq!(store.hit_test(Point::new(55.0, 50.0)), Some(a));
    }

    #[test]
    fn set_z_index_is_noop_when_unchanged() {
        let mut store = NodeStore::new();
        let id = store.create_container("a");
        let _ = store.evaluate();
        store.set_z_index(id, 0.0);
        assert!(!store.traversal_dirty);
        store.set_z_index(id, 3.0);
        assert!(store.traversal_dirty);
    }

    #[test]
    fn effective_alpha_multiplies_ancestors() {
        let mut store = NodeStore::new();
        let parent = store.create_container("parent");
        let child = store.create_container("child");
        store.add_child(parent, child);
        store.set_alpha(parent, 0.5);
        store.set_alpha(child, 0.5);
        assert_eq!(store.effective_alpha_at(child.index()), 0.25);
    }
}
