// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered sequence of draw items for one frame.

use kurbo::{Affine, Rect, Vec2};
use waymark_core::halo::GlowFilter;
use waymark_core::scene::{Color, NodeContent, NodeId, NodeStore};
use waymark_core::texture::Texture;

/// What a render item draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemKind {
    /// A textured quad; `anchor` is the fraction of the texture size that
    /// sits at the node origin.
    Sprite {
        /// Texture to draw.
        texture: Texture,
        /// Anchor within the texture.
        anchor: Vec2,
    },
    /// Vector commands, read from the node's
    /// [`Graphics`](waymark_core::scene::Graphics) at draw time.
    Graphics,
}

/// A single drawable node in the render plan.
///
/// Items are produced in back-to-front order, matching the scene's
/// traversal order.
#[derive(Clone, Debug)]
pub struct RenderItem {
    /// The node this item originates from.
    pub node: NodeId,
    /// What to draw.
    pub kind: ItemKind,
    /// World-space transform.
    pub world_transform: Affine,
    /// Opacity accumulated from ancestors (0.0–1.0).
    pub alpha: f32,
    /// Tint multiplied into sprite colors.
    pub tint: Color,
    /// Scene-space bounds of the drawn content.
    pub bounds: Rect,
    /// Nearest glow filter on the node or an ancestor.
    pub glow: Option<GlowFilter>,
}

/// The ordered list of draw items for a single frame.
///
/// Only nodes that are effectively visible, renderable along their whole
/// ancestry, and carry content produce items. Grouping nodes are skipped.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Draw items in back-to-front order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the plan for the current state of `nodes`.
    ///
    /// Requires a prior [`evaluate`](NodeStore::evaluate).
    #[must_use]
    pub fn build(nodes: &NodeStore) -> Self {
        let mut plan = Self::new();
        plan.rebuild(nodes);
        plan
    }

    /// Clears and refills the plan, reusing its allocation.
    pub fn rebuild(&mut self, nodes: &NodeStore) {
        self.items.clear();
        for &idx in nodes.traversal_order() {
            if !nodes.effective_visible_at(idx) || !nodes.effective_renderable_at(idx) {
                continue;
            }
            let kind = match nodes.content_at(idx) {
                NodeContent::Empty => continue,
                NodeContent::Graphics(graphics) if graphics.is_empty() => continue,
                NodeContent::Graphics(_) => ItemKind::Graphics,
                NodeContent::Sprite(texture) => ItemKind::Sprite {
                    texture: *texture,
                    anchor: nodes.anchor_at(idx),
                },
            };
            let Some(bounds) = nodes.content_world_bounds_at(idx) else {
                continue;
            };
            self.items.push(RenderItem {
                node: nodes.id_at(idx),
                kind,
                world_transform: nodes.world_transform_at(idx),
                alpha: nodes.effective_alpha_at(idx),
                tint: nodes.tint_at(idx),
                bounds,
                glow: inherited_glow(nodes, nodes.id_at(idx)),
            });
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the items whose bounds intersect `viewport`, in draw order.
    pub fn visible_in(&self, viewport: Rect) -> impl Iterator<Item = &RenderItem> + '_ {
        self.items
            .iter()
            .filter(move |item| overlaps(item.bounds, viewport))
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

fn inherited_glow(nodes: &NodeStore, mut id: NodeId) -> Option<GlowFilter> {
    loop {
        if let Some(glow) = nodes.glow(id) {
            return Some(glow);
        }
        id = nodes.parent(id)?;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};
    use waymark_core::feature::FeatureId;
    use waymark_core::halo::HOVER_GLOW;
    use waymark_core::layer::FeatureLayer;
    use waymark_core::projection::WebMercator;
    use waymark_core::scene::{Scene, SceneOptions, TextureId};
    use waymark_core::style::PointStyleUpdate;
    use waymark_core::texture::TextureAtlas;
    use waymark_core::trace::Tracer;

    use super::*;

    fn texture() -> Texture {
        Texture::new(TextureId(7), Size::new(10.0, 10.0))
    }

    #[test]
    fn plan_follows_draw_order_and_skips_groups() {
        let mut nodes = NodeStore::new();
        let root = nodes.create_container("root");
        let back = nodes.create_sprite(texture(), "back");
        let front = nodes.create_sprite(texture(), "front");
        nodes.add_child(root, back);
        nodes.add_child(root, front);
        nodes.set_position(front, Point::new(20.0, 0.0));
        let _ = nodes.evaluate();

        let plan = RenderPlan::build(&nodes);
        let order: Vec<_> = plan.items.iter().map(|item| item.node).collect();
        assert_eq!(order, vec![back, front]);
        assert_eq!(plan.items[1].bounds, Rect::new(20.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn hidden_and_unrenderable_subtrees_are_skipped() {
        let mut nodes = NodeStore::new();
        let root = nodes.create_container("root");
        let group = nodes.create_container("group");
        let inner = nodes.create_sprite(texture(), "inner");
        let hidden = nodes.create_sprite(texture(), "hidden");
        nodes.add_child(root, group);
        nodes.add_child(group, inner);
        nodes.add_child(root, hidden);
        nodes.set_visible(hidden, false);
        nodes.set_renderable(group, false);
        let _ = nodes.evaluate();

        assert!(RenderPlan::build(&nodes).items.is_empty());

        nodes.set_renderable(group, true);
        let _ = nodes.evaluate();
        let plan = RenderPlan::build(&nodes);
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].node, inner);
    }

    #[test]
    fn alpha_multiplies_and_glow_inherits() {
        let mut nodes = NodeStore::new();
        let root = nodes.create_container("root");
        let sprite = nodes.create_sprite(texture(), "sprite");
        nodes.add_child(root, sprite);
        nodes.set_alpha(root, 0.5);
        nodes.set_alpha(sprite, 0.5);
        nodes.set_glow(root, Some(HOVER_GLOW));
        let _ = nodes.evaluate();

        let plan = RenderPlan::build(&nodes);
        assert_eq!(plan.items[0].alpha, 0.25);
        assert_eq!(plan.items[0].glow, Some(HOVER_GLOW));
    }

    #[test]
    fn viewport_culling() {
        let mut nodes = NodeStore::new();
        let near = nodes.create_sprite(texture(), "near");
        let far = nodes.create_sprite(texture(), "far");
        nodes.set_position(far, Point::new(1000.0, 1000.0));
        let _ = nodes.evaluate();

        let plan = RenderPlan::build(&nodes);
        let seen: Vec<_> = plan
            .visible_in(Rect::new(0.0, 0.0, 100.0, 100.0))
            .map(|item| item.node)
            .collect();
        assert_eq!(seen, vec![near]);
    }

    #[test]
    fn points_draw_north_to_south() {
        let mut scene = Scene::new(TextureAtlas::with_builtin_markers(), SceneOptions::default());
        let mut layer = FeatureLayer::new(&mut scene, "points");
        let south = layer.add_point(&mut scene, "south");
        south.set_location(Point::new(0.0, 10.0));
        let north = layer.add_point(&mut scene, FeatureId::from("north"));
        north.set_location(Point::new(0.0, 20.0));
        north.set_style(PointStyleUpdate::default().marker("pin"));

        let projection = WebMercator::from_zoom(17.0, Vec2::ZERO);
        let _ = layer.render(&mut scene, &projection, 17.0, &mut Tracer::none());
        let _ = scene.evaluate();

        let markers = ["north", "south"]
            .map(|id| layer.get(id).and_then(|f| f.as_point()).unwrap().marker());
        let plan = RenderPlan::build(&scene.nodes);
        let pos = |node: NodeId| plan.items.iter().position(|item| item.node == node);
        // Higher latitude sorts further back.
        assert!(pos(markers[0]) < pos(markers[1]));
    }
}
