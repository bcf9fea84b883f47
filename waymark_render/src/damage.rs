// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial redraws.

use std::collections::HashMap;

use kurbo::Rect;
use waymark_core::backend::Presenter;
use waymark_core::scene::{FrameChanges, NodeStore};

/// Scene-space area that needs redrawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Everything needs redrawing.
    #[default]
    Full,
    /// A list of scene-space rectangles that need redrawing.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous frame can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// Adds one rectangle. Rectangles with no extent at all are ignored.
    pub fn add(&mut self, rect: Rect) {
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            return;
        }
        match self {
            Self::Full => {}
            Self::None => *self = Self::Rects(vec![rect]),
            Self::Rects(rects) => rects.push(rect),
        }
    }

    /// Returns the union of all damage, or `None` for [`Full`](Self::Full)
    /// and [`None`](Self::None).
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::Full | Self::None => None,
        }
    }

    /// Converts the damage into whole-unit trace rectangles, rounding
    /// outward.
    #[cfg(feature = "trace-rich")]
    #[must_use]
    pub fn trace_rects(&self) -> Vec<waymark_core::trace::DamageRect> {
        let Self::Rects(rects) = self else {
            return Vec::new();
        };
        rects
            .iter()
            .map(|r| trace_rect(*r))
            .collect()
    }
}

#[cfg(feature = "trace-rich")]
#[expect(
    clippy::cast_possible_truncation,
    reason = "scene coordinates fit in i32 after rounding"
)]
fn trace_rect(r: Rect) -> waymark_core::trace::DamageRect {
    let r = r.expand();
    waymark_core::trace::DamageRect {
        x: r.x0 as i32,
        y: r.y0 as i32,
        width: r.width() as u32,
        height: r.height() as u32,
    }
}

/// A [`Presenter`] that accumulates damage from frame changes.
///
/// For each node touched in a frame, both the area it covered last frame and
/// the area it covers now are damaged. Glow filters extend the damage of
/// their whole subtree by the glow distance. The first frame is always
/// [`DamageRegion::Full`].
#[derive(Debug, Default)]
pub struct DamageTracker {
    drawn: HashMap<u32, Rect>,
    glowing: HashMap<u32, Rect>,
    pending: Option<DamageRegion>,
    primed: bool,
}

impl DamageTracker {
    /// Creates a tracker whose first frame is fully damaged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and resets the damage accumulated since the last call.
    pub fn take(&mut self) -> DamageRegion {
        self.pending.take().unwrap_or(DamageRegion::None)
    }

    /// Forces the next frame to be fully damaged (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.pending = Some(DamageRegion::Full);
    }

    fn touch(&mut self, nodes: &NodeStore, idx: u32, damage: &mut DamageRegion) {
        if let Some(old) = self.drawn.remove(&idx) {
            damage.add(old);
        }
        let drawn = nodes.effective_visible_at(idx) && nodes.effective_renderable_at(idx);
        if drawn {
            if let Some(now) = nodes.content_world_bounds_at(idx) {
                damage.add(now);
                self.drawn.insert(idx, now);
            }
        }

        if let Some(old) = self.glowing.remove(&idx) {
            damage.add(old);
        }
        if let Some(glow) = nodes.glow_at(idx).filter(|_| drawn) {
            if let Some(subtree) = nodes.world_bounds(nodes.id_at(idx)) {
                let now = subtree.inflate(glow.distance, glow.distance);
                damage.add(now);
                self.glowing.insert(idx, now);
            }
        }
    }
}

impl Presenter for DamageTracker {
    fn apply(&mut self, nodes: &NodeStore, changes: &FrameChanges) {
        let mut damage = DamageRegion::None;

        for &idx in &changes.removed {
            if let Some(old) = self.drawn.remove(&idx) {
                damage.add(old);
            }
            if let Some(old) = self.glowing.remove(&idx) {
                damage.add(old);
            }
        }

        let touched = changes
            .transforms
            .iter()
            .chain(&changes.content)
            .chain(&changes.effects)
            .chain(&changes.hidden)
            .chain(&changes.unhidden)
            .chain(&changes.added);
        for &idx in touched {
            if changes.removed.contains(&idx) && !changes.added.contains(&idx) {
                continue;
            }
            self.touch(nodes, idx, &mut damage);
        }

        if !self.primed {
            self.primed = true;
            damage = DamageRegion::Full;
        }
        match &mut self.pending {
            Some(pending) => pending.merge(&damage),
            None => self.pending = Some(damage),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};
    use waymark_core::halo::HOVER_GLOW;
    use waymark_core::scene::TextureId;
    use waymark_core::texture::Texture;

    use super::*;

    fn sprite(nodes: &mut NodeStore, label: &str) -> waymark_core::scene::NodeId {
        nodes.create_sprite(Texture::new(TextureId(1), Size::new(10.0, 10.0)), label)
    }

    fn frame(nodes: &mut NodeStore, tracker: &mut DamageTracker) -> DamageRegion {
        let changes = nodes.evaluate();
        tracker.apply(nodes, &changes);
        tracker.take()
    }

    #[test]
    fn first_frame_is_full_then_quiet() {
        let mut nodes = NodeStore::new();
        let _ = sprite(&mut nodes, "a");
        let mut tracker = DamageTracker::new();
        assert_eq!(frame(&mut nodes, &mut tracker), DamageRegion::Full);
        assert_eq!(frame(&mut nodes, &mut tracker), DamageRegion::None);
    }

    #[test]
    fn move_damages_old_and_new_bounds() {
        let mut nodes = NodeStore::new();
        let a = sprite(&mut nodes, "a");
        let mut tracker = DamageTracker::new();
        let _ = frame(&mut nodes, &mut tracker);

        nodes.set_position(a, Point::new(100.0, 0.0));
        let damage = frame(&mut nodes, &mut tracker);
        assert_eq!(
            damage,
            DamageRegion::Rects(vec![
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(100.0, 0.0, 110.0, 10.0),
            ])
        );
    }

    #[test]
    fn hiding_damages_previous_bounds_only() {
        let mut nodes = NodeStore::new();
        let a = sprite(&mut nodes, "a");
        let mut tracker = DamageTracker::new();
        let _ = frame(&mut nodes, &mut tracker);

        nodes.set_visible(a, false);
        let damage = frame(&mut nodes, &mut tracker);
        assert_eq!(damage.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));

        // Moving while hidden costs nothing.
        nodes.set_position(a, Point::new(50.0, 50.0));
        assert_eq!(frame(&mut nodes, &mut tracker), DamageRegion::None);
    }

    #[test]
    fn destroy_damages_previous_bounds() {
        let mut nodes = NodeStore::new();
        let a = sprite(&mut nodes, "a");
        let mut tracker = DamageTracker::new();
        let _ = frame(&mut nodes, &mut tracker);

        nodes.destroy_node(a);
        let damage = frame(&mut nodes, &mut tracker);
        assert_eq!(damage.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn glow_extends_damage() {
        let mut nodes = NodeStore::new();
        let group = nodes.create_container("group");
        let a = sprite(&mut nodes, "a");
        nodes.add_child(group, a);
        let mut tracker = DamageTracker::new();
        let _ = frame(&mut nodes, &mut tracker);

        nodes.set_glow(group, Some(HOVER_GLOW));
        let damage = frame(&mut nodes, &mut tracker);
        assert_eq!(damage.bounds(), Some(Rect::new(-15.0, -15.0, 25.0, 25.0)));

        nodes.set_glow(group, None);
        let damage = frame(&mut nodes, &mut tracker);
        assert_eq!(damage.bounds(), Some(Rect::new(-15.0, -15.0, 25.0, 25.0)));
    }

    #[test]
    fn damage_accumulates_until_taken() {
        let mut nodes = NodeStore::new();
        let a = sprite(&mut nodes, "a");
        let mut tracker = DamageTracker::new();
        let _ = frame(&mut nodes, &mut tracker);

        nodes.set_position(a, Point::new(20.0, 0.0));
        let changes = nodes.evaluate();
        tracker.apply(&nodes, &changes);
        nodes.set_position(a, Point::new(40.0, 0.0));
        let changes = nodes.evaluate();
        tracker.apply(&nodes, &changes);
        assert_eq!(
            tracker.take().bounds(),
            Some(Rect::new(0.0, 0.0, 50.0, 10.0))
        );

        tracker.invalidate();
        assert_eq!(tracker.take(), DamageRegion::Full);
    }

    #[test]
    fn merge_rules() {
        let mut region = DamageRegion::None;
        region.merge(&DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]));
        assert!(!region.is_empty());
        region.merge(&DamageRegion::None);
        assert_eq!(region.bounds(), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
        region.merge(&DamageRegion::Full);
        assert_eq!(region, DamageRegion::Full);
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn trace_rects_round_outward() {
        let region = DamageRegion::Rects(vec![Rect::new(0.5, -0.5, 10.2, 3.0)]);
        let rects = region.trace_rects();
        assert_eq!(rects.len(), 1);
        assert_eq!((rects[0].x, rects[0].y), (0, -1));
        assert_eq!((rects[0].width, rects[0].height), (11, 4));
    }
}
