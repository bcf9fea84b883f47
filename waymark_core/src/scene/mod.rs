// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained scene tree.
//!
//! A [`Scene`] bundles the node tree with textures, named feature layers and
//! the overlay that hosts selection halos.
//!
//! A *node* is an element of the drawing tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//! - **Local properties** set by the caller: position, scale, rotation,
//!   anchor, z-index, alpha, tint, [`content`](NodeContent), hit area, glow
//!   and [`flags`](NodeFlags).
//! - **Computed properties** produced by [`evaluate`](NodeStore::evaluate):
//!   `world_transform` (product of ancestor local transforms) and
//!   `effective_visible` (every ancestor is visible).
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! # Dirty tracking
//!
//! Property mutations automatically mark the corresponding dirty channel
//! (see [`dirty`](crate::dirty)):
//!
//! - **TRANSFORM**: position, scale, rotation and visibility. Propagates to
//!   all descendants.
//! - **CONTENT** / **EFFECTS**: local-only; only the modified node is marked.
//! - **TOPOLOGY**: structural changes and z-index changes that trigger a
//!   draw-order rebuild.

mod content;
mod evaluate;
mod id;
mod root;
mod store;
mod traverse;

pub(crate) use content::points_bbox;
pub use content::{Color, DrawCommand, Graphics, NodeContent, Stroke, sprite_rect};
pub use evaluate::FrameChanges;
pub use id::{INVALID, NodeId, TextureId};
pub use root::{OVERLAY_LABEL, Scene, SceneOptions};
pub use store::{NodeFlags, NodeStore};
pub use traverse::Children;
