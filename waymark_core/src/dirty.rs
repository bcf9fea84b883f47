// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the scene graph.
//!
//! [`NodeStore`](crate::scene::NodeStore) uses multi-channel dirty tracking
//! (via [`understory_dirty`]) so that a frame only touches the nodes whose
//! derived state is stale. Each channel is an independent category of change.
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`TRANSFORM`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges from
//!   child to parent. Moving, scaling, rotating or hiding a feature container
//!   marks every marker, icon and viewfield below it, because world transforms
//!   and effective visibility are inherited. (Visibility changes are routed
//!   through [`TRANSFORM`] so one drain pass recomputes both.)
//!
//! - **Local-only**: [`CONTENT`] (texture, tint, alpha, anchor, graphics) and
//!   [`EFFECTS`] (hit area, glow filter) only mark the node that changed.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on child insertion and removal,
//!   node creation and destruction, and z-index changes. It triggers a
//!   traversal-order rebuild during evaluation.
//!
//! These channels describe the scene graph only. Feature-level staleness
//! (geometry, style, interaction) is tracked with plain flags on each feature
//! and resolved before the scene graph is evaluated.

use understory_dirty::Channel;

/// Position, scale, rotation or visibility changed; world transforms and
/// effective visibility of descendants must be recomputed.
pub const TRANSFORM: Channel = Channel::new(0);

/// Drawable content changed (texture, tint, alpha, anchor or graphics).
pub const CONTENT: Channel = Channel::new(1);

/// Interaction and decoration state changed (hit area or glow filter).
pub const EFFECTS: Channel = Channel::new(2);

/// Tree topology or sibling order changed; triggers a traversal rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
