// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and damage tracking for waymark scenes.
//!
//! This crate sits between [`waymark_core`]'s scene evaluation and whatever
//! actually puts pixels on screen. It defines:
//!
//! - [`RenderItem`]: one drawable node, flattened to world space
//! - [`RenderPlan`]: the back-to-front list of items for one frame
//! - [`DamageRegion`]: scene-space areas that need redrawing
//! - [`DamageTracker`]: a [`Presenter`](waymark_core::backend::Presenter)
//!   that turns [`FrameChanges`](waymark_core::scene::FrameChanges) into
//!   damage
//!
//! # Crate features
//!
//! - `trace-rich` (disabled by default): Enables conversion of damage into
//!   [`DamageRect`](waymark_core::trace::DamageRect) trace events.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod damage;
mod plan;

pub use damage::{DamageRegion, DamageTracker};
pub use plan::{ItemKind, RenderItem, RenderPlan};
