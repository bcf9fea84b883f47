// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained scene graph and feature renderers for interactive map editing.
//!
//! `waymark_core` turns map features (points, lines and areas with
//! `(longitude, latitude)` coordinates) into a tree of drawable nodes, and
//! keeps that tree up to date frame by frame while doing as little work as
//! possible.
//!
//! # Architecture
//!
//! ```text
//!   caller mutations (coords, style, hover/select)
//!       │
//!       ▼
//!   FeatureLayer::render() ──► Feature::update() ──► NodeStore setters
//!                                                        │
//!                 ┌──────────────────────────────────────┘
//!                 ▼
//!   Scene::evaluate() ──► FrameChanges ──► Presenter::apply()
//! ```
//!
//! **[`feature`]**: Point, line and polygon renderers. Each feature owns a
//! [`Geometry`](geometry::Geometry), a resolved style and a container node,
//! and only touches the scene when its geometry, style or interaction state
//! is dirty.
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles,
//! plus the [`Scene`](scene::Scene) root that bundles nodes, textures, layers
//! and the overlay.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`layer`]**: [`FeatureLayer`](layer::FeatureLayer), the per-frame
//! driver that invalidates features when the view changes.
//!
//! **[`overlay`]**: Registry of selection halos, one per feature.
//!
//! **[`style`]**, **[`texture`]**, **[`projection`]**, **[`hit_area`]**,
//! **[`halo`]**: Resolution of the inputs features draw with.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait that drawing
//! crates implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   change and damage-rect events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod dirty;
pub mod feature;
pub mod geometry;
pub mod halo;
pub mod hit_area;
pub mod layer;
pub mod overlay;
pub mod projection;
pub mod scene;
pub mod style;
pub mod texture;
pub mod trace;
