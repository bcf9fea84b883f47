// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the feature frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`FeatureLayer::render`](crate::layer::FeatureLayer::render) and
//! [`Scene::evaluate_traced`](crate::scene::Scene::evaluate_traced) call at
//! each stage. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] tallies per-feature [`UpdateReport`]s during a
//! frame and produces a [`FrameSummary`] at the end.
//!
//! Features are identified in events by the slot index of their container
//! node, the same index that appears in [`FrameChanges`] and node change
//! events.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`NodeChange`] and [`DamageRect`]
//!   events plus the corresponding `TraceSink` methods.
//!
//! [`FrameChanges`]: crate::scene::FrameChanges

use crate::feature::{FeatureKind, Lod, UpdateReport};
use crate::halo::{HaloChange, HaloKind};
#[cfg(feature = "trace-rich")]
use crate::scene::FrameChanges;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which property group of a node changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// World transform.
    Transform,
    /// Content, tint, opacity or anchor.
    Content,
    /// Hit area or glow.
    Effects,
    /// Effective visibility.
    Visibility,
    /// Added to or removed from the tree.
    Topology,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a feature layer starts a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBeginEvent {
    /// Per-layer frame counter.
    pub frame_index: u64,
    /// Effective zoom for this frame.
    pub zoom: f64,
    /// Number of features in the layer.
    pub feature_count: u32,
    /// Whether zoom, projection or wireframe changed, forcing every feature
    /// dirty.
    pub invalidated: bool,
}

/// Emitted for every feature that did work during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureUpdateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the feature's container node.
    pub node: u32,
    /// Feature variant.
    pub kind: FeatureKind,
    /// Level of detail after the update.
    pub lod: Lod,
    /// Whether geometry was reprojected.
    pub geometry: bool,
    /// Whether the style was reapplied.
    pub style: bool,
    /// Whether the feature is visible after the update.
    pub visible: bool,
}

/// Emitted when a hover glow or selection halo is attached or released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HaloEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the feature's container node.
    pub node: u32,
    /// Which decoration.
    pub kind: HaloKind,
    /// What happened to it.
    pub change: HaloChange,
}

/// Per-frame totals produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Features visited.
    pub features: u32,
    /// Features that did work.
    pub updated: u32,
    /// Features that were clean.
    pub skipped: u32,
    /// Features hidden by level of detail after the frame.
    pub hidden: u32,
    /// Selection halos alive in the overlay after the frame.
    pub halos: u32,
}

/// A per-frame node change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeChange {
    /// Slot index of the node that changed.
    pub node_index: u32,
    /// Which property group changed.
    pub field: NodeField,
}

#[cfg(feature = "trace-rich")]
impl NodeChange {
    /// Flattens the change lists of one evaluation into change records.
    #[must_use]
    pub fn collect(changes: &FrameChanges) -> Vec<Self> {
        let groups: [(&[u32], NodeField); 7] = [
            (&changes.transforms, NodeField::Transform),
            (&changes.content, NodeField::Content),
            (&changes.effects, NodeField::Effects),
            (&changes.hidden, NodeField::Visibility),
            (&changes.unhidden, NodeField::Visibility),
            (&changes.added, NodeField::Topology),
            (&changes.removed, NodeField::Topology),
        ];
        groups
            .into_iter()
            .flat_map(|(indices, field)| {
                indices.iter().map(move |&node_index| Self { node_index, field })
            })
            .collect()
    }
}

/// An axis-aligned damage rectangle in whole scene units.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a feature layer starts a frame.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called for every feature that did work.
    fn on_feature_update(&mut self, e: &FeatureUpdateEvent) {
        _ = e;
    }

    /// Called when a decoration is attached or released.
    fn on_halo(&mut self, e: &HaloEvent) {
        _ = e;
    }

    /// Called with the per-frame totals.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        _ = (frame_index, changes);
    }

    /// Called with per-frame damage rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        _ = (frame_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FeatureUpdateEvent`].
    #[inline]
    pub fn feature_update(&mut self, e: &FeatureUpdateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_feature_update(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`HaloEvent`].
    #[inline]
    pub fn halo(&mut self, e: &HaloEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_halo(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        if let Some(s) = &mut self.sink {
            s.on_node_changes(frame_index, changes);
        }
    }

    /// Emits damage rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        if let Some(s) = &mut self.sink {
            s.on_damage_rects(frame_index, rects);
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Tallies update reports during a frame and produces a [`FrameSummary`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
}

impl FrameSummaryBuilder {
    /// Starts a summary for the given frame.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                ..FrameSummary::default()
            },
        }
    }

    /// Records one feature's update.
    pub fn record(&mut self, report: &UpdateReport) {
        let s = &mut self.summary;
        s.features += 1;
        if report.updated {
            s.updated += 1;
        } else {
            s.skipped += 1;
        }
        if !report.visible {
            s.hidden += 1;
        }
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self, halos: usize) -> FrameSummary {
        FrameSummary {
            halos: u32::try_from(halos).unwrap_or(u32::MAX),
            ..self.summary
        }
    }
}

/// Builds the halo events for one update report.
pub(crate) fn halo_events(
    frame_index: u64,
    node: u32,
    report: &UpdateReport,
) -> impl Iterator<Item = HaloEvent> {
    [(HaloKind::Hover, report.hover), (HaloKind::Select, report.select)]
        .into_iter()
        .filter(|(_, change)| *change != HaloChange::None)
        .map(move |(kind, change)| HaloEvent {
            frame_index,
            node,
            kind,
            change,
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
