// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use waymark_core::feature::{FeatureKind, Lod};
use waymark_core::halo::{HaloChange, HaloKind};
use waymark_core::trace::{
    DamageRect, FeatureUpdateEvent, FrameBeginEvent, FrameSummary, HaloEvent, NodeChange,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn kind_name(kind: FeatureKind) -> &'static str {
    match kind {
        FeatureKind::Point => "point",
        FeatureKind::Line => "line",
        FeatureKind::Polygon => "polygon",
    }
}

fn lod_name(lod: Lod) -> &'static str {
    match lod {
        Lod::Hidden => "hidden",
        Lod::Simplified => "simplified",
        Lod::Full => "full",
    }
}

fn flag(set: bool, name: &'static str) -> &'static str {
    if set { name } else { "-" }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let invalidated = if e.invalidated { " invalidated" } else { "" };
        let _ = writeln!(
            self.writer,
            "[frame] frame={} zoom={:.2} features={}{invalidated}",
            e.frame_index, e.zoom, e.feature_count,
        );
    }

    fn on_feature_update(&mut self, e: &FeatureUpdateEvent) {
        let _ = writeln!(
            self.writer,
            "[update] frame={} node={} {} lod={} {} {} {}",
            e.frame_index,
            e.node,
            kind_name(e.kind),
            lod_name(e.lod),
            flag(e.geometry, "geometry"),
            flag(e.style, "style"),
            if e.visible { "visible" } else { "hidden" },
        );
    }

    fn on_halo(&mut self, e: &HaloEvent) {
        let kind = match e.kind {
            HaloKind::Hover => "hover",
            HaloKind::Select => "select",
        };
        let change = match e.change {
            HaloChange::None => "unchanged",
            HaloChange::Attached => "attached",
            HaloChange::Released => "released",
        };
        let _ = writeln!(
            self.writer,
            "[halo] frame={} node={} {kind} {change}",
            e.frame_index, e.node,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} features={} updated={} skipped={} hidden={} halos={}",
            s.frame_index, s.features, s.updated, s.skipped, s.hidden, s.halos,
        );
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        let _ = writeln!(
            self.writer,
            "[nodes] frame={frame_index} changes={}",
            changes.len(),
        );
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={frame_index} rects={}",
            rects.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_frame_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            zoom: 16.5,
            feature_count: 3,
            invalidated: true,
        });
        let output = output(sink);
        assert_eq!(output, "[frame] frame=1 zoom=16.50 features=3 invalidated\n");
    }

    #[test]
    fn pretty_print_update_and_halo() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_feature_update(&FeatureUpdateEvent {
            frame_index: 4,
            node: 9,
            kind: FeatureKind::Line,
            lod: Lod::Simplified,
            geometry: false,
            style: true,
            visible: true,
        });
        sink.on_halo(&HaloEvent {
            frame_index: 4,
            node: 9,
            kind: HaloKind::Select,
            change: HaloChange::Attached,
        });
        let output = output(sink);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "[update] frame=4 node=9 line lod=simplified - style visible");
        assert_eq!(lines[1], "[halo] frame=4 node=9 select attached");
    }

    #[test]
    fn pretty_print_summary_and_rich_counts() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_summary(&FrameSummary {
            frame_index: 2,
            features: 5,
            updated: 2,
            skipped: 3,
            hidden: 1,
            halos: 1,
        });
        sink.on_damage_rects(
            2,
            &[DamageRect {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            }],
        );
        let output = output(sink);
        assert!(output.contains("updated=2 skipped=3"), "got: {output}");
        assert!(output.contains("[damage] frame=2 rects=1"), "got: {output}");
    }
}
