// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded traces.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes a JSON array with one object per event. Every object carries
//! an `"event"` name and a `"frame"` index; the remaining keys depend on the
//! event.

use std::io::{self, Write};

use serde_json::{Value, json};
use waymark_core::feature::{FeatureKind, Lod};
use waymark_core::halo::{HaloChange, HaloKind};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| event_json(&e)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event_json(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::FrameBegin(e) => json!({
            "event": "FrameBegin",
            "frame": e.frame_index,
            "zoom": e.zoom,
            "features": e.feature_count,
            "invalidated": e.invalidated,
        }),
        RecordedEvent::FeatureUpdate(e) => json!({
            "event": "FeatureUpdate",
            "frame": e.frame_index,
            "node": e.node,
            "kind": kind_str(e.kind),
            "lod": lod_str(e.lod),
            "geometry": e.geometry,
            "style": e.style,
            "visible": e.visible,
        }),
        RecordedEvent::Halo(e) => json!({
            "event": "Halo",
            "frame": e.frame_index,
            "node": e.node,
            "kind": match e.kind {
                HaloKind::Hover => "hover",
                HaloKind::Select => "select",
            },
            "change": match e.change {
                HaloChange::None => "none",
                HaloChange::Attached => "attached",
                HaloChange::Released => "released",
            },
        }),
        RecordedEvent::FrameSummary(s) => json!({
            "event": "FrameSummary",
            "frame": s.frame_index,
            "features": s.features,
            "updated": s.updated,
            "skipped": s.skipped,
            "hidden": s.hidden,
            "halos": s.halos,
        }),
        RecordedEvent::NodeChangesCount { frame_index, count } => json!({
            "event": "NodeChanges",
            "frame": frame_index,
            "count": count,
        }),
        RecordedEvent::DamageRectsCount { frame_index, count } => json!({
            "event": "DamageRects",
            "frame": frame_index,
            "count": count,
        }),
    }
}

fn kind_str(kind: FeatureKind) -> &'static str {
    match kind {
        FeatureKind::Point => "point",
        FeatureKind::Line => "line",
        FeatureKind::Polygon => "polygon",
    }
}

fn lod_str(lod: Lod) -> &'static str {
    match lod {
        Lod::Hidden => "hidden",
        Lod::Simplified => "simplified",
        Lod::Full => "full",
    }
}

#[cfg(test)]
mod tests {
    use waymark_core::trace::{FeatureUpdateEvent, FrameBeginEvent, TraceSink};

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            zoom: 16.0,
            feature_count: 1,
            invalidated: true,
        });
        rec.on_feature_update(&FeatureUpdateEvent {
            frame_index: 0,
            node: 4,
            kind: FeatureKind::Polygon,
            lod: Lod::Simplified,
            geometry: true,
            style: true,
            visible: true,
        });
        rec.on_damage_rects(0, &[]);

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        let events = parsed.as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["event"], "FrameBegin");
        assert_eq!(events[0]["zoom"], 16.0);
        assert_eq!(events[1]["kind"], "polygon");
        assert_eq!(events[1]["lod"], "simplified");
        assert_eq!(events[2]["event"], "DamageRects");
        assert_eq!(events[2]["count"], 0);
    }

    #[test]
    fn empty_recording_exports_empty_array() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[]");
    }
}
