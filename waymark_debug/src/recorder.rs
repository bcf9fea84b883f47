// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_node_changes`](TraceSink::on_node_changes),
//! [`on_damage_rects`](TraceSink::on_damage_rects)) store only the count.

use waymark_core::feature::{FeatureKind, Lod};
use waymark_core::halo::{HaloChange, HaloKind};
use waymark_core::trace::{
    DamageRect, FeatureUpdateEvent, FrameBeginEvent, FrameSummary, HaloEvent, NodeChange,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_FEATURE_UPDATE: u8 = 2;
const TAG_HALO: u8 = 3;
const TAG_FRAME_SUMMARY: u8 = 4;
const TAG_NODE_CHANGES_COUNT: u8 = 5;
const TAG_DAMAGE_RECTS_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_count(&mut self, len: usize) {
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn write_kind(&mut self, kind: FeatureKind) {
        self.write_u8(match kind {
            FeatureKind::Point => 0,
            FeatureKind::Line => 1,
            FeatureKind::Polygon => 2,
        });
    }

    fn write_halo_kind(&mut self, kind: HaloKind) {
        self.write_u8(match kind {
            HaloKind::Hover => 0,
            HaloKind::Select => 1,
        });
    }

    fn write_halo_change(&mut self, change: HaloChange) {
        self.write_u8(match change {
            HaloChange::None => 0,
            HaloChange::Attached => 1,
            HaloChange::Released => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_f64(e.zoom);
        self.write_u32(e.feature_count);
        self.write_bool(e.invalidated);
    }

    fn on_feature_update(&mut self, e: &FeatureUpdateEvent) {
        self.write_u8(TAG_FEATURE_UPDATE);
        self.write_u64(e.frame_index);
        self.write_u32(e.node);
        self.write_kind(e.kind);
        self.write_u8(e.lod.level());
        self.write_bool(e.geometry);
        self.write_bool(e.style);
        self.write_bool(e.visible);
    }

    fn on_halo(&mut self, e: &HaloEvent) {
        self.write_u8(TAG_HALO);
        self.write_u64(e.frame_index);
        self.write_u32(e.node);
        self.write_halo_kind(e.kind);
        self.write_halo_change(e.change);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.features);
        self.write_u32(s.updated);
        self.write_u32(s.skipped);
        self.write_u32(s.hidden);
        self.write_u32(s.halos);
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        self.write_u8(TAG_NODE_CHANGES_COUNT);
        self.write_u64(frame_index);
        self.write_count(changes.len());
    }

    fn on_damage_rects(&mut self, frame_index: u64, rects: &[DamageRect]) {
        self.write_u8(TAG_DAMAGE_RECTS_COUNT);
        self.write_u64(frame_index);
        self.write_count(rects.len());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`FeatureUpdateEvent`].
    FeatureUpdate(FeatureUpdateEvent),
    /// A [`HaloEvent`].
    Halo(HaloEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Node-change count for a frame.
    NodeChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of node changes.
        count: u32,
    },
    /// Damage-rect count for a frame.
    DamageRectsCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of damage rects.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag, out-of-range enum byte or
/// truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_kind(&mut self) -> Option<FeatureKind> {
        match self.read_u8()? {
            0 => Some(FeatureKind::Point),
            1 => Some(FeatureKind::Line),
            2 => Some(FeatureKind::Polygon),
            _ => None,
        }
    }

    fn read_lod(&mut self) -> Option<Lod> {
        Lod::from_level(self.read_u8()?)
    }

    fn read_halo_kind(&mut self) -> Option<HaloKind> {
        match self.read_u8()? {
            0 => Some(HaloKind::Hover),
            1 => Some(HaloKind::Select),
            _ => None,
        }
    }

    fn read_halo_change(&mut self) -> Option<HaloChange> {
        match self.read_u8()? {
            0 => Some(HaloChange::None),
            1 => Some(HaloChange::Attached),
            2 => Some(HaloChange::Released),
            _ => None,
        }
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            zoom: self.read_f64()?,
            feature_count: self.read_u32()?,
            invalidated: self.read_bool()?,
        }))
    }

    fn decode_feature_update(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FeatureUpdate(FeatureUpdateEvent {
            frame_index: self.read_u64()?,
            node: self.read_u32()?,
            kind: self.read_kind()?,
            lod: self.read_lod()?,
            geometry: self.read_bool()?,
            style: self.read_bool()?,
            visible: self.read_bool()?,
        }))
    }

    fn decode_halo(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Halo(HaloEvent {
            frame_index: self.read_u64()?,
            node: self.read_u32()?,
            kind: self.read_halo_kind()?,
            change: self.read_halo_change()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            features: self.read_u32()?,
            updated: self.read_u32()?,
            skipped: self.read_u32()?,
            hidden: self.read_u32()?,
            halos: self.read_u32()?,
        }))
    }

    fn decode_count(&mut self) -> Option<(u64, u32)> {
        Some((self.read_u64()?, self.read_u32()?))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_FEATURE_UPDATE => self.decode_feature_update(),
            TAG_HALO => self.decode_halo(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_NODE_CHANGES_COUNT => {
                let (frame_index, count) = self.decode_count()?;
                Some(RecordedEvent::NodeChangesCount { frame_index, count })
            }
            TAG_DAMAGE_RECTS_COUNT => {
                let (frame_index, count) = self.decode_count()?;
                Some(RecordedEvent::DamageRectsCount { frame_index, count })
            }
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use waymark_core::trace::NodeField;

    use super::*;

    fn sample_update() -> FeatureUpdateEvent {
        FeatureUpdateEvent {
            frame_index: 7,
            node: 12,
            kind: FeatureKind::Point,
            lod: Lod::Full,
            geometry: true,
            style: false,
            visible: true,
        }
    }

    #[test]
    fn recorded_frame_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 7,
            zoom: 17.25,
            feature_count: 2,
            invalidated: false,
        });
        rec.on_feature_update(&sample_update());
        rec.on_halo(&HaloEvent {
            frame_index: 7,
            node: 12,
            kind: HaloKind::Hover,
            change: HaloChange::Released,
        });
        rec.on_frame_summary(&FrameSummary {
            frame_index: 7,
            features: 2,
            updated: 1,
            skipped: 1,
            hidden: 0,
            halos: 0,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);
        assert!(
            matches!(events[0], RecordedEvent::FrameBegin(e) if e.zoom == 17.25),
            "got {:?}",
            events[0]
        );
        assert_eq!(events[1], RecordedEvent::FeatureUpdate(sample_update()));
        assert!(
            matches!(
                events[2],
                RecordedEvent::Halo(HaloEvent {
                    change: HaloChange::Released,
                    ..
                })
            ),
            "got {:?}",
            events[2]
        );
        assert!(
            matches!(events[3], RecordedEvent::FrameSummary(s) if s.updated == 1),
            "got {:?}",
            events[3]
        );
    }

    #[test]
    fn rich_events_store_counts() {
        let mut rec = RecorderSink::new();
        rec.on_node_changes(
            3,
            &[
                NodeChange {
                    node_index: 1,
                    field: NodeField::Transform,
                },
                NodeChange {
                    node_index: 2,
                    field: NodeField::Content,
                },
            ],
        );
        rec.on_damage_rects(3, &[]);

        let events: Vec<_> = decode(&rec.into_bytes()).collect();
        assert_eq!(
            events,
            vec![
                RecordedEvent::NodeChangesCount {
                    frame_index: 3,
                    count: 2
                },
                RecordedEvent::DamageRectsCount {
                    frame_index: 3,
                    count: 0
                },
            ]
        );
    }

    #[test]
    fn truncated_or_unknown_input_stops() {
        let mut rec = RecorderSink::new();
        rec.on_feature_update(&sample_update());
        let bytes = rec.into_bytes();

        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
        assert_eq!(decode(&[0xff, 0, 0]).count(), 0);
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn corrupted_enum_byte_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_feature_update(&sample_update());
        rec.on_halo(&HaloEvent {
            frame_index: 7,
            node: 12,
            kind: HaloKind::Select,
            change: HaloChange::Attached,
        });
        let clean = rec.into_bytes();
        assert_eq!(decode(&clean).count(), 2);

        // tag + frame + node, then kind and lod.
        let kind_at = 1 + 8 + 4;
        for offset in [kind_at, kind_at + 1] {
            let mut bytes = clean.clone();
            bytes[offset] = 9;
            assert_eq!(decode(&bytes).count(), 0, "byte {offset} set to 9");
        }

        let halo_at = 1 + 8 + 4 + 5 + 1 + 8 + 4;
        let mut bytes = clean.clone();
        bytes[halo_at] = 7;
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events, vec![RecordedEvent::FeatureUpdate(sample_update())]);
    }
}
