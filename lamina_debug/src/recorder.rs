// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records: a tag byte, the nanoseconds elapsed
//! since the recorder was created, then the event payload. [`decode`] reads
//! them back as an iterator of [`Record`].
//!
//! Panel and widget ids are stored as their raw numbers.

use std::time::Instant;

use lamina_core::stale::StaleData;
use lamina_core::trace::{
    PassBeginEvent, PassEndEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, ReleaseEvent,
    TraceSink, WidgetGeneratedEvent,
};
use lamina_core::widget::WidgetKind;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PASS_BEGIN: u8 = 1;
const TAG_PASS_END: u8 = 2;
const TAG_PHASE_BEGIN: u8 = 3;
const TAG_PHASE_END: u8 = 4;
const TAG_WIDGET_GENERATED: u8 = 5;
const TAG_RELEASE: u8 = 6;

const WIDGET_KINDS: [WidgetKind; 4] = [
    WidgetKind::Checkbox,
    WidgetKind::Dropdown,
    WidgetKind::RadioButton,
    WidgetKind::Custom,
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
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

    fn begin(&mut self, tag: u8) {
        let elapsed = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.write_u8(tag);
        self.write_u64(elapsed);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::PanelLayout => 0,
            PhaseKind::WidgetLayout => 1,
            PhaseKind::Geometry => 2,
            PhaseKind::Scenegraph => 3,
        });
    }

    fn write_kind(&mut self, k: WidgetKind) {
        self.write_u8(match k {
            WidgetKind::Checkbox => 0,
            WidgetKind::Dropdown => 1,
            WidgetKind::RadioButton => 2,
            WidgetKind::Custom => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        self.begin(TAG_PASS_BEGIN);
        self.write_u64(e.pass);
        self.write_u32(e.panel.get());
        self.write_u32(e.widgets);
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        self.begin(TAG_PASS_END);
        self.write_u64(e.pass);
        self.write_u32(e.panel.get());
        self.write_u32(e.stale_widgets);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.begin(TAG_PHASE_BEGIN);
        self.write_u64(e.pass);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.begin(TAG_PHASE_END);
        self.write_u64(e.pass);
        self.write_phase(e.phase);
        self.write_u32(e.generated);
    }

    fn on_widget_generated(&mut self, e: &WidgetGeneratedEvent) {
        self.begin(TAG_WIDGET_GENERATED);
        self.write_u64(e.pass);
        self.write_phase(e.phase);
        self.write_u32(e.widget.panel().get());
        self.write_u32(e.widget.index());
        self.write_kind(e.kind);
        self.write_u8(e.remaining.bits());
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        self.begin(TAG_RELEASE);
        self.write_u64(e.pass);
        self.write_u32(e.meshes);
        self.write_u32(e.nodes);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`PassBeginEvent`].
    PassBegin {
        /// Pass counter.
        pass: u64,
        /// Raw panel id.
        panel: u32,
        /// Widgets in the panel.
        widgets: u32,
    },
    /// A [`PassEndEvent`].
    PassEnd {
        /// Pass counter.
        pass: u64,
        /// Raw panel id.
        panel: u32,
        /// Widgets left stale.
        stale_widgets: u32,
    },
    /// A [`PhaseBeginEvent`].
    PhaseBegin {
        /// Pass counter.
        pass: u64,
        /// The phase.
        phase: PhaseKind,
    },
    /// A [`PhaseEndEvent`].
    PhaseEnd {
        /// Pass counter.
        pass: u64,
        /// The phase.
        phase: PhaseKind,
        /// Widgets regenerated.
        generated: u32,
    },
    /// A [`WidgetGeneratedEvent`].
    WidgetGenerated {
        /// Pass counter.
        pass: u64,
        /// The phase.
        phase: PhaseKind,
        /// Raw id of the owning panel.
        panel: u32,
        /// Index of the widget within its panel.
        widget: u32,
        /// Widget kind.
        kind: WidgetKind,
        /// Stale bits left after the phase.
        remaining: StaleData,
    },
    /// A [`ReleaseEvent`].
    Release {
        /// Pass counter.
        pass: u64,
        /// Meshes destroyed.
        meshes: u32,
        /// Widget root nodes destroyed.
        nodes: u32,
    },
}

/// One decoded record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    /// Nanoseconds between the recorder's creation and the event.
    pub at_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`]s.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
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
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_kind(&mut self) -> Option<WidgetKind> {
        WIDGET_KINDS.get(usize::from(self.read_u8()?)).copied()
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_PASS_BEGIN => RecordedEvent::PassBegin {
                pass: self.read_u64()?,
                panel: self.read_u32()?,
                widgets: self.read_u32()?,
            },
            TAG_PASS_END => RecordedEvent::PassEnd {
                pass: self.read_u64()?,
                panel: self.read_u32()?,
                stale_widgets: self.read_u32()?,
            },
            TAG_PHASE_BEGIN => RecordedEvent::PhaseBegin {
                pass: self.read_u64()?,
                phase: self.read_phase()?,
            },
            TAG_PHASE_END => RecordedEvent::PhaseEnd {
                pass: self.read_u64()?,
                phase: self.read_phase()?,
                generated: self.read_u32()?,
            },
            TAG_WIDGET_GENERATED => RecordedEvent::WidgetGenerated {
                pass: self.read_u64()?,
                phase: self.read_phase()?,
                panel: self.read_u32()?,
                widget: self.read_u32()?,
                kind: self.read_kind()?,
                remaining: StaleData::from_bits_truncate(self.read_u8()?),
            },
            TAG_RELEASE => RecordedEvent::Release {
                pass: self.read_u64()?,
                meshes: self.read_u32()?,
                nodes: self.read_u32()?,
            },
            // Unknown tag: stop.
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at_nanos = self.read_u64()?;
        let event = self.decode_event(tag)?;
        Some(Record { at_nanos, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use kurbo::Size;
    use lamina_core::Panel;
    use lamina_core::input::NullInput;
    use lamina_core::trace::Tracer;
    use lamina_core::widget::Checkbox;
    use lamina_layout::ElementKind;
    use lamina_scene::font::FontMap;
    use lamina_scene::generator::SceneGenerator;
    use lamina_scene::mesh::MeshStore;

    use super::*;

    fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
        decode(rec.as_bytes()).map(|r| r.event).collect()
    }

    #[test]
    fn records_a_whole_pass() {
        let mut panel = Panel::new(NullInput);
        let layout = panel.layout_mut();
        let root = layout.set_root(ElementKind::Leaf);
        layout.set_size(Size::new(100.0, 10.0));
        let anchored = panel.add_widget(Checkbox::new("A"));
        panel.set_widget_anchor(anchored, Some(root)).unwrap();
        let _unanchored = panel.add_widget(Checkbox::new("B"));

        let mut rec = RecorderSink::new();
        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        panel
            .generate(
                &mut meshes,
                &FontMap::new(),
                &mut generator,
                &mut Tracer::new(&mut rec),
            )
            .unwrap();

        let events = events(&rec);
        let panel_id = panel.id().get();
        assert_eq!(
            events.first(),
            Some(&RecordedEvent::PassBegin {
                pass: 0,
                panel: panel_id,
                widgets: 2,
            })
        );
        assert_eq!(
            events.last(),
            Some(&RecordedEvent::PassEnd {
                pass: 0,
                panel: panel_id,
                stale_widgets: 1,
            })
        );
        let generated: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::WidgetGenerated {
                    phase,
                    widget,
                    kind,
                    remaining,
                    ..
                } => Some((*phase, *widget, *kind, *remaining)),
                _ => None,
            })
            .collect();
        assert_eq!(
            generated,
            [
                (
                    PhaseKind::WidgetLayout,
                    anchored.index(),
                    WidgetKind::Checkbox,
                    StaleData::GEOMETRY | StaleData::SCENEGRAPH,
                ),
                (
                    PhaseKind::Geometry,
                    anchored.index(),
                    WidgetKind::Checkbox,
                    StaleData::SCENEGRAPH,
                ),
                (
                    PhaseKind::Scenegraph,
                    anchored.index(),
                    WidgetKind::Checkbox,
                    StaleData::empty(),
                ),
            ]
        );
    }

    #[test]
    fn release_is_recorded_on_the_next_pass() {
        let mut panel = Panel::new(NullInput);
        let layout = panel.layout_mut();
        let root = layout.set_root(ElementKind::Leaf);
        layout.set_size(Size::new(100.0, 10.0));
        let id = panel.add_widget(Checkbox::new("A"));
        panel.set_widget_anchor(id, Some(root)).unwrap();

        let mut meshes = MeshStore::new();
        let mut generator = SceneGenerator::new();
        let fonts = FontMap::new();
        panel
            .generate(&mut meshes, &fonts, &mut generator, &mut Tracer::none())
            .unwrap();
        panel.destroy_widget(id).unwrap();

        let mut rec = RecorderSink::new();
        panel
            .generate(&mut meshes, &fonts, &mut generator, &mut Tracer::new(&mut rec))
            .unwrap();
        assert!(events(&rec).contains(&RecordedEvent::Release {
            pass: 1,
            meshes: 4,
            nodes: 1,
        }));
    }

    #[test]
    fn timestamps_do_not_decrease() {
        let mut rec = RecorderSink::new();
        for pass in 0..3 {
            rec.on_phase_begin(&PhaseBeginEvent {
                pass,
                phase: PhaseKind::Geometry,
            });
        }
        let stamps: Vec<_> = decode(rec.as_bytes()).map(|r| r.at_nanos).collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn truncated_records_stop_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_release(&ReleaseEvent {
            pass: 2,
            meshes: 3,
            nodes: 1,
        });
        rec.on_phase_end(&PhaseEndEvent {
            pass: 2,
            phase: PhaseKind::Scenegraph,
            generated: 5,
        });
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 2];
        let decoded: Vec<_> = decode(cut).map(|r| r.event).collect();
        assert_eq!(
            decoded,
            [RecordedEvent::Release {
                pass: 2,
                meshes: 3,
                nodes: 1,
            }]
        );
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
