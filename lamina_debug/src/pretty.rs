// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_core::stale::StaleData;
use lamina_core::trace::{
    PassBeginEvent, PassEndEvent, PhaseBeginEvent, PhaseEndEvent, ReleaseEvent, TraceSink,
    WidgetGeneratedEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Print per-widget lines.
    widgets: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("widgets", &self.widgets)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            widgets: true,
        }
    }

    /// Enables or disables the per-widget lines.
    #[must_use]
    pub fn widgets(mut self, enabled: bool) -> Self {
        self.widgets = enabled;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats stale bits as `layout|geometry`, or `-` when clean.
fn stale_names(stale: StaleData) -> String {
    if stale.is_empty() {
        return "-".into();
    }
    stale
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pass_begin(&mut self, e: &PassBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] pass={} panel={} widgets={}",
            e.pass,
            e.panel.get(),
            e.widgets,
        );
    }

    fn on_pass_end(&mut self, e: &PassEndEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] pass={} panel={} stale_widgets={}",
            e.pass,
            e.panel.get(),
            e.stale_widgets,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] pass={} {}",
            e.pass,
            e.phase.name(),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] pass={} {} generated={}",
            e.pass,
            e.phase.name(),
            e.generated,
        );
    }

    fn on_widget_generated(&mut self, e: &WidgetGeneratedEvent) {
        if !self.widgets {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[widget] pass={} {} {}#{} stale={}",
            e.pass,
            e.phase.name(),
            e.kind.name(),
            e.widget.index(),
            stale_names(e.remaining),
        );
    }

    fn on_release(&mut self, e: &ReleaseEvent) {
        let _ = writeln!(
            self.writer,
            "[release] pass={} meshes={} nodes={}",
            e.pass, e.meshes, e.nodes,
        );
    }
}

#[cfg(test)]
mod tests {
    use lamina_core::trace::PhaseKind;

    use super::*;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn phases_print_one_line_each() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            pass: 3,
            phase: PhaseKind::Geometry,
        });
        sink.on_phase_end(&PhaseEndEvent {
            pass: 3,
            phase: PhaseKind::Geometry,
            generated: 2,
        });
        sink.on_release(&ReleaseEvent {
            pass: 3,
            meshes: 4,
            nodes: 1,
        });
        assert_eq!(
            output(sink),
            "[phase:begin] pass=3 geometry\n\
             [phase:end] pass=3 geometry generated=2\n\
             [release] pass=3 meshes=4 nodes=1\n"
        );
    }

    #[test]
    fn stale_bits_are_named() {
        assert_eq!(stale_names(StaleData::empty()), "-");
        assert_eq!(
            stale_names(StaleData::GEOMETRY | StaleData::SCENEGRAPH),
            "geometry|scenegraph"
        );
    }
}
