// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Passes and phases become duration events on one track per panel; widget
//! generation and releases become instant events.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// # Errors
///
/// Fails when writing to `writer` fails.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    // Phase events carry no panel; they belong to the enclosing pass.
    let mut panel = 0;

    for record in decode(bytes) {
        let ts = nanos_to_us(record.at_nanos);
        match record.event {
            RecordedEvent::PassBegin {
                pass,
                panel: id,
                widgets,
            } => {
                panel = id;
                events.push(json!({
                    "ph": "B",
                    "name": "pass",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": panel,
                    "tid": 0,
                    "args": {
                        "pass": pass,
                        "widgets": widgets,
                    }
                }));
            }
            RecordedEvent::PassEnd {
                pass,
                panel: id,
                stale_widgets,
            } => {
                events.push(json!({
                    "ph": "E",
                    "name": "pass",
                    "cat": "Pass",
                    "ts": ts,
                    "pid": id,
                    "tid": 0,
                    "args": {
                        "pass": pass,
                        "stale_widgets": stale_widgets,
                    }
                }));
            }
            RecordedEvent::PhaseBegin { pass, phase } => {
                events.push(json!({
                    "ph": "B",
                    "name": phase.name(),
                    "cat": "Phase",
                    "ts": ts,
                    "pid": panel,
                    "tid": 0,
                    "args": {
                        "pass": pass,
                    }
                }));
            }
            RecordedEvent::PhaseEnd {
                pass,
                phase,
                generated,
            } => {
                events.push(json!({
                    "ph": "E",
                    "name": phase.name(),
                    "cat": "Phase",
                    "ts": ts,
                    "pid": panel,
                    "tid": 0,
                    "args": {
                        "pass": pass,
                        "generated": generated,
                    }
                }));
            }
            RecordedEvent::WidgetGenerated {
                pass,
                phase,
                panel: id,
                widget,
                kind,
                remaining,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": kind.name(),
                    "cat": "Widget",
                    "ts": ts,
                    "pid": id,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "pass": pass,
                        "phase": phase.name(),
                        "widget": widget,
                        "remaining": remaining.bits(),
                    }
                }));
            }
            RecordedEvent::Release {
                pass,
                meshes,
                nodes,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "release",
                    "cat": "Release",
                    "ts": ts,
                    "pid": panel,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "pass": pass,
                        "meshes": meshes,
                        "nodes": nodes,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}
