// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Only frame ticks carry a timestamp. Every other event is stamped with the
//! timestamp of the most recent frame before it (or `0` before the first
//! frame), which is enough to line transitions up with frames in a viewer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use vantage_core::reconcile::Pin;

use crate::recorder::{ElementTransition, RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Scroll samples become counter events so the scroll position plots as a
/// track.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut ts = 0.0_f64;
    let mut frame = 0_u64;

    let instant = |name: &str, cat: &str, ts: f64, args: Value| {
        json!({
            "ph": "i",
            "name": name,
            "cat": cat,
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "s": "t",
            "args": args,
        })
    };

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Frame(tick) => {
                ts = tick.timestamp_ms * 1000.0;
                frame = tick.frame_index;
                events.push(json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Scheduler",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": { "frame_index": frame }
                }));
            }
            RecordedEvent::Scroll(data) => {
                events.push(json!({
                    "ph": "C",
                    "name": "Scroll",
                    "cat": "Scroll",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "vertical": data.vertical.position,
                        "horizontal": data.horizontal.position,
                    }
                }));
            }
            RecordedEvent::ReconcileSkipped(reason) => {
                events.push(instant(
                    "ReconcileSkipped",
                    "Engine",
                    ts,
                    json!({ "frame_index": frame, "reason": format!("{reason:?}") }),
                ));
            }
            RecordedEvent::Rebuild {
                width,
                height,
                scroll_x,
                scroll_y,
                tracked,
            } => {
                events.push(instant(
                    "Rebuild",
                    "Engine",
                    ts,
                    json!({
                        "container": [width, height],
                        "scroll": [scroll_x, scroll_y],
                        "tracked": tracked,
                    }),
                ));
            }
            RecordedEvent::InterfaceSwitch { switch, interface } => {
                events.push(instant(
                    "InterfaceSwitch",
                    "Engine",
                    ts,
                    json!({
                        "switch": format!("{switch:?}"),
                        "interface": format!("{interface:?}"),
                    }),
                ));
            }
            RecordedEvent::Element {
                transition,
                index,
                bounds,
            } => {
                let name = match transition {
                    ElementTransition::Enter => "Enter",
                    ElementTransition::Exit => "Exit",
                    ElementTransition::Retire => "Retire",
                    ElementTransition::Unstick => "Unstick",
                };
                events.push(instant(
                    name,
                    "Element",
                    ts,
                    json!({
                        "frame_index": frame,
                        "index": index,
                        "top": bounds.y0,
                        "bottom": bounds.y1,
                    }),
                ));
            }
            RecordedEvent::Stick {
                index,
                pin,
                offset,
                engaged,
            } => {
                let placement = match pin {
                    Pin::Fixed { top } => json!({ "fixed": top }),
                    Pin::Anchored => json!("anchored"),
                };
                events.push(instant(
                    "Stick",
                    "Element",
                    ts,
                    json!({
                        "frame_index": frame,
                        "index": index,
                        "pin": placement,
                        "offset": offset,
                        "engaged": engaged,
                    }),
                ));
            }
            RecordedEvent::Action {
                kind,
                name,
                invoked,
            } => {
                events.push(instant(
                    "Action",
                    "Action",
                    ts,
                    json!({
                        "frame_index": frame,
                        "kind": format!("{kind:?}"),
                        "name": name,
                        "invoked": invoked,
                    }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use kurbo::Rect;
    use vantage_core::scroll::ScrollTracker;
    use vantage_core::timing::FrameTick;
    use vantage_core::trace::{ElementEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        let mut tracker = ScrollTracker::new();
        tracker.sample_positions(0, 0);
        rec.on_frame(&FrameTick {
            timestamp_ms: 1000.0,
            frame_index: 7,
        });
        rec.on_scroll(&tracker.sample_positions(250, 0));
        rec.on_enter(&ElementEvent {
            index: 0,
            bounds: Rect::new(0.0, 1000.0, 100.0, 1200.0),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Frame");
        assert_eq!(parsed[0]["ts"], 1_000_000.0);

        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[1]["args"]["vertical"], 250);

        // Stamped with the preceding frame.
        assert_eq!(parsed[2]["name"], "Enter");
        assert_eq!(parsed[2]["ts"], 1_000_000.0);
        assert_eq!(parsed[2]["args"]["frame_index"], 7);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
