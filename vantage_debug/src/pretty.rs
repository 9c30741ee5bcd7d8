// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use vantage_core::reconcile::Pin;
use vantage_core::scroll::FrameScrollData;
use vantage_core::timing::FrameTick;
use vantage_core::trace::{
    ActionEvent, ElementEvent, InterfaceSwitchEvent, RebuildEvent, SkipReason, StickEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Frame ticks are frequent and uninteresting on idle pages.
    frames: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
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
            frames: false,
        }
    }

    /// Also print a line for every frame tick.
    #[must_use]
    pub fn with_frames(mut self, frames: bool) -> Self {
        self.frames = frames;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn element(&mut self, tag: &str, e: &ElementEvent) {
        let _ = writeln!(
            self.writer,
            "[{tag}] #{} top={} bottom={}",
            e.index, e.bounds.y0, e.bounds.y1,
        );
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, tick: &FrameTick) {
        if self.frames {
            let _ = writeln!(
                self.writer,
                "[frame] {} at {:.1}ms",
                tick.frame_index, tick.timestamp_ms,
            );
        }
    }

    fn on_scroll(&mut self, data: &FrameScrollData) {
        let _ = writeln!(
            self.writer,
            "[scroll] v={} ({:?} {}) h={} ({:?} {})",
            data.vertical.position,
            data.vertical.direction,
            data.vertical.speed,
            data.horizontal.position,
            data.horizontal.direction,
            data.horizontal.speed,
        );
    }

    fn on_reconcile_skipped(&mut self, reason: SkipReason) {
        let reason = match reason {
            SkipReason::NoCache => "no cache",
            SkipReason::Resizing => "resizing",
        };
        let _ = writeln!(self.writer, "[skip] {reason}");
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] container={}x{} scroll=({}, {}) tracked={}",
            e.container.width, e.container.height, e.scroll.x, e.scroll.y, e.tracked,
        );
    }

    fn on_interface_switch(&mut self, e: &InterfaceSwitchEvent) {
        let _ = writeln!(
            self.writer,
            "[interface] {:?} -> {:?}",
            e.switch, e.interface,
        );
    }

    fn on_enter(&mut self, e: &ElementEvent) {
        self.element("enter", e);
    }

    fn on_exit(&mut self, e: &ElementEvent) {
        self.element("exit", e);
    }

    fn on_retire(&mut self, e: &ElementEvent) {
        self.element("retire", e);
    }

    fn on_stick(&mut self, e: &StickEvent) {
        let pin = match e.pin {
            Pin::Fixed { top } => format!("fixed top={top}"),
            Pin::Anchored => "anchored".to_owned(),
        };
        let verb = if e.engaged { "stick" } else { "move" };
        let _ = writeln!(
            self.writer,
            "[{verb}] #{} {pin} offset={}",
            e.index, e.offset,
        );
    }

    fn on_unstick(&mut self, e: &ElementEvent) {
        self.element("unstick", e);
    }

    fn on_action(&mut self, e: &ActionEvent<'_>) {
        let status = if e.invoked { "" } else { " (no handler)" };
        let _ = writeln!(
            self.writer,
            "[action] {:?} {}{status}",
            e.kind, e.name,
        );
    }
}
