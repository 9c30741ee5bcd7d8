// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as
//! an iterator of [`RecordedEvent`]. Decoding stops at the first truncated or
//! unknown record.

use kurbo::Rect;

use vantage_core::action::ActionKind;
use vantage_core::reconcile::Pin;
use vantage_core::scroll::FrameScrollData;
use vantage_core::source::{Interface, InterfaceSwitch};
use vantage_core::timing::FrameTick;
use vantage_core::trace::{
    ActionEvent, ElementEvent, InterfaceSwitchEvent, RebuildEvent, SkipReason, StickEvent,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME: u8 = 1;
const TAG_SCROLL: u8 = 2;
const TAG_SKIPPED: u8 = 3;
const TAG_REBUILD: u8 = 4;
const TAG_INTERFACE: u8 = 5;
const TAG_ENTER: u8 = 6;
const TAG_EXIT: u8 = 7;
const TAG_RETIRE: u8 = 8;
const TAG_STICK: u8 = 9;
const TAG_UNSTICK: u8 = 10;
const TAG_ACTION: u8 = 11;

// ---------------------------------------------------------------------------
// Decoded events
// ---------------------------------------------------------------------------

/// Which element transition an [`RecordedEvent::Element`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementTransition {
    /// Entered the viewport.
    Enter,
    /// Left the viewport.
    Exit,
    /// Retired after its first entry.
    Retire,
    /// Released from a pin.
    Unstick,
}

/// A decoded trace event.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A frame tick.
    Frame(FrameTick),
    /// A moving scroll sample.
    Scroll(FrameScrollData),
    /// A skipped reconciliation.
    ReconcileSkipped(SkipReason),
    /// A cache rebuild.
    Rebuild {
        /// Container width.
        width: f64,
        /// Container height.
        height: f64,
        /// Horizontal scroll offset at capture.
        scroll_x: f64,
        /// Vertical scroll offset at capture.
        scroll_y: f64,
        /// Elements tracked afterwards.
        tracked: u32,
    },
    /// An interface switch.
    InterfaceSwitch {
        /// What happened.
        switch: InterfaceSwitch,
        /// Interface active afterwards.
        interface: Interface,
    },
    /// An enter, exit, retire or unstick transition.
    Element {
        /// Which transition.
        transition: ElementTransition,
        /// Position in the tracked set.
        index: u32,
        /// Cached absolute bounds.
        bounds: Rect,
    },
    /// A pin engaged or moved.
    Stick {
        /// Position in the tracked set.
        index: u32,
        /// Placement written.
        pin: Pin,
        /// Clamped pinned offset.
        offset: f64,
        /// Whether the pin was engaged by this pass.
        engaged: bool,
    },
    /// A handler dispatch.
    Action {
        /// Trigger.
        kind: ActionKind,
        /// Handler name.
        name: String,
        /// Whether a handler was registered.
        invoked: bool,
    },
}

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

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn index(&mut self, index: usize) {
        self.u32(u32::try_from(index).unwrap_or(u32::MAX));
    }

    fn rect(&mut self, r: Rect) {
        for v in [r.x0, r.y0, r.x1, r.y1] {
            self.f64(v);
        }
    }

    fn element(&mut self, tag: u8, e: &ElementEvent) {
        self.u8(tag);
        self.index(e.index);
        self.rect(e.bounds);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame(&mut self, tick: &FrameTick) {
        self.u8(TAG_FRAME);
        self.u64(tick.frame_index);
        self.f64(tick.timestamp_ms);
    }

    fn on_scroll(&mut self, data: &FrameScrollData) {
        self.u8(TAG_SCROLL);
        // Direction and `is_scrolling` are derived on decode.
        self.i32(data.vertical.position);
        self.i32(data.vertical.position.saturating_sub(signed(data.vertical)));
        self.i32(data.horizontal.position);
        self.i32(data.horizontal.position.saturating_sub(signed(data.horizontal)));
    }

    fn on_reconcile_skipped(&mut self, reason: SkipReason) {
        self.u8(TAG_SKIPPED);
        self.u8(match reason {
            SkipReason::NoCache => 0,
            SkipReason::Resizing => 1,
        });
    }

    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.u8(TAG_REBUILD);
        self.f64(e.container.width);
        self.f64(e.container.height);
        self.f64(e.scroll.x);
        self.f64(e.scroll.y);
        self.index(e.tracked);
    }

    fn on_interface_switch(&mut self, e: &InterfaceSwitchEvent) {
        self.u8(TAG_INTERFACE);
        self.u8(match e.switch {
            InterfaceSwitch::Mounted => 0,
            InterfaceSwitch::Unmounted => 1,
            InterfaceSwitch::FellBack => 2,
        });
        self.u8(match e.interface {
            Interface::Native => 0,
            Interface::Virtualized => 1,
        });
    }

    fn on_enter(&mut self, e: &ElementEvent) {
        self.element(TAG_ENTER, e);
    }

    fn on_exit(&mut self, e: &ElementEvent) {
        self.element(TAG_EXIT, e);
    }

    fn on_retire(&mut self, e: &ElementEvent) {
        self.element(TAG_RETIRE, e);
    }

    fn on_stick(&mut self, e: &StickEvent) {
        self.u8(TAG_STICK);
        self.index(e.index);
        match e.pin {
            Pin::Fixed { top } => {
                self.u8(0);
                self.f64(top);
            }
            Pin::Anchored => {
                self.u8(1);
                self.f64(0.0);
            }
        }
        self.f64(e.offset);
        self.u8(u8::from(e.engaged));
    }

    fn on_unstick(&mut self, e: &ElementEvent) {
        self.element(TAG_UNSTICK, e);
    }

    fn on_action(&mut self, e: &ActionEvent<'_>) {
        self.u8(TAG_ACTION);
        self.u8(match e.kind {
            ActionKind::Enter => 0,
            ActionKind::Progress => 1,
        });
        self.u8(u8::from(e.invoked));
        let name = e.name.as_bytes();
        self.index(name.len());
        self.buf.extend_from_slice(name);
    }
}

/// Signed delta of a sample.
fn signed(sample: vantage_core::scroll::ScrollSample) -> i32 {
    use vantage_core::scroll::Direction;
    let speed = i32::try_from(sample.speed).unwrap_or(i32::MAX);
    match sample.direction {
        Direction::Forward => speed,
        Direction::Backward => -speed,
        Direction::Unchanged => 0,
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a buffer produced by [`RecorderSink`].
#[must_use]
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter { bytes, pos: 0 }
}

/// Iterator over [`RecordedEvent`]s in a recorded buffer.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let chunk = self.bytes.get(self.pos..end)?;
        self.pos = end;
        chunk.try_into().ok()
    }

    fn u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_le_bytes)
    }

    fn u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn bool(&mut self) -> Option<bool> {
        match self.u8()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    fn rect(&mut self) -> Option<Rect> {
        Some(Rect::new(self.f64()?, self.f64()?, self.f64()?, self.f64()?))
    }

    fn element(&mut self, transition: ElementTransition) -> Option<RecordedEvent> {
        Some(RecordedEvent::Element {
            transition,
            index: self.u32()?,
            bounds: self.rect()?,
        })
    }

    fn scroll(&mut self) -> Option<RecordedEvent> {
        use vantage_core::scroll::ScrollSample;
        let v = self.i32()?;
        let v_prev = self.i32()?;
        let h = self.i32()?;
        let h_prev = self.i32()?;
        let vertical = ScrollSample::between(v_prev, v);
        let horizontal = ScrollSample::between(h_prev, h);
        Some(RecordedEvent::Scroll(FrameScrollData {
            vertical,
            horizontal,
            is_scrolling: vertical.speed != 0 || horizontal.speed != 0,
        }))
    }

    fn stick(&mut self) -> Option<RecordedEvent> {
        let index = self.u32()?;
        let pin_tag = self.u8()?;
        let top = self.f64()?;
        let pin = match pin_tag {
            0 => Pin::Fixed { top },
            1 => Pin::Anchored,
            _ => return None,
        };
        Some(RecordedEvent::Stick {
            index,
            pin,
            offset: self.f64()?,
            engaged: self.bool()?,
        })
    }

    fn action(&mut self) -> Option<RecordedEvent> {
        let kind = match self.u8()? {
            0 => ActionKind::Enter,
            1 => ActionKind::Progress,
            _ => return None,
        };
        let invoked = self.bool()?;
        let len = usize::try_from(self.u32()?).ok()?;
        let end = self.pos.checked_add(len)?;
        let name = core::str::from_utf8(self.bytes.get(self.pos..end)?).ok()?;
        self.pos = end;
        Some(RecordedEvent::Action {
            kind,
            name: name.to_owned(),
            invoked,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let event = match self.u8()? {
            TAG_FRAME => RecordedEvent::Frame(FrameTick {
                frame_index: self.u64()?,
                timestamp_ms: self.f64()?,
            }),
            TAG_SCROLL => self.scroll()?,
            TAG_SKIPPED => RecordedEvent::ReconcileSkipped(match self.u8()? {
                0 => SkipReason::NoCache,
                1 => SkipReason::Resizing,
                _ => return None,
            }),
            TAG_REBUILD => RecordedEvent::Rebuild {
                width: self.f64()?,
                height: self.f64()?,
                scroll_x: self.f64()?,
                scroll_y: self.f64()?,
                tracked: self.u32()?,
            },
            TAG_INTERFACE => {
                let switch = match self.u8()? {
                    0 => InterfaceSwitch::Mounted,
                    1 => InterfaceSwitch::Unmounted,
                    2 => InterfaceSwitch::FellBack,
                    _ => return None,
                };
                let interface = match self.u8()? {
                    0 => Interface::Native,
                    1 => Interface::Virtualized,
                    _ => return None,
                };
                RecordedEvent::InterfaceSwitch { switch, interface }
            }
            TAG_ENTER => self.element(ElementTransition::Enter)?,
            TAG_EXIT => self.element(ElementTransition::Exit)?,
            TAG_RETIRE => self.element(ElementTransition::Retire)?,
            TAG_UNSTICK => self.element(ElementTransition::Unstick)?,
            TAG_STICK => self.stick()?,
            TAG_ACTION => self.action()?,
            _ => return None,
        };
        Some(event)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
