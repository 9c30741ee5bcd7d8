// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as it samples, rebuilds and reconciles. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::{Rect, Vec2};

use crate::action::ActionKind;
use crate::cache::ContainerGeometry;
use crate::reconcile::Pin;
use crate::scroll::FrameScrollData;
use crate::source::{Interface, InterfaceSwitch};
use crate::timing::FrameTick;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a reconciliation pass did nothing.
///
/// Idle frames (no scroll movement, not forced) are not reported; they are
/// the common case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The geometry cache has not been built yet.
    NoCache,
    /// A resize is pending and cached geometry is stale.
    Resizing,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the geometry cache is rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct RebuildEvent {
    /// Container geometry captured by the rebuild.
    pub container: ContainerGeometry,
    /// Scroll offset folded into the absolute bounds.
    pub scroll: Vec2,
    /// Number of elements now tracked.
    pub tracked: usize,
}

/// Emitted when the active scroll interface changes.
#[derive(Clone, Copy, Debug)]
pub struct InterfaceSwitchEvent {
    /// What happened.
    pub switch: InterfaceSwitch,
    /// Interface active afterwards.
    pub interface: Interface,
}

/// Identifies an element in a reconciliation pass.
#[derive(Clone, Copy, Debug)]
pub struct ElementEvent {
    /// Position in the tracked set at the time of the event.
    pub index: usize,
    /// Cached absolute bounds.
    pub bounds: Rect,
}

/// Emitted when an element is pinned or its placement changes.
#[derive(Clone, Copy, Debug)]
pub struct StickEvent {
    /// Position in the tracked set.
    pub index: usize,
    /// Placement written for the element.
    pub pin: Pin,
    /// Clamped pinned offset.
    pub offset: f64,
    /// Whether this pass engaged the pin (as opposed to moving it).
    pub engaged: bool,
}

/// Emitted for each named handler the engine tried to invoke.
#[derive(Clone, Copy, Debug)]
pub struct ActionEvent<'a> {
    /// Which trigger produced the call.
    pub kind: ActionKind,
    /// Handler name.
    pub name: &'a str,
    /// `false` if no handler was registered under `name`.
    pub invoked: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the backend delivers a frame.
    fn on_frame(&mut self, tick: &FrameTick) {
        _ = tick;
    }

    /// Called after a sample in which either axis moved.
    fn on_scroll(&mut self, data: &FrameScrollData) {
        _ = data;
    }

    /// Called when a reconciliation pass is skipped for a reason other than
    /// idleness.
    fn on_reconcile_skipped(&mut self, reason: SkipReason) {
        _ = reason;
    }

    /// Called after the geometry cache is rebuilt.
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        _ = e;
    }

    /// Called when the active scroll interface changes.
    fn on_interface_switch(&mut self, e: &InterfaceSwitchEvent) {
        _ = e;
    }

    /// Called when an element enters the viewport.
    fn on_enter(&mut self, e: &ElementEvent) {
        _ = e;
    }

    /// Called when an element leaves the viewport.
    fn on_exit(&mut self, e: &ElementEvent) {
        _ = e;
    }

    /// Called when a `once` element stops being tracked.
    fn on_retire(&mut self, e: &ElementEvent) {
        _ = e;
    }

    /// Called when an element is pinned or re-placed.
    fn on_stick(&mut self, e: &StickEvent) {
        _ = e;
    }

    /// Called when a pinned element is released.
    fn on_unstick(&mut self, e: &ElementEvent) {
        _ = e;
    }

    /// Called for each named handler dispatch.
    fn on_action(&mut self, e: &ActionEvent<'_>) {
        _ = e;
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

/// Generates a `Tracer` method forwarding one event to the sink.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident => $hook:ident($arg:ident: $ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, $arg: $ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook($arg);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = $arg;
            }
        }
    };
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

    forward!(
        /// Emits a frame tick.
        frame => on_frame(tick: &FrameTick)
    );
    forward!(
        /// Emits a moving scroll sample.
        scroll => on_scroll(data: &FrameScrollData)
    );
    forward!(
        /// Emits a skipped reconciliation.
        reconcile_skipped => on_reconcile_skipped(reason: SkipReason)
    );
    forward!(
        /// Emits a [`RebuildEvent`].
        rebuild => on_rebuild(e: &RebuildEvent)
    );
    forward!(
        /// Emits an [`InterfaceSwitchEvent`].
        interface_switch => on_interface_switch(e: &InterfaceSwitchEvent)
    );
    forward!(
        /// Emits a viewport entry.
        enter => on_enter(e: &ElementEvent)
    );
    forward!(
        /// Emits a viewport exit.
        exit => on_exit(e: &ElementEvent)
    );
    forward!(
        /// Emits a `once` retirement.
        retire => on_retire(e: &ElementEvent)
    );
    forward!(
        /// Emits a [`StickEvent`].
        stick => on_stick(e: &StickEvent)
    );
    forward!(
        /// Emits a release.
        unstick => on_unstick(e: &ElementEvent)
    );
    forward!(
        /// Emits an [`ActionEvent`].
        action => on_action(e: &ActionEvent<'_>)
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> ElementEvent {
        ElementEvent {
            index: 3,
            bounds: Rect::new(0.0, 1000.0, 100.0, 1200.0),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_enter(&sample_event());
        sink.on_reconcile_skipped(SkipReason::NoCache);
        sink.on_action(&ActionEvent {
            kind: ActionKind::Enter,
            name: "reveal",
            invoked: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.enter(&sample_event());
        tracer.reconcile_skipped(SkipReason::Resizing);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            entered: Vec<usize>,
        }
        impl TraceSink for RecordingSink {
            fn on_enter(&mut self, e: &ElementEvent) {
                self.entered.push(e.index);
            }
        }

        let mut sink = RecordingSink {
            entered: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.enter(&sample_event());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.entered, &[3]);
    }
}
