// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll tracking and per-frame reconciliation for scroll-driven styling.
//!
//! `vantage_core` watches a scroll offset each frame and decides, for every
//! tracked element, whether it entered or left the viewport, how far it has
//! progressed through it, how much parallax translation it gets, and whether
//! it should be pinned to the top of the viewport. It is `no_std` compatible
//! (with `alloc`) and knows nothing about the DOM: hosts supply measurements
//! through [`Layout`](cache::Layout), offsets through
//! [`ScrollSource`](source::ScrollSource), and apply the resulting
//! [`FrameChanges`](reconcile::FrameChanges) through a
//! [`Presenter`](backend::Presenter).
//!
//! # Architecture
//!
//! ```text
//!   Backend (frame tick)
//!       │
//!       ▼
//!   ScrollSource ──► ScrollTracker::sample() ──► FrameScrollData
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   GeometryCache ──► reconcile() ──► FrameChanges ──► Presenter::apply()
//!                                          │
//!                                          └──────► ActionRegistry::dispatch()
//! ```
//!
//! The geometry cache is rebuilt out of band (startup, debounced resize,
//! interface switch, explicit recompute), never in response to scrolling.
//!
//! **[`source`]**: The scroll-offset polling contract and the native /
//! virtualized interface switch.
//!
//! **[`scroll`]**: Per-axis scroll samples and the frame-over-frame delta
//! tracker.
//!
//! **[`cache`]**: Container geometry and absolute element bounds.
//!
//! **[`reconcile`]**: Visibility, progress, parallax and sticky math, and the
//! per-frame change set.
//!
//! **[`engine`]**: [`Engine`](engine::Engine) ties the pieces together and
//! guards reconciliation against idle frames and pending resizes.
//!
//! **[`action`]**: Named enter/progress handlers registered by the host.
//!
//! **[`options`]**: Engine configuration and per-element attribute parsing.
//!
//! **[`resize`]**: Debounce bookkeeping for resize bursts.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait backends
//! implement.
//!
//! **[`timing`]**: The frame tick delivered by backend frame loops.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! engine instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod action;
pub mod backend;
pub mod cache;
pub mod engine;
pub mod options;
pub mod reconcile;
pub mod resize;
pub mod scroll;
pub mod source;
pub mod timing;
pub mod trace;

/// Rounds to the nearest integer, with halves rounded toward positive
/// infinity.
///
/// This is the rounding browsers apply to script-computed pixel values, so
/// `-0.5` rounds to `0` and `2.5` rounds to `3`. Non-finite input yields `0`
/// for NaN and saturates for infinities.
#[must_use]
pub fn round_half_up(value: f64) -> i32 {
    let shifted = value + 0.5;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "saturating float-to-int cast is the floor's first step"
    )]
    let truncated = shifted as i32;
    if f64::from(truncated) > shifted {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}
