// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame ticks delivered by backend frame loops.
//!
//! A backend's tick source (e.g. `requestAnimationFrame`) produces one
//! [`FrameTick`] per rendering frame. The engine itself is time-agnostic: the
//! tick only identifies the frame for diagnostics.

/// A frame opportunity delivered by the backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Frame timestamp in milliseconds on the backend's monotonic clock.
    pub timestamp_ms: f64,
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
}
