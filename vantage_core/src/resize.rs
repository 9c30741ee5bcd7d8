// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resize debounce bookkeeping.
//!
//! Every resize event calls [`ResizeDebounce::begin`], which marks a resize as
//! pending and returns a fresh [`ResizeToken`]. The host (re)arms its timer
//! with that token; when a timer fires it hands its token back to
//! [`ResizeDebounce::settle`]. Only the token from the most recent `begin`
//! settles the debounce, so a burst of resize events produces exactly one
//! rebuild even if the host cannot cancel stale timers.

/// Identifies one armed debounce timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResizeToken(u64);

/// Tracks whether a resize is pending and which timer may settle it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResizeDebounce {
    generation: u64,
    pending: bool,
}

impl ResizeDebounce {
    /// Creates an idle debounce.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            pending: false,
        }
    }

    /// Records a resize event and returns the token for the timer that
    /// replaces any previous one.
    pub fn begin(&mut self) -> ResizeToken {
        self.generation = self.generation.wrapping_add(1);
        self.pending = true;
        ResizeToken(self.generation)
    }

    /// Called when a debounce timer fires.
    ///
    /// Returns `true` if `token` is the latest one and the resize is now
    /// settled; the caller should rebuild. Stale tokens return `false`.
    pub fn settle(&mut self, token: ResizeToken) -> bool {
        if !self.pending || token.0 != self.generation {
            return false;
        }
        self.pending = false;
        true
    }

    /// Returns `true` while a resize is waiting to settle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}
