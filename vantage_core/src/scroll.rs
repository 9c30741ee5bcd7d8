// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-over-frame scroll sampling.
//!
//! [`ScrollTracker::sample`] reads both axes from a
//! [`ScrollSource`] and compares them with the previous frame's positions,
//! producing a fresh [`FrameScrollData`]. It runs every frame, whether or not
//! reconciliation proceeds, because its `is_scrolling` flag is what lets the
//! engine skip idle frames.

use kurbo::Vec2;

use crate::source::ScrollSource;

/// A scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Top-to-bottom scrolling.
    Vertical,
    /// Left-to-right scrolling.
    Horizontal,
}

/// Which way an axis moved since the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards larger offsets (down or right).
    Forward,
    /// Towards smaller offsets (up or left).
    Backward,
    /// No movement.
    #[default]
    Unchanged,
}

impl Direction {
    /// Classifies a signed position delta.
    #[must_use]
    pub const fn from_delta(delta: i32) -> Self {
        if delta > 0 {
            Self::Forward
        } else if delta < 0 {
            Self::Backward
        } else {
            Self::Unchanged
        }
    }
}

/// One axis of a frame's scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScrollSample {
    /// Current scroll offset in pixels.
    pub position: i32,
    /// Movement direction since the previous frame.
    pub direction: Direction,
    /// Absolute movement since the previous frame, in pixels.
    pub speed: u32,
}

impl ScrollSample {
    /// Builds a sample from the previous and current positions.
    #[must_use]
    pub const fn between(previous: i32, current: i32) -> Self {
        let delta = current.saturating_sub(previous);
        Self {
            position: current,
            direction: Direction::from_delta(delta),
            speed: delta.unsigned_abs(),
        }
    }

    /// A sample that did not move.
    #[must_use]
    pub const fn at_rest(position: i32) -> Self {
        Self::between(position, position)
    }
}

/// Scroll state for both axes in one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameScrollData {
    /// Vertical axis sample.
    pub vertical: ScrollSample,
    /// Horizontal axis sample.
    pub horizontal: ScrollSample,
    /// Whether either axis moved since the previous frame.
    pub is_scrolling: bool,
}

impl FrameScrollData {
    /// Returns the sample for one axis.
    #[must_use]
    pub const fn axis(&self, axis: Axis) -> ScrollSample {
        match axis {
            Axis::Vertical => self.vertical,
            Axis::Horizontal => self.horizontal,
        }
    }

    /// Returns the scroll offset as a vector (`x` horizontal, `y` vertical).
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(
            f64::from(self.horizontal.position),
            f64::from(self.vertical.position),
        )
    }
}

/// Computes [`FrameScrollData`] from successive polls of a scroll source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollTracker {
    previous: Option<(i32, i32)>,
}

impl ScrollTracker {
    /// Creates a tracker with no recorded position.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// Polls `source` on both axes and returns the new frame data.
    ///
    /// The first sample after construction reports zero movement.
    pub fn sample<S: ScrollSource + ?Sized>(&mut self, source: &S) -> FrameScrollData {
        use crate::scroll::Axis::{Horizontal, Vertical};
        self.sample_positions(source.offset(Vertical), source.offset(Horizontal))
    }

    /// Records raw positions and returns the new frame data.
    pub fn sample_positions(&mut self, vertical: i32, horizontal: i32) -> FrameScrollData {
        let (last_v, last_h) = self.previous.unwrap_or((vertical, horizontal));
        self.previous = Some((vertical, horizontal));

        let vertical = ScrollSample::between(last_v, vertical);
        let horizontal = ScrollSample::between(last_h, horizontal);
        FrameScrollData {
            vertical,
            horizontal,
            is_scrolling: vertical.speed != 0 || horizontal.speed != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_at_rest() {
        let mut tracker = ScrollTracker::new();
        let data = tracker.sample_positions(120, 40);
        assert_eq!(data.vertical, ScrollSample::at_rest(120));
        assert_eq!(data.horizontal, ScrollSample::at_rest(40));
        assert!(!data.is_scrolling);
    }

    #[test]
    fn direction_and_speed_follow_delta() {
        let mut tracker = ScrollTracker::new();
        tracker.sample_positions(100, 0);

        let data = tracker.sample_positions(130, 0);
        assert_eq!(data.vertical.direction, Direction::Forward);
        assert_eq!(data.vertical.speed, 30);
        assert_eq!(data.horizontal.direction, Direction::Unchanged);
        assert!(data.is_scrolling);

        let data = tracker.sample_positions(110, 5);
        assert_eq!(data.vertical.direction, Direction::Backward);
        assert_eq!(data.vertical.speed, 20);
        assert_eq!(data.horizontal.direction, Direction::Forward);
        assert_eq!(data.horizontal.speed, 5);
    }

    #[test]
    fn leaving_zero_counts_as_scrolling() {
        let mut tracker = ScrollTracker::new();
        tracker.sample_positions(0, 0);
        let data = tracker.sample_positions(10, 0);
        assert!(data.is_scrolling);
        assert_eq!(data.vertical.speed, 10);
    }

    #[test]
    fn stationary_frames_are_idle() {
        let mut tracker = ScrollTracker::new();
        tracker.sample_positions(50, 50);
        tracker.sample_positions(60, 50);
        let data = tracker.sample_positions(60, 50);
        assert!(!data.is_scrolling);
        assert_eq!(data.offset(), Vec2::new(50.0, 60.0));
    }
}
