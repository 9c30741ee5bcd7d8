// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry cache.
//!
//! A [`GeometryCache`] snapshots the scroll container's size and the bounds of
//! every tracked element. Bounds are stored in absolute document coordinates:
//! the viewport-relative rectangle reported by the host is translated by the
//! scroll offset at capture time, once. After that, per-frame reconciliation
//! only compares scroll positions against cached numbers and never measures
//! the document again.
//!
//! Cached bounds stay valid until the next rebuild. Any layout-affecting
//! change (resize, interface switch, DOM edits) must go through
//! [`Engine::rebuild`](crate::engine::Engine::rebuild).

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size, Vec2};

use crate::options::{ElementOptions, Options};
use crate::reconcile::Pin;

/// Size of the scroll container at cache-build time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerGeometry {
    /// Container width in pixels.
    pub width: f64,
    /// Container height in pixels.
    pub height: f64,
}

impl From<Size> for ContainerGeometry {
    fn from(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// One element as measured by the host, before caching.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement<H> {
    /// Host handle for the element.
    pub element: H,
    /// Bounding rectangle relative to the viewport.
    pub rect: Rect,
    /// Parsed per-element settings.
    pub options: ElementOptions,
    /// Viewport-relative rectangle of the resolved sticky-to-top parent, if
    /// one was named and found.
    pub stick_parent_rect: Option<Rect>,
}

/// The host's view of the document, used when rebuilding the cache.
pub trait Layout {
    /// Host handle type for elements.
    type Handle;

    /// Returns the current size of the scroll container.
    fn container_size(&self) -> Size;

    /// Measures every markable element that is not disabled, in document
    /// order.
    fn measure(&self) -> Vec<Measurement<Self::Handle>>;
}

/// Run state of a tracked element, owned by the reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementState {
    /// Currently inside the viewport (including its offset margin).
    pub is_visible: bool,
    /// Currently pinned to the top.
    pub is_sticky_to_top: bool,
    /// Last in-range vertical progress percentage.
    pub percentage: Option<i32>,
    /// Placement last written for a pinned element.
    pub pin: Option<Pin>,
}

/// A cached element with absolute bounds and resolved settings.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedElement<H> {
    /// Host handle.
    pub element: H,
    /// Absolute bounds in document coordinates.
    pub bounds: Rect,
    /// Visibility margin in pixels.
    pub offset: f64,
    /// Enter-viewport handler name.
    pub action: Option<String>,
    /// Vertical parallax speed, if enabled.
    pub vertical_parallax: Option<f64>,
    /// Horizontal parallax speed, if enabled.
    pub horizontal_parallax: Option<f64>,
    /// Vertical progress handler name.
    pub vertical_progress_action: Option<String>,
    /// Stop tracking after the first entry.
    pub once: bool,
    /// Pin to the top when scrolled past.
    pub stick_to_top: bool,
    /// Absolute bottom edge of the sticky-to-top parent.
    pub stick_to_top_parent_bottom: Option<f64>,
    /// Pin to the bottom (declared, not reconciled).
    pub stick_to_bottom: bool,
    /// Name of the sticky-to-bottom parent.
    pub stick_to_bottom_parent: Option<String>,
    /// Mutable run state.
    pub state: ElementState,
}

impl<H> TrackedElement<H> {
    /// Converts a measurement into absolute coordinates.
    #[must_use]
    pub fn from_measurement(measurement: Measurement<H>, scroll: Vec2, options: &Options) -> Self {
        let Measurement {
            element,
            rect,
            options: declared,
            stick_parent_rect,
        } = measurement;
        let speed = |axis: Option<Option<f64>>| axis.map(|s| s.unwrap_or(options.parallax_speed));
        Self {
            element,
            bounds: rect + scroll,
            offset: declared.offset.unwrap_or(options.container_offset),
            action: declared.action,
            vertical_parallax: speed(declared.vertical_parallax),
            horizontal_parallax: speed(declared.horizontal_parallax),
            vertical_progress_action: declared.vertical_progress_action,
            once: declared.once,
            stick_to_top: declared.stick_to_top,
            stick_to_top_parent_bottom: stick_parent_rect.map(|r| r.y1 + scroll.y),
            stick_to_bottom: declared.stick_to_bottom,
            stick_to_bottom_parent: declared.stick_to_bottom_parent,
            state: ElementState::default(),
        }
    }

    /// Element width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    /// Element height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// Whether any parallax axis is enabled.
    #[must_use]
    pub fn has_parallax(&self) -> bool {
        self.vertical_parallax.is_some() || self.horizontal_parallax.is_some()
    }
}

/// Snapshot of the container and all tracked elements.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryCache<H> {
    pub(crate) container: ContainerGeometry,
    pub(crate) items: Vec<TrackedElement<H>>,
}

impl<H> GeometryCache<H> {
    /// Builds a cache from fresh measurements taken at scroll offset `scroll`.
    #[must_use]
    pub fn build(
        container: ContainerGeometry,
        scroll: Vec2,
        measurements: impl IntoIterator<Item = Measurement<H>>,
        options: &Options,
    ) -> Self {
        let items = measurements
            .into_iter()
            .filter(|m| !m.options.disabled)
            .map(|m| TrackedElement::from_measurement(m, scroll, options))
            .collect();
        Self { container, items }
    }

    /// Container geometry captured at build time.
    #[must_use]
    pub fn container(&self) -> ContainerGeometry {
        self.container
    }

    /// Tracked elements in document order.
    #[must_use]
    pub fn items(&self) -> &[TrackedElement<H>] {
        &self.items
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
