// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame reconciliation.
//!
//! [`reconcile`] walks the geometry cache once per (non-idle) frame and, for
//! every tracked element, evaluates four independent features against the
//! frame's scroll data:
//!
//! 1. **Visibility**: [`is_in_view`]. Entering adds the in-viewport marker
//!    and queues the enter action; `once` elements are then retired from the
//!    cache for good. Leaving removes the marker.
//! 2. **Progress**: [`progress_percentage`]. The progress action is queued
//!    only for values within `0..=100`.
//! 3. **Parallax**: [`parallax_offset`], written only while the element is in
//!    view.
//! 4. **Sticky-to-top**: [`sticky_placement`] once the element's top has been
//!    scrolled past, bounded by its parent's bottom edge.
//!
//! Results land in a [`FrameChanges`]; nothing here touches the host. Each
//! feature only records a change when its state actually changed (parallax
//! excepted, since it tracks the scroll position continuously).

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use crate::action::{ActionKind, ElementSnapshot, PendingAction};
use crate::cache::{ContainerGeometry, GeometryCache, TrackedElement};
use crate::round_half_up;
use crate::scroll::FrameScrollData;
use crate::source::Interface;
use crate::trace::{ElementEvent, StickEvent, Tracer};

/// How a pinned element is positioned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pin {
    /// Fixed positioning at `top` pixels from the viewport top.
    Fixed {
        /// Distance from the top edge.
        top: f64,
    },
    /// Absolute positioning against the bottom of the sticky parent, once the
    /// element has reached the end of its parent.
    Anchored,
}

/// Where a pinned element goes this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickyPlacement {
    /// Positioning to write.
    pub pin: Pin,
    /// Pinned offset, clamped to `parent_bottom - height`.
    pub offset: f64,
}

/// A translation written to an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform<H> {
    /// Host handle.
    pub element: H,
    /// Translation in whole pixels.
    pub translation: Vec2,
}

/// A pin written to an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Stick<H> {
    /// Host handle.
    pub element: H,
    /// Placement to write.
    pub pin: Pin,
    /// Height of the placeholder to insert after the element, present only
    /// when this frame engaged the pin.
    pub placeholder_height: Option<f64>,
}

/// The set of changes produced by a single reconciliation pass.
///
/// Backends apply them through
/// [`Presenter::apply`](crate::backend::Presenter::apply); `actions` are then
/// handed to [`ActionRegistry::dispatch`](crate::action::ActionRegistry::dispatch).
#[derive(Clone, Debug)]
pub struct FrameChanges<H> {
    /// Elements that entered the viewport.
    pub entered: Vec<H>,
    /// Elements that left the viewport.
    pub exited: Vec<H>,
    /// `once` elements retired from tracking; hosts mark them disabled.
    pub retired: Vec<H>,
    /// Parallax translations.
    pub transforms: Vec<Transform<H>>,
    /// Pins engaged or moved.
    pub stuck: Vec<Stick<H>>,
    /// Pins released.
    pub unstuck: Vec<H>,
    /// Handler calls, in trigger order.
    pub actions: Vec<PendingAction<H>>,
}

impl<H> Default for FrameChanges<H> {
    fn default() -> Self {
        Self {
            entered: Vec::new(),
            exited: Vec::new(),
            retired: Vec::new(),
            transforms: Vec::new(),
            stuck: Vec::new(),
            unstuck: Vec::new(),
            actions: Vec::new(),
        }
    }
}

impl<H> FrameChanges<H> {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.entered.clear();
        self.exited.clear();
        self.retired.clear();
        self.transforms.clear();
        self.stuck.clear();
        self.unstuck.clear();
        self.actions.clear();
    }

    /// Returns `true` if the pass produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty()
            && self.exited.is_empty()
            && self.retired.is_empty()
            && self.transforms.is_empty()
            && self.stuck.is_empty()
            && self.unstuck.is_empty()
            && self.actions.is_empty()
    }
}

/// Whether an element is inside the viewport.
///
/// On each axis the leading edge, pulled back by the container extent and the
/// margin, must have been scrolled past, and the trailing edge plus the margin
/// must not. `scroll` is `(horizontal, vertical)`.
#[must_use]
pub fn is_in_view(bounds: Rect, offset: f64, container: ContainerGeometry, scroll: Vec2) -> bool {
    let top_passed = scroll.y > bounds.y0 - container.height - offset;
    let bottom_passed = scroll.y > bounds.y1 + offset;
    let left_passed = scroll.x > bounds.x0 - container.width - offset;
    let right_passed = scroll.x > bounds.x1 + offset;
    top_passed && !bottom_passed && left_passed && !right_passed
}

/// Vertical progress of an element through the viewport, in percent.
///
/// Returns `None` when the value falls outside `0..=100`; it is never
/// clamped.
#[must_use]
pub fn progress_percentage(
    bounds: Rect,
    offset: f64,
    container: ContainerGeometry,
    scroll_y: f64,
) -> Option<i32> {
    let progress = scroll_y - bounds.y0 + container.height - offset;
    let ratio = progress / (bounds.height() + container.height) * 100.0;
    if !ratio.is_finite() {
        return None;
    }
    let percentage = round_half_up(ratio);
    (0..=100).contains(&percentage).then_some(percentage)
}

/// Parallax translation for an element, per enabled axis.
///
/// Each axis is `round((leading_edge - extent / 2 - scroll) * speed)`;
/// disabled axes are `0`.
#[must_use]
pub fn parallax_offset(
    bounds: Rect,
    vertical_speed: Option<f64>,
    horizontal_speed: Option<f64>,
    scroll: Vec2,
) -> Vec2 {
    let axis = |edge: f64, extent: f64, position: f64, speed: Option<f64>| {
        speed.map_or(0.0, |speed| {
            f64::from(round_half_up((edge - extent / 2.0 - position) * speed))
        })
    };
    Vec2::new(
        axis(bounds.x0, bounds.width(), scroll.x, horizontal_speed),
        axis(bounds.y0, bounds.height(), scroll.y, vertical_speed),
    )
}

/// Placement of an element pinned to the top.
///
/// The pinned offset follows the scroll position until it reaches
/// `parent_bottom - height`, then stays there so the element leaves with its
/// parent. Virtualized scrolling moves transformed content, so the element is
/// fixed at the pinned offset itself; native scrolling fixes it at the
/// viewport top and anchors it to the parent's bottom past the boundary.
#[must_use]
pub fn sticky_placement(
    scroll_y: f64,
    parent_bottom: f64,
    height: f64,
    interface: Interface,
) -> StickyPlacement {
    let max_top = parent_bottom - height;
    let offset = if scroll_y >= max_top { max_top } else { scroll_y };
    let pin = match interface {
        Interface::Virtualized => Pin::Fixed { top: offset },
        Interface::Native if scroll_y <= max_top => Pin::Fixed { top: 0.0 },
        Interface::Native => Pin::Anchored,
    };
    StickyPlacement { pin, offset }
}

/// Runs one reconciliation pass over `cache`.
///
/// Retired `once` elements are removed from the cache after their pass
/// completes.
pub fn reconcile<H: Clone>(
    cache: &mut GeometryCache<H>,
    scroll: &FrameScrollData,
    interface: Interface,
    changes: &mut FrameChanges<H>,
    tracer: &mut Tracer<'_>,
) {
    let container = cache.container;
    let mut index = 0;
    cache.items.retain_mut(|item| {
        let retire = reconcile_element(index, item, container, scroll, interface, changes, tracer);
        index += 1;
        !retire
    });
}

/// Reconciles one element. Returns `true` if it must leave the cache.
fn reconcile_element<H: Clone>(
    index: usize,
    item: &mut TrackedElement<H>,
    container: ContainerGeometry,
    scroll: &FrameScrollData,
    interface: Interface,
    changes: &mut FrameChanges<H>,
    tracer: &mut Tracer<'_>,
) -> bool {
    let position = scroll.offset();
    let event = ElementEvent {
        index,
        bounds: item.bounds,
    };
    let mut retire = false;

    let in_view = is_in_view(item.bounds, item.offset, container, position);
    if in_view && !item.state.is_visible {
        item.state.is_visible = true;
        changes.entered.push(item.element.clone());
        tracer.enter(&event);
        if let Some(name) = &item.action {
            changes
                .actions
                .push(pending(ActionKind::Enter, name, item, scroll));
        }
        if item.once {
            retire = true;
            changes.retired.push(item.element.clone());
            tracer.retire(&event);
        }
    } else if !in_view && item.state.is_visible {
        item.state.is_visible = false;
        changes.exited.push(item.element.clone());
        tracer.exit(&event);
    }

    if let Some(name) = &item.vertical_progress_action
        && let Some(percentage) =
            progress_percentage(item.bounds, item.offset, container, position.y)
    {
        item.state.percentage = Some(percentage);
        changes
            .actions
            .push(pending(ActionKind::Progress, name, item, scroll));
    }

    if in_view && item.has_parallax() {
        changes.transforms.push(Transform {
            element: item.element.clone(),
            translation: parallax_offset(
                item.bounds,
                item.vertical_parallax,
                item.horizontal_parallax,
                position,
            ),
        });
    }

    if item.stick_to_top
        && let Some(parent_bottom) = item.stick_to_top_parent_bottom
    {
        if position.y > item.bounds.y0 {
            let placement = sticky_placement(position.y, parent_bottom, item.height(), interface);
            let engaged = !item.state.is_sticky_to_top;
            if engaged || item.state.pin != Some(placement.pin) {
                changes.stuck.push(Stick {
                    element: item.element.clone(),
                    pin: placement.pin,
                    placeholder_height: engaged.then(|| item.height()),
                });
                tracer.stick(&StickEvent {
                    index,
                    pin: placement.pin,
                    offset: placement.offset,
                    engaged,
                });
            }
            item.state.is_sticky_to_top = true;
            item.state.pin = Some(placement.pin);
        } else if item.state.is_sticky_to_top {
            item.state.is_sticky_to_top = false;
            item.state.pin = None;
            changes.unstuck.push(item.element.clone());
            tracer.unstick(&event);
        }
    }

    retire
}

fn pending<H: Clone>(
    kind: ActionKind,
    name: &str,
    item: &TrackedElement<H>,
    scroll: &FrameScrollData,
) -> PendingAction<H> {
    PendingAction {
        kind,
        name: name.into(),
        element: item.element.clone(),
        snapshot: ElementSnapshot {
            bounds: item.bounds,
            is_visible: item.state.is_visible,
            is_sticky_to_top: item.state.is_sticky_to_top,
            percentage: item.state.percentage,
        },
        scroll: *scroll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: ContainerGeometry = ContainerGeometry {
        width: 1000.0,
        height: 800.0,
    };

    fn at(y: f64) -> Vec2 {
        Vec2::new(0.0, y)
    }

    #[test]
    fn viewport_boundaries_are_exclusive_at_the_leading_edge() {
        let bounds = Rect::new(0.0, 1000.0, 100.0, 1200.0);
        assert!(!is_in_view(bounds, 0.0, CONTAINER, at(0.0)));
        assert!(!is_in_view(bounds, 0.0, CONTAINER, at(200.0)));
        assert!(is_in_view(bounds, 0.0, CONTAINER, at(201.0)));
        assert!(is_in_view(bounds, 0.0, CONTAINER, at(1200.0)));
        assert!(!is_in_view(bounds, 0.0, CONTAINER, at(1201.0)));
    }

    #[test]
    fn offset_widens_the_window() {
        let bounds = Rect::new(0.0, 1000.0, 100.0, 1200.0);
        assert!(is_in_view(bounds, 50.0, CONTAINER, at(151.0)));
        assert!(is_in_view(bounds, 50.0, CONTAINER, at(1250.0)));
        assert!(!is_in_view(bounds, 50.0, CONTAINER, at(1251.0)));
    }

    #[test]
    fn horizontal_axis_must_also_be_in_view() {
        let bounds = Rect::new(2000.0, 1000.0, 2100.0, 1200.0);
        assert!(!is_in_view(bounds, 0.0, CONTAINER, Vec2::new(0.0, 500.0)));
        assert!(is_in_view(bounds, 0.0, CONTAINER, Vec2::new(1500.0, 500.0)));
        assert!(!is_in_view(bounds, 0.0, CONTAINER, Vec2::new(2101.0, 500.0)));
    }

    #[test]
    fn progress_is_bounded_and_monotonic() {
        let bounds = Rect::new(0.0, 1000.0, 100.0, 1200.0);
        // -0.6% rounds to -1 and is skipped; -0.1% rounds to 0 and is kept.
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 194.0), None);
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 199.0), Some(0));
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 200.0), Some(0));
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 700.0), Some(50));
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 1200.0), Some(100));
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 1204.0), Some(100));
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 1205.0), None);
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 1210.0), None);

        let mut last = 0;
        for y in 200..=1200 {
            let p = progress_percentage(bounds, 0.0, CONTAINER, f64::from(y))
                .expect("inside the progress span");
            assert!(p >= last, "progress went backwards at {y}");
            assert!((0..=100).contains(&p), "out of range at {y}");
            last = p;
        }
    }

    #[test]
    fn progress_rounds_half_up_at_the_lower_edge() {
        // -0.5% rounds to 0 and is reported.
        let bounds = Rect::new(0.0, 1000.0, 100.0, 1200.0);
        assert_eq!(progress_percentage(bounds, 0.0, CONTAINER, 195.0), Some(0));
    }

    #[test]
    fn progress_with_degenerate_geometry_is_skipped() {
        let flat = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            progress_percentage(flat, 0.0, ContainerGeometry::default(), 0.0),
            None
        );
    }

    #[test]
    fn zero_speed_parallax_is_zero() {
        let bounds = Rect::new(30.0, 1000.0, 130.0, 1200.0);
        for y in [0.0, 123.0, 5000.0] {
            let t = parallax_offset(bounds, Some(0.0), Some(0.0), Vec2::new(y, y));
            assert_eq!(t, Vec2::ZERO);
        }
    }

    #[test]
    fn parallax_uses_leading_edge_minus_half_extent() {
        let bounds = Rect::new(0.0, 1000.0, 100.0, 1200.0);
        // (1000 - 100 - 500) * 0.1 = 40
        let t = parallax_offset(bounds, Some(0.1), None, at(500.0));
        assert_eq!(t, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn sticky_offset_never_exceeds_the_parent_boundary() {
        // Parent ends at 2000, element is 300 tall: boundary at 1700.
        for y in (0..4000).step_by(50) {
            let placement = sticky_placement(f64::from(y), 2000.0, 300.0, Interface::Virtualized);
            assert!(placement.offset <= 1700.0);
            if y >= 1700 {
                assert_eq!(placement.offset, 1700.0);
                assert_eq!(placement.pin, Pin::Fixed { top: 1700.0 });
            }
        }
    }

    #[test]
    fn native_sticky_anchors_past_the_boundary() {
        assert_eq!(
            sticky_placement(1000.0, 2000.0, 300.0, Interface::Native).pin,
            Pin::Fixed { top: 0.0 }
        );
        assert_eq!(
            sticky_placement(1700.0, 2000.0, 300.0, Interface::Native).pin,
            Pin::Fixed { top: 0.0 }
        );
        assert_eq!(
            sticky_placement(1701.0, 2000.0, 300.0, Interface::Native).pin,
            Pin::Anchored
        );
    }
}
