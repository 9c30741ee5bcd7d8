// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named action handlers.
//!
//! Elements refer to behavior by name (`data-os-action="reveal"`). The host
//! registers a handler per name in an [`ActionRegistry`]; reconciliation
//! queues a [`PendingAction`] for each trigger and the registry dispatches
//! them after the frame's style changes have been applied. Names with no
//! registered handler are skipped.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use kurbo::Rect;

use crate::scroll::FrameScrollData;
use crate::trace::{ActionEvent, Tracer};

/// What triggered a handler call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// The element entered the viewport.
    Enter,
    /// The element's vertical progress was recomputed within `0..=100`.
    Progress,
}

/// Element state captured when an action was queued.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementSnapshot {
    /// Absolute bounds.
    pub bounds: Rect,
    /// Visibility after this frame's transition.
    pub is_visible: bool,
    /// Whether the element is pinned.
    pub is_sticky_to_top: bool,
    /// Latest in-range progress percentage.
    pub percentage: Option<i32>,
}

/// A handler call queued by reconciliation.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingAction<H> {
    /// Trigger.
    pub kind: ActionKind,
    /// Handler name.
    pub name: String,
    /// Host handle of the element.
    pub element: H,
    /// Element state at the time of the trigger.
    pub snapshot: ElementSnapshot,
    /// Scroll state of the frame.
    pub scroll: FrameScrollData,
}

/// What a handler receives.
#[derive(Debug)]
pub struct ActionContext<'a, H> {
    /// Trigger.
    pub kind: ActionKind,
    /// Host handle of the element.
    pub element: &'a H,
    /// Element state at the time of the trigger.
    pub state: &'a ElementSnapshot,
    /// Scroll state of the frame.
    pub scroll: &'a FrameScrollData,
}

/// A registered handler.
pub type Handler<H> = Box<dyn FnMut(&ActionContext<'_, H>)>;

/// Counts from one [`ActionRegistry::dispatch`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers invoked.
    pub invoked: usize,
    /// Actions skipped because no handler was registered under the name.
    pub missing: usize,
}

/// Maps handler names to host-supplied callbacks.
pub struct ActionRegistry<H> {
    handlers: BTreeMap<String, Handler<H>>,
}

impl<H> fmt::Debug for ActionRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.handlers.keys())
            .finish_non_exhaustive()
    }
}

impl<H> Default for ActionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ActionRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers `handler` under `name`, replacing any previous handler.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&ActionContext<'_, H>) + 'static,
    ) -> &mut Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Returns `true` if a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Invokes the handler for each pending action, in order.
    pub fn dispatch(
        &mut self,
        pending: &[PendingAction<H>],
        tracer: &mut Tracer<'_>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for action in pending {
            let invoked = match self.handlers.get_mut(action.name.as_str()) {
                Some(handler) => {
                    handler(&ActionContext {
                        kind: action.kind,
                        element: &action.element,
                        state: &action.snapshot,
                        scroll: &action.scroll,
                    });
                    true
                }
                None => false,
            };
            tracer.action(&ActionEvent {
                kind: action.kind,
                name: &action.name,
                invoked,
            });
            if invoked {
                report.invoked += 1;
            } else {
                report.missing += 1;
            }
        }
        report
    }
}
