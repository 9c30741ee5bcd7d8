// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser lifecycle: frame loop, resize debounce, and host calls.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, MediaQueryList, Window};

use vantage_core::action::{ActionContext, ActionRegistry};
use vantage_core::engine::Engine;
use vantage_core::options::Options;
use vantage_core::resize::ResizeToken;
use vantage_core::source::{Interface, ScrollSources};
use vantage_core::timing::FrameTick;
use vantage_core::trace::{TraceSink, Tracer};

use crate::dom::{Container, DomLayout};
use crate::platform::Capabilities;
use crate::presenter::DomPresenter;
use crate::raf::RafLoop;
use crate::source::{NativeScroll, SmoothScrollbar};
use crate::timer::Timeout;

/// Configuration for [`OnScroll::init`].
#[derive(Clone, Debug, Default)]
pub struct WebOptions {
    /// Engine options.
    pub engine: Options,
    /// Scroll container. Defaults to the whole document.
    pub container: Container,
    /// Virtualized scrolling used at or above the breakpoint.
    pub scrollbar: Option<SmoothScrollbar>,
}

/// Why [`OnScroll::init`] failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    /// Not running in a window context.
    NoWindow,
    /// The window has no document.
    NoDocument,
    /// Registering the resize listener failed.
    ResizeListener,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => f.write_str("no global window"),
            Self::NoDocument => f.write_str("window has no document"),
            Self::ResizeListener => f.write_str("failed to register the resize listener"),
        }
    }
}

impl core::error::Error for InitError {}

type Tracked = HtmlElement;

struct State {
    engine: Engine<Tracked>,
    sources: ScrollSources<NativeScroll, SmoothScrollbar>,
    layout: DomLayout,
    presenter: DomPresenter,
    actions: ActionRegistry<Tracked>,
    breakpoint: Option<MediaQueryList>,
    resize_timer: Option<Timeout>,
    sink: Option<Box<dyn TraceSink>>,
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => Tracer::new(sink.as_mut()),
        None => Tracer::none(),
    }
}

impl State {
    fn frame(&mut self, tick: FrameTick) {
        let Self {
            engine,
            sources,
            presenter,
            actions,
            sink,
            ..
        } = self;
        let mut tracer = tracer(sink);
        tracer.frame(&tick);
        engine.update(&*sources, presenter, actions, false, &mut tracer);
    }

    /// Re-evaluates the breakpoint, rebuilds the cache and runs a forced
    /// frame.
    fn recompute(&mut self) {
        let Self {
            engine,
            sources,
            layout,
            presenter,
            actions,
            breakpoint,
            sink,
            ..
        } = self;
        let mut tracer = tracer(sink);
        let wide = breakpoint.as_ref().is_some_and(MediaQueryList::matches);
        engine.select_interface(sources, wide, &mut tracer);
        engine.recompute(&*sources, &*layout, presenter, actions, &mut tracer);
    }
}

/// Scroll tracking attached to a browser document.
///
/// Created with [`OnScroll::init`], which builds the geometry cache, runs the
/// first forced pass, starts the frame loop and listens for resizes. Dropping
/// it stops everything.
pub struct OnScroll {
    state: Rc<RefCell<State>>,
    raf: RafLoop,
    window: Window,
    on_resize: Closure<dyn FnMut()>,
}

impl fmt::Debug for OnScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnScroll")
            .field("raf", &self.raf)
            .finish_non_exhaustive()
    }
}

impl OnScroll {
    /// Attaches to the current window's document.
    pub fn init(options: WebOptions, actions: ActionRegistry<Tracked>) -> Result<Self, InitError> {
        let window = web_sys::window().ok_or(InitError::NoWindow)?;
        let document = window.document().ok_or(InitError::NoDocument)?;
        let WebOptions {
            engine: options,
            container,
            scrollbar,
        } = options;

        let capabilities = Capabilities::detect(&document);
        let breakpoint = window
            .match_media(&options.breakpoint_query())
            .ok()
            .flatten();
        let layout = DomLayout::new(
            window.clone(),
            document.clone(),
            container.clone(),
            options.items_selector.clone(),
        );
        let presenter = DomPresenter::new(document, &options, capabilities);
        let sources = ScrollSources::new(NativeScroll::new(window.clone(), container), scrollbar);
        let debounce_ms = options.resize_debounce_ms;

        let state = Rc::new(RefCell::new(State {
            engine: Engine::new(options),
            sources,
            layout,
            presenter,
            actions,
            breakpoint,
            resize_timer: None,
            sink: None,
        }));
        state.borrow_mut().recompute();

        let weak = Rc::downgrade(&state);
        let raf = RafLoop::new(move |tick| {
            if let Some(state) = weak.upgrade()
                && let Ok(mut state) = state.try_borrow_mut()
            {
                state.frame(tick);
            }
        });

        let weak = Rc::downgrade(&state);
        let on_resize = Closure::wrap(Box::new(move || {
            handle_resize(&weak, debounce_ms);
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|_| InitError::ResizeListener)?;

        raf.start();
        Ok(Self {
            state,
            raf,
            window,
            on_resize,
        })
    }

    /// Rebuilds the geometry cache and runs a forced pass.
    ///
    /// Call after changing the document outside of a resize. Has no effect
    /// when called from inside an action handler.
    pub fn force_recompute(&self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.recompute();
        }
    }

    /// Stops the frame loop, cancelling the pending frame.
    pub fn stop(&self) {
        self.raf.stop();
    }

    /// Restarts a stopped frame loop.
    pub fn start(&self) {
        self.raf.start();
    }

    /// Returns `true` while the frame loop runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.raf.is_running()
    }

    /// The interface currently driving the engine.
    #[must_use]
    pub fn interface(&self) -> Interface {
        self.state
            .try_borrow()
            .map_or(Interface::Native, |state| state.engine.interface())
    }

    /// Registers a named handler after initialization.
    pub fn register_action(
        &self,
        name: &str,
        handler: impl FnMut(&ActionContext<'_, Tracked>) + 'static,
    ) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.actions.register(name, handler);
        }
    }

    /// Routes engine events to `sink`.
    ///
    /// Only available with the `trace` feature, which also turns on event
    /// delivery in `vantage_core`.
    #[cfg(feature = "trace")]
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.sink = Some(sink);
        }
    }
}

impl Drop for OnScroll {
    fn drop(&mut self) {
        self.raf.stop();
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.resize_timer = None;
        }
    }
}

fn handle_resize(state: &Weak<RefCell<State>>, debounce_ms: u32) {
    let Some(strong) = state.upgrade() else {
        return;
    };
    let Ok(mut guard) = strong.try_borrow_mut() else {
        return;
    };
    let token = guard.engine.begin_resize();
    let weak = state.clone();
    // Replacing the previous timer clears it.
    guard.resize_timer = Some(Timeout::new(debounce_ms, move || settle(&weak, token)));
}

fn settle(state: &Weak<RefCell<State>>, token: ResizeToken) {
    let Some(strong) = state.upgrade() else {
        return;
    };
    let Ok(mut guard) = strong.try_borrow_mut() else {
        return;
    };
    if guard.engine.settle_resize(token) {
        guard.recompute();
    }
}
