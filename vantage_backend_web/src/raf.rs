// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame loop.
//!
//! [`RafLoop`] calls a callback with a [`FrameTick`] once per rendering frame.
//! The next frame is requested only after the callback returns, so callbacks
//! never overlap. [`stop`](RafLoop::stop) cancels the frame that is already
//! pending, not just the ones after it.
//!
//! [`FrameTick`]: vantage_core::timing::FrameTick

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use vantage_core::timing::FrameTick;

// Direct global bindings instead of `web_sys::Window` methods, so the frame
// path never has to fetch (and unwrap) the window.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type FrameClosure = Closure<dyn FnMut(f64)>;

/// A `requestAnimationFrame` loop that emits [`FrameTick`] events.
///
/// Create with [`RafLoop::new`], then [`start`](Self::start) it. The loop
/// re-registers itself after each callback until [`stop`](Self::stop) is
/// called or the `RafLoop` is dropped. A stopped loop can be started again.
///
/// [`FrameTick`]: vantage_core::timing::FrameTick
pub struct RafLoop {
    shared: Rc<Shared>,
}

struct Shared {
    /// The JS closure handed to `requestAnimationFrame`. Created on first
    /// start and reused across restarts.
    closure: RefCell<Option<FrameClosure>>,
    on_frame: RefCell<Box<dyn FnMut(FrameTick)>>,
    frames: Cell<u64>,
    running: Cell<bool>,
    /// ID of the pending request, if any.
    pending: Cell<Option<i32>>,
}

impl Shared {
    fn request(&self) {
        if let Some(closure) = &*self.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.pending.set(Some(id));
        }
    }
}

impl RafLoop {
    /// Creates a loop that is **not yet running**.
    pub fn new(on_frame: impl FnMut(FrameTick) + 'static) -> Self {
        Self {
            shared: Rc::new(Shared {
                closure: RefCell::new(None),
                on_frame: RefCell::new(Box::new(on_frame)),
                frames: Cell::new(0),
                running: Cell::new(false),
                pending: Cell::new(None),
            }),
        }
    }

    /// Starts the loop. No-op if it is already running.
    pub fn start(&self) {
        if self.shared.running.replace(true) {
            return;
        }
        if self.shared.closure.borrow().is_none() {
            // The closure holds a weak handle so that dropping the loop frees
            // the shared state even though the closure refers to it.
            let weak = Rc::downgrade(&self.shared);
            let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.pending.set(None);
                if !shared.running.get() {
                    return;
                }
                let frame_index = shared.frames.get();
                shared.frames.set(frame_index + 1);

                // Re-entrant calls (the callback stopping the loop) only touch
                // `Cell`s, so holding this borrow is fine.
                if let Ok(mut on_frame) = shared.on_frame.try_borrow_mut() {
                    on_frame(FrameTick {
                        timestamp_ms,
                        frame_index,
                    });
                }

                if shared.running.get() && shared.pending.get().is_none() {
                    shared.request();
                }
            }) as Box<dyn FnMut(f64)>);
            *self.shared.closure.borrow_mut() = Some(closure);
        }
        self.shared.request();
    }

    /// Stops the loop and cancels the pending frame.
    pub fn stop(&self) {
        if !self.shared.running.replace(false) {
            return;
        }
        if let Some(id) = self.shared.pending.take() {
            cancel_animation_frame(id);
        }
    }

    /// Returns `true` if the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    /// Number of frames delivered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.shared.frames.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        self.shared.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.shared.running.get())
            .field("frames", &self.shared.frames.get())
            .field("pending", &self.shared.pending.get())
            .finish_non_exhaustive()
    }
}
