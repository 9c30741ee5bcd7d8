// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll sources: native scrolling and a `smooth-scrollbar` provider.

use wasm_bindgen::prelude::*;
use web_sys::{Element, Window};

use vantage_core::round_half_up;
use vantage_core::scroll::Axis;
use vantage_core::source::{ScrollSource, VirtualScroll};

use crate::dom::Container;

/// Native scroll position of the window or of a container element.
#[derive(Clone, Debug)]
pub struct NativeScroll {
    window: Window,
    container: Container,
}

impl NativeScroll {
    /// Reads the scroll position of `container`.
    #[must_use]
    pub fn new(window: Window, container: Container) -> Self {
        Self { window, container }
    }
}

impl ScrollSource for NativeScroll {
    fn offset(&self, axis: Axis) -> i32 {
        match (&self.container, axis) {
            (Container::Document, Axis::Vertical) => {
                round_half_up(self.window.scroll_y().unwrap_or(0.0))
            }
            (Container::Document, Axis::Horizontal) => {
                round_half_up(self.window.scroll_x().unwrap_or(0.0))
            }
            (Container::Element(element), Axis::Vertical) => element.scroll_top(),
            (Container::Element(element), Axis::Horizontal) => element.scroll_left(),
        }
    }
}

#[wasm_bindgen]
extern "C" {
    /// The `Scrollbar` class exported by `smooth-scrollbar`.
    #[derive(Clone, Debug)]
    pub type ScrollbarClass;

    #[wasm_bindgen(method, catch, js_name = "init")]
    fn init(this: &ScrollbarClass, target: &Element) -> Result<ScrollbarInstance, JsValue>;

    /// A mounted `smooth-scrollbar` instance.
    #[derive(Clone, Debug)]
    pub type ScrollbarInstance;

    #[wasm_bindgen(method, getter, js_name = "scrollTop")]
    fn scroll_top(this: &ScrollbarInstance) -> f64;

    #[wasm_bindgen(method, getter, js_name = "scrollLeft")]
    fn scroll_left(this: &ScrollbarInstance) -> f64;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &ScrollbarInstance) -> Result<(), JsValue>;
}

impl ScrollSource for ScrollbarInstance {
    fn offset(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Vertical => round_half_up(self.scroll_top()),
            Axis::Horizontal => round_half_up(self.scroll_left()),
        }
    }
}

/// Mounts `smooth-scrollbar` on a target element when the viewport is wide.
#[derive(Clone, Debug)]
pub struct SmoothScrollbar {
    class: ScrollbarClass,
    target: Element,
}

impl SmoothScrollbar {
    /// Creates a provider from the library's `Scrollbar` class object (for
    /// example `window.Scrollbar`) and the element to mount it on.
    #[must_use]
    pub fn new(class: JsValue, target: Element) -> Self {
        Self {
            class: class.unchecked_into(),
            target,
        }
    }
}

impl VirtualScroll for SmoothScrollbar {
    type Instance = ScrollbarInstance;

    fn init(&mut self) -> Option<ScrollbarInstance> {
        if self.class.is_undefined() || self.class.is_null() {
            return None;
        }
        self.class.init(&self.target).ok()
    }

    fn destroy(&mut self, instance: ScrollbarInstance) {
        let _ = instance.destroy();
    }
}
