// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM measurement.
//!
//! [`DomLayout`] implements [`Layout`] by querying the document for marked
//! elements and reading their bounding client rectangles. Those rectangles
//! are viewport-relative; the engine folds in the scroll offset.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, DomRect, Element, HtmlElement, Window};

use vantage_core::cache::{Layout, Measurement};
use vantage_core::options::{Attributes, ElementOptions, attr};

/// Reads markup attributes from a DOM element.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DomAttributes<'a>(pub(crate) &'a Element);

impl Attributes for DomAttributes<'_> {
    fn has(&self, name: &str) -> bool {
        self.0.has_attribute(name)
    }

    fn get(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }
}

/// The element whose scrolling drives the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Container {
    /// The whole document, scrolled by the window.
    #[default]
    Document,
    /// A scrollable element.
    Element(HtmlElement),
}

/// Measures the document for the engine.
#[derive(Clone, Debug)]
pub struct DomLayout {
    window: Window,
    document: Document,
    container: Container,
    selector: String,
}

impl DomLayout {
    /// Creates a layout reading elements matching `selector`.
    #[must_use]
    pub fn new(window: Window, document: Document, container: Container, selector: String) -> Self {
        Self {
            window,
            document,
            container,
            selector,
        }
    }

    /// The scroll container.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// All elements currently matching the tracked-element selector.
    pub(crate) fn marked(&self) -> Vec<HtmlElement> {
        query_all(&self.document, &self.selector)
    }

    fn stick_parent(&self, name: &str) -> Option<Rect> {
        let selector = format!("[{}=\"{}\"]", attr::STICK_PARENT, escape(name));
        let parent = self.document.query_selector(&selector).ok().flatten()?;
        Some(to_rect(&parent.get_bounding_client_rect()))
    }
}

impl Layout for DomLayout {
    type Handle = HtmlElement;

    fn container_size(&self) -> Size {
        match &self.container {
            Container::Document => {
                let read = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
                    v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
                };
                Size::new(
                    read(self.window.inner_width()),
                    read(self.window.inner_height()),
                )
            }
            Container::Element(element) => {
                let r = element.get_bounding_client_rect();
                Size::new(r.width(), r.height())
            }
        }
    }

    fn measure(&self) -> Vec<Measurement<HtmlElement>> {
        self.marked()
            .into_iter()
            .filter_map(|element| {
                let options = ElementOptions::from_attributes(&DomAttributes(&element));
                if options.disabled {
                    return None;
                }
                let rect = to_rect(&element.get_bounding_client_rect());
                let stick_parent_rect = options
                    .stick_to_top_parent
                    .as_deref()
                    .and_then(|name| self.stick_parent(name));
                Some(Measurement {
                    element,
                    rect,
                    options,
                    stick_parent_rect,
                })
            })
            .collect()
    }
}

/// Returns every `HtmlElement` matching `selector`, in document order.
pub(crate) fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn to_rect(r: &DomRect) -> Rect {
    Rect::new(r.left(), r.top(), r.right(), r.bottom())
}

/// Escapes a value for use inside a double-quoted attribute selector.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
