// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM styling.
//!
//! Applies [`FrameChanges`] to live elements: marker classes, inline
//! `transform`/`position`/`top`/`bottom` styles, and placeholder `<div>`s
//! that hold a pinned element's place in the flow.
//!
//! [`FrameChanges`]: vantage_core::reconcile::FrameChanges

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use vantage_core::backend::Presenter;
use vantage_core::options::{Options, attr};
use vantage_core::reconcile::{FrameChanges, Pin, Stick};
use web_sys::{Document, Element, HtmlElement};

use crate::dom::query_all;
use crate::platform::Capabilities;

/// Writes reconciled state to the DOM.
pub struct DomPresenter {
    document: Document,
    selector: String,
    in_viewport_class: String,
    stick_to_top_class: String,
    transform_property: &'static str,
    /// Placeholders currently in the document, keyed by the pinned element.
    placeholders: Vec<(HtmlElement, Element)>,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("selector", &self.selector)
            .field("in_viewport_class", &self.in_viewport_class)
            .field("stick_to_top_class", &self.stick_to_top_class)
            .field("transform_property", &self.transform_property)
            .field("placeholders", &self.placeholders.len())
            .finish_non_exhaustive()
    }
}

impl DomPresenter {
    /// Creates a presenter using the class names and selector in `options`.
    #[must_use]
    pub fn new(document: Document, options: &Options, capabilities: Capabilities) -> Self {
        Self {
            document,
            selector: options.items_selector.clone(),
            in_viewport_class: options.in_viewport_class.clone(),
            stick_to_top_class: options.stick_to_top_class.clone(),
            transform_property: capabilities.transform_property,
            placeholders: Vec::new(),
        }
    }

    /// Number of placeholders currently inserted.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    fn stick(&mut self, stick: &Stick<HtmlElement>) {
        let element = &stick.element;
        let _ = element.class_list().add_1(&self.stick_to_top_class);
        let style = element.style();
        match stick.pin {
            Pin::Fixed { top } => {
                let _ = style.set_property("position", "fixed");
                let _ = style.set_property("top", &format!("{top}px"));
                let _ = style.remove_property("bottom");
            }
            Pin::Anchored => {
                let _ = style.set_property("position", "absolute");
                let _ = style.remove_property("top");
                let _ = style.set_property("bottom", "0px");
            }
        }

        if let Some(height) = stick.placeholder_height {
            self.remove_placeholder(element);
            let Ok(placeholder) = self.document.create_element("div") else {
                return;
            };
            let _ = placeholder.set_attribute(attr::PLACEHOLDER, "");
            let _ = placeholder.set_attribute("style", &format!("height: {height}px"));
            if element.after_with_node_1(&placeholder).is_ok() {
                self.placeholders.push((element.clone(), placeholder));
            }
        }
    }

    fn unstick(&mut self, element: &HtmlElement) {
        let _ = element.class_list().remove_1(&self.stick_to_top_class);
        clear_position(element);
        self.remove_placeholder(element);
    }

    fn remove_placeholder(&mut self, element: &HtmlElement) {
        self.placeholders.retain(|(pinned, placeholder)| {
            if pinned == element {
                placeholder.remove();
                false
            } else {
                true
            }
        });
    }
}

fn clear_position(element: &HtmlElement) {
    let style = element.style();
    let _ = style.remove_property("position");
    let _ = style.remove_property("top");
    let _ = style.remove_property("bottom");
}

impl Presenter<HtmlElement> for DomPresenter {
    fn reset(&mut self) {
        for (_, placeholder) in self.placeholders.drain(..) {
            placeholder.remove();
        }
        // Placeholders left behind by an earlier instance.
        for stray in query_all(&self.document, &format!("[{}]", attr::PLACEHOLDER)) {
            stray.remove();
        }
        for element in query_all(&self.document, &self.selector) {
            if element.has_attribute(attr::DISABLED) {
                continue;
            }
            let _ = element.style().remove_property(self.transform_property);
            if element.has_attribute(attr::STICK_TO_TOP) {
                clear_position(&element);
            }
            let classes = element.class_list();
            let _ = classes.remove_1(&self.in_viewport_class);
            let _ = classes.remove_1(&self.stick_to_top_class);
        }
    }

    fn apply(&mut self, changes: &FrameChanges<HtmlElement>) {
        for element in &changes.entered {
            let _ = element.class_list().add_1(&self.in_viewport_class);
        }
        for element in &changes.exited {
            let _ = element.class_list().remove_1(&self.in_viewport_class);
        }
        for element in &changes.retired {
            let _ = element.set_attribute(attr::DISABLED, "");
        }
        for transform in &changes.transforms {
            let t = transform.translation;
            let _ = transform.element.style().set_property(
                self.transform_property,
                &format!("translate3d({}px, {}px, 0)", t.x, t.y),
            );
        }
        for stick in &changes.stuck {
            self.stick(stick);
        }
        for element in &changes.unstuck {
            self.unstick(element);
        }
    }
}
