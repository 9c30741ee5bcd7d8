// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser capability probing, done once at startup.

use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Document, HtmlElement};

/// Property names probed on a scratch element's style, paired with the CSS
/// property written for them. Unprefixed first.
const TRANSFORM_CANDIDATES: [(&str, &str); 4] = [
    ("transform", "transform"),
    ("webkitTransform", "-webkit-transform"),
    ("MozTransform", "-moz-transform"),
    ("msTransform", "-ms-transform"),
];

/// Browser features resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// CSS property used for parallax translations.
    pub transform_property: &'static str,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            transform_property: "transform",
        }
    }
}

impl Capabilities {
    /// Probes the browser through a detached scratch element.
    #[must_use]
    pub fn detect(document: &Document) -> Self {
        let Some(probe) = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return Self::default();
        };
        let style = probe.style();
        let transform_property = TRANSFORM_CANDIDATES
            .iter()
            .find(|(js_name, _)| {
                js_sys::Reflect::get(&style, &JsValue::from_str(js_name))
                    .is_ok_and(|v| !v.is_undefined() && !v.is_null())
            })
            .map_or("transform", |(_, css)| *css);
        Self { transform_property }
    }
}
