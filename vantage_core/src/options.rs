// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration and per-element attributes.
//!
//! [`Options`] is applied once at construction. Per-element behavior is
//! declared in markup with `data-os-*` attributes (see [`attr`]) and parsed
//! into [`ElementOptions`] at cache-build time through the [`Attributes`]
//! trait, so the parsing rules stay independent of any particular DOM
//! binding.

use alloc::string::String;

/// Attribute names recognized on tracked elements.
pub mod attr {
    /// Excludes the element from the geometry cache.
    pub const DISABLED: &str = "data-os-disabled";
    /// Visibility margin override, in pixels.
    pub const OFFSET: &str = "data-os-offset";
    /// Name of the handler invoked when the element enters the viewport.
    pub const ACTION: &str = "data-os-action";
    /// Name of the handler fed the vertical progress percentage.
    pub const VERTICAL_PROGRESS_ACTION: &str = "data-os-v-progress-action";
    /// Stop tracking after the first viewport entry.
    pub const ONCE: &str = "data-os-once";
    /// Vertical parallax, with an optional speed value.
    pub const VERTICAL_PARALLAX: &str = "data-os-v-parallax";
    /// Horizontal parallax, with an optional speed value.
    pub const HORIZONTAL_PARALLAX: &str = "data-os-h-parallax";
    /// Pin to the top of the viewport once scrolled past.
    pub const STICK_TO_TOP: &str = "data-os-stick-to-top";
    /// Name of the parent whose bottom edge bounds the pinning.
    pub const STICK_TO_TOP_PARENT: &str = "data-os-stick-to-top-parent";
    /// Pin to the bottom of the viewport.
    pub const STICK_TO_BOTTOM: &str = "data-os-stick-to-bottom";
    /// Name of the parent bounding bottom pinning.
    pub const STICK_TO_BOTTOM_PARENT: &str = "data-os-stick-to-bottom-parent";
    /// Declares an element as a named sticky parent.
    pub const STICK_PARENT: &str = "data-os-stick-parent";
    /// Marks placeholders inserted while an element is pinned.
    pub const PLACEHOLDER: &str = "data-os-dummy-element";
}

/// Engine-wide configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    /// Selector matching tracked elements.
    pub items_selector: String,
    /// Visibility margin used when an element does not override it.
    pub container_offset: f64,
    /// Class added while an element is in the viewport.
    pub in_viewport_class: String,
    /// Class added while an element is pinned to the top.
    pub stick_to_top_class: String,
    /// Parallax speed used when an element does not override it.
    pub parallax_speed: f64,
    /// Minimum viewport width, in pixels, at which a virtualized scroll
    /// provider takes over.
    pub breakpoint: f64,
    /// Quiet period after the last resize event before geometry is rebuilt.
    pub resize_debounce_ms: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            items_selector: String::from("[data-os]"),
            container_offset: 0.0,
            in_viewport_class: String::from("is-in-viewport"),
            stick_to_top_class: String::from("is-stick-to-top"),
            parallax_speed: 0.1,
            breakpoint: 1025.0,
            resize_debounce_ms: 250,
        }
    }
}

impl Options {
    /// Returns the media query matching viewports at or above the breakpoint.
    #[must_use]
    pub fn breakpoint_query(&self) -> String {
        alloc::format!("(min-width: {}px)", self.breakpoint)
    }
}

/// Read access to an element's attributes.
pub trait Attributes {
    /// Returns `true` if the attribute is present (with any value).
    fn has(&self, name: &str) -> bool;

    /// Returns the attribute value, if present.
    fn get(&self, name: &str) -> Option<String>;
}

/// Per-element settings declared in markup.
///
/// Numeric overrides that are absent or unparsable are `None` and fall back
/// to the engine [`Options`]; an explicit `0` is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementOptions {
    /// Excluded from tracking.
    pub disabled: bool,
    /// Visibility margin override, in whole pixels.
    pub offset: Option<f64>,
    /// Enter-viewport handler name.
    pub action: Option<String>,
    /// Vertical progress handler name.
    pub vertical_progress_action: Option<String>,
    /// Stop tracking after the first entry.
    pub once: bool,
    /// Vertical parallax enabled, with an optional speed override.
    pub vertical_parallax: Option<Option<f64>>,
    /// Horizontal parallax enabled, with an optional speed override.
    pub horizontal_parallax: Option<Option<f64>>,
    /// Pin to the top when scrolled past.
    pub stick_to_top: bool,
    /// Name of the sticky parent bounding top pinning.
    pub stick_to_top_parent: Option<String>,
    /// Pin to the bottom.
    pub stick_to_bottom: bool,
    /// Name of the sticky parent bounding bottom pinning.
    pub stick_to_bottom_parent: Option<String>,
}

impl ElementOptions {
    /// Parses the `data-os-*` attributes of one element.
    #[must_use]
    pub fn from_attributes<A: Attributes + ?Sized>(attrs: &A) -> Self {
        let parallax = |name: &str| {
            attrs
                .has(name)
                .then(|| attrs.get(name).as_deref().and_then(parse_number))
        };
        Self {
            disabled: attrs.has(attr::DISABLED),
            offset: attrs.get(attr::OFFSET).as_deref().and_then(parse_integer),
            action: non_empty(attrs.get(attr::ACTION)),
            vertical_progress_action: non_empty(attrs.get(attr::VERTICAL_PROGRESS_ACTION)),
            once: attrs.has(attr::ONCE),
            vertical_parallax: parallax(attr::VERTICAL_PARALLAX),
            horizontal_parallax: parallax(attr::HORIZONTAL_PARALLAX),
            stick_to_top: attrs.has(attr::STICK_TO_TOP),
            stick_to_top_parent: non_empty(attrs.get(attr::STICK_TO_TOP_PARENT)),
            stick_to_bottom: attrs.has(attr::STICK_TO_BOTTOM),
            stick_to_bottom_parent: non_empty(attrs.get(attr::STICK_TO_BOTTOM_PARENT)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses the leading decimal number of `text`, ignoring trailing units.
///
/// `"40px"` parses as `40`, `" -0.25"` as `-0.25`, `"px"` as `None`.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    text[..end].parse().ok()
}

/// Parses the leading integer of `text`, ignoring any fraction or units.
///
/// `"12.7"` parses as `12`, `"-3px"` as `-3`, `".5"` as `None`.
#[must_use]
pub fn parse_integer(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = sign;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == sign {
        return None;
    }
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    struct Attrs(BTreeMap<&'static str, &'static str>);

    impl Attributes for Attrs {
        fn has(&self, name: &str) -> bool {
            self.0.contains_key(name)
        }

        fn get(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|v| String::from(*v))
        }
    }

    fn attrs(pairs: &[(&'static str, &'static str)]) -> Attrs {
        Attrs(pairs.iter().copied().collect())
    }

    #[test]
    fn parse_number_accepts_leading_numbers() {
        assert_eq!(parse_number("40"), Some(40.0));
        assert_eq!(parse_number("40px"), Some(40.0));
        assert_eq!(parse_number(" -0.25"), Some(-0.25));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("3."), Some(3.0));
        assert_eq!(parse_number("px"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
    }

    #[test]
    fn parse_integer_truncates_at_the_fraction() {
        assert_eq!(parse_integer("12"), Some(12.0));
        assert_eq!(parse_integer("12.7"), Some(12.0));
        assert_eq!(parse_integer(" -3.9px"), Some(-3.0));
        assert_eq!(parse_integer("+40px"), Some(40.0));
        assert_eq!(parse_integer(".5"), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn offset_is_whole_pixels_but_speed_keeps_its_fraction() {
        let parsed = ElementOptions::from_attributes(&attrs(&[
            (attr::OFFSET, "12.7"),
            (attr::VERTICAL_PARALLAX, "0.25"),
        ]));
        assert_eq!(parsed.offset, Some(12.0));
        assert_eq!(parsed.vertical_parallax, Some(Some(0.25)));
    }

    #[test]
    fn bare_element_has_no_features() {
        let parsed = ElementOptions::from_attributes(&attrs(&[("data-os", "")]));
        assert_eq!(parsed, ElementOptions::default());
    }

    #[test]
    fn parses_every_attribute() {
        let parsed = ElementOptions::from_attributes(&attrs(&[
            (attr::OFFSET, "120"),
            (attr::ACTION, "reveal"),
            (attr::VERTICAL_PROGRESS_ACTION, "logProgress"),
            (attr::ONCE, ""),
            (attr::VERTICAL_PARALLAX, "0.3"),
            (attr::HORIZONTAL_PARALLAX, ""),
            (attr::STICK_TO_TOP, ""),
            (attr::STICK_TO_TOP_PARENT, "hero"),
            (attr::STICK_TO_BOTTOM, ""),
            (attr::STICK_TO_BOTTOM_PARENT, "footer"),
        ]));
        assert_eq!(parsed.offset, Some(120.0));
        assert_eq!(parsed.action.as_deref(), Some("reveal"));
        assert_eq!(parsed.vertical_progress_action.as_deref(), Some("logProgress"));
        assert!(parsed.once);
        assert_eq!(parsed.vertical_parallax, Some(Some(0.3)));
        assert_eq!(parsed.horizontal_parallax, Some(None));
        assert!(parsed.stick_to_top);
        assert_eq!(parsed.stick_to_top_parent.as_deref(), Some("hero"));
        assert!(parsed.stick_to_bottom);
        assert_eq!(parsed.stick_to_bottom_parent.as_deref(), Some("footer"));
        assert!(!parsed.disabled);
    }

    #[test]
    fn explicit_zero_speed_is_kept() {
        let parsed = ElementOptions::from_attributes(&attrs(&[(attr::VERTICAL_PARALLAX, "0")]));
        assert_eq!(parsed.vertical_parallax, Some(Some(0.0)));
    }

    #[test]
    fn empty_action_names_are_ignored() {
        let parsed = ElementOptions::from_attributes(&attrs(&[(attr::ACTION, "  ")]));
        assert_eq!(parsed.action, None);
    }

    #[test]
    fn default_options_match_documented_values() {
        let options = Options::default();
        assert_eq!(options.items_selector, "[data-os]");
        assert_eq!(options.breakpoint_query(), "(min-width: 1025px)");
        assert_eq!(options.resize_debounce_ms, 250);
    }
}
