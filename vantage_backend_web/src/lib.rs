// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for vantage.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`OnScroll`]: the assembled engine attached to a document, with its
//!   frame loop and debounced resize handling
//! - [`RafLoop`]: `requestAnimationFrame` tick source
//! - [`DomLayout`]: element discovery and measurement
//! - [`DomPresenter`]: marker classes, inline styles and placeholders
//! - [`NativeScroll`] and [`SmoothScrollbar`]: the two scroll sources
//! - [`Capabilities`]: one-time browser feature probing
//!
//! A minimal host:
//!
//! ```rust,ignore
//! let mut actions = ActionRegistry::new();
//! actions.register("reveal", |ctx| {
//!     let _ = ctx.element.class_list().add_1("revealed");
//! });
//! let on_scroll = OnScroll::init(WebOptions::default(), actions)?;
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables engine tracing in
//!   `vantage_core` and [`OnScroll::set_trace_sink`].

#![no_std]

extern crate alloc;

mod app;
mod dom;
mod platform;
mod presenter;
mod raf;
mod source;
mod timer;

pub use app::{InitError, OnScroll, WebOptions};
pub use dom::{Container, DomLayout};
pub use platform::Capabilities;
pub use presenter::DomPresenter;
pub use raf::RafLoop;
pub use source::{NativeScroll, ScrollbarClass, ScrollbarInstance, SmoothScrollbar};
pub use vantage_core::backend::Presenter;
