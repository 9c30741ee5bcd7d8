// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for host integrations.
//!
//! Vantage splits host-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Tick source**: Produces [`FrameTick`] values via a host mechanism
//!   (e.g. `requestAnimationFrame`). Setup and cancellation differ per host,
//!   so this is not abstracted by a trait.
//!
//! - **Scroll sources**: Implements [`ScrollSource`] for the native scroll
//!   position and, optionally, [`VirtualScroll`] for a custom scrollbar.
//!
//! - **Layout**: Implements [`Layout`] to enumerate and measure marked
//!   elements.
//!
//! - **Presenter**: Implements the [`Presenter`] trait to apply frame
//!   changes to the host's element tree (e.g. DOM classes and inline styles).
//!
//! - **Resize timer**: Arms a timer per [`ResizeToken`] and calls
//!   [`Engine::settle_resize`] when it fires.
//!
//! # Crate boundaries
//!
//! `vantage_core` owns the data model, reconciliation, and this contract
//! module. Backend crates depend on `vantage_core` and provide host glue.
//!
//! [`FrameTick`]: crate::timing::FrameTick
//! [`ScrollSource`]: crate::source::ScrollSource
//! [`VirtualScroll`]: crate::source::VirtualScroll
//! [`Layout`]: crate::cache::Layout
//! [`ResizeToken`]: crate::resize::ResizeToken
//! [`Engine::settle_resize`]: crate::engine::Engine::settle_resize

use crate::reconcile::FrameChanges;

/// Applies reconciled frame changes to a host element tree.
///
/// # Frame loop pseudocode
///
/// A typical frame callback wires the pieces together like this:
///
/// ```rust,ignore
/// fn on_frame(tick: FrameTick) {
///     tracer.frame(&tick);
///     engine.update(&sources, &mut presenter, &mut actions, false, &mut tracer);
///     raf.request_next();
/// }
///
/// fn on_resize_settled(token: ResizeToken) {
///     if engine.settle_resize(token) {
///         engine.rebuild(&sources, &layout, &mut presenter, &mut tracer);
///         engine.update(&sources, &mut presenter, &mut actions, true, &mut tracer);
///     }
/// }
/// ```
pub trait Presenter<H> {
    /// Undoes every style and structural change previously applied, so that
    /// elements can be measured in their natural position.
    fn reset(&mut self);

    /// Applies the given [`FrameChanges`] to the host tree.
    fn apply(&mut self, changes: &FrameChanges<H>);
}
