// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-offset providers.
//!
//! The engine polls a single [`ScrollSource`] each frame. Two interchangeable
//! providers sit behind it:
//!
//! - **Native**: the document's (or a container element's) own scroll
//!   position.
//! - **Virtualized**: a custom scrollbar implementation that moves its own
//!   transformed content and keeps the scroll position internally.
//!
//! [`ScrollSources`] owns both and picks the active one from a responsive
//! breakpoint via [`select`](ScrollSources::select). The virtualized provider
//! is instantiated lazily when the viewport grows past the breakpoint and torn
//! down when it shrinks below it.

use core::convert::Infallible;
use core::fmt;

use crate::scroll::Axis;

/// Anything that can report a current scroll offset.
///
/// Offsets are whole pixels; providers that track sub-pixel positions round
/// them with [`round_half_up`](crate::round_half_up).
pub trait ScrollSource {
    /// Returns the current scroll offset along `axis`.
    fn offset(&self, axis: Axis) -> i32;
}

impl<S: ScrollSource + ?Sized> ScrollSource for &S {
    fn offset(&self, axis: Axis) -> i32 {
        (**self).offset(axis)
    }
}

impl ScrollSource for Infallible {
    fn offset(&self, _axis: Axis) -> i32 {
        match *self {}
    }
}

/// Which scroll interface is currently driving the engine.
///
/// Sticky placement depends on it: a virtualized source scrolls transformed
/// content rather than native document flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Interface {
    /// Native document or element scrolling.
    #[default]
    Native,
    /// A virtualized scrollbar instance.
    Virtualized,
}

/// A factory for virtualized scroll instances.
///
/// `init` may fail (for example when the provider script never loaded); the
/// owning [`ScrollSources`] then falls back to native scrolling permanently.
pub trait VirtualScroll {
    /// The live instance that reports offsets while mounted.
    type Instance: ScrollSource;

    /// Mounts a new instance, or returns `None` if the provider is unusable.
    fn init(&mut self) -> Option<Self::Instance>;

    /// Unmounts an instance previously returned by [`init`](Self::init).
    fn destroy(&mut self, instance: Self::Instance);
}

/// A [`VirtualScroll`] that is never configured.
///
/// Use it as the type parameter of [`ScrollSources`] for native-only hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVirtualScroll;

impl VirtualScroll for NoVirtualScroll {
    type Instance = Infallible;

    fn init(&mut self) -> Option<Infallible> {
        None
    }

    fn destroy(&mut self, instance: Infallible) {
        match instance {}
    }
}

/// The outcome of an interface selection that changed something.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceSwitch {
    /// A virtualized instance was mounted and is now active.
    Mounted,
    /// The virtualized instance was torn down; native scrolling is active.
    Unmounted,
    /// The provider failed to mount and has been dropped for good.
    FellBack,
}

/// The native scroll source plus an optional virtualized provider.
pub struct ScrollSources<N, V: VirtualScroll> {
    native: N,
    provider: Option<V>,
    instance: Option<V::Instance>,
}

impl<N: fmt::Debug, V: VirtualScroll> fmt::Debug for ScrollSources<N, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSources")
            .field("native", &self.native)
            .field("has_provider", &self.provider.is_some())
            .field("interface", &self.interface())
            .finish_non_exhaustive()
    }
}

impl<N: ScrollSource> ScrollSources<N, NoVirtualScroll> {
    /// Creates sources that only ever scroll natively.
    #[must_use]
    pub fn native_only(native: N) -> Self {
        Self::new(native, None)
    }
}

impl<N, V: VirtualScroll> ScrollSources<N, V> {
    /// Returns the currently active interface.
    #[must_use]
    pub fn interface(&self) -> Interface {
        if self.instance.is_some() {
            Interface::Virtualized
        } else {
            Interface::Native
        }
    }

    /// Returns `true` if a virtualized provider is still configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Returns the native source.
    #[must_use]
    pub fn native(&self) -> &N {
        &self.native
    }
}

impl<N: ScrollSource, V: VirtualScroll> ScrollSources<N, V> {
    /// Creates sources with native scrolling active.
    ///
    /// The provider, if any, is not mounted until [`select`](Self::select)
    /// is called with `wide == true`.
    #[must_use]
    pub fn new(native: N, provider: Option<V>) -> Self {
        Self {
            native,
            provider,
            instance: None,
        }
    }

    /// Picks the active interface for the current viewport.
    ///
    /// `wide` is whether the viewport is at or above the breakpoint. Returns
    /// `None` when the active interface did not change.
    pub fn select(&mut self, wide: bool) -> Option<InterfaceSwitch> {
        if wide {
            if self.instance.is_some() {
                return None;
            }
            let provider = self.provider.as_mut()?;
            match provider.init() {
                Some(instance) => {
                    self.instance = Some(instance);
                    Some(InterfaceSwitch::Mounted)
                }
                None => {
                    self.provider = None;
                    Some(InterfaceSwitch::FellBack)
                }
            }
        } else {
            let instance = self.instance.take()?;
            if let Some(provider) = self.provider.as_mut() {
                provider.destroy(instance);
            }
            Some(InterfaceSwitch::Unmounted)
        }
    }
}

impl<N: ScrollSource, V: VirtualScroll> ScrollSource for ScrollSources<N, V> {
    fn offset(&self, axis: Axis) -> i32 {
        match &self.instance {
            Some(instance) => instance.offset(axis),
            None => self.native.offset(axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(i32, i32);

    impl ScrollSource for Fixed {
        fn offset(&self, axis: Axis) -> i32 {
            match axis {
                Axis::Vertical => self.0,
                Axis::Horizontal => self.1,
            }
        }
    }

    #[derive(Default)]
    struct Provider {
        fail: bool,
        inits: u32,
        destroys: u32,
    }

    impl VirtualScroll for Provider {
        type Instance = Fixed;

        fn init(&mut self) -> Option<Fixed> {
            self.inits += 1;
            (!self.fail).then_some(Fixed(500, 7))
        }

        fn destroy(&mut self, _instance: Fixed) {
            self.destroys += 1;
        }
    }

    #[test]
    fn native_only_never_switches() {
        let mut sources = ScrollSources::native_only(Fixed(10, 0));
        assert_eq!(sources.select(true), None);
        assert_eq!(sources.interface(), Interface::Native);
        assert_eq!(sources.offset(Axis::Vertical), 10);
    }

    #[test]
    fn wide_viewport_mounts_lazily_once() {
        let mut sources = ScrollSources::new(Fixed(10, 0), Some(Provider::default()));
        assert_eq!(sources.interface(), Interface::Native);

        assert_eq!(sources.select(true), Some(InterfaceSwitch::Mounted));
        assert_eq!(sources.interface(), Interface::Virtualized);
        assert_eq!(sources.offset(Axis::Vertical), 500);
        assert_eq!(sources.offset(Axis::Horizontal), 7);

        // Already mounted: no second instance.
        assert_eq!(sources.select(true), None);
        assert_eq!(sources.provider.as_ref().map(|p| p.inits), Some(1));
    }

    #[test]
    fn narrow_viewport_tears_down() {
        let mut sources = ScrollSources::new(Fixed(10, 0), Some(Provider::default()));
        sources.select(true);
        assert_eq!(sources.select(false), Some(InterfaceSwitch::Unmounted));
        assert_eq!(sources.interface(), Interface::Native);
        assert_eq!(sources.offset(Axis::Vertical), 10);
        assert_eq!(sources.provider.as_ref().map(|p| p.destroys), Some(1));

        // Nothing mounted: nothing to tear down.
        assert_eq!(sources.select(false), None);
    }

    #[test]
    fn failed_provider_falls_back_permanently() {
        let provider = Provider {
            fail: true,
            ..Provider::default()
        };
        let mut sources = ScrollSources::new(Fixed(3, 0), Some(provider));
        assert_eq!(sources.select(true), Some(InterfaceSwitch::FellBack));
        assert!(!sources.has_provider());
        assert_eq!(sources.select(true), None);
        assert_eq!(sources.interface(), Interface::Native);
        assert_eq!(sources.offset(Axis::Vertical), 3);
    }

    #[test]
    fn debug_reports_active_interface() {
        let mut sources = ScrollSources::new(Fixed(10, 0), Some(Provider::default()));
        let native = alloc::format!("{sources:?}");
        assert!(native.contains("interface: Native"), "got: {native}");
        assert!(native.contains("has_provider: true"), "got: {native}");

        sources.select(true);
        let mounted = alloc::format!("{sources:?}");
        assert!(mounted.contains("interface: Virtualized"), "got: {mounted}");
    }
}
