// Copyright 2026 the Vantage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: cache ownership, frame guards, and the update cycle.
//!
//! [`Engine`] owns the geometry cache, the scroll tracker and the resize
//! debounce. A backend drives it from two places:
//!
//! - the frame loop calls [`update`](Engine::update) once per frame, which
//!   samples the scroll source and, unless the frame is idle, reconciles and
//!   applies the resulting changes;
//! - resize handling calls [`begin_resize`](Engine::begin_resize) per event
//!   and, once its timer settles, [`recompute`](Engine::recompute).
//!
//! Reconciliation is skipped entirely while no cache exists, while a resize
//! is pending, and on frames where nothing moved (unless forced).

use kurbo::Vec2;

use crate::action::ActionRegistry;
use crate::backend::Presenter;
use crate::cache::{GeometryCache, Layout};
use crate::options::Options;
use crate::reconcile::{FrameChanges, reconcile};
use crate::resize::{ResizeDebounce, ResizeToken};
use crate::scroll::{FrameScrollData, ScrollTracker};
use crate::source::{Interface, InterfaceSwitch, ScrollSource, ScrollSources, VirtualScroll};
use crate::trace::{InterfaceSwitchEvent, RebuildEvent, SkipReason, Tracer};

/// Scroll tracking and reconciliation state for one scroll container.
#[derive(Debug)]
pub struct Engine<H> {
    options: Options,
    cache: Option<GeometryCache<H>>,
    tracker: ScrollTracker,
    scroll: FrameScrollData,
    resize: ResizeDebounce,
    interface: Interface,
    changes: FrameChanges<H>,
}

impl<H: Clone> Engine<H> {
    /// Creates an engine with no cache; nothing is reconciled until the
    /// first [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            cache: None,
            tracker: ScrollTracker::new(),
            scroll: FrameScrollData::default(),
            resize: ResizeDebounce::new(),
            interface: Interface::Native,
            changes: FrameChanges::default(),
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The current geometry cache, if built.
    #[must_use]
    pub fn cache(&self) -> Option<&GeometryCache<H>> {
        self.cache.as_ref()
    }

    /// Scroll data from the most recent sample.
    #[must_use]
    pub fn scroll(&self) -> &FrameScrollData {
        &self.scroll
    }

    /// The interface sticky placement is computed for.
    #[must_use]
    pub fn interface(&self) -> Interface {
        self.interface
    }

    /// Sets the interface sticky placement is computed for.
    ///
    /// Hosts that manage scroll sources themselves call this after a switch;
    /// most use [`select_interface`](Self::select_interface) instead. Either
    /// way the cache must be rebuilt afterwards.
    pub fn set_interface(&mut self, interface: Interface) {
        self.interface = interface;
    }

    /// Picks the active scroll interface for the current viewport width.
    ///
    /// `wide` is whether the viewport matches the breakpoint query. Returns
    /// the switch that happened, if any; a switch invalidates the cache.
    pub fn select_interface<N: ScrollSource, V: VirtualScroll>(
        &mut self,
        sources: &mut ScrollSources<N, V>,
        wide: bool,
        tracer: &mut Tracer<'_>,
    ) -> Option<InterfaceSwitch> {
        let switch = sources.select(wide)?;
        self.interface = sources.interface();
        tracer.interface_switch(&InterfaceSwitchEvent {
            switch,
            interface: self.interface,
        });
        Some(switch)
    }

    /// Rebuilds the geometry cache.
    ///
    /// Resets everything `presenter` applied so elements are measured in
    /// their natural position, samples the scroll source, then measures the
    /// container and every markable element. Run state of all elements
    /// starts over.
    pub fn rebuild<S, L, P>(
        &mut self,
        source: &S,
        layout: &L,
        presenter: &mut P,
        tracer: &mut Tracer<'_>,
    ) where
        S: ScrollSource + ?Sized,
        L: Layout<Handle = H> + ?Sized,
        P: Presenter<H> + ?Sized,
    {
        presenter.reset();
        self.sample(source, tracer);
        let scroll: Vec2 = self.scroll.offset();
        let cache = GeometryCache::build(
            layout.container_size().into(),
            scroll,
            layout.measure(),
            &self.options,
        );
        tracer.rebuild(&RebuildEvent {
            container: cache.container(),
            scroll,
            tracked: cache.len(),
        });
        self.cache = Some(cache);
    }

    /// Samples the scroll source and records the frame's scroll data.
    pub fn sample<S: ScrollSource + ?Sized>(
        &mut self,
        source: &S,
        tracer: &mut Tracer<'_>,
    ) -> FrameScrollData {
        self.scroll = self.tracker.sample(source);
        if self.scroll.is_scrolling {
            tracer.scroll(&self.scroll);
        }
        self.scroll
    }

    /// Reconciles the cache against the last sample.
    ///
    /// Returns `None` when the pass was skipped: no cache, a pending resize,
    /// or an idle frame without `force`.
    pub fn reconcile(&mut self, force: bool, tracer: &mut Tracer<'_>) -> Option<&FrameChanges<H>> {
        let Some(cache) = self.cache.as_mut() else {
            tracer.reconcile_skipped(SkipReason::NoCache);
            return None;
        };
        if self.resize.is_pending() {
            tracer.reconcile_skipped(SkipReason::Resizing);
            return None;
        }
        if !self.scroll.is_scrolling && !force {
            return None;
        }
        self.changes.clear();
        reconcile(cache, &self.scroll, self.interface, &mut self.changes, tracer);
        Some(&self.changes)
    }

    /// Runs one frame: sample, reconcile, apply, dispatch.
    ///
    /// Returns `true` if a reconciliation pass ran.
    pub fn update<S, P>(
        &mut self,
        source: &S,
        presenter: &mut P,
        actions: &mut ActionRegistry<H>,
        force: bool,
        tracer: &mut Tracer<'_>,
    ) -> bool
    where
        S: ScrollSource + ?Sized,
        P: Presenter<H> + ?Sized,
    {
        self.sample(source, tracer);
        let Some(changes) = self.reconcile(force, tracer) else {
            return false;
        };
        presenter.apply(changes);
        actions.dispatch(&changes.actions, tracer);
        true
    }

    /// Rebuilds the cache and runs a forced frame.
    ///
    /// Used at startup, after a settled resize, and after structural changes
    /// to the document.
    pub fn recompute<S, L, P>(
        &mut self,
        source: &S,
        layout: &L,
        presenter: &mut P,
        actions: &mut ActionRegistry<H>,
        tracer: &mut Tracer<'_>,
    ) where
        S: ScrollSource + ?Sized,
        L: Layout<Handle = H> + ?Sized,
        P: Presenter<H> + ?Sized,
    {
        self.rebuild(source, layout, presenter, tracer);
        self.update(source, presenter, actions, true, tracer);
    }

    /// Records a resize event. Reconciliation is suspended until the
    /// returned token settles.
    pub fn begin_resize(&mut self) -> ResizeToken {
        self.resize.begin()
    }

    /// Settles a debounce timer. Returns `true` if the host should now
    /// [`recompute`](Self::recompute).
    pub fn settle_resize(&mut self, token: ResizeToken) -> bool {
        self.resize.settle(token)
    }

    /// Returns `true` while a resize is pending.
    #[must_use]
    pub fn is_resizing(&self) -> bool {
        self.resize.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use kurbo::{Rect, Size};

    use crate::action::{ActionContext, ActionKind};
    use crate::cache::Measurement;
    use crate::options::ElementOptions;
    use crate::reconcile::Pin;
    use crate::scroll::Axis;

    /// A fake document with absolute element rects.
    struct Page {
        scroll: Cell<(i32, i32)>,
        container: Size,
        elements: Vec<(u32, Rect, ElementOptions, Option<Rect>)>,
    }

    impl Page {
        fn new(elements: Vec<(u32, Rect, ElementOptions, Option<Rect>)>) -> Self {
            Self {
                scroll: Cell::new((0, 0)),
                container: Size::new(1000.0, 800.0),
                elements,
            }
        }

        fn scroll_to(&self, y: i32) {
            self.scroll.set((y, self.scroll.get().1));
        }

        fn scroll_vec(&self) -> Vec2 {
            let (y, x) = self.scroll.get();
            Vec2::new(f64::from(x), f64::from(y))
        }
    }

    impl ScrollSource for Page {
        fn offset(&self, axis: Axis) -> i32 {
            let (y, x) = self.scroll.get();
            match axis {
                Axis::Vertical => y,
                Axis::Horizontal => x,
            }
        }
    }

    impl Layout for Page {
        type Handle = u32;

        fn container_size(&self) -> Size {
            self.container
        }

        fn measure(&self) -> Vec<Measurement<u32>> {
            let scroll = self.scroll_vec();
            self.elements
                .iter()
                .map(|(id, rect, options, parent)| Measurement {
                    element: *id,
                    rect: *rect - scroll,
                    options: options.clone(),
                    stick_parent_rect: parent.map(|p| p - scroll),
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct Recorder {
        resets: usize,
        frames: Vec<FrameChanges<u32>>,
    }

    impl Recorder {
        fn entered(&self) -> Vec<u32> {
            self.frames.iter().flat_map(|f| f.entered.clone()).collect()
        }

        fn exited(&self) -> Vec<u32> {
            self.frames.iter().flat_map(|f| f.exited.clone()).collect()
        }

        fn last(&self) -> &FrameChanges<u32> {
            self.frames.last().expect("at least one frame applied")
        }
    }

    impl Presenter<u32> for Recorder {
        fn reset(&mut self) {
            self.resets += 1;
        }

        fn apply(&mut self, changes: &FrameChanges<u32>) {
            self.frames.push(changes.clone());
        }
    }

    fn with_action(name: &str) -> ElementOptions {
        ElementOptions {
            action: Some(String::from(name)),
            ..ElementOptions::default()
        }
    }

    fn counting(name: &str) -> (ActionRegistry<u32>, Rc<Cell<u32>>) {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let mut registry = ActionRegistry::new();
        registry.register(name, move |_: &ActionContext<'_, u32>| {
            counter.set(counter.get() + 1);
        });
        (registry, hits)
    }

    fn frame(
        engine: &mut Engine<u32>,
        page: &Page,
        presenter: &mut Recorder,
        actions: &mut ActionRegistry<u32>,
        y: i32,
    ) -> bool {
        page.scroll_to(y);
        engine.update(page, presenter, actions, false, &mut Tracer::none())
    }

    const ELEMENT: Rect = Rect::new(0.0, 1000.0, 100.0, 1200.0);

    #[test]
    fn enters_and_exits_exactly_once() {
        let page = Page::new(vec![(1, ELEMENT, with_action("reveal"), None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let (mut actions, hits) = counting("reveal");

        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        for y in [50, 100, 200] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        assert!(presenter.entered().is_empty());

        for y in [250, 300, 800, 1200] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        assert_eq!(presenter.entered(), vec![1]);
        assert_eq!(hits.get(), 1);
        assert!(presenter.exited().is_empty());

        for y in [1201, 1300, 1400] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        assert_eq!(presenter.exited(), vec![1]);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn idle_frames_do_not_reconcile() {
        let page = Page::new(vec![(1, ELEMENT, ElementOptions::default(), None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let mut actions = ActionRegistry::new();

        assert!(!frame(&mut engine, &page, &mut presenter, &mut actions, 0));
        engine.rebuild(&page, &page, &mut presenter, &mut Tracer::none());
        assert!(frame(&mut engine, &page, &mut presenter, &mut actions, 10));
        assert!(!frame(&mut engine, &page, &mut presenter, &mut actions, 10));
        assert!(engine.update(&page, &mut presenter, &mut actions, true, &mut Tracer::none()));
    }

    #[test]
    fn once_elements_never_come_back() {
        let options = ElementOptions {
            once: true,
            ..with_action("reveal")
        };
        let page = Page::new(vec![(1, ELEMENT, options, None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let (mut actions, hits) = counting("reveal");

        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        frame(&mut engine, &page, &mut presenter, &mut actions, 500);
        assert_eq!(presenter.last().entered, vec![1]);
        assert_eq!(presenter.last().retired, vec![1]);
        assert_eq!(engine.cache().map(GeometryCache::len), Some(0));

        for y in [0, 500, 2000, 500] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        assert_eq!(presenter.entered(), vec![1]);
        assert!(presenter.exited().is_empty());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn progress_handler_only_sees_bounded_values() {
        let options = ElementOptions {
            vertical_progress_action: Some(String::from("progress")),
            ..ElementOptions::default()
        };
        let page = Page::new(vec![(1, ELEMENT, options, None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut actions = ActionRegistry::new();
        actions.register("progress", move |ctx: &ActionContext<'_, u32>| {
            assert_eq!(ctx.kind, ActionKind::Progress);
            sink.borrow_mut().push(ctx.state.percentage);
        });

        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        for y in (0..=1600).step_by(20) {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }

        let seen = seen.borrow();
        assert!(!seen.is_empty());
        assert_eq!(seen.first(), Some(&Some(0)));
        assert_eq!(seen.last(), Some(&Some(100)));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| p.is_some_and(|p| (0..=100).contains(&p))));
    }

    #[test]
    fn parallax_is_written_only_in_view() {
        let options = ElementOptions {
            vertical_parallax: Some(None),
            ..ElementOptions::default()
        };
        let page = Page::new(vec![(1, ELEMENT, options, None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let mut actions = ActionRegistry::new();

        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        frame(&mut engine, &page, &mut presenter, &mut actions, 100);
        assert!(presenter.last().transforms.is_empty());

        frame(&mut engine, &page, &mut presenter, &mut actions, 500);
        // (1000 - 100 - 500) * 0.1
        assert_eq!(presenter.last().transforms[0].translation, Vec2::new(0.0, 40.0));
    }

    fn sticky(parent: Option<Rect>) -> Page {
        let options = ElementOptions {
            stick_to_top: true,
            ..ElementOptions::default()
        };
        Page::new(vec![(7, Rect::new(0.0, 500.0, 100.0, 600.0), options, parent)])
    }

    #[test]
    fn native_sticky_lifecycle() {
        let page = sticky(Some(Rect::new(0.0, 0.0, 100.0, 2000.0)));
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let mut actions = ActionRegistry::new();
        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());

        frame(&mut engine, &page, &mut presenter, &mut actions, 500);
        assert!(presenter.last().stuck.is_empty());

        frame(&mut engine, &page, &mut presenter, &mut actions, 501);
        let stick = &presenter.last().stuck[0];
        assert_eq!(stick.pin, Pin::Fixed { top: 0.0 });
        assert_eq!(stick.placeholder_height, Some(100.0));

        // Same placement: nothing to write.
        frame(&mut engine, &page, &mut presenter, &mut actions, 900);
        assert!(presenter.last().stuck.is_empty());

        // Past 2000 - 100 the element rides out with its parent.
        frame(&mut engine, &page, &mut presenter, &mut actions, 1901);
        let stick = &presenter.last().stuck[0];
        assert_eq!(stick.pin, Pin::Anchored);
        assert_eq!(stick.placeholder_height, None);

        frame(&mut engine, &page, &mut presenter, &mut actions, 400);
        assert_eq!(presenter.last().unstuck, vec![7]);
        frame(&mut engine, &page, &mut presenter, &mut actions, 300);
        assert!(presenter.last().unstuck.is_empty());
    }

    #[test]
    fn virtualized_sticky_follows_the_scroll_position() {
        let page = sticky(Some(Rect::new(0.0, 0.0, 100.0, 2000.0)));
        let mut engine = Engine::new(Options::default());
        engine.set_interface(Interface::Virtualized);
        let mut presenter = Recorder::default();
        let mut actions = ActionRegistry::new();
        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());

        frame(&mut engine, &page, &mut presenter, &mut actions, 600);
        assert_eq!(presenter.last().stuck[0].pin, Pin::Fixed { top: 600.0 });
        frame(&mut engine, &page, &mut presenter, &mut actions, 700);
        assert_eq!(presenter.last().stuck[0].pin, Pin::Fixed { top: 700.0 });
        for y in [1900, 2500, 3000] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        let cache = engine.cache().expect("cache built");
        assert_eq!(cache.items()[0].state.pin, Some(Pin::Fixed { top: 1900.0 }));
    }

    #[test]
    fn sticky_without_parent_is_inert() {
        let page = sticky(None);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let mut actions = ActionRegistry::new();
        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        for y in [501, 1000, 5000, 0] {
            frame(&mut engine, &page, &mut presenter, &mut actions, y);
        }
        assert!(presenter.frames.iter().all(|f| f.stuck.is_empty() && f.unstuck.is_empty()));
    }

    #[test]
    fn rebuild_is_idempotent_across_scroll_positions() {
        let page = Page::new(vec![
            (1, ELEMENT, with_action("a"), None),
            (2, Rect::new(20.0, 3000.0, 220.0, 3300.0), ElementOptions::default(), None),
        ]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();

        engine.rebuild(&page, &page, &mut presenter, &mut Tracer::none());
        let first = engine.cache().cloned();
        page.scroll_to(1234);
        engine.rebuild(&page, &page, &mut presenter, &mut Tracer::none());
        assert_eq!(engine.cache().cloned(), first);
        assert_eq!(presenter.resets, 2);
    }

    #[test]
    fn resize_burst_rebuilds_once() {
        let page = Page::new(vec![(1, ELEMENT, with_action("reveal"), None)]);
        let mut engine = Engine::new(Options::default());
        let mut presenter = Recorder::default();
        let (mut actions, hits) = counting("reveal");
        engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
        let resets_before = presenter.resets;

        let tokens = [engine.begin_resize(), engine.begin_resize(), engine.begin_resize()];
        // Scrolling into view while resizing reconciles nothing.
        assert!(!frame(&mut engine, &page, &mut presenter, &mut actions, 400));
        assert_eq!(hits.get(), 0);

        // Every timer fires; only the last one settles.
        for token in tokens {
            if engine.settle_resize(token) {
                engine.recompute(&page, &page, &mut presenter, &mut actions, &mut Tracer::none());
            }
        }
        assert_eq!(presenter.resets - resets_before, 1);
        assert!(!engine.is_resizing());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn interface_selection_updates_placement_mode() {
        use crate::source::NoVirtualScroll;

        let page = Page::new(Vec::new());
        let mut sources: ScrollSources<&Page, NoVirtualScroll> = ScrollSources::native_only(&page);
        let mut engine: Engine<u32> = Engine::new(Options::default());
        assert_eq!(engine.select_interface(&mut sources, true, &mut Tracer::none()), None);
        assert_eq!(engine.interface(), Interface::Native);
    }

    /// Mounts instances that report a fixed vertical offset.
    #[derive(Default)]
    struct Slider {
        mounted: u32,
        destroyed: u32,
    }

    impl VirtualScroll for Slider {
        type Instance = Scrolled;

        fn init(&mut self) -> Option<Scrolled> {
            self.mounted += 1;
            Some(Scrolled(640))
        }

        fn destroy(&mut self, _instance: Scrolled) {
            self.destroyed += 1;
        }
    }

    struct Scrolled(i32);

    impl ScrollSource for Scrolled {
        fn offset(&self, axis: Axis) -> i32 {
            match axis {
                Axis::Vertical => self.0,
                Axis::Horizontal => 0,
            }
        }
    }

    #[test]
    fn provider_mounts_when_wide_and_unmounts_when_narrow() {
        let page = Page::new(Vec::new());
        page.scroll_to(40);
        let mut sources = ScrollSources::new(&page, Some(Slider::default()));
        let mut engine: Engine<u32> = Engine::new(Options::default());

        assert_eq!(
            engine.select_interface(&mut sources, true, &mut Tracer::none()),
            Some(InterfaceSwitch::Mounted)
        );
        assert_eq!(engine.interface(), Interface::Virtualized);
        assert_eq!(engine.sample(&sources, &mut Tracer::none()).vertical.position, 640);

        // Still wide: nothing to do.
        assert_eq!(engine.select_interface(&mut sources, true, &mut Tracer::none()), None);
        assert_eq!(engine.interface(), Interface::Virtualized);

        assert_eq!(
            engine.select_interface(&mut sources, false, &mut Tracer::none()),
            Some(InterfaceSwitch::Unmounted)
        );
        assert_eq!(engine.interface(), Interface::Native);
        assert_eq!(engine.sample(&sources, &mut Tracer::none()).vertical.position, 40);
    }
}
