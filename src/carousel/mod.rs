//! Hero slideshow: one active slide out of a fixed deck, rotated on a timer
//! and overridable by dot clicks and swipes.
//!
//! A transition runs in two timed phases. The outgoing slide first gets the
//! exiting class; after `exit-delay` it loses `active`, the target becomes
//! current with `active` and the entering class, indicators update and the
//! progress bar restarts; `enter-delay` later the entering class is dropped.
//!
//! Requests that arrive during the exit phase are dropped ([`Navigation::Busy`]).
//! A request during the enter phase cuts the entering animation short and
//! starts a new transition immediately.

mod progress;
mod state;
mod swipe;
mod timers;

use std::time::Duration;

use page_model::Surface;
use tracing::{debug, info, warn};

use crate::config::{SlideClasses, SliderConfig};

pub use progress::ProgressMeter;
pub use state::{CarouselState, Navigation, Phase};
pub use swipe::{SwipeDirection, SwipeTracker};
pub use timers::{Fired, TimerHandle, TimerKind, Timers};

/// One panel of the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide<E> {
    pub index: usize,
    pub element: E,
}

#[derive(Debug)]
struct Hooks<E> {
    slides: Vec<Slide<E>>,
    progress: Option<E>,
    current_label: Option<E>,
    total_label: Option<E>,
    dots: Vec<E>,
}

impl<E> Hooks<E> {
    fn empty() -> Self {
        Self {
            slides: Vec::new(),
            progress: None,
            current_label: None,
            total_label: None,
            dots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Timing {
    dwell: Duration,
    exit_delay: Duration,
    enter_delay: Duration,
}

/// Two-digit, one-based slide number as shown in the counter.
pub fn counter_label(n: usize) -> String {
    format!("{n:02}")
}

#[derive(Debug)]
pub struct Carousel<E> {
    hooks: Hooks<E>,
    classes: SlideClasses,
    timing: Timing,
    state: CarouselState,
    progress: ProgressMeter,
    swipe: SwipeTracker,
    timers: Timers,
}

impl<E: Clone + Eq + std::fmt::Debug> Carousel<E> {
    /// Binds to the slider markup and starts rotating at page-clock `now`.
    ///
    /// A missing slider root or an empty deck yields an idle carousel.
    pub fn mount<S>(surface: &mut S, cfg: &SliderConfig, now: Duration) -> Self
    where
        S: Surface<Element = E>,
    {
        let hooks = bind_hooks(surface, cfg);
        let mut carousel = Self {
            state: CarouselState::new(hooks.slides.len()),
            hooks,
            classes: cfg.classes.clone(),
            timing: Timing {
                dwell: cfg.dwell,
                exit_delay: cfg.exit_delay,
                enter_delay: cfg.enter_delay,
            },
            progress: ProgressMeter::new(cfg.dwell, cfg.progress_tick),
            swipe: SwipeTracker::new(cfg.swipe_threshold_px),
            timers: Timers::new(),
        };
        carousel.start(surface, now);
        carousel
    }

    fn start<S: Surface<Element = E>>(&mut self, surface: &mut S, now: Duration) {
        let total = self.state.total();
        if total == 0 {
            info!("no slides found; carousel idle");
            return;
        }

        for slide in &self.hooks.slides {
            surface.remove_class(&slide.element, &self.classes.exiting);
            surface.remove_class(&slide.element, &self.classes.entering);
            if slide.index == 0 {
                surface.add_class(&slide.element, &self.classes.active);
            } else {
                surface.remove_class(&slide.element, &self.classes.active);
            }
        }
        if let Some(label) = &self.hooks.total_label {
            surface.set_text(label, &counter_label(total));
        }
        self.sync_indicators(surface);
        self.restart_progress(surface, now);
        self.restart_auto_rotation(now);
        info!(
            total,
            dwell_ms = self.timing.dwell.as_millis() as u64,
            "carousel started"
        );
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current()
    }

    pub fn total(&self) -> usize {
        self.state.total()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_idle(&self) -> bool {
        self.state.phase() == Phase::Idle
    }

    pub fn progress_fraction(&self) -> f64 {
        self.progress.fraction()
    }

    pub fn slides(&self) -> &[Slide<E>] {
        &self.hooks.slides
    }

    /// Number of live timers of `kind`; never more than one.
    pub fn live_timers(&self, kind: TimerKind) -> usize {
        self.timers.live(kind)
    }

    /// Live timers of every kind.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Next page-clock instant at which [`Carousel::advance`] has work.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Index of the dot containing `target`, if any.
    pub fn dot_index<S>(&self, surface: &S, target: &E) -> Option<usize>
    where
        S: Surface<Element = E>,
    {
        self.hooks
            .dots
            .iter()
            .position(|dot| surface.contains(dot, target))
    }

    /// Manual navigation to `target`; restarts the auto-rotate cadence when a
    /// transition starts.
    pub fn go_to<S>(&mut self, surface: &mut S, target: usize, now: Duration) -> Navigation
    where
        S: Surface<Element = E>,
    {
        let nav = self.begin_transition(surface, target, now);
        if nav.started() {
            self.restart_auto_rotation(now);
        }
        nav
    }

    pub fn next<S>(&mut self, surface: &mut S, now: Duration) -> Navigation
    where
        S: Surface<Element = E>,
    {
        match self.state.next_index() {
            Some(target) => self.go_to(surface, target, now),
            None => Navigation::Idle,
        }
    }

    pub fn previous<S>(&mut self, surface: &mut S, now: Duration) -> Navigation
    where
        S: Surface<Element = E>,
    {
        match self.state.previous_index() {
            Some(target) => self.go_to(surface, target, now),
            None => Navigation::Idle,
        }
    }

    pub fn touch_start(&mut self, screen_x: f64) {
        self.swipe.touch_start(screen_x);
    }

    /// Completes a touch gesture. `None` when the drag was not a swipe.
    pub fn touch_end<S>(&mut self, surface: &mut S, screen_x: f64, now: Duration) -> Option<Navigation>
    where
        S: Surface<Element = E>,
    {
        let direction = self.swipe.touch_end(screen_x)?;
        debug!(?direction, "swipe detected");
        Some(match direction {
            SwipeDirection::Left => self.next(surface, now),
            SwipeDirection::Right => self.previous(surface, now),
        })
    }

    /// Runs every timer due at or before `now`, in due order. Returns how
    /// many fired.
    pub fn advance<S>(&mut self, surface: &mut S, now: Duration) -> usize
    where
        S: Surface<Element = E>,
    {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            fired += 1;
            self.on_timer(surface, timer);
        }
        fired
    }

    /// Cancels every timer and parks the carousel in [`Phase::Idle`].
    pub fn shutdown<S>(&mut self, surface: &mut S)
    where
        S: Surface<Element = E>,
    {
        match self.state.phase() {
            Phase::Exiting { from, .. } => {
                if let Some(slide) = self.hooks.slides.get(from) {
                    surface.remove_class(&slide.element, &self.classes.exiting);
                }
            }
            Phase::Entering { index } => {
                if let Some(slide) = self.hooks.slides.get(index) {
                    surface.remove_class(&slide.element, &self.classes.entering);
                }
            }
            Phase::Showing | Phase::Idle => {}
        }
        self.timers.cancel_all();
        self.state.stop();
        debug!("carousel shut down");
    }

    fn on_timer<S: Surface<Element = E>>(&mut self, surface: &mut S, timer: Fired) {
        match timer.kind {
            TimerKind::AutoRotate => {
                if self.state.auto_rotate != Some(timer.handle) {
                    return;
                }
                let Some(target) = self.state.next_index() else {
                    return;
                };
                let nav = self.begin_transition(surface, target, timer.at);
                if !nav.started() {
                    debug!(?nav, "automatic advance skipped");
                }
            }
            TimerKind::Progress => {
                if self.state.progress != Some(timer.handle) {
                    return;
                }
                let full = self.progress.tick();
                if let Some(bar) = &self.hooks.progress {
                    surface.set_style(bar, "width", &self.progress.width_label());
                }
                if full {
                    self.timers.cancel(timer.handle);
                    self.state.progress = None;
                }
            }
            TimerKind::Phase => {
                if self.state.phase_timer != Some(timer.handle) {
                    return;
                }
                self.state.phase_timer = None;
                match self.state.phase() {
                    Phase::Exiting { .. } => self.enter(surface, timer.at),
                    Phase::Entering { .. } => {
                        if let Some(index) = self.state.complete_enter() {
                            self.remove_slide_class(surface, index, ClassSlot::Entering);
                            debug!(index, "slide settled");
                        }
                    }
                    Phase::Showing | Phase::Idle => {}
                }
            }
        }
    }

    fn begin_transition<S: Surface<Element = E>>(
        &mut self,
        surface: &mut S,
        target: usize,
        now: Duration,
    ) -> Navigation {
        let nav = self.state.admit(target);
        match nav {
            Navigation::Started { .. } => {}
            Navigation::Busy => {
                debug!(target, "exit phase in flight; navigation dropped");
                return nav;
            }
            Navigation::OutOfRange => {
                warn!(target, total = self.state.total(), "navigation target out of range");
                return nav;
            }
            Navigation::Unchanged | Navigation::Idle => return nav,
        }

        if let Phase::Entering { .. } = self.state.phase() {
            self.cancel_phase_timer();
            if let Some(index) = self.state.complete_enter() {
                self.remove_slide_class(surface, index, ClassSlot::Entering);
            }
        }

        let from = self.state.begin_exit(target);
        self.add_slide_class(surface, from, ClassSlot::Exiting);
        self.cancel_phase_timer();
        self.state.phase_timer =
            Some(self.timers.start_timeout(TimerKind::Phase, now, self.timing.exit_delay));
        debug!(from, to = target, "slide exit started");
        nav
    }

    fn enter<S: Surface<Element = E>>(&mut self, surface: &mut S, at: Duration) {
        let Some((from, to)) = self.state.complete_exit() else {
            return;
        };
        self.remove_slide_class(surface, from, ClassSlot::Active);
        self.remove_slide_class(surface, from, ClassSlot::Exiting);
        self.add_slide_class(surface, to, ClassSlot::Active);
        self.add_slide_class(surface, to, ClassSlot::Entering);
        self.sync_indicators(surface);
        self.restart_progress(surface, at);
        self.state.phase_timer =
            Some(self.timers.start_timeout(TimerKind::Phase, at, self.timing.enter_delay));
        info!(from, to, "slide activated");
    }

    fn sync_indicators<S: Surface<Element = E>>(&self, surface: &mut S) {
        let current = self.state.current();
        if let Some(label) = &self.hooks.current_label {
            surface.set_text(label, &counter_label(current + 1));
        }
        for (idx, dot) in self.hooks.dots.iter().enumerate() {
            if idx == current {
                surface.add_class(dot, &self.classes.active);
            } else {
                surface.remove_class(dot, &self.classes.active);
            }
        }
    }

    fn restart_progress<S: Surface<Element = E>>(&mut self, surface: &mut S, now: Duration) {
        if let Some(handle) = self.state.progress.take() {
            self.timers.cancel(handle);
        }
        self.progress.reset();
        if let Some(bar) = &self.hooks.progress {
            surface.set_style(bar, "width", "0%");
        }
        let tick = self.progress.tick_interval();
        self.state.progress = Some(self.timers.start_interval(TimerKind::Progress, now, tick));
    }

    fn restart_auto_rotation(&mut self, now: Duration) {
        if let Some(handle) = self.state.auto_rotate.take() {
            self.timers.cancel(handle);
        }
        self.state.auto_rotate =
            Some(self.timers.start_interval(TimerKind::AutoRotate, now, self.timing.dwell));
    }

    fn cancel_phase_timer(&mut self) {
        if let Some(handle) = self.state.phase_timer.take() {
            self.timers.cancel(handle);
        }
    }

    fn add_slide_class<S: Surface<Element = E>>(&self, surface: &mut S, index: usize, slot: ClassSlot) {
        if let Some(slide) = self.hooks.slides.get(index) {
            surface.add_class(&slide.element, slot.name(&self.classes));
        }
    }

    fn remove_slide_class<S: Surface<Element = E>>(
        &self,
        surface: &mut S,
        index: usize,
        slot: ClassSlot,
    ) {
        if let Some(slide) = self.hooks.slides.get(index) {
            surface.remove_class(&slide.element, slot.name(&self.classes));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClassSlot {
    Active,
    Exiting,
    Entering,
}

impl ClassSlot {
    fn name(self, classes: &SlideClasses) -> &str {
        match self {
            ClassSlot::Active => &classes.active,
            ClassSlot::Exiting => &classes.exiting,
            ClassSlot::Entering => &classes.entering,
        }
    }
}

fn bind_hooks<S: Surface>(surface: &S, cfg: &SliderConfig) -> Hooks<S::Element> {
    let sel = &cfg.selectors;
    let Some(root) = surface.query(None, &sel.root) else {
        warn!(selector = %sel.root, "slider root not found");
        return Hooks::empty();
    };

    let slides = surface
        .query_all(Some(&root), &sel.slides)
        .into_iter()
        .enumerate()
        .map(|(index, element)| Slide { index, element })
        .collect();
    let optional = |selector: &str, what: &str| {
        let found = surface.query(Some(&root), selector);
        if found.is_none() {
            debug!(selector, what, "optional slider hook missing");
        }
        found
    };

    Hooks {
        slides,
        progress: optional(&sel.progress, "progress bar"),
        current_label: optional(&sel.current, "current counter"),
        total_label: optional(&sel.total, "total counter"),
        dots: surface.query_all(Some(&root), &sel.dots),
    }
}
