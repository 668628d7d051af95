//! Intro sequencer
//!
//! Plays the page preloader: a counter runs from 0 to 100 with a progress
//! bar tracking it, then an exit choreography slides the counter out,
//! collapses the bar, and lifts the overlay away. The completion callback
//! fires exactly once, either when the exit finishes or when the fallback
//! timeout expires first.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reel_core::{ElementId, Property, Stage};
use tracing::{debug, warn};

use crate::easing::Easing;
use crate::engine::{FrameCallbackHandle, TimelineHandle};
use crate::error::Result;
use crate::keyframe::Keyframe;
use crate::scope::ScopeHandle;
use crate::timeline::{CompletionCallback, Position, Timeline};
use crate::values::FloatTween;

/// Durations, overlaps, and curves for the intro
#[derive(Clone, Debug, PartialEq)]
pub struct IntroTimings {
    /// Time for the counter to run 0 to 100
    pub count_duration: f32,
    pub count_easing: Easing,
    pub counter_exit_duration: f32,
    /// Vertical travel of the counter as it leaves (px)
    pub counter_exit_offset: f32,
    pub counter_exit_easing: Easing,
    pub bar_collapse_duration: f32,
    /// How far the bar collapse starts before the counter exit ends
    pub bar_overlap: f32,
    pub bar_easing: Easing,
    pub container_slide_duration: f32,
    /// How far the overlay slide starts before the bar collapse ends
    pub container_overlap: f32,
    pub container_easing: Easing,
    /// Force completion after this many seconds, if set
    pub fallback_timeout: Option<f32>,
}

impl Default for IntroTimings {
    fn default() -> Self {
        Self {
            count_duration: 3.0,
            count_easing: Easing::CubicInOut,
            counter_exit_duration: 0.8,
            counter_exit_offset: -100.0,
            counter_exit_easing: Easing::QuintIn,
            bar_collapse_duration: 0.8,
            bar_overlap: 0.5,
            bar_easing: Easing::QuintIn,
            container_slide_duration: 1.2,
            container_overlap: 0.2,
            container_easing: Easing::QuintInOut,
            fallback_timeout: Some(12.0),
        }
    }
}

impl IntroTimings {
    /// Length of the exit choreography, overlaps included
    pub fn exit_duration(&self) -> f32 {
        let counter_end = self.counter_exit_duration;
        let bar_start = (counter_end - self.bar_overlap).max(0.0);
        let bar_end = counter_end.max(bar_start + self.bar_collapse_duration);
        let container_start = (bar_end - self.container_overlap).max(0.0);
        bar_end.max(container_start + self.container_slide_duration)
    }

    /// Count plus exit, the time a normal run takes to complete
    pub fn total_duration(&self) -> f32 {
        self.count_duration + self.exit_duration()
    }
}

/// Elements the intro animates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntroElements {
    /// Full-screen overlay
    pub container: ElementId,
    pub counter: ElementId,
    pub progress_bar: ElementId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroPhase {
    Counting,
    Exiting,
    Complete,
}

/// Runs a completion callback at most once
struct Latch {
    callback: RefCell<Option<CompletionCallback>>,
    fired: Cell<bool>,
}

impl Latch {
    fn fire(&self) -> bool {
        if self.fired.replace(true) {
            return false;
        }
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
        true
    }
}

struct IntroState {
    elements: IntroElements,
    timings: IntroTimings,
    count: FloatTween,
    counter: u32,
    phase: IntroPhase,
    elapsed: f32,
    exit: Option<TimelineHandle>,
}

impl IntroState {
    /// Advance the count; returns the exit timeline on the frame the count finishes
    fn step(&mut self, dt: f32, stage: &mut Stage) -> Option<Timeline> {
        self.elapsed += dt;
        if self.phase != IntroPhase::Counting {
            return None;
        }

        self.count.tick(dt);
        let shown = if self.count.is_finished() {
            100
        } else {
            (self.count.value().floor().max(0.0) as u32).min(99)
        };
        self.counter = self.counter.max(shown);
        stage.write(
            self.elements.progress_bar,
            Property::WidthPercent,
            self.counter as f32,
        );

        if self.counter < 100 {
            return None;
        }
        debug!("IntroSequencer: count finished after {:.2}s", self.elapsed);
        self.phase = IntroPhase::Exiting;
        Some(self.exit_timeline())
    }

    /// Jump the overlay to where the exit leaves it
    fn force_end_state(&mut self, stage: &mut Stage) {
        if let Some(exit) = self.exit.take() {
            exit.cancel();
        }
        let IntroElements {
            container,
            counter,
            progress_bar,
        } = self.elements;
        self.counter = 100;
        stage.write(progress_bar, Property::WidthPercent, 100.0);
        stage.write(counter, Property::TranslateY, self.timings.counter_exit_offset);
        stage.write(counter, Property::Opacity, 0.0);
        stage.write(progress_bar, Property::ScaleX, 0.0);
        stage.write(container, Property::YPercent, -100.0);
    }

    fn exit_timeline(&self) -> Timeline {
        let t = &self.timings;
        let IntroElements {
            container,
            counter,
            progress_bar,
        } = self.elements;

        Timeline::new()
            .label("intro.exit")
            .add(
                Keyframe::to(t.counter_exit_duration)
                    .set(counter, Property::TranslateY, t.counter_exit_offset)
                    .set(counter, Property::Opacity, 0.0)
                    .easing(t.counter_exit_easing),
            )
            .add_at(
                Keyframe::to(t.bar_collapse_duration)
                    .set(progress_bar, Property::ScaleX, 0.0)
                    .easing(t.bar_easing),
                Position::Overlap(t.bar_overlap),
            )
            .add_at(
                Keyframe::to(t.container_slide_duration)
                    .set(container, Property::YPercent, -100.0)
                    .easing(t.container_easing),
                Position::Overlap(t.container_overlap),
            )
    }
}

/// The preloader sequence
///
/// Mount once per page; the sequencer registers its frame callback and exit
/// timeline on the given scope, so disposing the scope stops it.
pub struct IntroSequencer {
    state: Rc<RefCell<IntroState>>,
    latch: Rc<Latch>,
}

impl IntroSequencer {
    /// Start the intro; `on_complete` runs once when it finishes
    pub fn mount<F>(
        scope: &ScopeHandle,
        elements: IntroElements,
        timings: IntroTimings,
        on_complete: F,
    ) -> Result<Self>
    where
        F: FnOnce() + 'static,
    {
        let mut count = FloatTween::new(0.0, 100.0, timings.count_duration, timings.count_easing);
        count.start();
        let fallback = timings.fallback_timeout;
        if let Some(limit) = fallback {
            if limit <= timings.total_duration() {
                warn!(
                    "IntroSequencer: fallback {:.1}s ends before the {:.1}s sequence",
                    limit,
                    timings.total_duration()
                );
            }
        }

        let state = Rc::new(RefCell::new(IntroState {
            elements,
            timings,
            count,
            counter: 0,
            phase: IntroPhase::Counting,
            elapsed: 0.0,
            exit: None,
        }));
        let latch = Rc::new(Latch {
            callback: RefCell::new(Some(Box::new(on_complete))),
            fired: Cell::new(false),
        });

        let own_callback: Rc<RefCell<Option<FrameCallbackHandle>>> = Rc::new(RefCell::new(None));
        let handle = {
            let state = state.clone();
            let latch = latch.clone();
            let exit_scope = scope.clone();
            let own_callback = own_callback.clone();
            scope.on_frame(move |frame, stage| {
                let exit = state.borrow_mut().step(frame.dt, stage);
                if let Some(timeline) = exit {
                    let exit_latch = latch.clone();
                    match exit_scope.schedule(timeline.on_complete(move || {
                        exit_latch.fire();
                    })) {
                        Ok(handle) => state.borrow_mut().exit = Some(handle),
                        Err(err) => warn!("IntroSequencer: could not schedule exit: {}", err),
                    }
                }

                let elapsed = state.borrow().elapsed;
                if !latch.fired.get() && fallback.is_some_and(|limit| elapsed >= limit) {
                    warn!("IntroSequencer: forcing completion after {:.1}s", elapsed);
                    state.borrow_mut().force_end_state(stage);
                    latch.fire();
                }

                if latch.fired.get() {
                    state.borrow_mut().phase = IntroPhase::Complete;
                    if let Some(callback) = own_callback.borrow().as_ref() {
                        callback.remove();
                    }
                }
            })?
        };
        *own_callback.borrow_mut() = Some(handle);

        debug!("IntroSequencer: mounted");
        Ok(Self { state, latch })
    }

    /// Counter value to display, 0 to 100
    pub fn counter(&self) -> u32 {
        self.state.borrow().counter
    }

    pub fn phase(&self) -> IntroPhase {
        if self.latch.fired.get() {
            IntroPhase::Complete
        } else {
            self.state.borrow().phase
        }
    }

    pub fn is_complete(&self) -> bool {
        self.latch.fired.get()
    }

    /// The scheduled exit timeline, once counting has finished
    pub fn exit_timeline(&self) -> Option<TimelineHandle> {
        self.state.borrow().exit.clone()
    }
}
