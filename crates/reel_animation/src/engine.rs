//! Timeline engine
//!
//! Owns every scheduled timeline and per-frame callback and advances them
//! once per display frame. The engine is constructed explicitly and shared
//! through weak handles; operations on a handle whose engine has been
//! dropped are no-ops.
//!
//! # Frame order
//!
//! 1. Evaluate viewport triggers and advance timelines, rendering into the stage
//! 2. Run frame callbacks
//! 3. Run completion callbacks collected in step 1
//!
//! User callbacks in steps 2 and 3 run with the engine unborrowed, so they
//! may schedule, cancel, or dispose freely.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use reel_core::Stage;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{AnimationError, Result};
use crate::sampler::Sample;
use crate::timeline::{CompletionCallback, PlayState, Timeline};

/// Longest frame delta the engine will apply, in seconds
pub const DEFAULT_MAX_FRAME_DT: f32 = 0.1;

new_key_type! {
    /// Handle to a scheduled timeline
    pub struct TimelineId;
    /// Handle to a per-frame callback
    pub struct FrameCallbackId;
}

/// What a frame callback sees each frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub sample: Sample,
    /// Seconds since the previous frame, clamped to the engine's limit
    pub dt: f32,
}

/// Per-frame callback for continuous animation
pub type FrameCallback = Box<dyn FnMut(&Frame, &mut Stage)>;

/// Internal state of the engine
struct EngineInner {
    timelines: SlotMap<TimelineId, Timeline>,
    // A callback is taken out of its slot while it runs
    frame_callbacks: SlotMap<FrameCallbackId, Option<FrameCallback>>,
    last_timestamp: Option<f64>,
    max_frame_dt: f32,
    frames: u64,
}

/// Advances timelines and frame callbacks
///
/// ```ignore
/// let engine = TimelineEngine::new();
/// let fade = engine.schedule(Timeline::new().add(Keyframe::to(0.3).set(id, Property::Opacity, 0.0)));
/// loop {
///     let sample = sampler.sample(now, scroll);
///     engine.tick(&sample, &mut stage);
/// }
/// ```
pub struct TimelineEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                timelines: SlotMap::with_key(),
                frame_callbacks: SlotMap::with_key(),
                last_timestamp: None,
                max_frame_dt: DEFAULT_MAX_FRAME_DT,
                frames: 0,
            })),
        }
    }

    /// Override the frame delta clamp
    pub fn with_max_frame_dt(self, max_frame_dt: f32) -> Self {
        self.inner.borrow_mut().max_frame_dt = max_frame_dt.max(0.0);
        self
    }

    /// Get a weak handle to this engine
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Schedule a timeline
    ///
    /// Timelines without a trigger start playing on the next tick unless
    /// built with `paused()` or `scroll_bound()`.
    pub fn schedule(&self, timeline: Timeline) -> TimelineHandle {
        let id = insert_timeline(&self.inner, timeline);
        TimelineHandle {
            id,
            engine: self.handle(),
        }
    }

    /// Register a callback that runs once per frame
    pub fn on_frame<F>(&self, callback: F) -> FrameCallbackHandle
    where
        F: FnMut(&Frame, &mut Stage) + 'static,
    {
        let id = self
            .inner
            .borrow_mut()
            .frame_callbacks
            .insert(Some(Box::new(callback)));
        FrameCallbackHandle {
            id,
            engine: self.handle(),
        }
    }

    /// Advance everything by one frame
    ///
    /// Returns true if any timeline is still playing.
    pub fn tick(&self, sample: &Sample, stage: &mut Stage) -> bool {
        let (frame, completions, callback_ids) = {
            let mut inner = self.inner.borrow_mut();
            let dt = match inner.last_timestamp {
                Some(prev) => ((sample.timestamp - prev) as f32).clamp(0.0, inner.max_frame_dt),
                None => 0.0,
            };
            inner.last_timestamp = Some(sample.timestamp);
            inner.frames += 1;

            let mut completions: SmallVec<[CompletionCallback; 2]> = SmallVec::new();
            for (_, timeline) in inner.timelines.iter_mut() {
                timeline.evaluate_trigger(stage, sample);
                if let Some(callback) = timeline.advance(dt, stage) {
                    debug!("TimelineEngine: '{}' completed", timeline.name());
                    completions.push(callback);
                }
            }

            let ids: SmallVec<[FrameCallbackId; 8]> = inner.frame_callbacks.keys().collect();
            (
                Frame {
                    sample: *sample,
                    dt,
                },
                completions,
                ids,
            )
        };

        for id in callback_ids {
            let taken = self
                .inner
                .borrow_mut()
                .frame_callbacks
                .get_mut(id)
                .and_then(Option::take);
            let Some(mut callback) = taken else {
                continue;
            };
            callback(&frame, stage);
            // Put it back unless it was removed while running
            if let Some(slot) = self.inner.borrow_mut().frame_callbacks.get_mut(id) {
                *slot = Some(callback);
            }
        }

        for callback in completions {
            callback();
        }

        self.has_active_timelines()
    }

    /// Check if any timeline is playing
    pub fn has_active_timelines(&self) -> bool {
        self.inner
            .borrow()
            .timelines
            .values()
            .any(Timeline::is_playing)
    }

    /// Get the number of scheduled timelines
    pub fn timeline_count(&self) -> usize {
        self.inner.borrow().timelines.len()
    }

    /// Get the number of registered frame callbacks
    pub fn frame_callback_count(&self) -> usize {
        self.inner.borrow().frame_callbacks.len()
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_timeline(inner: &RefCell<EngineInner>, mut timeline: Timeline) -> TimelineId {
    timeline.on_scheduled();
    debug!(
        "TimelineEngine: scheduled '{}' ({} entries, {:.2}s)",
        timeline.name(),
        timeline.entry_count(),
        timeline.duration()
    );
    inner.borrow_mut().timelines.insert(timeline)
}

// ============================================================================
// Handles
// ============================================================================

/// A weak handle to the timeline engine
///
/// This is passed to components that need to schedule animations.
/// It won't prevent the engine from being dropped.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Weak<RefCell<EngineInner>>,
}

impl EngineHandle {
    /// Schedule a timeline
    pub fn schedule(&self, timeline: Timeline) -> Result<TimelineHandle> {
        let inner = self.inner.upgrade().ok_or(AnimationError::EngineDropped)?;
        let id = insert_timeline(&inner, timeline);
        Ok(TimelineHandle {
            id,
            engine: self.clone(),
        })
    }

    /// Register a per-frame callback
    pub fn on_frame<F>(&self, callback: F) -> Result<FrameCallbackHandle>
    where
        F: FnMut(&Frame, &mut Stage) + 'static,
    {
        let inner = self.inner.upgrade().ok_or(AnimationError::EngineDropped)?;
        let id = inner
            .borrow_mut()
            .frame_callbacks
            .insert(Some(Box::new(callback)));
        Ok(FrameCallbackHandle {
            id,
            engine: self.clone(),
        })
    }

    /// Access a timeline
    ///
    /// Returns None if the engine is dropped or the timeline was removed.
    pub fn with_timeline<F, R>(&self, id: TimelineId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow_mut().timelines.get_mut(id).map(f))
    }

    fn remove_timeline(&self, id: TimelineId) -> Option<Timeline> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow_mut().timelines.remove(id))
    }

    fn remove_frame_callback(&self, id: FrameCallbackId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().frame_callbacks.remove(id).is_some())
            .unwrap_or(false)
    }

    fn has_frame_callback(&self, id: FrameCallbackId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().frame_callbacks.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the engine is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Control surface for one scheduled timeline
#[derive(Clone)]
pub struct TimelineHandle {
    id: TimelineId,
    engine: EngineHandle,
}

impl TimelineHandle {
    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn play(&self) {
        self.engine.with_timeline(self.id, Timeline::play);
    }

    pub fn pause(&self) {
        self.engine.with_timeline(self.id, Timeline::pause);
    }

    pub fn reverse(&self) {
        self.engine.with_timeline(self.id, Timeline::reverse);
    }

    pub fn restart(&self) {
        self.engine.with_timeline(self.id, Timeline::restart);
    }

    /// Set progress of a scroll-bound timeline (0.0 to 1.0)
    pub fn set_progress(&self, progress: f32) {
        self.engine.with_timeline(self.id, |t| t.seek(progress));
    }

    /// Stop all mutation now; written values stay as they are
    pub fn cancel(&self) {
        if self.engine.remove_timeline(self.id).is_some() {
            trace!("TimelineHandle: cancelled {:?}", self.id);
        }
    }

    /// Stop all mutation and restore the values the timeline overwrote
    pub fn cancel_and_reset(&self, stage: &mut Stage) {
        if let Some(mut timeline) = self.engine.remove_timeline(self.id) {
            timeline.reset(stage);
            trace!("TimelineHandle: cancelled and reset {:?}", self.id);
        }
    }

    /// Playhead progress, or None once cancelled
    pub fn progress(&self) -> Option<f32> {
        self.engine.with_timeline(self.id, |t| t.progress())
    }

    pub fn state(&self) -> Option<PlayState> {
        self.engine.with_timeline(self.id, |t| t.state())
    }

    /// True while the timeline is playing
    pub fn is_active(&self) -> bool {
        self.engine
            .with_timeline(self.id, |t| t.is_playing())
            .unwrap_or(false)
    }

    /// True until cancelled or the engine is dropped
    pub fn is_scheduled(&self) -> bool {
        self.engine.with_timeline(self.id, |_| ()).is_some()
    }
}

/// Registration of a per-frame callback
#[derive(Clone)]
pub struct FrameCallbackHandle {
    id: FrameCallbackId,
    engine: EngineHandle,
}

impl FrameCallbackHandle {
    pub fn id(&self) -> FrameCallbackId {
        self.id
    }

    /// Unregister the callback; returns false if it was already gone
    pub fn remove(&self) -> bool {
        self.engine.remove_frame_callback(self.id)
    }

    pub fn is_registered(&self) -> bool {
        self.engine.has_frame_callback(self.id)
    }
}
