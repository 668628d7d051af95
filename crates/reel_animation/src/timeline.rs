//! Timelines
//!
//! A timeline is an ordered set of keyframes placed at absolute offsets.
//! Placement follows the familiar tween-sequencing vocabulary: append after
//! the previous entry, run alongside it, overlap its tail (`"-=0.5"`), leave
//! a gap (`"+=0.2"`), or pin to an absolute time. Stagger groups place one
//! keyframe per element with a fixed per-item delay.
//!
//! Entrance timelines run on their own clock once played. Scroll-bound
//! timelines never advance on their own; their progress is set from the
//! scroll position by the scroll-link controller.
//!
//! ```ignore
//! let exit = Timeline::new()
//!     .add(Keyframe::to(0.8).set(counter, Property::TranslateY, -100.0))
//!     .add_at(Keyframe::to(0.8).set(bar, Property::ScaleX, 0.0), Position::Overlap(0.5))
//!     .on_complete(|| println!("done"));
//! ```

use reel_core::Stage;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::keyframe::{Keyframe, KeyframeMode, Track};
use crate::sampler::Sample;
use crate::trigger::{TogglePolicy, TriggerEdge, TriggerState, ViewportTrigger};

/// Callback invoked once when a timeline first finishes playing forward
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Where a keyframe is placed relative to what is already in the timeline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// After the timeline's current end
    #[default]
    Sequence,
    /// At the same offset as the previous entry
    WithPrevious,
    /// Starting this many seconds before the timeline's current end (`"-=x"`)
    Overlap(f32),
    /// Starting this many seconds after the timeline's current end (`"+=x"`)
    Gap(f32),
    /// At an absolute offset from the timeline start
    At(f32),
}

/// Whether a timeline owns its clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimelineKind {
    #[default]
    Entrance,
    ScrollBound,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    /// Scheduled but not yet played (waiting on a trigger or an explicit play)
    #[default]
    Idle,
    Playing,
    Paused,
    /// Reached the end of the current direction
    Finished,
}

struct Entry {
    keyframe: Keyframe,
    start: f32,
    tracks: Option<SmallVec<[Track; 4]>>,
    rendered: Option<f32>,
}

impl Entry {
    fn begin(&self) -> f32 {
        self.start + self.keyframe.delay_offset()
    }

    fn end(&self) -> f32 {
        self.begin() + self.keyframe.duration()
    }

    fn local_progress(&self, time: f32) -> f32 {
        let duration = self.keyframe.duration();
        if duration <= 0.0 {
            return if time >= self.begin() { 1.0 } else { 0.0 };
        }
        ((time - self.begin()) / duration).clamp(0.0, 1.0)
    }

    fn write(&mut self, stage: &mut Stage, local: f32) {
        let Some(tracks) = &self.tracks else {
            return;
        };
        let eased = self.keyframe.easing_curve().apply(local);
        for track in tracks {
            stage.write(track.element, track.property, track.value_at(eased));
        }
        self.rendered = Some(local);
    }
}

/// An ordered set of keyframes with a playhead
pub struct Timeline {
    label: String,
    entries: Vec<Entry>,
    kind: TimelineKind,
    trigger: Option<TriggerState>,
    on_complete: Option<CompletionCallback>,
    autoplay: bool,
    last_start: f32,
    time: f32,
    direction: Direction,
    state: PlayState,
    primed: bool,
    dirty: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            label: String::from("timeline"),
            entries: Vec::new(),
            kind: TimelineKind::Entrance,
            trigger: None,
            on_complete: None,
            autoplay: true,
            last_start: 0.0,
            time: 0.0,
            direction: Direction::Forward,
            state: PlayState::Idle,
            primed: false,
            dirty: false,
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Name used in logs
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Append a keyframe after the previous entry
    pub fn add(self, keyframe: Keyframe) -> Self {
        self.add_at(keyframe, Position::Sequence)
    }

    /// Place a keyframe relative to the previous entry
    pub fn add_at(mut self, keyframe: Keyframe, position: Position) -> Self {
        let start = self.resolve_position(position);
        let entry = Entry {
            keyframe,
            start,
            tracks: None,
            rendered: None,
        };
        self.last_start = start;
        self.entries.push(entry);
        self
    }

    /// Append a group of keyframes, each delayed `each` seconds after the one before
    pub fn stagger(self, keyframes: impl IntoIterator<Item = Keyframe>, each: f32) -> Self {
        self.stagger_at(keyframes, each, Position::Sequence)
    }

    /// Place a stagger group relative to the previous entry
    pub fn stagger_at(
        mut self,
        keyframes: impl IntoIterator<Item = Keyframe>,
        each: f32,
        position: Position,
    ) -> Self {
        let group_start = self.resolve_position(position);
        let each = each.max(0.0);
        for (i, keyframe) in keyframes.into_iter().enumerate() {
            self.entries.push(Entry {
                keyframe,
                start: group_start + each * i as f32,
                tracks: None,
                rendered: None,
            });
        }
        self.last_start = group_start;
        self
    }

    /// Stagger one keyframe across its targets, in declaration order
    pub fn stagger_targets(self, keyframe: Keyframe, each: f32) -> Self {
        let parts = keyframe.split_targets();
        self.stagger(parts, each)
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Drive progress from scroll instead of time
    pub fn scroll_bound(mut self) -> Self {
        self.kind = TimelineKind::ScrollBound;
        self.autoplay = false;
        self
    }

    /// Arm until the trigger element crosses into the viewport
    pub fn triggered_by(mut self, trigger: ViewportTrigger) -> Self {
        self.trigger = Some(TriggerState::new(trigger));
        self.autoplay = false;
        self
    }

    /// Do not start playing when scheduled
    pub fn paused(mut self) -> Self {
        self.autoplay = false;
        self
    }

    // Relative placements measure from the end of everything added so far
    fn resolve_position(&self, position: Position) -> f32 {
        let end = self.duration();
        let start = match position {
            Position::Sequence => end,
            Position::WithPrevious => self.last_start,
            Position::Overlap(seconds) => end - seconds,
            Position::Gap(seconds) => end + seconds,
            Position::At(offset) => offset,
        };
        start.max(0.0)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> TimelineKind {
        self.kind
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Offset of each entry's first frame, in insertion order
    pub fn entry_offsets(&self) -> Vec<f32> {
        self.entries.iter().map(Entry::begin).collect()
    }

    /// Total length in seconds
    pub fn duration(&self) -> f32 {
        self.entries.iter().map(Entry::end).fold(0.0, f32::max)
    }

    /// Current time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Playhead position, 0.0 to 1.0
    pub fn progress(&self) -> f32 {
        let duration = self.duration();
        if duration <= 0.0 {
            return if self.state == PlayState::Finished && self.direction == Direction::Forward {
                1.0
            } else {
                0.0
            };
        }
        (self.time / duration).clamp(0.0, 1.0)
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    // ========================================================================
    // Control
    // ========================================================================

    pub fn play(&mut self) {
        self.direction = Direction::Forward;
        self.state = PlayState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
    }

    /// Play backward from the current time
    pub fn reverse(&mut self) {
        self.direction = Direction::Reverse;
        self.state = PlayState::Playing;
    }

    /// Jump back to the start and play forward
    pub fn restart(&mut self) {
        self.time = 0.0;
        self.direction = Direction::Forward;
        self.state = PlayState::Playing;
        self.dirty = true;
    }

    /// Move the playhead to a fraction of the duration
    ///
    /// Used for scroll-bound timelines; rendering happens on the next tick.
    pub fn seek(&mut self, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let time = progress * self.duration();
        if time != self.time || !self.primed {
            self.time = time;
            self.dirty = true;
        }
    }

    // ========================================================================
    // Engine integration
    // ========================================================================

    pub(crate) fn on_scheduled(&mut self) {
        if self.autoplay {
            self.play();
        }
    }

    /// Check the viewport trigger and start or reverse playback on a crossing
    pub(crate) fn evaluate_trigger(&mut self, stage: &Stage, sample: &Sample) {
        let Some(trigger) = self.trigger.as_mut() else {
            return;
        };
        let policy = trigger.policy();
        match trigger.evaluate(stage, sample) {
            Some(TriggerEdge::Enter) => {
                debug!("Timeline '{}': trigger entered, playing", self.label);
                self.play();
            }
            Some(TriggerEdge::LeaveBack) if policy == TogglePolicy::PlayReverse => {
                debug!("Timeline '{}': trigger left, reversing", self.label);
                self.reverse();
            }
            _ => {}
        }
    }

    /// Advance the clock and render
    ///
    /// Returns the completion callback the first time the timeline finishes
    /// playing forward.
    pub(crate) fn advance(&mut self, dt: f32, stage: &mut Stage) -> Option<CompletionCallback> {
        if !self.primed {
            self.prime(stage);
        }

        let mut finished = false;
        if self.state == PlayState::Playing && self.kind == TimelineKind::Entrance {
            let duration = self.duration();
            match self.direction {
                Direction::Forward => {
                    self.time = (self.time + dt).min(duration);
                    if self.time >= duration {
                        self.state = PlayState::Finished;
                        finished = true;
                    }
                }
                Direction::Reverse => {
                    self.time = (self.time - dt).max(0.0);
                    if self.time <= 0.0 {
                        self.state = PlayState::Finished;
                    }
                }
            }
            self.dirty = true;
        }

        if self.dirty {
            self.render(stage);
            self.dirty = false;
        }

        if finished {
            trace!("Timeline '{}': finished", self.label);
            return self.on_complete.take();
        }
        None
    }

    /// Render start values of `From` keyframes so revealed content starts hidden
    fn prime(&mut self, stage: &mut Stage) {
        self.primed = true;
        for entry in &mut self.entries {
            if entry.keyframe.mode() == KeyframeMode::From {
                entry.tracks = Some(entry.keyframe.resolve(stage));
                entry.write(stage, 0.0);
            }
        }
    }

    fn render(&mut self, stage: &mut Stage) {
        let time = self.time;
        for entry in &mut self.entries {
            if entry.tracks.is_none() {
                // To keyframes capture their start values when first reached
                if time < entry.begin() {
                    continue;
                }
                entry.tracks = Some(entry.keyframe.resolve(stage));
            }
            let local = entry.local_progress(time);
            if entry.rendered != Some(local) {
                entry.write(stage, local);
            }
        }
    }

    /// Restore every property this timeline touched to its pre-timeline value
    pub(crate) fn reset(&mut self, stage: &mut Stage) {
        for entry in self.entries.iter_mut().rev() {
            if let Some(tracks) = entry.tracks.take() {
                for track in tracks.iter().rev() {
                    stage.write(track.element, track.property, track.initial);
                }
            }
            entry.rendered = None;
        }
        self.time = 0.0;
        self.state = PlayState::Idle;
    }
}
