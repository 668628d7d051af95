//! Scroll-linked regions
//!
//! A region maps the document scroll offset inside a window `[start, end]`
//! to a progress value and drives either a horizontal pan of a content
//! element or a scroll-bound timeline. Regions can pin their trigger element
//! so it stays fixed in the viewport while the window is traversed.
//!
//! Each region runs a small state machine:
//!
//! ```text
//!            measured            scroll >= start        scroll > end
//! Inactive ───────────▶ Armed ─────────────────▶ Pinned ───────────▶ Released
//!    ▲                    ◀─────────────────────         ◀───────────
//!    └──── gate closed / layout lost (from any state) ────────────────┘
//! ```
//!
//! While inactive a region writes nothing; entering the inactive state
//! clears whatever the region had written.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use reel_core::{Breakpoint, ElementId, Property, Stage, Viewport};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::damping::{Damped, DampingFactor};
use crate::engine::TimelineHandle;
use crate::error::{AnimationError, Result};
use crate::sampler::Sample;

new_key_type! {
    /// Handle to a registered scroll region
    pub struct RegionId;
}

// ============================================================================
// State machine
// ============================================================================

/// Lifecycle of a scroll region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollLinkState {
    /// Gate closed or layout unmeasurable; no effect
    #[default]
    Inactive,
    /// Scroll is before the window
    Armed,
    /// Scroll is inside the window
    Pinned,
    /// Scroll is past the window; output held at its terminal value
    Released,
}

/// Events driving region state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionEvent {
    GateClosed,
    LayoutLost,
    Measured,
    BeforeStart,
    WithinWindow,
    PastEnd,
}

impl ScrollLinkState {
    /// Next state for an event, or None if the event does not change state
    pub fn on_event(&self, event: RegionEvent) -> Option<Self> {
        use RegionEvent::*;
        use ScrollLinkState::*;

        match (self, event) {
            // Any active state drops out when the gate closes or layout is lost
            (Armed | Pinned | Released, GateClosed | LayoutLost) => Some(Inactive),

            (Inactive, Measured) => Some(Armed),

            (Armed, WithinWindow) => Some(Pinned),
            (Armed, PastEnd) => Some(Released),

            (Pinned, BeforeStart) => Some(Armed),
            (Pinned, PastEnd) => Some(Released),

            (Released, WithinWindow) => Some(Pinned),
            (Released, BeforeStart) => Some(Armed),

            _ => None,
        }
    }

    /// Returns true if the region has any effect
    pub fn is_active(&self) -> bool {
        !matches!(self, ScrollLinkState::Inactive)
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, ScrollLinkState::Pinned)
    }
}

// ============================================================================
// Region configuration
// ============================================================================

/// Where the window starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartCondition {
    /// When the trigger's top reaches this fraction of the viewport height
    /// (0.0 = "top top", 0.5 = "top center")
    TriggerTopAt(f32),
}

impl Default for StartCondition {
    fn default() -> Self {
        StartCondition::TriggerTopAt(0.0)
    }
}

/// Where the window ends
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EndCondition {
    /// When the trigger's bottom reaches this fraction of the viewport height
    TriggerBottomAt(f32),
    /// A fixed scroll distance after the start
    Distance(f32),
    /// The content element's scroll width after the start
    #[default]
    ContentWidth,
}

/// What a region drives with its progress
#[derive(Clone)]
pub enum ScrubBinding {
    /// Translate `content` left by `progress * (contentWidth - viewportWidth)`
    HorizontalPan { content: ElementId },
    /// Set the progress of a scroll-bound timeline
    Timeline(TimelineHandle),
}

impl std::fmt::Debug for ScrubBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrubBinding::HorizontalPan { content } => f
                .debug_struct("HorizontalPan")
                .field("content", content)
                .finish(),
            ScrubBinding::Timeline(handle) => f.debug_tuple("Timeline").field(&handle.id()).finish(),
        }
    }
}

/// A scroll-linked region
#[derive(Clone, Debug)]
pub struct ScrollRegion {
    label: String,
    trigger: ElementId,
    start: StartCondition,
    end: EndCondition,
    pin: bool,
    scrub: DampingFactor,
    binding: ScrubBinding,
    gate: Option<Breakpoint>,
}

impl ScrollRegion {
    /// Pan `content` horizontally while scrolling past `trigger`
    pub fn horizontal_pan(trigger: ElementId, content: ElementId) -> Self {
        Self::new(trigger, ScrubBinding::HorizontalPan { content })
    }

    /// Drive a scroll-bound timeline while scrolling past `trigger`
    pub fn timeline(trigger: ElementId, timeline: TimelineHandle) -> Self {
        Self::new(trigger, ScrubBinding::Timeline(timeline))
    }

    fn new(trigger: ElementId, binding: ScrubBinding) -> Self {
        Self {
            label: String::from("region"),
            trigger,
            start: StartCondition::default(),
            end: EndCondition::default(),
            pin: false,
            scrub: DampingFactor::SNAP,
            binding,
            gate: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn start(mut self, start: StartCondition) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: EndCondition) -> Self {
        self.end = end;
        self
    }

    /// Keep the trigger fixed in the viewport while inside the window
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    /// Damping applied to displayed progress (1.0 = locked to scroll)
    pub fn scrub(mut self, factor: impl Into<DampingFactor>) -> Self {
        self.scrub = factor.into();
        self
    }

    /// Only active while the viewport matches the breakpoint
    pub fn gate(mut self, breakpoint: Breakpoint) -> Self {
        self.gate = Some(breakpoint);
        self
    }

    pub fn name(&self) -> &str {
        &self.label
    }

    fn measure(&self, stage: &Stage, viewport: &Viewport) -> Option<Measurement> {
        if viewport.size().is_empty() {
            return None;
        }
        let bounds = stage.bounds(self.trigger)?;
        if bounds.size.is_empty() {
            return None;
        }
        let content_width = match self.binding {
            ScrubBinding::HorizontalPan { content } => {
                let width = stage.scroll_width(content)?;
                if width <= 0.0 {
                    return None;
                }
                width
            }
            ScrubBinding::Timeline(_) => 0.0,
        };
        Some(Measurement {
            trigger_top: bounds.top(),
            trigger_bottom: bounds.bottom(),
            content_width,
            viewport: *viewport,
        })
    }

    fn window(&self, m: &Measurement) -> (f32, f32) {
        let vh = m.viewport.height;
        let start = match self.start {
            StartCondition::TriggerTopAt(fraction) => m.trigger_top - fraction * vh,
        };
        let end = match self.end {
            EndCondition::TriggerBottomAt(fraction) => m.trigger_bottom - fraction * vh,
            EndCondition::Distance(px) => start + px,
            EndCondition::ContentWidth => start + m.content_width,
        };
        (start, end.max(start))
    }
}

/// Layout inputs a region's window is derived from
#[derive(Debug, Clone, Copy, PartialEq)]
struct Measurement {
    trigger_top: f32,
    trigger_bottom: f32,
    content_width: f32,
    viewport: Viewport,
}

/// Map a scroll offset into a window; an empty window is a step at `start`
fn window_progress(scroll: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if scroll >= start { 1.0 } else { 0.0 };
    }
    ((scroll - start) / (end - start)).clamp(0.0, 1.0)
}

// ============================================================================
// Runtime
// ============================================================================

struct RegionRuntime {
    region: ScrollRegion,
    state: ScrollLinkState,
    measured: Option<Measurement>,
    window: (f32, f32),
    progress: Damped<f32>,
    /// Last (pin offset, output) written, if anything is currently applied
    written: Option<(f32, f32)>,
}

impl RegionRuntime {
    fn new(region: ScrollRegion) -> Self {
        let scrub = region.scrub;
        Self {
            region,
            state: ScrollLinkState::Inactive,
            measured: None,
            window: (0.0, 0.0),
            progress: Damped::new(0.0, scrub),
            written: None,
        }
    }

    fn transition(&mut self, event: RegionEvent) {
        if let Some(next) = self.state.on_event(event) {
            debug!(
                "ScrollRegion '{}': {:?} -> {:?} ({:?})",
                self.region.label, self.state, next, event
            );
            self.state = next;
        }
    }

    fn update(&mut self, sample: &Sample, stage: &mut Stage) {
        let viewport = sample.viewport;
        if let Some(gate) = self.region.gate {
            if !gate.matches(&viewport) {
                self.deactivate(stage, RegionEvent::GateClosed);
                return;
            }
        }

        let Some(measurement) = self.region.measure(stage, &viewport) else {
            self.deactivate(stage, RegionEvent::LayoutLost);
            return;
        };
        if self.measured != Some(measurement) {
            let window = self.region.window(&measurement);
            trace!(
                "ScrollRegion '{}': window {:?} -> {:?}",
                self.region.label,
                self.window,
                window
            );
            self.window = window;
            self.measured = Some(measurement);
        }
        self.transition(RegionEvent::Measured);

        let (start, end) = self.window;
        let scroll = sample.scroll_offset;
        let position = if scroll < start {
            RegionEvent::BeforeStart
        } else if scroll <= end {
            RegionEvent::WithinWindow
        } else {
            RegionEvent::PastEnd
        };
        self.transition(position);

        let raw = window_progress(scroll, start, end);
        let shown = if self.state.is_pinned() {
            self.progress.step_to(raw)
        } else {
            self.progress.snap_to(raw);
            raw
        };

        let pin_offset = match self.state {
            ScrollLinkState::Pinned => scroll - start,
            ScrollLinkState::Released => end - start,
            _ => 0.0,
        };
        self.apply(stage, pin_offset, shown, &measurement);
    }

    fn apply(&mut self, stage: &mut Stage, pin_offset: f32, progress: f32, m: &Measurement) {
        let output = match self.region.binding {
            ScrubBinding::HorizontalPan { .. } => {
                let travel = (m.content_width - m.viewport.width).max(0.0);
                -progress * travel
            }
            ScrubBinding::Timeline(_) => progress,
        };
        if self.written == Some((pin_offset, output)) {
            return;
        }

        if self.region.pin {
            stage.write(self.region.trigger, Property::PinOffset, pin_offset);
        }
        match &self.region.binding {
            ScrubBinding::HorizontalPan { content } => {
                stage.write(*content, Property::TranslateX, output);
            }
            ScrubBinding::Timeline(handle) => handle.set_progress(output),
        }
        self.written = Some((pin_offset, output));
    }

    fn deactivate(&mut self, stage: &mut Stage, event: RegionEvent) {
        self.transition(event);
        self.clear_output(stage);
        self.measured = None;
        self.progress.snap_to(0.0);
    }

    /// Remove everything this region has written
    fn clear_output(&mut self, stage: &mut Stage) {
        if self.written.take().is_none() {
            return;
        }
        if self.region.pin {
            stage.clear(self.region.trigger, Property::PinOffset);
        }
        match &self.region.binding {
            ScrubBinding::HorizontalPan { content } => {
                stage.clear(*content, Property::TranslateX);
            }
            ScrubBinding::Timeline(handle) => handle.set_progress(0.0),
        }
    }

    fn scroll_distance(&self) -> Option<f32> {
        if !self.state.is_active() {
            return None;
        }
        let (start, end) = self.window;
        Some(end - start)
    }
}

// ============================================================================
// Controller
// ============================================================================

struct ControllerInner {
    regions: SlotMap<RegionId, RegionRuntime>,
}

/// Updates every registered scroll region once per frame
pub struct ScrollLinkController {
    inner: Rc<RefCell<ControllerInner>>,
}

impl ScrollLinkController {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ControllerInner {
                regions: SlotMap::with_key(),
            })),
        }
    }

    /// Get a weak handle to this controller
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a region; it takes effect on the next update
    pub fn add_region(&self, region: ScrollRegion) -> RegionHandle {
        let id = insert_region(&self.inner, region);
        RegionHandle {
            id,
            controller: self.handle(),
        }
    }

    /// Re-evaluate every region against the frame sample
    pub fn update(&self, sample: &Sample, stage: &mut Stage) {
        let mut inner = self.inner.borrow_mut();
        for (_, region) in inner.regions.iter_mut() {
            region.update(sample, stage);
        }
    }

    pub fn region_count(&self) -> usize {
        self.inner.borrow().regions.len()
    }

    /// Total pin spacing of all active pinned regions
    pub fn total_pin_spacing(&self) -> f32 {
        self.inner
            .borrow()
            .regions
            .values()
            .filter(|r| r.region.pin)
            .filter_map(RegionRuntime::scroll_distance)
            .sum()
    }
}

impl Default for ScrollLinkController {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_region(inner: &RefCell<ControllerInner>, region: ScrollRegion) -> RegionId {
    debug!(
        "ScrollLinkController: added region '{}' ({:?})",
        region.label, region.binding
    );
    inner.borrow_mut().regions.insert(RegionRuntime::new(region))
}

/// A weak handle to the scroll-link controller
#[derive(Clone)]
pub struct ControllerHandle {
    inner: Weak<RefCell<ControllerInner>>,
}

impl ControllerHandle {
    pub fn add_region(&self, region: ScrollRegion) -> Result<RegionHandle> {
        let inner = self.inner.upgrade().ok_or(AnimationError::EngineDropped)?;
        let id = insert_region(&inner, region);
        Ok(RegionHandle {
            id,
            controller: self.clone(),
        })
    }

    fn with_region<F, R>(&self, id: RegionId, f: F) -> Option<R>
    where
        F: FnOnce(&mut RegionRuntime) -> R,
    {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow_mut().regions.get_mut(id).map(f))
    }

    fn remove_region(&self, id: RegionId) -> Option<RegionRuntime> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.borrow_mut().regions.remove(id))
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Control surface for one registered region
#[derive(Clone)]
pub struct RegionHandle {
    id: RegionId,
    controller: ControllerHandle,
}

impl RegionHandle {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn state(&self) -> Option<ScrollLinkState> {
        self.controller.with_region(self.id, |r| r.state)
    }

    /// Displayed (scrubbed) progress
    pub fn progress(&self) -> Option<f32> {
        self.controller.with_region(self.id, |r| r.progress.current())
    }

    /// Scroll window `(start, end)` while the region is active
    pub fn window(&self) -> Option<(f32, f32)> {
        self.controller
            .with_region(self.id, |r| r.state.is_active().then_some(r.window))
            .flatten()
    }

    /// Scroll distance the region spans while active
    pub fn scroll_distance(&self) -> Option<f32> {
        self.controller
            .with_region(self.id, |r| r.scroll_distance())
            .flatten()
    }

    pub fn is_registered(&self) -> bool {
        self.controller.with_region(self.id, |_| ()).is_some()
    }

    /// Stop updating; written values stay as they are
    pub fn remove(&self) -> bool {
        self.controller.remove_region(self.id).is_some()
    }

    /// Clear the region's pin and transform, then stop updating
    pub fn revert(&self, stage: &mut Stage) -> bool {
        match self.controller.remove_region(self.id) {
            Some(mut runtime) => {
                runtime.clear_output(stage);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::engine::TimelineEngine;
    use crate::keyframe::Keyframe;
    use crate::timeline::Timeline;
    use reel_core::Rect;

    struct Gallery {
        stage: Stage,
        section: ElementId,
        track: ElementId,
        controller: ScrollLinkController,
        region: RegionHandle,
    }

    fn gallery(content_width: f32, scrub: f32) -> Gallery {
        let mut stage = Stage::new();
        let section = stage.insert("works", Rect::new(0.0, 1000.0, 1000.0, 800.0));
        let track = stage.insert("works.track", Rect::new(0.0, 1000.0, 1000.0, 800.0));
        stage.set_scroll_width(track, content_width);
        let controller = ScrollLinkController::new();
        let region = controller.add_region(
            ScrollRegion::horizontal_pan(section, track)
                .pinned()
                .scrub(scrub)
                .gate(Breakpoint::MEDIUM),
        );
        Gallery {
            stage,
            section,
            track,
            controller,
            region,
        }
    }

    fn at(scroll: f32, width: f32) -> Sample {
        Sample::at(0.0, scroll, Viewport::new(width, 800.0))
    }

    impl Gallery {
        fn scroll(&mut self, scroll: f32) -> f32 {
            self.controller.update(&at(scroll, 1000.0), &mut self.stage);
            self.x()
        }

        fn x(&self) -> f32 {
            self.stage.value(self.track, Property::TranslateX).unwrap_or(f32::NAN)
        }

        fn pin(&self) -> f32 {
            self.stage.value(self.section, Property::PinOffset).unwrap_or(f32::NAN)
        }
    }

    #[test]
    fn test_state_transitions() {
        use RegionEvent::*;
        use ScrollLinkState::*;
        assert_eq!(Inactive.on_event(Measured), Some(Armed));
        assert_eq!(Inactive.on_event(WithinWindow), None);
        assert_eq!(Armed.on_event(WithinWindow), Some(Pinned));
        assert_eq!(Pinned.on_event(PastEnd), Some(Released));
        assert_eq!(Released.on_event(BeforeStart), Some(Armed));
        assert_eq!(Pinned.on_event(GateClosed), Some(Inactive));
        assert_eq!(Inactive.on_event(GateClosed), None);
    }

    #[test]
    fn test_pan_maps_full_travel() {
        let mut g = gallery(5000.0, 1.0);

        assert_eq!(g.scroll(0.0), 0.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Armed));
        assert_eq!(g.region.window(), Some((1000.0, 6000.0)));

        assert_eq!(g.scroll(1000.0), 0.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Pinned));
        assert_eq!(g.scroll(3500.0), -2000.0);
        assert_eq!(g.pin(), 2500.0);
        assert_eq!(g.scroll(6000.0), -4000.0);

        assert_eq!(g.scroll(9000.0), -4000.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Released));
        assert_eq!(g.pin(), 5000.0);
        assert_eq!(g.region.scroll_distance(), Some(5000.0));
    }

    #[test]
    fn test_gate_toggle_clears_and_rearms() {
        let mut g = gallery(5000.0, 1.0);
        g.scroll(0.0);
        g.scroll(3500.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Pinned));

        g.controller.update(&at(3500.0, 700.0), &mut g.stage);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Inactive));
        assert_eq!(g.x(), 0.0);
        assert_eq!(g.pin(), 0.0);
        let transform_set = g.stage.get(g.track).map(|e| e.style.is_set(Property::TranslateX));
        assert_eq!(transform_set, Some(false));
        assert_eq!(g.region.scroll_distance(), None);

        // Staying below the breakpoint writes nothing
        g.stage.drain_writes();
        g.controller.update(&at(4000.0, 700.0), &mut g.stage);
        assert!(g.stage.drain_writes().is_empty());

        assert_eq!(g.scroll(3500.0), -2000.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Pinned));
    }

    #[test]
    fn test_zero_size_content_stays_inactive_then_recovers() {
        let mut g = gallery(0.0, 1.0);
        g.scroll(3500.0);
        assert_eq!(g.region.state(), Some(ScrollLinkState::Inactive));
        assert_eq!(g.stage.write_count(), 0);

        g.stage.set_scroll_width(g.track, 5000.0);
        assert_eq!(g.scroll(3500.0), -2000.0);
    }

    #[test]
    fn test_content_resize_while_pinned_does_not_jump() {
        let mut g = gallery(5000.0, 1.0);
        g.scroll(0.0);
        let before = g.scroll(3500.0);
        g.stage.set_scroll_width(g.track, 5200.0);
        let after = g.scroll(3500.0);
        assert!((after - before).abs() <= 200.0);
        assert_eq!(g.region.window(), Some((1000.0, 6200.0)));
    }

    #[test]
    fn test_empty_window_is_a_step() {
        let mut stage = Stage::new();
        let section = stage.insert("s", Rect::new(0.0, 500.0, 1000.0, 400.0));
        let track = stage.insert("t", Rect::new(0.0, 500.0, 1000.0, 400.0));
        stage.set_scroll_width(track, 3000.0);
        let controller = ScrollLinkController::new();
        let region = controller
            .add_region(ScrollRegion::horizontal_pan(section, track).end(EndCondition::Distance(0.0)));

        controller.update(&at(499.0, 1000.0), &mut stage);
        assert_eq!(region.progress(), Some(0.0));
        controller.update(&at(500.0, 1000.0), &mut stage);
        assert_eq!(region.progress(), Some(1.0));
        assert_eq!(stage.value(track, Property::TranslateX), Some(-2000.0));
    }

    #[test]
    fn test_scrub_lags_behind_scroll() {
        let mut g = gallery(5000.0, 0.1);
        g.scroll(0.0);
        let first = g.scroll(3500.0);
        assert!(first > -2000.0 && first < 0.0);

        let mut x = first;
        for _ in 0..500 {
            x = g.scroll(3500.0);
        }
        assert_eq!(x, -2000.0);
    }

    #[test]
    fn test_drives_scroll_bound_timeline() {
        let mut stage = Stage::new();
        let image = stage.insert("about.image", Rect::new(0.0, 1000.0, 500.0, 600.0));
        let engine = TimelineEngine::new();
        let timeline = engine.schedule(
            Timeline::new()
                .add(
                    Keyframe::to(1.0)
                        .set(image, Property::TranslateY, 100.0)
                        .easing(Easing::Linear),
                )
                .scroll_bound(),
        );
        let controller = ScrollLinkController::new();
        let region = controller.add_region(
            ScrollRegion::timeline(image, timeline.clone())
                .start(StartCondition::TriggerTopAt(0.5))
                .end(EndCondition::TriggerBottomAt(0.5)),
        );

        let sample = at(900.0, 1000.0);
        controller.update(&sample, &mut stage);
        engine.tick(&sample, &mut stage);
        assert_eq!(region.window(), Some((600.0, 1200.0)));
        assert_eq!(timeline.progress(), Some(0.5));
        assert_eq!(stage.value(image, Property::TranslateY), Some(50.0));
    }

    #[test]
    fn test_remove_leaves_stage_and_revert_clears() {
        let mut g = gallery(5000.0, 1.0);
        g.scroll(0.0);
        g.scroll(3500.0);
        let writes = g.stage.write_count();

        assert!(g.region.remove());
        g.scroll(4000.0);
        assert_eq!(g.stage.write_count(), writes);
        assert_eq!(g.x(), -2000.0);
        assert!(!g.region.remove());

        let region = g.controller.add_region(ScrollRegion::horizontal_pan(g.section, g.track).pinned());
        g.scroll(3500.0);
        assert!(region.revert(&mut g.stage));
        assert_eq!(g.x(), 0.0);
        assert_eq!(g.pin(), 0.0);
        assert_eq!(g.controller.region_count(), 0);
    }
}
