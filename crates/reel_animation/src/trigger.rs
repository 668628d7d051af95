//! Viewport triggers
//!
//! A trigger watches one element and reports when its top edge crosses a
//! horizontal line at a fraction of the viewport height ("top 85%"). The
//! toggle policy decides what a timeline does when the element crosses back.

use reel_core::{ElementId, Stage, Viewport};

use crate::sampler::Sample;

/// Default trigger line, as a fraction of viewport height from the top
pub const DEFAULT_START_FRACTION: f32 = 0.85;

/// What happens on crossing back above the trigger line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TogglePolicy {
    /// Play forward once; later crossings are ignored
    #[default]
    PlayOnce,
    /// Play forward on enter, reverse on leave-back
    PlayReverse,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTrigger {
    pub element: ElementId,
    pub start_fraction: f32,
    pub policy: TogglePolicy,
}

impl ViewportTrigger {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            start_fraction: DEFAULT_START_FRACTION,
            policy: TogglePolicy::PlayOnce,
        }
    }

    /// Trigger line as a fraction of viewport height, clamped to [0, 1]
    pub fn start_at(mut self, fraction: f32) -> Self {
        self.start_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            DEFAULT_START_FRACTION
        };
        self
    }

    pub fn policy(mut self, policy: TogglePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the element's top is at or above the trigger line
    ///
    /// `None` when the element is not on the stage.
    pub fn has_entered(&self, stage: &Stage, scroll_offset: f32, viewport: &Viewport) -> Option<bool> {
        let bounds = stage.bounds(self.element)?;
        let top_in_viewport = bounds.top() - scroll_offset;
        Some(top_in_viewport <= viewport.height * self.start_fraction)
    }
}

/// A crossing of the trigger line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TriggerEdge {
    Enter,
    LeaveBack,
}

#[derive(Debug)]
pub(crate) struct TriggerState {
    trigger: ViewportTrigger,
    inside: bool,
    spent: bool,
}

impl TriggerState {
    pub fn new(trigger: ViewportTrigger) -> Self {
        Self {
            trigger,
            inside: false,
            spent: false,
        }
    }

    pub fn policy(&self) -> TogglePolicy {
        self.trigger.policy
    }

    pub fn evaluate(&mut self, stage: &Stage, sample: &Sample) -> Option<TriggerEdge> {
        if self.spent {
            return None;
        }
        let entered = self
            .trigger
            .has_entered(stage, sample.scroll_offset, &sample.viewport)?;

        match (self.inside, entered) {
            (false, true) => {
                self.inside = true;
                if self.trigger.policy == TogglePolicy::PlayOnce {
                    self.spent = true;
                }
                Some(TriggerEdge::Enter)
            }
            (true, false) => {
                self.inside = false;
                Some(TriggerEdge::LeaveBack)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::Rect;

    fn setup(top: f32) -> (Stage, ElementId) {
        let mut stage = Stage::new();
        let id = stage.insert("title", Rect::new(0.0, top, 600.0, 80.0));
        (stage, id)
    }

    #[test]
    fn test_crossing_line() {
        let (stage, id) = setup(2000.0);
        let trigger = ViewportTrigger::new(id).start_at(0.9);
        let viewport = Viewport::new(1200.0, 1000.0);
        assert_eq!(trigger.has_entered(&stage, 1000.0, &viewport), Some(false));
        assert_eq!(trigger.has_entered(&stage, 1100.0, &viewport), Some(true));
    }

    #[test]
    fn test_play_once_fires_a_single_enter() {
        let (stage, id) = setup(2000.0);
        let mut state = TriggerState::new(ViewportTrigger::new(id));
        let viewport = Viewport::new(1200.0, 1000.0);
        let at = |scroll| Sample::at(0.0, scroll, viewport);

        assert_eq!(state.evaluate(&stage, &at(0.0)), None);
        assert_eq!(state.evaluate(&stage, &at(1500.0)), Some(TriggerEdge::Enter));
        assert_eq!(state.evaluate(&stage, &at(0.0)), None);
        assert_eq!(state.evaluate(&stage, &at(1500.0)), None);
    }

    #[test]
    fn test_play_reverse_toggles() {
        let (stage, id) = setup(2000.0);
        let mut state =
            TriggerState::new(ViewportTrigger::new(id).policy(TogglePolicy::PlayReverse));
        let viewport = Viewport::new(1200.0, 1000.0);
        let at = |scroll| Sample::at(0.0, scroll, viewport);

        assert_eq!(state.evaluate(&stage, &at(1500.0)), Some(TriggerEdge::Enter));
        assert_eq!(state.evaluate(&stage, &at(1600.0)), None);
        assert_eq!(state.evaluate(&stage, &at(0.0)), Some(TriggerEdge::LeaveBack));
        assert_eq!(state.evaluate(&stage, &at(1500.0)), Some(TriggerEdge::Enter));
    }

    #[test]
    fn test_missing_element_never_fires() {
        let (mut stage, id) = setup(0.0);
        stage.remove(id);
        let mut state = TriggerState::new(ViewportTrigger::new(id));
        let sample = Sample::at(0.0, 0.0, Viewport::default());
        assert_eq!(state.evaluate(&stage, &sample), None);
    }
}
