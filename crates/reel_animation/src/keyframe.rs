//! Keyframes
//!
//! A keyframe is one timed transition of a set of element properties. It is
//! immutable once added to a timeline. Start values are captured from the
//! stage when the keyframe first renders, so consecutive keyframes on the
//! same property chain naturally.

use indexmap::IndexMap;
use reel_core::{ElementId, Property, Stage};
use smallvec::SmallVec;

use crate::easing::Easing;

/// Property/value pairs for one element
pub type PropertyValues = SmallVec<[(Property, f32); 4]>;

/// How keyframe values relate to the element's current style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyframeMode {
    /// Animate from the current value to the keyframe value
    #[default]
    To,
    /// Animate from the keyframe value to the current value
    ///
    /// The start values are rendered as soon as the timeline is primed, so
    /// content revealed this way stays hidden until it plays.
    From,
}

/// A timed transition of element properties
#[derive(Clone, Debug)]
pub struct Keyframe {
    targets: IndexMap<ElementId, PropertyValues>,
    duration: f32,
    easing: Easing,
    delay: f32,
    mode: KeyframeMode,
}

impl Keyframe {
    /// Animate to the given values over `duration` seconds
    pub fn to(duration: f32) -> Self {
        Self::with_mode(KeyframeMode::To, duration)
    }

    /// Animate from the given values over `duration` seconds
    pub fn from(duration: f32) -> Self {
        Self::with_mode(KeyframeMode::From, duration)
    }

    fn with_mode(mode: KeyframeMode, duration: f32) -> Self {
        Self {
            targets: IndexMap::new(),
            duration: duration.max(0.0),
            easing: Easing::CubicOut,
            delay: 0.0,
            mode,
        }
    }

    /// Add a property value for an element (builder pattern)
    ///
    /// Setting the same property twice keeps the last value.
    pub fn set(mut self, element: ElementId, property: Property, value: f32) -> Self {
        let values = self.targets.entry(element).or_default();
        if let Some(slot) = values.iter_mut().find(|(p, _)| *p == property) {
            slot.1 = value;
        } else {
            values.push((property, value));
        }
        self
    }

    /// Apply the same property values to several elements, in order
    pub fn set_all(
        mut self,
        elements: impl IntoIterator<Item = ElementId>,
        values: &[(Property, f32)],
    ) -> Self {
        for element in elements {
            for &(property, value) in values {
                self = self.set(element, property, value);
            }
        }
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Delay relative to the keyframe's position in its timeline (seconds)
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay_offset(&self) -> f32 {
        self.delay
    }

    pub fn mode(&self) -> KeyframeMode {
        self.mode
    }

    pub fn easing_curve(&self) -> Easing {
        self.easing
    }

    /// Elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.targets.keys().copied()
    }

    pub fn values_for(&self, element: ElementId) -> Option<&[(Property, f32)]> {
        self.targets.get(&element).map(|v| v.as_slice())
    }

    /// Split into one keyframe per element, preserving declaration order
    ///
    /// Used for stagger groups.
    pub fn split_targets(&self) -> Vec<Keyframe> {
        self.targets
            .iter()
            .map(|(&element, values)| {
                let mut targets = IndexMap::with_capacity(1);
                targets.insert(element, values.clone());
                Keyframe {
                    targets,
                    duration: self.duration,
                    easing: self.easing,
                    delay: self.delay,
                    mode: self.mode,
                }
            })
            .collect()
    }

    /// Capture start/end values from the stage
    ///
    /// Elements that no longer exist produce no tracks.
    pub(crate) fn resolve(&self, stage: &Stage) -> SmallVec<[Track; 4]> {
        let mut tracks = SmallVec::new();
        for (&element, values) in &self.targets {
            for &(property, value) in values {
                let Some(current) = stage.value(element, property) else {
                    continue;
                };
                let (from, to) = match self.mode {
                    KeyframeMode::To => (current, value),
                    KeyframeMode::From => (value, current),
                };
                tracks.push(Track {
                    element,
                    property,
                    from,
                    to,
                    initial: current,
                });
            }
        }
        tracks
    }
}

/// A resolved property transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Track {
    pub element: ElementId,
    pub property: Property,
    pub from: f32,
    pub to: f32,
    /// Style value before the keyframe touched it
    pub initial: f32,
}

impl Track {
    pub fn value_at(&self, eased: f32) -> f32 {
        self.from + (self.to - self.from) * eased
    }
}
