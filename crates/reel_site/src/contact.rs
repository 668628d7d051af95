//! Contact section

use reel_animation::{Keyframe, ScopeHandle, Timeline, TimelineHandle, ViewportTrigger};
use reel_core::{ElementId, Property, Rect, Stage, Viewport};

use crate::config::RevealConfig;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactElements {
    pub section: ElementId,
    pub title: ElementId,
}

impl ContactElements {
    pub fn insert(stage: &mut Stage) -> Self {
        Self {
            section: stage.insert("contact", Rect::ZERO),
            title: stage.insert("contact.title", Rect::ZERO),
        }
    }

    pub fn arrange(&self, stage: &mut Stage, top: f32, viewport: &Viewport) -> f32 {
        let (vw, vh) = (viewport.width, viewport.height);
        stage.set_bounds(self.section, Rect::new(0.0, top, vw, vh));
        stage.set_bounds(self.title, Rect::new(vw * 0.08, top + vh * 0.3, vw * 0.84, vh * 0.3));
        vh
    }
}

/// Title rises 100 px, unskews, and fades in once
pub fn mount_title_reveal(
    scope: &ScopeHandle,
    elements: &ContactElements,
    config: &RevealConfig,
) -> Result<TimelineHandle> {
    let handle = scope.schedule(
        Timeline::new()
            .label("contact.title")
            .add(
                Keyframe::from(config.contact_duration)
                    .set(elements.title, Property::TranslateY, 100.0)
                    .set(elements.title, Property::Opacity, 0.0)
                    .set(elements.title, Property::SkewY, 5.0)
                    .easing(config.contact_easing),
            )
            .triggered_by(ViewportTrigger::new(elements.title).start_at(config.contact_start)),
    )?;
    Ok(handle)
}
