//! About section
//!
//! Two effects: the portrait drifts, grows, and tilts while the section
//! scrolls through the middle of the viewport (a scroll-bound timeline
//! scrubbed by a region), and the text paragraphs rise in one after another
//! when the text block enters the viewport, reversing when it leaves.

use reel_animation::{
    EndCondition, Easing, Keyframe, RegionHandle, ScopeHandle, ScrollRegion, StartCondition,
    Timeline, TimelineHandle, TogglePolicy, ViewportTrigger,
};
use reel_core::{ElementId, Property, Rect, Stage, Viewport};
use smallvec::SmallVec;
use tracing::debug;

use crate::config::RevealConfig;
use crate::error::Result;

/// Paragraphs in the about copy
pub const PARAGRAPH_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct AboutElements {
    pub section: ElementId,
    pub image: ElementId,
    pub text: ElementId,
    pub paragraphs: SmallVec<[ElementId; PARAGRAPH_COUNT]>,
}

impl AboutElements {
    pub fn insert(stage: &mut Stage) -> Self {
        Self {
            section: stage.insert("about", Rect::ZERO),
            image: stage.insert("about.image", Rect::ZERO),
            text: stage.insert("about.text", Rect::ZERO),
            paragraphs: (0..PARAGRAPH_COUNT)
                .map(|i| stage.insert(format!("about.p{}", i + 1), Rect::ZERO))
                .collect(),
        }
    }

    /// Lay the section out at `top`; returns its height
    pub fn arrange(&self, stage: &mut Stage, top: f32, viewport: &Viewport) -> f32 {
        let (vw, vh) = (viewport.width, viewport.height);
        let height = vh * 1.2;
        stage.set_bounds(self.section, Rect::new(0.0, top, vw, height));
        stage.set_bounds(
            self.image,
            Rect::new(vw * 0.55, top + vh * 0.15, vw * 0.35, vh * 0.8),
        );

        let text_top = top + vh * 0.2;
        stage.set_bounds(self.text, Rect::new(vw * 0.08, text_top, vw * 0.4, vh * 0.7));
        let line = vh * 0.2;
        for (i, &p) in self.paragraphs.iter().enumerate() {
            let y = text_top + i as f32 * (line + vh * 0.03);
            stage.set_bounds(p, Rect::new(vw * 0.08, y, vw * 0.4, line));
        }
        height
    }
}

/// Registered about-section animations
pub struct AboutSection {
    parallax: TimelineHandle,
    region: RegionHandle,
    reveal: TimelineHandle,
}

impl AboutSection {
    pub fn mount(scope: &ScopeHandle, elements: &AboutElements, config: &RevealConfig) -> Result<Self> {
        let parallax = scope.schedule(
            Timeline::new()
                .label("about.parallax")
                .add(
                    Keyframe::to(1.0)
                        .set(elements.image, Property::TranslateY, 100.0)
                        .set(elements.image, Property::Scale, 1.1)
                        .set(elements.image, Property::Rotate, 2.0)
                        .easing(Easing::QuadOut),
                )
                .scroll_bound(),
        )?;

        // "top center" to "bottom center"
        let region = scope.add_region(
            ScrollRegion::timeline(elements.section, parallax.clone())
                .label("about.parallax")
                .start(StartCondition::TriggerTopAt(0.5))
                .end(EndCondition::TriggerBottomAt(0.5))
                .scrub(config.parallax_scrub),
        )?;

        let fade_up = Keyframe::from(config.paragraph_duration)
            .set_all(
                elements.paragraphs.iter().copied(),
                &[(Property::Opacity, 0.0), (Property::TranslateY, 50.0)],
            )
            .easing(config.paragraph_easing);
        let reveal = scope.schedule(
            Timeline::new()
                .label("about.reveal")
                .stagger_targets(fade_up, config.paragraph_stagger)
                .triggered_by(
                    ViewportTrigger::new(elements.text)
                        .start_at(config.about_start)
                        .policy(TogglePolicy::PlayReverse),
                ),
        )?;

        debug!("AboutSection: mounted");
        Ok(Self {
            parallax,
            region,
            reveal,
        })
    }

    pub fn parallax(&self) -> &TimelineHandle {
        &self.parallax
    }

    pub fn parallax_region(&self) -> &RegionHandle {
        &self.region
    }

    pub fn reveal(&self) -> &TimelineHandle {
        &self.reveal
    }
}
