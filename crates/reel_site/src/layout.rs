//! Page layout
//!
//! Sections stack top to bottom: hero, about, works, the works pin spacing,
//! feedback, contact. Fixed layers (background, intro overlay, cursor)
//! cover the viewport.

use reel_animation::IntroElements;
use reel_core::{ElementId, Rect, Stage, Viewport};

use crate::about::AboutElements;
use crate::contact::ContactElements;
use crate::cursor::CursorElements;
use crate::feedback::FeedbackElements;
use crate::nav::Anchor;
use crate::works::{WorksElements, WorksGallery};

/// Vertical extent of a section in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Every element the page owns
#[derive(Clone, Debug)]
pub struct PageElements {
    pub background: ElementId,
    pub hero: ElementId,
    pub orb: ElementId,
    pub about: AboutElements,
    pub works: WorksElements,
    pub feedback: FeedbackElements,
    pub contact: ContactElements,
    pub cursor: CursorElements,
    /// Absent when the preloader is disabled
    pub intro: Option<IntroElements>,
}

impl PageElements {
    pub fn insert(stage: &mut Stage, with_intro: bool) -> Self {
        let background = stage.insert("background", Rect::ZERO);
        let hero = stage.insert("hero", Rect::ZERO);
        let orb = stage.insert("hero.orb", Rect::ZERO);
        let about = AboutElements::insert(stage);
        let works = WorksElements::insert(stage);
        let feedback = FeedbackElements::insert(stage);
        let contact = ContactElements::insert(stage);
        let cursor = CursorElements {
            lens: stage.insert("cursor.lens", Rect::ZERO),
            dot: stage.insert("cursor.dot", Rect::ZERO),
        };
        let intro = with_intro.then(|| IntroElements {
            container: stage.insert("intro", Rect::ZERO),
            counter: stage.insert("intro.counter", Rect::ZERO),
            progress_bar: stage.insert("intro.bar", Rect::ZERO),
        });

        Self {
            background,
            hero,
            orb,
            about,
            works,
            feedback,
            contact,
            cursor,
            intro,
        }
    }

    /// Position every section for `viewport`
    ///
    /// `pin_spacing` is the extra scroll distance the pinned gallery
    /// reserves below the works section.
    pub fn arrange(
        &self,
        stage: &mut Stage,
        viewport: Viewport,
        gallery: &WorksGallery,
        pin_spacing: f32,
    ) -> PageLayout {
        let (vw, vh) = (viewport.width, viewport.height);
        let screen = Rect::new(0.0, 0.0, vw, vh);

        stage.set_bounds(self.background, screen);
        stage.set_bounds(self.cursor.lens, Rect::new(0.0, 0.0, 80.0, 80.0));
        stage.set_bounds(self.cursor.dot, Rect::new(0.0, 0.0, 8.0, 8.0));
        if let Some(intro) = &self.intro {
            stage.set_bounds(intro.container, screen);
            stage.set_bounds(intro.counter, Rect::new(vw * 0.05, vh * 0.75, vw * 0.3, vh * 0.2));
            stage.set_bounds(intro.progress_bar, Rect::new(0.0, vh - 4.0, vw, 4.0));
        }

        let hero = Span {
            top: 0.0,
            height: vh,
        };
        stage.set_bounds(self.hero, Rect::new(0.0, hero.top, vw, hero.height));
        let side = vw.min(vh) * 0.5;
        stage.set_bounds(
            self.orb,
            Rect::new((vw - side) / 2.0, (vh - side) / 2.0, side, side),
        );

        let about = Span {
            top: hero.bottom(),
            height: self.about.arrange(stage, hero.bottom(), &viewport),
        };
        let works = Span {
            top: about.bottom(),
            height: gallery.arrange(stage, about.bottom(), &viewport),
        };
        let feedback_top = works.bottom() + pin_spacing;
        let feedback = Span {
            top: feedback_top,
            height: self.feedback.arrange(stage, feedback_top, &viewport),
        };
        let contact = Span {
            top: feedback.bottom(),
            height: self.contact.arrange(stage, feedback.bottom(), &viewport),
        };

        PageLayout {
            viewport,
            hero,
            about,
            works,
            pin_spacing,
            feedback,
            contact,
        }
    }
}

/// Section positions from the last layout pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub viewport: Viewport,
    pub hero: Span,
    pub about: Span,
    pub works: Span,
    pub pin_spacing: f32,
    pub feedback: Span,
    pub contact: Span,
}

impl PageLayout {
    pub fn section(&self, anchor: Anchor) -> Span {
        match anchor {
            Anchor::Home => self.hero,
            Anchor::About => self.about,
            Anchor::Works => self.works,
            Anchor::Feedback => self.feedback,
            Anchor::Contact => self.contact,
        }
    }

    pub fn document_height(&self) -> f32 {
        self.contact.bottom()
    }

    pub fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport.height).max(0.0)
    }

    /// Scroll offset that brings `anchor` to the top of the viewport
    pub fn scroll_target(&self, anchor: Anchor) -> f32 {
        self.section(anchor).top.min(self.max_scroll())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use reel_core::Breakpoint;

    #[test]
    fn test_sections_stack_with_pin_spacing() {
        let mut stage = Stage::new();
        let elements = PageElements::insert(&mut stage, false);
        let gallery = WorksGallery::new(elements.works, Breakpoint::MEDIUM, &GalleryConfig::default());
        let viewport = Viewport::new(1200.0, 1000.0);

        let layout = elements.arrange(&mut stage, viewport, &gallery, 0.0);
        assert_eq!(layout.about, Span { top: 1000.0, height: 1200.0 });
        assert_eq!(layout.works.top, 2200.0);
        assert_eq!(layout.feedback.top, 3200.0);
        assert_eq!(layout.contact.top, 4700.0);
        assert_eq!(layout.max_scroll(), 4700.0);
        assert_eq!(stage.bounds(elements.about.section).map(|b| b.top()), Some(1000.0));

        let pinned = elements.arrange(&mut stage, viewport, &gallery, 3000.0);
        assert_eq!(pinned.feedback.top, 6200.0);
        assert_eq!(pinned.scroll_target(Anchor::Feedback), 6200.0);
        assert_eq!(pinned.scroll_target(Anchor::Works), 2200.0);
        assert_eq!(pinned.scroll_target(Anchor::Contact), pinned.max_scroll());
        assert_eq!(pinned.scroll_target(Anchor::Home), 0.0);

        // Short documents clamp targets to the end
        let short = PageLayout {
            contact: Span { top: 4700.0, height: 100.0 },
            ..layout
        };
        assert_eq!(short.scroll_target(Anchor::Contact), 3800.0);
    }

    #[test]
    fn test_intro_elements_are_optional() {
        let mut stage = Stage::new();
        let without = PageElements::insert(&mut stage, false);
        assert!(without.intro.is_none());
        let count = stage.len();

        let mut stage = Stage::new();
        let with = PageElements::insert(&mut stage, true);
        assert!(with.intro.is_some());
        assert_eq!(stage.len(), count + 3);
    }
}
