//! Works gallery
//!
//! One full-viewport panel per work item, laid side by side on a track.
//! On wide viewports the section pins while vertical scroll pans the track
//! left by its overflow; below the breakpoint the panels stack vertically
//! and scroll natively.
//!
//! The gallery is rebuilt whenever a new item list arrives. Each build
//! lives in its own child scope; the previous build's region is reverted
//! and its panels removed before the next one is laid out.

use reel_animation::{
    AnimationScope, EndCondition, RegionHandle, ScopeHandle, ScrollLinkState, ScrollRegion,
    StartCondition,
};
use reel_core::{Breakpoint, ElementId, Rect, Stage, Viewport};
use tracing::debug;

use crate::config::GalleryConfig;
use crate::error::Result;
use crate::providers::WorkItem;

/// Description shown for items that have none
pub const DEFAULT_DESCRIPTION: &str =
    "Página moderna desenvolvida para apresentar o trabalho e atrair potenciais clientes.";

/// Shown while the item list has not arrived
pub const LOADING_TEXT: &str = "Carregando Repositórios...";

/// Panel height as a fraction of the viewport when stacked
const STACKED_PANEL_HEIGHT: f32 = 0.8;

/// Display-ready content of one gallery panel
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPanel {
    pub element: ElementId,
    /// `"01"`, `"02"`, ...
    pub index_label: String,
    pub title: String,
    pub year: u16,
    pub description: String,
    pub url: String,
    pub homepage_url: Option<String>,
    pub star_count: u32,
    pub fork_count: u32,
}

impl WorkPanel {
    fn new(element: ElementId, index: usize, item: &WorkItem) -> Self {
        Self {
            element,
            index_label: format!("{:02}", index + 1),
            title: panel_title(&item.title),
            year: item.year,
            description: item
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            url: item.url.clone(),
            homepage_url: item.homepage_url.clone().filter(|u| !u.trim().is_empty()),
            star_count: item.star_count,
            fork_count: item.fork_count,
        }
    }
}

/// Repository-style slugs read better with spaces
pub fn panel_title(raw: &str) -> String {
    raw.replace('-', " ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorksElements {
    /// Pinned while the track pans
    pub section: ElementId,
    /// Holds the panels; its scroll width is the sum of panel widths
    pub track: ElementId,
}

impl WorksElements {
    pub fn insert(stage: &mut Stage) -> Self {
        Self {
            section: stage.insert("works", Rect::ZERO),
            track: stage.insert("works.track", Rect::ZERO),
        }
    }
}

/// The horizontal works gallery
pub struct WorksGallery {
    elements: WorksElements,
    breakpoint: Breakpoint,
    scrub: f32,
    max_items: usize,
    panels: Vec<WorkPanel>,
    build: Option<(AnimationScope, RegionHandle)>,
    loaded: bool,
}

impl WorksGallery {
    pub fn new(elements: WorksElements, breakpoint: Breakpoint, config: &GalleryConfig) -> Self {
        Self {
            elements,
            breakpoint,
            scrub: config.scrub,
            max_items: config.max_items,
            panels: Vec::new(),
            build: None,
            loaded: false,
        }
    }

    pub fn elements(&self) -> WorksElements {
        self.elements
    }

    /// Replace the panels and re-register the scroll region
    ///
    /// Returns the height of the re-laid-out section.
    pub fn rebuild(
        &mut self,
        parent: &ScopeHandle,
        items: &[WorkItem],
        stage: &mut Stage,
        top: f32,
        viewport: &Viewport,
    ) -> Result<f32> {
        self.teardown(stage);

        self.panels = items
            .iter()
            .take(self.max_items)
            .enumerate()
            .map(|(i, item)| {
                let element = stage.insert(format!("works.panel.{:02}", i + 1), Rect::ZERO);
                WorkPanel::new(element, i, item)
            })
            .collect();
        self.loaded = true;
        let height = self.arrange(stage, top, viewport);

        let scope = parent.child("works.gallery")?;
        let region = scope.add_region(
            ScrollRegion::horizontal_pan(self.elements.section, self.elements.track)
                .label("works.gallery")
                .start(StartCondition::TriggerTopAt(0.0))
                .end(EndCondition::ContentWidth)
                .pinned()
                .scrub(self.scrub)
                .gate(self.breakpoint),
        )?;
        self.build = Some((scope, region));

        debug!("WorksGallery: built {} panels", self.panels.len());
        Ok(height)
    }

    /// Lay out the section and its panels at `top`; returns the section height
    pub fn arrange(&self, stage: &mut Stage, top: f32, viewport: &Viewport) -> f32 {
        let (vw, vh) = (viewport.width, viewport.height);
        let count = self.panels.len() as f32;

        let height = if self.breakpoint.matches(viewport) {
            for (i, panel) in self.panels.iter().enumerate() {
                stage.set_bounds(panel.element, Rect::new(i as f32 * vw, top, vw, vh));
            }
            stage.set_scroll_width(self.elements.track, count * vw);
            vh
        } else {
            let panel_height = vh * STACKED_PANEL_HEIGHT;
            for (i, panel) in self.panels.iter().enumerate() {
                stage.set_bounds(
                    panel.element,
                    Rect::new(0.0, top + i as f32 * panel_height, vw, panel_height),
                );
            }
            stage.set_scroll_width(self.elements.track, vw);
            (count * panel_height).max(vh)
        };

        stage.set_bounds(self.elements.section, Rect::new(0.0, top, vw, height));
        stage.set_bounds(self.elements.track, Rect::new(0.0, top, vw, height));
        height
    }

    /// Revert the current build: clear the pan and pin, drop the panels
    pub fn teardown(&mut self, stage: &mut Stage) {
        if let Some((scope, region)) = self.build.take() {
            region.revert(stage);
            scope.dispose();
        }
        for panel in self.panels.drain(..) {
            stage.remove(panel.element);
        }
    }

    pub fn panels(&self) -> &[WorkPanel] {
        &self.panels
    }

    /// Loading text until the first item list arrives
    pub fn status_text(&self) -> Option<&'static str> {
        (!self.loaded).then_some(LOADING_TEXT)
    }

    pub fn region(&self) -> Option<&RegionHandle> {
        self.build.as_ref().map(|(_, region)| region)
    }

    pub fn state(&self) -> ScrollLinkState {
        self.region()
            .and_then(RegionHandle::state)
            .unwrap_or(ScrollLinkState::Inactive)
    }

    /// Extra scroll distance the pinned section adds below itself
    pub fn pin_spacing(&self) -> f32 {
        self.region()
            .and_then(RegionHandle::scroll_distance)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_animation::{Sample, ScrollLinkController, TimelineEngine};
    use reel_core::{EventHub, Property};

    fn item(id: u64, title: &str) -> WorkItem {
        WorkItem {
            id,
            title: title.to_string(),
            description: None,
            year: 2024,
            url: format!("https://example.com/{id}"),
            homepage_url: None,
            star_count: 0,
            fork_count: 0,
            updated_at: Default::default(),
        }
    }

    struct Harness {
        _engine: TimelineEngine,
        controller: ScrollLinkController,
        _hub: reel_core::SharedEventHub,
        scope: AnimationScope,
        stage: Stage,
        gallery: WorksGallery,
    }

    fn harness() -> Harness {
        let engine = TimelineEngine::new();
        let controller = ScrollLinkController::new();
        let hub = EventHub::shared();
        let scope = AnimationScope::new("page", &engine, &controller, &hub);
        let mut stage = Stage::new();
        let elements = WorksElements::insert(&mut stage);
        let config = GalleryConfig {
            scrub: 1.0,
            ..GalleryConfig::default()
        };
        Harness {
            _engine: engine,
            controller,
            _hub: hub,
            scope,
            stage,
            gallery: WorksGallery::new(elements, Breakpoint::MEDIUM, &config),
        }
    }

    #[test]
    fn test_panel_content() {
        let mut stage = Stage::new();
        let el = stage.insert("panel", Rect::ZERO);
        let mut source = item(1, "portfolio-novo-site");
        source.homepage_url = Some("  ".into());
        let panel = WorkPanel::new(el, 0, &source);
        assert_eq!(panel.index_label, "01");
        assert_eq!(panel.title, "portfolio novo site");
        assert_eq!(panel.description, DEFAULT_DESCRIPTION);
        assert_eq!(panel.homepage_url, None);

        source.description = Some("Landing page".into());
        assert_eq!(WorkPanel::new(el, 9, &source).index_label, "10");
        assert_eq!(WorkPanel::new(el, 9, &source).description, "Landing page");
    }

    #[test]
    fn test_pan_maps_scroll_onto_track_overflow() {
        let mut h = harness();
        let viewport = Viewport::new(1000.0, 800.0);
        let items: Vec<WorkItem> = (1..=5).map(|i| item(i, "repo")).collect();
        assert_eq!(h.gallery.status_text(), Some(LOADING_TEXT));
        h.gallery
            .rebuild(&h.scope.handle(), &items, &mut h.stage, 1000.0, &viewport)
            .unwrap();
        assert_eq!(h.gallery.status_text(), None);
        assert_eq!(h.stage.scroll_width(h.gallery.elements().track), Some(5000.0));

        let track = h.gallery.elements().track;
        let section = h.gallery.elements().section;
        h.controller.update(&Sample::at(0.0, 3500.0, viewport), &mut h.stage);
        assert_eq!(h.gallery.state(), ScrollLinkState::Pinned);
        // Window 1000..6000; halfway pans half of the 4000 px overflow
        assert_eq!(h.stage.value(track, Property::TranslateX), Some(-2000.0));
        assert_eq!(h.stage.value(section, Property::PinOffset), Some(2500.0));
        assert_eq!(h.gallery.pin_spacing(), 5000.0);

        h.controller.update(&Sample::at(0.1, 9000.0, viewport), &mut h.stage);
        assert_eq!(h.gallery.state(), ScrollLinkState::Released);
        assert_eq!(h.stage.value(track, Property::TranslateX), Some(-4000.0));
    }

    #[test]
    fn test_narrow_viewport_stacks_panels_without_effect() {
        let mut h = harness();
        let viewport = Viewport::new(600.0, 800.0);
        let items: Vec<WorkItem> = (1..=3).map(|i| item(i, "repo")).collect();
        let height = h
            .gallery
            .rebuild(&h.scope.handle(), &items, &mut h.stage, 0.0, &viewport)
            .unwrap();
        assert_eq!(height, 3.0 * 640.0);

        h.controller.update(&Sample::at(0.0, 500.0, viewport), &mut h.stage);
        assert_eq!(h.gallery.state(), ScrollLinkState::Inactive);
        assert_eq!(h.gallery.pin_spacing(), 0.0);
        let track = h.gallery.elements().track;
        assert!(!h.stage.get(track).is_some_and(|e| e.style.is_set(Property::TranslateX)));
    }

    #[test]
    fn test_rebuild_replaces_panels_and_reverts_region() {
        let mut h = harness();
        let viewport = Viewport::new(1000.0, 800.0);
        let first: Vec<WorkItem> = (1..=4).map(|i| item(i, "old")).collect();
        h.gallery
            .rebuild(&h.scope.handle(), &first, &mut h.stage, 0.0, &viewport)
            .unwrap();
        let old_panel = h.gallery.panels()[0].element;
        h.controller.update(&Sample::at(0.0, 1000.0, viewport), &mut h.stage);
        assert_eq!(h.gallery.state(), ScrollLinkState::Pinned);

        let second: Vec<WorkItem> = (1..=2).map(|i| item(i, "new")).collect();
        h.gallery
            .rebuild(&h.scope.handle(), &second, &mut h.stage, 0.0, &viewport)
            .unwrap();
        assert!(!h.stage.contains(old_panel));
        assert_eq!(h.gallery.panels().len(), 2);
        assert_eq!(h.controller.region_count(), 1);
        // The new region starts from a clean slate
        let track = h.gallery.elements().track;
        assert!(!h.stage.get(track).is_some_and(|e| e.style.is_set(Property::TranslateX)));
    }

    #[test]
    fn test_parent_dispose_removes_region() {
        let mut h = harness();
        let viewport = Viewport::new(1000.0, 800.0);
        let items = vec![item(1, "a"), item(2, "b")];
        h.gallery
            .rebuild(&h.scope.handle(), &items, &mut h.stage, 0.0, &viewport)
            .unwrap();
        assert_eq!(h.controller.region_count(), 1);
        h.scope.dispose();
        assert_eq!(h.controller.region_count(), 0);
        assert!(h
            .gallery
            .rebuild(&h.scope.handle(), &items, &mut h.stage, 0.0, &viewport)
            .is_err());
    }
}
