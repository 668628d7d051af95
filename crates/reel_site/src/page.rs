//! The page
//!
//! Owns the sampler, engine, scroll-link controller, and the root scope
//! every section registers on. A host feeds it input events and calls
//! [`Page::frame`] once per display frame, then drains the stage's writes.
//!
//! Section reveals and the works gallery stay dormant until the intro
//! completes; work items that arrive earlier are held until then.

use std::cell::Cell;
use std::rc::Rc;

use reel_animation::{
    AnimationError, AnimationScope, IntroSequencer, Sample, ScrollLinkController, ScrollSource,
    SignalSampler, TimelineEngine, TimelineHandle,
};
use reel_core::{EventHub, HostEvent, SharedEventHub, Stage, Viewport};
use tracing::{debug, info, warn};

use crate::about::AboutSection;
use crate::config::SiteConfig;
use crate::contact;
use crate::cursor::CursorFollower;
use crate::error::Result;
use crate::feedback::{self, FeedbackForm, SubmitStatus, TestimonialFeed};
use crate::gradient::BackgroundGradient;
use crate::hero::HeroOrb;
use crate::layout::{PageElements, PageLayout};
use crate::nav::{Anchor, NavMenu};
use crate::providers::{TestimonialsProvider, WorkItem, WorkItemsProvider};
use crate::works::WorksGallery;

/// Reveals registered once the page is active
pub struct Reveals {
    pub about: AboutSection,
    pub feedback_title: TimelineHandle,
    pub contact_title: TimelineHandle,
}

pub struct Page {
    config: SiteConfig,
    sampler: SignalSampler,
    engine: TimelineEngine,
    controller: ScrollLinkController,
    hub: SharedEventHub,
    scope: AnimationScope,
    elements: PageElements,
    layout: PageLayout,

    intro: Option<IntroSequencer>,
    intro_done: Rc<Cell<bool>>,
    reveals: Option<Reveals>,

    cursor: CursorFollower,
    gradient: BackgroundGradient,
    hero: HeroOrb,
    gallery: WorksGallery,
    pending_items: Option<Vec<WorkItem>>,

    feed: TestimonialFeed,
    form: FeedbackForm,
    nav: NavMenu,
    unmounted: bool,
}

impl Page {
    /// Insert the page's elements into `stage` and start the intro
    pub fn mount(config: SiteConfig, viewport: Viewport, stage: &mut Stage) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::try_new(viewport.width, viewport.height)?;
        let breakpoint = config.gallery_breakpoint()?;

        let engine = TimelineEngine::new().with_max_frame_dt(config.max_frame_dt);
        let controller = ScrollLinkController::new();
        let hub = EventHub::shared();
        let scope = AnimationScope::new("page", &engine, &controller, &hub);
        let handle = scope.handle();

        let elements = PageElements::insert(stage, config.intro.enabled);
        let gallery = WorksGallery::new(elements.works, breakpoint, &config.gallery);
        let layout = elements.arrange(stage, viewport, &gallery, 0.0);

        let gradient =
            BackgroundGradient::mount(&handle, elements.background, viewport.size(), &config.gradient)?;
        let hero = HeroOrb::mount(&handle, elements.orb)?;
        let cursor = CursorFollower::mount(&handle, elements.cursor, &config.cursor)?;

        let intro_done = Rc::new(Cell::new(false));
        let intro = match elements.intro {
            Some(intro_elements) => {
                let done = intro_done.clone();
                let sequencer = IntroSequencer::mount(
                    &handle,
                    intro_elements,
                    config.intro.timings(),
                    move || done.set(true),
                )?;
                Some(sequencer)
            }
            None => {
                intro_done.set(true);
                None
            }
        };

        info!(
            "Page: mounted at {}x{} (intro {})",
            viewport.width,
            viewport.height,
            if intro.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            sampler: SignalSampler::new(viewport),
            config,
            engine,
            controller,
            hub,
            scope,
            elements,
            layout,
            intro,
            intro_done,
            reveals: None,
            cursor,
            gradient,
            hero,
            gallery,
            pending_items: None,
            feed: TestimonialFeed::new(),
            form: FeedbackForm::new(),
            nav: NavMenu::new(),
            unmounted: false,
        })
    }

    // =========================================================================
    // Input and frames
    // =========================================================================

    /// Feed a host event to the sampler and the page's listeners
    pub fn handle_event(&mut self, event: &HostEvent) {
        self.sampler.handle_event(event);
        if !self.unmounted {
            self.hub.borrow_mut().dispatch(event);
        }
    }

    /// Run one display frame
    ///
    /// Order: relayout if the viewport changed, sample, update scroll
    /// regions, tick timelines and frame callbacks, then activate sections
    /// and relayout for pin spacing as needed.
    pub fn frame(&mut self, now: f64, scroll: impl ScrollSource, stage: &mut Stage) -> Result<Sample> {
        if self.unmounted {
            return Err(AnimationError::ScopeDisposed.into());
        }

        let viewport = self.sampler.viewport();
        if viewport != self.layout.viewport {
            debug!("Page: viewport {}x{}, relayout", viewport.width, viewport.height);
            self.relayout(stage, viewport);
        }

        let sample = self.sampler.sample(now, scroll);
        self.controller.update(&sample, stage);
        self.engine.tick(&sample, stage);

        if self.reveals.is_none() && self.intro_done.get() {
            self.activate(stage)?;
        }
        if self.gallery.pin_spacing() != self.layout.pin_spacing {
            debug!(
                "Page: pin spacing {} -> {}",
                self.layout.pin_spacing,
                self.gallery.pin_spacing()
            );
            self.relayout(stage, viewport);
        }

        Ok(sample)
    }

    fn relayout(&mut self, stage: &mut Stage, viewport: Viewport) {
        self.layout = self
            .elements
            .arrange(stage, viewport, &self.gallery, self.gallery.pin_spacing());
    }

    fn activate(&mut self, stage: &mut Stage) -> Result<()> {
        let handle = self.scope.handle();
        let reveal = &self.config.reveal;
        let about = AboutSection::mount(&handle, &self.elements.about, reveal)?;
        let feedback_title = feedback::mount_title_reveal(&handle, &self.elements.feedback, reveal)?;
        let contact_title = contact::mount_title_reveal(&handle, &self.elements.contact, reveal)?;
        self.reveals = Some(Reveals {
            about,
            feedback_title,
            contact_title,
        });
        info!("Page: intro complete, sections active");

        if let Some(items) = self.pending_items.take() {
            self.build_gallery(&items, stage)?;
        }
        Ok(())
    }

    fn build_gallery(&mut self, items: &[WorkItem], stage: &mut Stage) -> Result<()> {
        let viewport = self.layout.viewport;
        self.gallery
            .rebuild(&self.scope.handle(), items, stage, self.layout.works.top, &viewport)?;
        self.relayout(stage, viewport);
        Ok(())
    }

    // =========================================================================
    // Collaborator data
    // =========================================================================

    /// Replace the work items; held until the page is active
    pub fn set_work_items(&mut self, items: Vec<WorkItem>, stage: &mut Stage) -> Result<()> {
        if self.reveals.is_some() {
            self.build_gallery(&items, stage)
        } else {
            debug!("Page: holding {} work items until active", items.len());
            self.pending_items = Some(items);
            Ok(())
        }
    }

    /// Fetch work items; a failure leaves the gallery on its loading text
    pub fn load_work_items(&mut self, provider: &dyn WorkItemsProvider, stage: &mut Stage) -> Result<()> {
        match provider.list_work_items() {
            Ok(items) => self.set_work_items(items, stage),
            Err(err) => {
                warn!("Page: could not load work items: {}", err);
                Ok(())
            }
        }
    }

    pub fn load_testimonials(&mut self, provider: &dyn TestimonialsProvider) {
        self.feed.refresh(provider);
    }

    /// Submit the feedback form and refresh the feed on success
    pub fn submit_feedback(&mut self, provider: &dyn TestimonialsProvider) -> &SubmitStatus {
        self.form.submit(provider, &mut self.feed)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Follow a header link; returns the scroll offset to move to
    pub fn navigate(&mut self, anchor: Anchor) -> f32 {
        self.nav.select(anchor);
        self.layout.scroll_target(anchor)
    }

    pub fn scroll_target(&self, anchor: Anchor) -> f32 {
        self.layout.scroll_target(anchor)
    }

    pub fn max_scroll(&self) -> f32 {
        self.layout.max_scroll()
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release every registration the page made; safe to call twice
    ///
    /// Values already written stay where they are.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.scope.dispose();
        info!("Page: unmounted");
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.sampler.viewport()
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn elements(&self) -> &PageElements {
        &self.elements
    }

    pub fn intro(&self) -> Option<&IntroSequencer> {
        self.intro.as_ref()
    }

    /// Whether the intro has completed and sections are live
    pub fn is_active(&self) -> bool {
        self.reveals.is_some()
    }

    pub fn reveals(&self) -> Option<&Reveals> {
        self.reveals.as_ref()
    }

    pub fn cursor(&self) -> &CursorFollower {
        &self.cursor
    }

    pub fn gradient(&self) -> &BackgroundGradient {
        &self.gradient
    }

    pub fn hero(&self) -> &HeroOrb {
        &self.hero
    }

    pub fn gallery(&self) -> &WorksGallery {
        &self.gallery
    }

    pub fn feed(&self) -> &TestimonialFeed {
        &self.feed
    }

    pub fn form(&self) -> &FeedbackForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FeedbackForm {
        &mut self.form
    }

    pub fn nav(&self) -> &NavMenu {
        &self.nav
    }

    pub fn nav_mut(&mut self) -> &mut NavMenu {
        &mut self.nav
    }

    pub fn listener_count(&self) -> usize {
        self.hub.borrow().listener_count()
    }

    pub fn frame_callback_count(&self) -> usize {
        self.engine.frame_callback_count()
    }

    pub fn region_count(&self) -> usize {
        self.controller.region_count()
    }
}
