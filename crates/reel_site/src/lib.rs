//! Reel Site
//!
//! The promotional page built on the reel animation layer: a counter
//! preloader that hands off to the page, pointer-driven effects, scroll
//! reveals, a pinned horizontal gallery of work items, and a testimonial
//! feed with a submission form.
//!
//! # Features
//!
//! - **Page**: one object owning the sampler, engine, controller, and root scope
//! - **Cursor Follower**: trailing lens and pointer dot with press feedback
//! - **Background Gradient**: shader uniforms with a damped pointer distance
//! - **Sections**: about parallax and reveals, works gallery, feedback, contact
//! - **Providers**: work item and testimonial collaborators, with JSON-backed implementations
//! - **Configuration**: `reel.toml` with a default for every field
//!
//! # Example
//!
//! ```ignore
//! use reel_core::{Stage, Viewport};
//! use reel_site::{Page, SiteConfig};
//!
//! let mut stage = Stage::new();
//! let mut page = Page::mount(SiteConfig::default(), Viewport::new(1440.0, 900.0), &mut stage)?;
//!
//! // Each display frame
//! page.frame(now, scroll_y, &mut stage)?;
//! for write in stage.drain_writes() {
//!     apply(write);
//! }
//! ```

pub mod about;
pub mod config;
pub mod contact;
pub mod cursor;
pub mod error;
pub mod feedback;
pub mod gradient;
pub mod hero;
pub mod layout;
pub mod nav;
pub mod page;
pub mod providers;
pub mod works;

pub use about::{AboutElements, AboutSection};
pub use config::{CursorConfig, GalleryConfig, GradientConfig, IntroConfig, RevealConfig, SiteConfig};
pub use contact::ContactElements;
pub use cursor::{CursorElements, CursorFollower};
pub use error::{ProviderError, Result, SiteError};
pub use feedback::{
    DraftError, FeedStatus, FeedbackElements, FeedbackForm, SubmitStatus, TestimonialFeed,
};
pub use gradient::{BackgroundGradient, GradientUniforms};
pub use hero::{HeroOrb, OrbTransform};
pub use layout::{PageElements, PageLayout, Span};
pub use nav::{Anchor, NavMenu};
pub use page::{Page, Reveals};
pub use providers::{
    JsonTestimonials, JsonWorkItems, Testimonial, TestimonialDraft, TestimonialsProvider,
    WorkItem, WorkItemsProvider,
};
pub use works::{WorkPanel, WorksElements, WorksGallery};
