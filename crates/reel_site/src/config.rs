//! Site configuration
//!
//! Loaded from `reel.toml`. Every field has a default, so an empty file
//! yields the stock page. Easing curves are written by name
//! (`"power3.out"`, `"ease-in-out"`, ...).

use reel_animation::{Easing, IntroTimings, DEFAULT_MAX_FRAME_DT};
use reel_core::Breakpoint;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

// =============================================================================
// Top level
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Minimum viewport width (px) for the scroll-linked gallery
    pub breakpoint: f32,
    /// Display frame rate the simulator drives
    pub frame_rate: f32,
    /// Largest frame delta handed to timelines (s)
    pub max_frame_dt: f32,
    pub intro: IntroConfig,
    pub cursor: CursorConfig,
    pub gradient: GradientConfig,
    pub gallery: GalleryConfig,
    pub reveal: RevealConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            breakpoint: Breakpoint::MEDIUM.min_width,
            frame_rate: 60.0,
            max_frame_dt: DEFAULT_MAX_FRAME_DT,
            intro: IntroConfig::default(),
            cursor: CursorConfig::default(),
            gradient: GradientConfig::default(),
            gallery: GalleryConfig::default(),
            reveal: RevealConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a `reel.toml` document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn gallery_breakpoint(&self) -> Result<Breakpoint> {
        Ok(Breakpoint::try_min_width(self.breakpoint)?)
    }

    /// Seconds per simulated frame
    pub fn frame_dt(&self) -> f64 {
        1.0 / self.frame_rate as f64
    }

    /// Reject values the page cannot run with
    pub fn validate(&self) -> Result<()> {
        self.gallery_breakpoint()?;
        positive("frame_rate", self.frame_rate)?;
        positive("max_frame_dt", self.max_frame_dt)?;

        let i = &self.intro;
        non_negative("intro.count_duration", i.count_duration)?;
        non_negative("intro.counter_exit_duration", i.counter_exit_duration)?;
        non_negative("intro.bar_collapse_duration", i.bar_collapse_duration)?;
        non_negative("intro.container_slide_duration", i.container_slide_duration)?;
        non_negative("intro.bar_overlap", i.bar_overlap)?;
        non_negative("intro.container_overlap", i.container_overlap)?;
        non_negative("intro.fallback_timeout", i.fallback_timeout)?;
        let sequence = i.timings().total_duration();
        if i.fallback_timeout > 0.0 && i.fallback_timeout <= sequence {
            return Err(SiteError::InvalidConfig(format!(
                "intro.fallback_timeout ({}s) must outlast the {}s intro sequence",
                i.fallback_timeout, sequence
            )));
        }

        damping("cursor.lens_damping", self.cursor.lens_damping)?;
        damping("cursor.dot_damping", self.cursor.dot_damping)?;
        non_negative("cursor.press_duration", self.cursor.press_duration)?;
        damping("gradient.distance_damping", self.gradient.distance_damping)?;
        damping("gallery.scrub", self.gallery.scrub)?;

        let r = &self.reveal;
        fraction("reveal.about_start", r.about_start)?;
        fraction("reveal.feedback_start", r.feedback_start)?;
        fraction("reveal.contact_start", r.contact_start)?;
        damping("reveal.parallax_scrub", r.parallax_scrub)?;
        non_negative("reveal.paragraph_stagger", r.paragraph_stagger)?;
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SiteError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SiteError::InvalidConfig(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

fn fraction(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SiteError::InvalidConfig(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Per-frame damping factors; 0 would never move
fn damping(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SiteError::InvalidConfig(format!(
            "{name} must be within (0, 1], got {value}"
        )))
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Preloader timings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Skip the preloader and activate the page on the first frame
    pub enabled: bool,
    pub count_duration: f32,
    #[serde(with = "easing_name")]
    pub count_easing: Easing,
    pub counter_exit_duration: f32,
    pub counter_exit_offset: f32,
    #[serde(with = "easing_name")]
    pub counter_exit_easing: Easing,
    pub bar_collapse_duration: f32,
    pub bar_overlap: f32,
    #[serde(with = "easing_name")]
    pub bar_easing: Easing,
    pub container_slide_duration: f32,
    pub container_overlap: f32,
    #[serde(with = "easing_name")]
    pub container_easing: Easing,
    /// Force completion after this many seconds; 0 disables
    pub fallback_timeout: f32,
}

impl Default for IntroConfig {
    fn default() -> Self {
        let t = IntroTimings::default();
        Self {
            enabled: true,
            count_duration: t.count_duration,
            count_easing: t.count_easing,
            counter_exit_duration: t.counter_exit_duration,
            counter_exit_offset: t.counter_exit_offset,
            counter_exit_easing: t.counter_exit_easing,
            bar_collapse_duration: t.bar_collapse_duration,
            bar_overlap: t.bar_overlap,
            bar_easing: t.bar_easing,
            container_slide_duration: t.container_slide_duration,
            container_overlap: t.container_overlap,
            container_easing: t.container_easing,
            fallback_timeout: t.fallback_timeout.unwrap_or(0.0),
        }
    }
}

impl IntroConfig {
    pub fn timings(&self) -> IntroTimings {
        IntroTimings {
            count_duration: self.count_duration,
            count_easing: self.count_easing,
            counter_exit_duration: self.counter_exit_duration,
            counter_exit_offset: self.counter_exit_offset,
            counter_exit_easing: self.counter_exit_easing,
            bar_collapse_duration: self.bar_collapse_duration,
            bar_overlap: self.bar_overlap,
            bar_easing: self.bar_easing,
            container_slide_duration: self.container_slide_duration,
            container_overlap: self.container_overlap,
            container_easing: self.container_easing,
            fallback_timeout: (self.fallback_timeout > 0.0).then_some(self.fallback_timeout),
        }
    }
}

/// Cursor follower rates
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Per-frame damping of the outer lens (slow trail)
    pub lens_damping: f32,
    /// Per-frame damping of the inner dot (1.0 = no trail)
    pub dot_damping: f32,
    /// Lens scale while a pointer button is held
    pub press_scale: f32,
    pub press_duration: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            lens_damping: 0.12,
            dot_damping: 1.0,
            press_scale: 0.7,
            press_duration: 0.3,
        }
    }
}

/// Background gradient uniforms
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GradientConfig {
    /// Per-frame damping of the pointer distance uniform
    pub distance_damping: f32,
    /// Focus point in normalized pointer space
    pub focus: [f32; 2],
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            distance_damping: 0.05,
            focus: [0.0, 0.0],
        }
    }
}

/// Horizontal works gallery
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Per-frame damping of displayed scroll progress (1.0 = locked)
    pub scrub: f32,
    /// Most work items shown
    pub max_items: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            scrub: 0.1,
            max_items: 10,
        }
    }
}

/// Viewport-triggered reveals and the about parallax
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Trigger line for the about paragraphs (fraction of viewport height)
    pub about_start: f32,
    pub paragraph_duration: f32,
    pub paragraph_stagger: f32,
    #[serde(with = "easing_name")]
    pub paragraph_easing: Easing,
    pub parallax_scrub: f32,
    pub feedback_start: f32,
    pub feedback_duration: f32,
    #[serde(with = "easing_name")]
    pub feedback_easing: Easing,
    pub contact_start: f32,
    pub contact_duration: f32,
    #[serde(with = "easing_name")]
    pub contact_easing: Easing,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            about_start: 0.85,
            paragraph_duration: 1.0,
            paragraph_stagger: 0.15,
            paragraph_easing: Easing::QuartOut,
            parallax_scrub: 0.1,
            feedback_start: 0.9,
            feedback_duration: 1.0,
            feedback_easing: Easing::QuartOut,
            contact_start: 0.9,
            contact_duration: 1.5,
            contact_easing: Easing::QuintOut,
        }
    }
}

/// Serialize easings by name
mod easing_name {
    use reel_animation::Easing;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(easing: &Easing, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(easing.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Easing, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
