//! `reel.toml` handling
//!
//! One file configures both the page and the simulator:
//! - top-level keys and tables (`breakpoint`, `[intro]`, `[cursor]`, ...) are the page's [`SiteConfig`]
//! - `[simulation]` holds the viewport, run length, fixtures, and the input script

use anyhow::{Context, Result};
use reel_core::Viewport;
use reel_site::{SiteConfig, TestimonialDraft};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "reel.toml";

/// Everything loaded from a project directory
#[derive(Debug)]
pub struct ReelConfig {
    pub site: SiteConfig,
    pub simulation: SimulationConfig,
    /// Directory the fixture paths are relative to
    pub root: PathBuf,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct SimulationFile {
    #[serde(default)]
    simulation: SimulationConfig,
}

/// Simulator settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: f32,
    pub height: f32,
    /// Simulated seconds
    pub duration: f32,
    /// Log a summary every this many frames; 0 logs only the end
    pub log_every: u32,
    /// JSON array of work items
    pub work_items: Option<PathBuf>,
    /// JSON array of testimonials
    pub testimonials: Option<PathBuf>,
    pub steps: Vec<ScriptStep>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
            duration: 10.0,
            log_every: 60,
            work_items: Some(PathBuf::from("fixtures/work_items.json")),
            testimonials: Some(PathBuf::from("fixtures/testimonials.json")),
            steps: Vec::new(),
        }
    }
}

/// Input applied once the simulated clock reaches `at`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScriptStep {
    pub at: f32,
    #[serde(default)]
    pub scroll: Option<f32>,
    #[serde(default)]
    pub pointer: Option<[f32; 2]>,
    /// `true` presses the primary button, `false` releases it
    #[serde(default)]
    pub press: Option<bool>,
    #[serde(default)]
    pub resize: Option<[f32; 2]>,
    /// Section anchor to jump to, e.g. `"#works"`
    #[serde(default)]
    pub navigate: Option<String>,
    /// Testimonial to submit through the form
    #[serde(default)]
    pub feedback: Option<TestimonialDraft>,
}

impl ReelConfig {
    /// Load `reel.toml` from a directory; a missing file yields the defaults
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::info!(
                "No {} in {}, using defaults",
                CONFIG_FILE,
                path.display()
            );
            return Ok(Self {
                site: SiteConfig::default(),
                simulation: SimulationConfig::default(),
                root: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse(&content, path)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn parse(content: &str, root: &Path) -> Result<Self> {
        let site = SiteConfig::from_toml_str(content)?;
        let file: SimulationFile = toml::from_str(content)?;
        let simulation = file.simulation;

        Viewport::try_new(simulation.width, simulation.height)
            .context("Invalid simulation viewport")?;
        if !simulation.duration.is_finite() || simulation.duration <= 0.0 {
            anyhow::bail!(
                "simulation duration must be positive, got {}",
                simulation.duration
            );
        }

        Ok(Self {
            site,
            simulation,
            root: root.to_path_buf(),
        })
    }

    /// Resolve a fixture path against the project directory
    pub fn fixture_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Default `reel.toml` contents
    pub fn default_toml() -> Result<String> {
        let site = SiteConfig::default()
            .to_toml_string()
            .context("Failed to serialize config")?;
        let simulation = toml::to_string_pretty(&SimulationFile::default())
            .context("Failed to serialize config")?;
        Ok(format!("{}\n{}", site, simulation))
    }
}
