//! Headless frame loop
//!
//! Mounts a page on a fresh stage, replays the scripted input against a
//! simulated clock, and reports what the page wrote.

use anyhow::{Context, Result};
use reel_core::{HostEvent, PointerButton, Stage, Viewport};
use reel_site::{Anchor, JsonTestimonials, JsonWorkItems, Page};
use std::fs;
use tracing::{debug, info, warn};

use crate::config::{ReelConfig, ScriptStep};

/// Totals reported after a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub frames: u64,
    pub writes: usize,
    pub intro_completed_at: Option<f64>,
    pub final_scroll: f32,
    pub panels: usize,
    pub testimonials: usize,
}

pub struct Simulator {
    page: Page,
    stage: Stage,
    steps: Vec<ScriptStep>,
    next_step: usize,
    scroll: f32,
    frame_dt: f64,
    total_frames: u64,
    log_every: u32,
    testimonials: Option<JsonTestimonials>,
}

impl Simulator {
    pub fn new(config: &ReelConfig) -> Result<Self> {
        let sim = &config.simulation;
        let mut stage = Stage::new();
        let viewport = Viewport::try_new(sim.width, sim.height)?;
        let mut page = Page::mount(config.site.clone(), viewport, &mut stage)
            .context("Failed to mount page")?;

        if let Some(path) = &sim.work_items {
            let path = config.fixture_path(path);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let provider = JsonWorkItems::from_json_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            page.load_work_items(&provider, &mut stage)?;
        }

        let testimonials = match &sim.testimonials {
            Some(path) => {
                let path = config.fixture_path(path);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let provider = JsonTestimonials::from_json_str(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                page.load_testimonials(&provider);
                Some(provider)
            }
            None => None,
        };

        let mut steps = sim.steps.clone();
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));

        let frame_dt = config.site.frame_dt();
        let total_frames = (sim.duration as f64 / frame_dt).round().max(1.0) as u64;

        Ok(Self {
            page,
            stage,
            steps,
            next_step: 0,
            scroll: 0.0,
            frame_dt,
            total_frames,
            log_every: sim.log_every,
            testimonials,
        })
    }

    pub fn run(&mut self) -> Result<Summary> {
        let mut summary = Summary::default();

        for frame in 0..self.total_frames {
            let now = frame as f64 * self.frame_dt;
            self.apply_due_steps(now)?;

            self.scroll = self.scroll.clamp(0.0, self.page.max_scroll());
            self.page.frame(now, self.scroll, &mut self.stage)?;
            let writes = self.stage.drain_writes();
            summary.writes += writes.len();
            for write in &writes {
                tracing::trace!(
                    "{} {} = {:?}",
                    self.stage.label(write.element),
                    write.property.name(),
                    write.value
                );
            }

            if summary.intro_completed_at.is_none() && self.page.is_active() {
                info!("Page active at {:.2}s", now);
                summary.intro_completed_at = Some(now);
            }
            if self.log_every > 0 && frame % u64::from(self.log_every) == 0 {
                self.log_frame(frame, now, writes.len());
            }
            summary.frames += 1;
        }

        summary.final_scroll = self.scroll;
        summary.panels = self.page.gallery().panels().len();
        summary.testimonials = self.page.feed().items().len();
        self.page.unmount();
        Ok(summary)
    }

    fn apply_due_steps(&mut self, now: f64) -> Result<()> {
        while let Some(step) = self.steps.get(self.next_step) {
            if f64::from(step.at) > now {
                break;
            }
            let step = step.clone();
            self.next_step += 1;
            self.apply(&step)?;
        }
        Ok(())
    }

    fn apply(&mut self, step: &ScriptStep) -> Result<()> {
        debug!("Script step at {:.2}s", step.at);
        if let Some([width, height]) = step.resize {
            self.page.handle_event(&HostEvent::Resized { width, height });
        }
        if let Some([x, y]) = step.pointer {
            self.page.handle_event(&HostEvent::PointerMoved { x, y });
        }
        if let Some(down) = step.press {
            let pointer = self.page.cursor().dot();
            let (x, y) = (pointer.x, pointer.y);
            let event = if down {
                HostEvent::PointerDown {
                    button: PointerButton::Primary,
                    x,
                    y,
                }
            } else {
                HostEvent::PointerUp {
                    button: PointerButton::Primary,
                    x,
                    y,
                }
            };
            self.page.handle_event(&event);
        }
        if let Some(scroll) = step.scroll {
            self.scroll = scroll;
            self.page.handle_event(&HostEvent::Scrolled { offset_y: scroll });
        }
        if let Some(href) = &step.navigate {
            let anchor: Anchor = href
                .parse()
                .with_context(|| format!("Invalid navigate step at {}s", step.at))?;
            self.scroll = self.page.navigate(anchor);
            info!("Navigate {} -> scroll {:.0}", anchor, self.scroll);
        }
        if let Some(draft) = &step.feedback {
            let Some(provider) = &self.testimonials else {
                warn!("Feedback step at {}s ignored: no testimonials fixture", step.at);
                return Ok(());
            };
            *self.page.form_mut().draft_mut() = draft.clone();
            let status = self.page.submit_feedback(provider);
            info!("Feedback submit: {:?}", status);
        }
        Ok(())
    }

    fn log_frame(&self, frame: u64, now: f64, writes: usize) {
        let intro = match self.page.intro() {
            Some(intro) => format!("{:?} {}", intro.phase(), intro.counter()),
            None => "off".to_string(),
        };
        info!(
            "frame {:>5} t={:>6.2}s scroll={:>7.1} intro={} gallery={:?} writes={}",
            frame,
            now,
            self.scroll,
            intro,
            self.page.gallery().state(),
            writes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config(extra: &str) -> ReelConfig {
        let content = format!(
            "[intro]\nenabled = false\n\n[simulation]\nwidth = 1200.0\nheight = 1000.0\nduration = 1.0\nlog_every = 0\n{}",
            extra
        );
        let mut config = ReelConfig::parse(&content, Path::new(".")).unwrap();
        config.simulation.work_items = None;
        config.simulation.testimonials = None;
        config
    }

    #[test]
    fn test_runs_script_without_fixtures() {
        let config = config(
            "\n[[simulation.steps]]\nat = 0.5\nnavigate = \"#about\"\n\n[[simulation.steps]]\nat = 0.1\npointer = [100.0, 200.0]\n",
        );
        let mut sim = Simulator::new(&config).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(summary.frames, 60);
        assert_eq!(summary.intro_completed_at, Some(0.0));
        assert_eq!(summary.final_scroll, 1000.0);
        assert!(summary.writes > 0);
        assert_eq!(summary.panels, 0);
    }

    #[test]
    fn test_bad_anchor_fails_the_run() {
        let config = config("\n[[simulation.steps]]\nat = 0.0\nnavigate = \"#blog\"\n");
        let mut sim = Simulator::new(&config).unwrap();
        assert!(sim.run().is_err());
    }
}
