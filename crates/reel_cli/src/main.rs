//! Reel CLI
//!
//! Run a Reel page headlessly and check its configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod simulate;

use config::{ReelConfig, CONFIG_FILE};
use simulate::Simulator;

#[derive(Parser)]
#[command(name = "reel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reel page simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the page and replay the scripted input
    Simulate {
        /// Project directory containing reel.toml
        #[arg(default_value = ".")]
        source: String,

        /// Override the simulated duration (seconds)
        #[arg(short, long)]
        duration: Option<f32>,

        /// Override the viewport, e.g. 1440x900
        #[arg(long)]
        viewport: Option<String>,
    },

    /// Validate reel.toml
    CheckConfig {
        /// Project directory containing reel.toml
        #[arg(default_value = ".")]
        source: String,

        /// Print the effective configuration
        #[arg(short, long)]
        print: bool,
    },

    /// Write a default reel.toml into a directory
    Init {
        #[arg(default_value = ".")]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            source,
            duration,
            viewport,
        } => cmd_simulate(&source, duration, viewport.as_deref()),

        Commands::CheckConfig { source, print } => cmd_check_config(&source, print),

        Commands::Init { path } => cmd_init(&path),
    }
}

fn parse_viewport(value: &str) -> Result<(f32, f32)> {
    let Some((width, height)) = value.split_once(['x', 'X']) else {
        anyhow::bail!("Invalid viewport '{}'. Expected WIDTHxHEIGHT", value);
    };
    let width: f32 = width.trim().parse()?;
    let height: f32 = height.trim().parse()?;
    Ok((width, height))
}

fn cmd_simulate(source: &str, duration: Option<f32>, viewport: Option<&str>) -> Result<()> {
    let path = PathBuf::from(source);
    let mut config = ReelConfig::load_from_dir(&path)?;

    if let Some(duration) = duration {
        if !duration.is_finite() || duration <= 0.0 {
            anyhow::bail!("Duration must be positive, got {}", duration);
        }
        config.simulation.duration = duration;
    }
    if let Some(viewport) = viewport {
        let (width, height) = parse_viewport(viewport)?;
        config.simulation.width = width;
        config.simulation.height = height;
    }

    info!(
        "Simulating {:.1}s at {}x{} ({} script steps)",
        config.simulation.duration,
        config.simulation.width,
        config.simulation.height,
        config.simulation.steps.len()
    );

    let mut simulator = Simulator::new(&config)?;
    let summary = simulator.run()?;

    println!("Simulation");
    println!("==========");
    println!("Frames:        {}", summary.frames);
    println!("Style writes:  {}", summary.writes);
    match summary.intro_completed_at {
        Some(t) => println!("Page active:   {:.2}s", t),
        None => println!("Page active:   never"),
    }
    println!("Final scroll:  {:.1}", summary.final_scroll);
    println!("Gallery:       {} panels", summary.panels);
    println!("Testimonials:  {}", summary.testimonials);

    Ok(())
}

fn cmd_check_config(source: &str, print: bool) -> Result<()> {
    let path = PathBuf::from(source);
    let config = ReelConfig::load_from_dir(&path)?;

    info!(
        "Config OK: breakpoint {}px, intro {}, {} script steps",
        config.site.breakpoint,
        if config.site.intro.enabled { "on" } else { "off" },
        config.simulation.steps.len()
    );

    for fixture in [&config.simulation.work_items, &config.simulation.testimonials]
        .into_iter()
        .flatten()
    {
        let resolved = config.fixture_path(fixture);
        if !resolved.exists() {
            anyhow::bail!("Fixture not found: {}", resolved.display());
        }
    }

    if print {
        println!("{}", config.site.to_toml_string()?);
    }

    Ok(())
}

fn cmd_init(path: &str) -> Result<()> {
    let dir = PathBuf::from(path);
    let target = dir.join(CONFIG_FILE);
    if target.exists() {
        anyhow::bail!("This directory already contains a {}", CONFIG_FILE);
    }

    fs::create_dir_all(&dir)?;
    fs::write(&target, ReelConfig::default_toml()?)?;

    info!("Wrote {}", target.display());
    Ok(())
}
