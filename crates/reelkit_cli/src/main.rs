//! Reelkit CLI - headless reel spin simulation
//!
//! Spins a bank of reels on a fixed-rate virtual clock and logs what a
//! renderer would draw: reel positions, blur and symbol wraps.

mod sim;

use anyhow::{bail, Context, Result};
use clap::Parser;
use reelkit_animation::EngineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Simulate a slot-machine spin without a renderer
#[derive(Parser, Debug)]
#[command(name = "reelkit")]
#[command(about = "Headless reel spin simulation")]
#[command(version)]
struct Args {
    /// Engine config file (reelkit.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of reels
    #[arg(short, long, default_value = "5")]
    reels: usize,

    /// Symbols per reel
    #[arg(short, long, default_value = "4")]
    symbols: u64,

    /// Extra symbols each reel travels, comma separated (defaults to 0 for every reel)
    #[arg(short, long, value_delimiter = ',')]
    extras: Vec<u32>,

    /// Frames per second of the virtual clock
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Log reel state every N frames
    #[arg(long, default_value = "30")]
    report_every: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if args.reels == 0 {
        bail!("--reels must be at least 1");
    }
    if args.symbols == 0 {
        bail!("--symbols must be at least 1");
    }
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }

    let extras = if args.extras.is_empty() {
        vec![0; args.reels]
    } else {
        args.extras.clone()
    };

    let mut sim = sim::Simulation::new(config, args.reels, args.symbols);
    sim.spin(&extras)?;
    let summary = sim.run(args.fps, args.report_every.max(1))?;

    println!(
        "Spin finished after {} frames ({:.0}ms), {} symbol wraps",
        summary.frames,
        summary.elapsed.as_millis_f64(),
        summary.wraps
    );
    for (index, position) in summary.positions.iter().enumerate() {
        println!("  reel {index}: position {position:.2}");
    }

    Ok(())
}
