#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs one headless Sky Arena episode.

mod config_file;
mod policies;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sky_arena_core::WELCOME_BANNER;
use sky_arena_simulation::{MatchSummary, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::policies::PolicyKind;

/// Command-line options accepted by the Sky Arena binary.
#[derive(Debug, Parser)]
#[command(
    name = "sky-arena",
    version,
    about = "Run a headless Sky Arena episode"
)]
struct Cli {
    /// TOML document describing the arena; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of actors competing in the arena.
    #[arg(long, default_value_t = 2)]
    actors: usize,
    /// Decision source driving every actor.
    #[arg(long, value_enum, default_value_t = PolicyKind::Chase)]
    policy: PolicyKind,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long)]
    verbose: bool,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

/// Machine-readable episode result.
#[derive(Debug, Serialize)]
struct Report<'a> {
    seed: u64,
    ticks: u64,
    elapsed_secs: f32,
    summary: &'a MatchSummary,
}

/// Entry point for the Sky Arena command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = config_file::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.game.seed = seed;
    }
    let seed = config.game.seed;

    let controllers = (0..cli.actors)
        .map(|_| policies::controller(cli.policy))
        .collect();
    let mut simulation =
        Simulation::new(config, controllers).context("failed to construct the simulation")?;
    info!(seed, actors = cli.actors, policy = ?cli.policy, "starting episode");

    let status = simulation.run_to_end().context("episode aborted")?;
    let summary = MatchSummary::from_status(&status, &simulation.actors())
        .context("episode ended without a terminal status")?;

    if cli.json {
        let report = Report {
            seed,
            ticks: simulation.clock().elapsed_ticks(),
            elapsed_secs: simulation.clock().elapsed_secs(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{WELCOME_BANNER}");
        print!("{summary}");
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
