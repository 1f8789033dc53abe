#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that runs Night Shift headless.

mod bots;
mod config;
mod host;
mod render;

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use night_shift_core::{PlayerId, ProfileStore, Tuning};
use night_shift_profile_store::{JsonProfileStore, MemoryProfileStore};
use night_shift_session::Session;
use night_shift_world::{query, World};
use tracing_subscriber::prelude::*;

use crate::bots::ScriptedBot;
use crate::host::RunOptions;

/// Headless host for the Night Shift co-op survival simulation.
#[derive(Debug, Parser)]
#[command(name = "night-shift", version, about)]
struct Cli {
    /// Optional TOML file overriding gameplay tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Seed for map generation and loot.
    #[arg(long, global = true, default_value_t = 1)]
    seed: u64,
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Runs a session with scripted players.
    Run(RunArgs),
    /// Prints the map generated for the seed.
    Map,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Number of scripted players.
    #[arg(long, default_value_t = 2)]
    bots: u32,
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120.0)]
    seconds: f64,
    /// Runs as fast as possible instead of in real time.
    #[arg(long)]
    fast: bool,
    /// Writes snapshots as JSON lines to this file, or `-` for stdout.
    #[arg(long)]
    snapshots: Option<PathBuf>,
    /// Publishes this player's fogged view (`p<n>`) instead of the spectator view.
    #[arg(long, value_parser = parse_viewer)]
    viewer: Option<PlayerId>,
    /// Persists profiles to this JSON file instead of keeping them in memory.
    #[arg(long)]
    profiles: Option<PathBuf>,
}

fn parse_viewer(text: &str) -> Result<PlayerId, String> {
    PlayerId::parse(text).ok_or_else(|| format!("expected `p<n>`, got `{text}`"))
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let tuning = config::load_tuning(cli.config.as_deref())?;
    match cli.command {
        Mode::Map => {
            let world = World::new(tuning, cli.seed);
            print!("{}", render::render_map(query::map(&world)));
            Ok(())
        }
        Mode::Run(args) => match args.profiles.clone() {
            Some(path) => run(tuning, cli.seed, &args, JsonProfileStore::open(path)),
            None => run(tuning, cli.seed, &args, MemoryProfileStore::new()),
        },
    }
}

fn run<S>(tuning: Tuning, seed: u64, args: &RunArgs, store: S) -> Result<()>
where
    S: ProfileStore,
    S::Error: Display,
{
    let mut session = Session::new(tuning, seed, store);
    tracing::info!(seed, "{}", query::welcome_banner(session.world()));

    let mut bots: Vec<ScriptedBot> = (0..args.bots)
        .map(|index| ScriptedBot::new(index, seed))
        .collect();
    let options = RunOptions {
        seconds: args.seconds,
        fast: args.fast,
        viewer: args.viewer,
    };
    let sink = open_sink(args.snapshots.as_deref())?;
    let summary = host::run(&mut session, &mut bots, &options, sink)?;
    eprintln!(
        "ran {} ticks: {} won, {} lost, {} snapshots",
        summary.ticks, summary.rounds_won, summary.rounds_lost, summary.snapshots
    );
    Ok(())
}

fn open_sink(path: Option<&Path>) -> Result<Option<Box<dyn Write>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if path == Path::new("-") {
        return Ok(Some(Box::new(BufWriter::new(io::stdout()))));
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create snapshot file at {}", path.display()))?;
    Ok(Some(Box::new(BufWriter::new(file))))
}
