#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the art gallery guard game.

mod config;
mod dashboard;
mod layout_transfer;
mod session;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    config::{FileConfig, Overrides},
    session::{Outcome, Session},
};

#[derive(Debug, Parser)]
#[command(
    name = "art-gallery",
    version,
    about = "Station guards so they watch as much of a generated gallery as possible"
)]
struct Cli {
    /// TOML file with `[settings]` and `[tuning]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of rooms merged into the floor plan (1-20).
    #[arg(long)]
    rooms: Option<u32>,
    /// Number of guards available (1-10).
    #[arg(long)]
    guards: Option<u32>,
    /// Minimum overlap between consecutive rooms (0-0.9).
    #[arg(long)]
    overlap: Option<f64>,
    /// Hide coverage until every guard is placed.
    #[arg(long)]
    blind: bool,
    /// Seed for the first floor plan; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the art gallery command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let file = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };
    let startup = config::resolve(
        file,
        Overrides {
            rooms: cli.rooms,
            guards: cli.guards,
            overlap: cli.overlap,
            blind: cli.blind,
            seed: cli.seed,
        },
    )?;

    let seed = startup.seed.unwrap_or_else(rand::random);
    info!(seed, "starting session");
    let mut session = Session::start(startup.tuning, startup.settings, seed)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", session.greeting())?;
    writeln!(out, "Type `help` to list the available actions.")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match session::parse_action(&line) {
            Ok(action) => match session.execute(action)? {
                Outcome::Continue(message) => writeln!(out, "{message}")?,
                Outcome::Quit => break,
            },
            Err(error) => writeln!(out, "{}", error.render())?,
        }
    }

    info!("session ended");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}
