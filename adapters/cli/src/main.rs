#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Waypoint Defence headlessly.

mod orders;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, trace, warn};
use tracing_subscriber::EnvFilter;
use waypoint_defence_config::GameConfig;
use waypoint_defence_core::{Event, Outcome};
use waypoint_defence_simulation::{Simulation, TimeScale};
use waypoint_defence_world::query;

use orders::BuildOrder;

/// Plays rounds of a track without rendering.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version)]
struct Cli {
    /// Track configuration in TOML; the built-in track when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of rounds to play; every round of the track when omitted.
    #[arg(long)]
    rounds: Option<usize>,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Upper bound on ticks spent in a single round.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u32,
    /// Turret to buy before the first round, as NODE:KIND. Repeatable.
    #[arg(long = "build", value_name = "NODE:KIND")]
    builds: Vec<BuildOrder>,
    /// Run the simulation at double speed.
    #[arg(long)]
    fast: bool,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if cli.tick_ms == 0 {
        bail!("--tick-ms must be positive");
    }

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load track from {}", path.display()))?,
        None => GameConfig::default_track().context("built-in track is invalid")?,
    };

    let mut simulation = Simulation::new(&config);
    simulation.add_observer(Box::new(|event: &Event| trace!(?event, "event")));
    println!("{}", query::welcome_banner(simulation.world()));

    for order in &cli.builds {
        let events = simulation.place_turret(order.node, order.kind);
        if let Some(Event::PlacementRejected { reason, .. }) = events
            .iter()
            .find(|event| matches!(event, Event::PlacementRejected { .. }))
        {
            warn!(node = order.node.get(), kind = ?order.kind, ?reason, "purchase rejected");
        }
    }
    if cli.fast && simulation.toggle_time_scale() != TimeScale::Double {
        warn!("double speed unavailable");
    }

    let rounds = cli
        .rounds
        .unwrap_or(simulation.rounds_total())
        .min(simulation.rounds_total());
    let tick = Duration::from_millis(cli.tick_ms);

    for _ in 0..rounds {
        if simulation.is_inert() {
            break;
        }
        let _ = simulation.start_next_round();
        play_round(&mut simulation, tick, cli.max_ticks)?;

        let economy = query::economy(simulation.world());
        info!(
            round = economy.rounds(),
            money = economy.money(),
            lives = economy.lives(),
            "round finished"
        );
    }

    let economy = query::economy(simulation.world());
    let verdict = match simulation.outcome() {
        Some(Outcome::Won) => "won",
        Some(Outcome::Lost) => "lost",
        None => "undecided",
    };
    println!(
        "{verdict} after {} round(s): {} lives, {} money",
        economy.rounds(),
        economy.lives(),
        economy.money()
    );
    let _ = simulation.teardown();
    Ok(())
}

/// Steps until the running round completes or the level is decided.
fn play_round(simulation: &mut Simulation, tick: Duration, max_ticks: u32) -> Result<()> {
    for _ in 0..max_ticks {
        if !simulation.round_in_progress() || simulation.is_inert() {
            return Ok(());
        }
        let _ = simulation.step(tick);
    }
    bail!(
        "round {} did not finish within {max_ticks} ticks",
        simulation.round_index()
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
