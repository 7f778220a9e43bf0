#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Tower Defence simulation headless.

use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tower_defence_core::{CellCoord, Event, RunState, TowerKind};
use tower_defence_simulation::{Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);

/// Headless Tower Defence runner.
#[derive(Debug, Parser)]
#[command(name = "tower-defence", version, about)]
struct CliArgs {
    /// TOML file describing the grid, routes, enemies and economy.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Overrides the route selection seed from the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Tower placed before the first tick, as `column,row,kind`.
    #[arg(long = "place", value_name = "X,Y,KIND")]
    placements: Vec<Placement>,
    /// Log filter such as `info` or `tower_defence_world=debug`; defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    cell: CellCoord,
    kind: TowerKind,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(',').map(str::trim);
        let (Some(column), Some(row), Some(kind), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected `column,row,kind`, got `{value}`"));
        };

        let column = column
            .parse::<u32>()
            .map_err(|error| format!("invalid column `{column}`: {error}"))?;
        let row = row
            .parse::<u32>()
            .map_err(|error| format!("invalid row `{row}`: {error}"))?;
        let kind = kind.parse::<TowerKind>().map_err(|error| error.to_string())?;

        Ok(Self {
            cell: CellCoord::new(column, row),
            kind,
        })
    }
}

#[derive(Debug, Default)]
struct RunTally {
    spawned: u32,
    killed: u32,
    escaped: u32,
    shots: u32,
}

impl RunTally {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyKilled { .. } => self.killed += 1,
            Event::EnemyEscaped { .. } => self.escaped += 1,
            Event::ProjectileFired { .. } => self.shots += 1,
            _ => {}
        }
    }
}

/// Entry point for the Tower Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_level.as_deref())?;

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config).context("failed to build simulation")?;

    for placement in &args.placements {
        match simulation.place_tower(placement.cell, placement.kind) {
            Ok(tower) => tracing::info!(
                tower = tower.get(),
                kind = %placement.kind,
                column = placement.cell.column(),
                row = placement.cell.row(),
                "tower placed"
            ),
            Err(reason) => tracing::warn!(
                kind = %placement.kind,
                column = placement.cell.column(),
                row = placement.cell.row(),
                %reason,
                "tower placement rejected"
            ),
        }
    }

    let mut tally = RunTally::default();
    for _ in 0..args.ticks {
        simulation.advance(FRAME);
        for event in simulation.drain_events() {
            tally.record(&event);
        }
        if simulation.run_state() == RunState::GameOver {
            break;
        }
    }

    let economy = simulation.economy();
    println!(
        "tick {} | {:?} | money {} | lives {} | wave {}",
        simulation.tick(),
        simulation.run_state(),
        economy.money,
        economy.lives,
        economy.wave
    );
    println!(
        "enemies spawned {} | killed {} | escaped {} | projectiles fired {}",
        tally.spawned, tally.killed, tally.escaped, tally.shots
    );
    Ok(())
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
