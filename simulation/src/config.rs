//! TOML-backed configuration for a simulation run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tower_defence_core::{CellCoord, EconomySnapshot};
use tower_defence_system_spawning::{Config as SpawningConfig, DEFAULT_SPAWN_PERIOD_TICKS};
use tower_defence_world::{Config as WorldConfig, EnemyTemplate, GridError};

/// Failures raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// The grid or its routes are malformed.
    #[error("invalid grid configuration")]
    Grid(#[from] GridError),
    /// Enemies would never move or would spawn dead.
    #[error("enemy speed must be positive and finite and health non-zero (speed {speed}, health {health})")]
    InvalidEnemy {
        /// Configured speed.
        speed: f32,
        /// Configured health.
        health: u32,
    },
}

/// Complete description of a simulation run.
///
/// Every field is optional in TOML; omitted values fall back to the classic
/// 8 x 6 serpentine map.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed for route selection when several routes exist.
    pub seed: u64,
    /// Grid dimensions and routes.
    pub grid: GridSection,
    /// Enemy template and kill bounty.
    pub enemy: EnemySection,
    /// Starting money, lives and wave.
    pub economy: EconomySection,
    /// Spawn cadence.
    pub spawn: SpawnSection,
}

/// Grid dimensions and routes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Side length of one cell in world units.
    pub cell_size: f32,
    /// Routes as lists of `[column, row]` corner cells.
    pub routes: Vec<Vec<[u32; 2]>>,
}

/// Enemy template and kill bounty.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemySection {
    /// Distance travelled per tick.
    pub speed: f32,
    /// Health at spawn.
    pub health: u32,
    /// Money credited per kill.
    pub bounty: u32,
}

/// Starting money, lives and wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomySection {
    /// Money available at the start.
    pub money: u32,
    /// Lives available at the start.
    pub lives: u32,
    /// Initial wave counter.
    pub wave: u32,
}

/// Spawn cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnSection {
    /// Ticks between spawns; zero disables spawning.
    pub period_ticks: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            columns: world.columns,
            rows: world.rows,
            cell_size: world.cell_size,
            routes: world
                .routes
                .iter()
                .map(|route| {
                    route
                        .iter()
                        .map(|cell| [cell.column(), cell.row()])
                        .collect()
                })
                .collect(),
        }
    }
}

impl Default for EnemySection {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            speed: world.enemy.speed,
            health: world.enemy.health,
            bounty: world.bounty,
        }
    }
}

impl Default for EconomySection {
    fn default() -> Self {
        let start = WorldConfig::default().starting_economy;
        Self {
            money: start.money,
            lives: start.lives,
            wave: start.wave,
        }
    }
}

impl Default for SpawnSection {
    fn default() -> Self {
        Self {
            period_ticks: DEFAULT_SPAWN_PERIOD_TICKS,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks values the grid builder does not cover.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = self.enemy.speed;
        if !speed.is_finite() || speed <= 0.0 || self.enemy.health == 0 {
            return Err(ConfigError::InvalidEnemy {
                speed,
                health: self.enemy.health,
            });
        }
        Ok(())
    }

    /// World parameters derived from this configuration.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            columns: self.grid.columns,
            rows: self.grid.rows,
            cell_size: self.grid.cell_size,
            routes: self
                .grid
                .routes
                .iter()
                .map(|route| {
                    route
                        .iter()
                        .map(|[column, row]| CellCoord::new(*column, *row))
                        .collect()
                })
                .collect(),
            enemy: EnemyTemplate {
                speed: self.enemy.speed,
                health: self.enemy.health,
            },
            bounty: self.enemy.bounty,
            starting_economy: EconomySnapshot {
                money: self.economy.money,
                lives: self.economy.lives,
                wave: self.economy.wave,
            },
        }
    }

    /// Spawning parameters derived from this configuration.
    #[must_use]
    pub fn spawning_config(&self) -> SpawningConfig {
        SpawningConfig::new(self.spawn.period_ticks, self.seed)
    }
}
