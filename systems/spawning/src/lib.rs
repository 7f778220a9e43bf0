#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{Command, RouteId, RunState};

/// Ticks between spawns when no other cadence is configured.
pub const DEFAULT_SPAWN_PERIOD_TICKS: u32 = 60;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    period_ticks: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    ///
    /// A period of zero disables spawning.
    #[must_use]
    pub const fn new(period_ticks: u32, rng_seed: u64) -> Self {
        Self {
            period_ticks,
            rng_seed,
        }
    }

    /// Ticks between two consecutive spawns.
    #[must_use]
    pub const fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    /// Seed for route selection.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_PERIOD_TICKS, 0)
    }
}

/// Pure system that deterministically emits spawn commands while running.
#[derive(Clone, Debug)]
pub struct Spawning {
    period_ticks: u32,
    accumulator: u32,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            period_ticks: config.period_ticks,
            accumulator: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Advances the spawn timer by one tick and emits a spawn when it is due.
    ///
    /// The timer is frozen while the run is not [`RunState::Running`].
    pub fn handle(&mut self, run_state: RunState, route_count: usize, out: &mut Vec<Command>) {
        if run_state != RunState::Running || self.period_ticks == 0 || route_count == 0 {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(1);
        if self.accumulator < self.period_ticks {
            return;
        }
        self.accumulator = 0;

        let route = self.select_route(route_count);
        out.push(Command::SpawnEnemy { route });
    }

    fn select_route(&mut self, route_count: usize) -> RouteId {
        debug_assert!(route_count > 0, "select_route requires routes");
        if route_count == 1 {
            return RouteId::new(0);
        }
        let index = self.rng.gen_range(0..route_count);
        RouteId::new(u32::try_from(index).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_route_is_always_selected() {
        let mut spawning = Spawning::new(Config::new(1, 99));
        for _ in 0..16 {
            assert_eq!(spawning.select_route(1), RouteId::new(0));
        }
    }

    #[test]
    fn selected_routes_stay_in_bounds() {
        let mut spawning = Spawning::new(Config::new(1, 7));
        for _ in 0..64 {
            assert!(spawning.select_route(3).get() < 3);
        }
    }
}
