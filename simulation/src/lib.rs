#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order simulation loop that drives the Tower Defence systems.
//!
//! [`Simulation`] owns the world together with every system and is the only
//! entry point a host needs: it accepts player commands between ticks,
//! advances the world one tick per [`Simulation::advance`] call and publishes
//! the resulting [`Event`]s to subscribers.

mod config;

use std::{fmt, time::Duration};

use tower_defence_core::{
    CellCoord, Command, EconomySnapshot, EnemySnapshot, Event, PlacementError, ProjectileImpact,
    ProjectileSnapshot, RunState, TowerId, TowerKind, TowerSnapshot, TowerTarget,
};
use tower_defence_system_movement::Movement;
use tower_defence_system_spawning::Spawning;
use tower_defence_system_tower_combat::TowerCombat;
use tower_defence_system_tower_targeting::TowerTargeting;
use tower_defence_world::{self as world, query, World};

pub use config::{
    ConfigError, EconomySection, EnemySection, GridSection, SimulationConfig, SpawnSection,
};

type Subscriber = Box<dyn FnMut(&Event)>;

/// Read-only picture of the simulation handed to presentation layers.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSnapshot {
    /// Ticks completed since the last reset.
    pub tick: u64,
    /// Current lifecycle state.
    pub run_state: RunState,
    /// Money, lives and wave counter.
    pub economy: EconomySnapshot,
    /// Enemies ordered by spawn.
    pub enemies: Vec<EnemySnapshot>,
    /// Towers ordered by identifier.
    pub towers: Vec<TowerSnapshot>,
    /// In-flight projectiles ordered by launch.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Every route expanded to the cells it crosses.
    pub routes: Vec<Vec<CellCoord>>,
    /// Cells that are not part of any route.
    pub buildable: Vec<CellCoord>,
}

/// Owns the world and every system and advances them in a fixed phase order.
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    movement: Movement,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    tower_targets: Vec<TowerTarget>,
    impacts: Vec<ProjectileImpact>,
    commands: Vec<Command>,
    events: Vec<Event>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &query::tick(&self.world))
            .field("run_state", &query::run_state(&self.world))
            .field("economy", &query::economy(&self.world))
            .field("pending_events", &self.events.len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Builds a running simulation, refusing malformed configurations.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::new(&config.world_config())?;
        let spawning = Spawning::new(config.spawning_config());
        tracing::info!(
            routes = query::topology(&world).path().route_count(),
            seed = config.seed,
            "simulation created"
        );

        Ok(Self {
            config,
            world,
            movement: Movement::new(),
            spawning,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            tower_targets: Vec::new(),
            impacts: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
            subscribers: Vec::new(),
        })
    }

    /// Registers a callback invoked for every event, in emission order.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Event) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Removes and returns the events emitted since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Advances the simulation by one tick.
    ///
    /// `dt` is informational; the simulation steps in whole ticks. Nothing
    /// happens unless the run is [`RunState::Running`].
    pub fn advance(&mut self, dt: Duration) {
        if query::run_state(&self.world) != RunState::Running {
            return;
        }
        let first_event = self.events.len();
        let tick = query::tick(&self.world);

        let enemies = query::enemy_view(&self.world);
        self.movement.handle_enemies(
            RunState::Running,
            tick,
            &enemies,
            query::topology(&self.world),
            &mut self.commands,
        );
        self.flush();

        // Escapes are the only way a tick can end the run. The tick that ends
        // it is not counted: the world accepts no Tick once the game is over.
        if query::run_state(&self.world) != RunState::Running {
            self.publish(first_event);
            return;
        }

        let route_count = query::topology(&self.world).path().route_count();
        self.spawning
            .handle(RunState::Running, route_count, &mut self.commands);
        self.flush();

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .handle(RunState::Running, &towers, &enemies, &mut self.tower_targets);
        self.combat
            .handle(RunState::Running, &towers, &self.tower_targets, &mut self.commands);
        self.flush();

        let projectiles = query::projectile_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.movement.handle_projectiles(
            RunState::Running,
            &projectiles,
            &enemies,
            &mut self.commands,
            &mut self.impacts,
        );
        self.flush();

        let enemies = query::enemy_view(&self.world);
        self.combat.resolve_impacts(
            RunState::Running,
            tick,
            &self.impacts,
            &enemies,
            &mut self.commands,
        );
        self.flush();

        self.commands.push(Command::PruneEnemies);
        self.commands.push(Command::Tick { dt });
        self.flush();

        tracing::trace!(
            tick = query::tick(&self.world),
            enemies = query::enemy_view(&self.world).len(),
            projectiles = query::projectile_view(&self.world).iter().count(),
            "tick advanced"
        );
        self.publish(first_event);
    }

    /// Attempts to place a tower, spending its cost on success.
    pub fn place_tower(&mut self, cell: CellCoord, kind: TowerKind) -> Result<TowerId, PlacementError> {
        let first_event = self.events.len();
        self.commands.push(Command::PlaceTower { kind, cell });
        self.flush();

        let outcome = self.events[first_event..]
            .iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::NotRunning));
        self.publish(first_event);
        outcome
    }

    /// Flips between running and paused and reports whether the run is now
    /// paused. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) -> bool {
        let first_event = self.events.len();
        self.commands.push(Command::TogglePause);
        self.flush();
        self.publish(first_event);
        query::run_state(&self.world) == RunState::Paused
    }

    /// Increments the informational wave counter and returns its new value.
    pub fn advance_wave(&mut self) -> u32 {
        let first_event = self.events.len();
        self.commands.push(Command::AdvanceWave);
        self.flush();
        self.publish(first_event);
        query::economy(&self.world).wave
    }

    /// Replaces the whole state with a fresh running game.
    ///
    /// The grid and configuration are kept, as are subscribers, which are
    /// told about the restored run state and economy.
    pub fn reset(&mut self) -> SimulationSnapshot {
        self.world = self.world.restarted();
        self.spawning = Spawning::new(self.config.spawning_config());
        self.tower_targets.clear();
        self.impacts.clear();
        self.commands.clear();
        tracing::info!("simulation reset");

        let first_event = self.events.len();
        let economy = query::economy(&self.world);
        self.events.extend([
            Event::RunStateChanged {
                state: RunState::Running,
            },
            Event::MoneyChanged {
                money: economy.money,
            },
            Event::LivesChanged {
                lives: economy.lives,
            },
            Event::WaveChanged { wave: economy.wave },
        ]);
        self.publish(first_event);
        self.snapshot()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        query::run_state(&self.world)
    }

    /// Ticks completed since the last reset.
    #[must_use]
    pub fn tick(&self) -> u64 {
        query::tick(&self.world)
    }

    /// Money, lives and wave counter.
    #[must_use]
    pub fn economy(&self) -> EconomySnapshot {
        query::economy(&self.world)
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the underlying world for custom queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures everything a presentation layer needs to draw a frame.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        let topology = query::topology(&self.world);
        SimulationSnapshot {
            tick: query::tick(&self.world),
            run_state: query::run_state(&self.world),
            economy: query::economy(&self.world),
            enemies: query::enemy_view(&self.world).into_vec(),
            towers: query::tower_view(&self.world).into_vec(),
            projectiles: query::projectile_view(&self.world).into_vec(),
            routes: topology
                .path()
                .routes()
                .map(|(_, cells)| cells.to_vec())
                .collect(),
            buildable: topology.buildable().iter().collect(),
        }
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn publish(&mut self, first_event: usize) {
        if self.subscribers.is_empty() {
            return;
        }
        for event in &self.events[first_event..] {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }
    }
}
