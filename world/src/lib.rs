#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tower Defence.
//!
//! The world owns the grid topology, every live entity and the economy. It is
//! mutated exclusively through [`apply`], which reports every observable
//! change as an [`Event`]. Read access goes through the [`query`] module.

mod economy;
mod enemies;
mod grid;
mod projectiles;
mod towers;

use std::sync::Arc;

use tower_defence_core::{
    Attack, CellCoord, Command, EconomySnapshot, EnemyId, Event, PlacementError, ProjectileId,
    RouteId, RunState, SlowDebuff, TowerId, TowerKind, WorldPoint,
};

pub use enemies::EnemyTemplate;
pub use grid::{default_routes, BuildableSet, GridError, GridTopology, Path, MAX_GRID_CELLS};

use economy::EconomyLedger;
use enemies::EnemyArena;
use projectiles::{Launch, ProjectileArena};
use towers::TowerRegistry;

const DEFAULT_GRID_COLUMNS: u32 = 8;
const DEFAULT_GRID_ROWS: u32 = 6;
const DEFAULT_CELL_SIZE: f32 = 100.0;
const DEFAULT_BOUNTY: u32 = 10;
const STARTING_ECONOMY: EconomySnapshot = EconomySnapshot {
    money: 100,
    lives: 10,
    wave: 1,
};

/// Static parameters used to build a world.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Side length of one cell in world units.
    pub cell_size: f32,
    /// Routes authored as axis-aligned corner cells.
    pub routes: Vec<Vec<CellCoord>>,
    /// Speed and health of spawned enemies.
    pub enemy: EnemyTemplate,
    /// Money credited for each kill.
    pub bounty: u32,
    /// Money, lives and wave counter at the start of a game.
    pub starting_economy: EconomySnapshot,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            cell_size: DEFAULT_CELL_SIZE,
            routes: default_routes(),
            enemy: EnemyTemplate::default(),
            bounty: DEFAULT_BOUNTY,
            starting_economy: STARTING_ECONOMY,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Rules {
    enemy: EnemyTemplate,
    bounty: u32,
    starting_economy: EconomySnapshot,
}

/// Represents the authoritative Tower Defence world state.
#[derive(Clone, Debug)]
pub struct World {
    topology: Arc<GridTopology>,
    rules: Rules,
    run_state: RunState,
    tick_index: u64,
    enemies: EnemyArena,
    projectiles: ProjectileArena,
    towers: TowerRegistry,
    economy: EconomyLedger,
}

impl World {
    /// Creates a running world, validating the grid configuration.
    pub fn new(config: &Config) -> Result<Self, GridError> {
        let topology =
            GridTopology::build(config.columns, config.rows, config.cell_size, &config.routes)?;
        let rules = Rules {
            enemy: config.enemy,
            bounty: config.bounty,
            starting_economy: config.starting_economy,
        };
        Ok(Self::with_topology(Arc::new(topology), rules))
    }

    /// Produces a fresh running world that shares this world's topology and rules.
    #[must_use]
    pub fn restarted(&self) -> Self {
        Self::with_topology(Arc::clone(&self.topology), self.rules)
    }

    fn with_topology(topology: Arc<GridTopology>, rules: Rules) -> Self {
        Self {
            topology,
            rules,
            run_state: RunState::Running,
            tick_index: 0,
            enemies: EnemyArena::new(),
            projectiles: ProjectileArena::new(),
            towers: TowerRegistry::new(),
            economy: EconomyLedger::new(rules.starting_economy),
        }
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self.try_place_tower(kind, cell) {
            Ok(tower) => {
                tracing::debug!(tower = tower.get(), ?kind, ?cell, "tower placed");
                out_events.push(Event::TowerPlaced { tower, kind, cell });
                out_events.push(Event::MoneyChanged {
                    money: self.economy.money(),
                });
            }
            Err(reason) => {
                tracing::debug!(?kind, ?cell, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        }
    }

    fn try_place_tower(&mut self, kind: TowerKind, cell: CellCoord) -> Result<TowerId, PlacementError> {
        if self.run_state != RunState::Running {
            return Err(PlacementError::NotRunning);
        }
        if !self.topology.is_buildable(cell) {
            return Err(PlacementError::NotBuildable);
        }
        if self.towers.at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }
        if !self.economy.try_purchase(kind.stats().cost) {
            return Err(PlacementError::InsufficientFunds);
        }
        Ok(self.towers.insert(kind, cell))
    }

    fn toggle_pause(&mut self, out_events: &mut Vec<Event>) {
        let next = match self.run_state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::GameOver => return,
        };
        self.run_state = next;
        tracing::info!(state = ?next, tick = self.tick_index, "run state changed");
        out_events.push(Event::RunStateChanged { state: next });
    }

    fn spawn_enemy(&mut self, route: RouteId, out_events: &mut Vec<Event>) {
        let Some(start) = self.topology.waypoint_position(route, 0) else {
            tracing::warn!(route = route.get(), "spawn requested on unknown route");
            return;
        };
        let enemy = self.enemies.spawn(route, start, self.rules.enemy);
        out_events.push(Event::EnemySpawned { enemy, route });
    }

    fn move_enemy(&mut self, id: EnemyId, position: WorldPoint, next_waypoint: u32) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        let route_len = self
            .topology
            .path()
            .route(enemy.route)
            .and_then(|cells| u32::try_from(cells.len()).ok())
            .unwrap_or(0);
        enemy.position = position;
        enemy.next_waypoint = next_waypoint.min(route_len);
    }

    fn escape_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.remove(enemy).is_none() {
            return;
        }
        out_events.push(Event::EnemyEscaped { enemy });

        let loss = self.economy.enemy_escaped();
        tracing::debug!(lives = loss.lives, "enemy escaped");
        out_events.push(Event::LivesChanged { lives: loss.lives });

        if loss.game_over {
            self.run_state = RunState::GameOver;
            tracing::info!(tick = self.tick_index, "player ran out of lives");
            out_events.push(Event::RunStateChanged {
                state: RunState::GameOver,
            });
            out_events.push(Event::GameOver);
        }
    }

    fn fire_projectile(&mut self, tower_id: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        if tower.cooldown > 0 {
            return;
        }
        let stats = tower.kind.stats();
        let Attack::Projectile { speed, .. } = stats.attack else {
            return;
        };
        let Some(enemy) = self.enemies.get(target) else {
            return;
        };

        let projectile = self.projectiles.launch(Launch {
            tower: tower_id,
            kind: tower.kind,
            origin: self.topology.cell_center(tower.cell),
            target,
            target_position: enemy.position,
            damage: stats.damage,
            speed,
        });
        tower.reload();
        out_events.push(Event::ProjectileFired {
            projectile,
            tower: tower_id,
            target,
        });
    }

    fn lock_beam(&mut self, tower_id: TowerId, target: EnemyId) {
        let Some(tower) = self.towers.get_mut(tower_id) else {
            return;
        };
        if tower.kind.stats().attack != Attack::Beam || !self.enemies.contains(target) {
            return;
        }
        tower.beam_target = Some(target);
        tower.reload();
    }

    fn release_beam(&mut self, tower_id: TowerId) {
        if let Some(tower) = self.towers.get_mut(tower_id) {
            tower.beam_target = None;
        }
    }

    fn damage_enemy(&mut self, id: EnemyId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        if enemy.health.is_zero() || amount == 0 {
            return;
        }

        enemy.health = enemy.health.saturating_sub(amount);
        if enemy.health.is_zero() {
            let bounty = self.rules.bounty;
            let money = self.economy.credit_kill(bounty);
            tracing::debug!(bounty, money, "enemy killed");
            out_events.push(Event::EnemyKilled { enemy: id, bounty });
            out_events.push(Event::MoneyChanged { money });
        }
    }

    fn slow_enemy(&mut self, id: EnemyId, debuff: SlowDebuff) {
        if let Some(enemy) = self.enemies.get_mut(id) {
            if !enemy.health.is_zero() {
                enemy.slow = debuff;
            }
        }
    }

    fn move_projectile(
        &mut self,
        id: ProjectileId,
        position: WorldPoint,
        target_position: WorldPoint,
    ) {
        if let Some(projectile) = self.projectiles.get_mut(id) {
            projectile.position = position;
            projectile.target_position = target_position;
        }
    }

    fn close_tick(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        self.towers.cool_down();
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            dt,
            tick: self.tick_index,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Placement, pause and wave commands are always evaluated; every other
/// command is ignored unless the world is [`RunState::Running`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::TogglePause => world.toggle_pause(out_events),
        Command::AdvanceWave => {
            if world.run_state != RunState::GameOver {
                let wave = world.economy.advance_wave();
                out_events.push(Event::WaveChanged { wave });
            }
        }
        _ if world.run_state != RunState::Running => {}
        Command::SpawnEnemy { route } => world.spawn_enemy(route, out_events),
        Command::MoveEnemy {
            enemy,
            position,
            next_waypoint,
        } => world.move_enemy(enemy, position, next_waypoint),
        Command::EscapeEnemy { enemy } => world.escape_enemy(enemy, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events)
        }
        Command::LockBeam { tower, target } => world.lock_beam(tower, target),
        Command::ReleaseBeam { tower } => world.release_beam(tower),
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::SlowEnemy { enemy, debuff } => world.slow_enemy(enemy, debuff),
        Command::MoveProjectile {
            projectile,
            position,
            target_position,
        } => world.move_projectile(projectile, position, target_position),
        Command::RemoveProjectile { projectile } => {
            let _ = world.projectiles.remove(projectile);
        }
        Command::PruneEnemies => {
            let removed = world.enemies.prune_dead();
            if removed > 0 {
                tracing::trace!(removed, "pruned dead enemies");
            }
        }
        Command::Tick { dt } => world.close_tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tower_defence_core::{
        CellCoord, EconomySnapshot, EnemyView, ProjectileId, ProjectileView, RunState, TowerId,
        TowerSnapshot, TowerView,
    };

    use crate::GridTopology;

    /// Current lifecycle state.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run_state
    }

    /// Number of ticks completed since the world started.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick_index
    }

    /// Money, lives and wave counter.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Money credited for each kill.
    #[must_use]
    pub fn bounty(world: &World) -> u32 {
        world.rules.bounty
    }

    /// Provides read-only access to the immutable grid topology.
    #[must_use]
    pub fn topology(world: &World) -> &GridTopology {
        &world.topology
    }

    /// Captures a read-only view of the enemies, oldest spawn first.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.enemies.view()
    }

    /// Captures a read-only view of the placed towers.
    ///
    /// Beam targets whose enemy no longer exists are reported as `None`.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|(id, tower)| TowerSnapshot {
                    id,
                    kind: tower.kind,
                    level: tower.level,
                    cell: tower.cell,
                    center: world.topology.cell_center(tower.cell),
                    range: tower.kind.stats().range,
                    cooldown: tower.cooldown,
                    beam_target: tower
                        .beam_target
                        .filter(|enemy| world.enemies.contains(*enemy)),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the in-flight projectiles.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        world.projectiles.view()
    }

    /// Tower standing on the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.at(cell)
    }

    /// In-flight projectiles launched by the provided tower.
    #[must_use]
    pub fn projectiles_of(world: &World, tower: TowerId) -> Vec<ProjectileId> {
        world.projectiles.owned_by(tower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tower_defence_core::Health;

    fn world() -> World {
        World::new(&Config::default()).expect("default config is valid")
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    fn spawn(world: &mut World) -> EnemyId {
        let events = run(
            world,
            vec![Command::SpawnEnemy {
                route: RouteId::new(0),
            }],
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy, .. }] => *enemy,
            other => panic!("unexpected spawn events: {other:?}"),
        }
    }

    fn place(world: &mut World, kind: TowerKind, cell: CellCoord) -> TowerId {
        let events = run(world, vec![Command::PlaceTower { kind, cell }]);
        match events.first() {
            Some(Event::TowerPlaced { tower, .. }) => *tower,
            other => panic!("placement failed: {other:?}"),
        }
    }

    #[test]
    fn new_world_starts_running_with_default_economy() {
        let world = world();

        assert_eq!(query::run_state(&world), RunState::Running);
        assert_eq!(query::tick(&world), 0);
        assert_eq!(
            query::economy(&world),
            EconomySnapshot {
                money: 100,
                lives: 10,
                wave: 1
            }
        );
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn malformed_route_refuses_to_build() {
        let config = Config {
            routes: vec![vec![CellCoord::new(0, 0), CellCoord::new(3, 3)]],
            ..Config::default()
        };
        assert!(matches!(
            World::new(&config),
            Err(GridError::Disconnected { .. })
        ));
    }

    #[test]
    fn placement_spends_money_until_funds_run_out() {
        let mut world = world();

        let events = run(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(0, 0),
                },
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(1, 0),
                },
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(2, 0),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::TowerPlaced {
                    tower: TowerId::new(0),
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(0, 0),
                },
                Event::MoneyChanged { money: 50 },
                Event::TowerPlaced {
                    tower: TowerId::new(1),
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(1, 0),
                },
                Event::MoneyChanged { money: 0 },
                Event::TowerPlacementRejected {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(2, 0),
                    reason: PlacementError::InsufficientFunds,
                },
            ]
        );
        assert_eq!(query::economy(&world).money, 0);
        assert_eq!(query::tower_view(&world).iter().count(), 2);
    }

    #[test]
    fn tower_view_reports_the_engagement_range() {
        let mut world = world();
        let tower = place(&mut world, TowerKind::Basic, CellCoord::new(0, 0));

        let view = query::tower_view(&world);
        let snapshot = view.iter().find(|snapshot| snapshot.id == tower);

        assert_eq!(snapshot.map(|snapshot| snapshot.range), Some(250.0));
    }

    #[test]
    fn placement_rejects_path_and_occupied_cells() {
        let mut world = world();
        let _ = place(&mut world, TowerKind::Basic, CellCoord::new(2, 2));

        let events = run(
            &mut world,
            vec![
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(2, 3),
                },
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(2, 2),
                },
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(40, 40),
                },
            ],
        );

        let reasons: Vec<PlacementError> = events
            .iter()
            .filter_map(|event| match event {
                Event::TowerPlacementRejected { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                PlacementError::NotBuildable,
                PlacementError::Occupied,
                PlacementError::NotBuildable,
            ]
        );
        assert_eq!(query::economy(&world).money, 50);
        assert_eq!(query::tower_view(&world).iter().count(), 1);
    }

    #[test]
    fn paused_world_ignores_simulation_commands_and_placement() {
        let mut world = world();
        let events = run(
            &mut world,
            vec![
                Command::TogglePause,
                Command::SpawnEnemy {
                    route: RouteId::new(0),
                },
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                Command::PlaceTower {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(0, 0),
                },
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::RunStateChanged {
                    state: RunState::Paused
                },
                Event::TowerPlacementRejected {
                    kind: TowerKind::Basic,
                    cell: CellCoord::new(0, 0),
                    reason: PlacementError::NotRunning,
                },
            ]
        );
        assert_eq!(query::tick(&world), 0);
        assert!(query::enemy_view(&world).is_empty());

        let events = run(&mut world, vec![Command::TogglePause]);
        assert_eq!(
            events,
            vec![Event::RunStateChanged {
                state: RunState::Running
            }]
        );
    }

    #[test]
    fn enemies_spawn_on_the_first_waypoint() {
        let mut world = world();
        let enemy = spawn(&mut world);

        let view = query::enemy_view(&world);
        let snapshot = view.get(enemy).expect("spawned enemy");
        assert_eq!(snapshot.position, WorldPoint::new(50.0, 350.0));
        assert_eq!(snapshot.next_waypoint, 1);
        assert_eq!(snapshot.health, Health::new(100));
        assert_eq!(snapshot.max_health, Health::new(100));
    }

    #[test]
    fn escapes_cost_lives_and_last_life_ends_the_game() {
        let config = Config {
            starting_economy: EconomySnapshot {
                money: 100,
                lives: 2,
                wave: 1,
            },
            ..Config::default()
        };
        let mut world = World::new(&config).expect("valid config");
        let first = spawn(&mut world);
        let second = spawn(&mut world);
        let third = spawn(&mut world);

        let events = run(&mut world, vec![Command::EscapeEnemy { enemy: first }]);
        assert_eq!(
            events,
            vec![
                Event::EnemyEscaped { enemy: first },
                Event::LivesChanged { lives: 1 },
            ]
        );
        assert_eq!(query::run_state(&world), RunState::Running);

        let events = run(
            &mut world,
            vec![
                Command::EscapeEnemy { enemy: second },
                Command::EscapeEnemy { enemy: third },
                Command::TogglePause,
            ],
        );
        assert_eq!(
            events,
            vec![
                Event::EnemyEscaped { enemy: second },
                Event::LivesChanged { lives: 0 },
                Event::RunStateChanged {
                    state: RunState::GameOver
                },
                Event::GameOver,
            ]
        );
        assert_eq!(query::run_state(&world), RunState::GameOver);
        assert_eq!(query::economy(&world).lives, 0);
        assert_eq!(query::enemy_view(&world).len(), 1);
    }

    #[test]
    fn kill_bounty_is_credited_once_per_enemy() {
        let mut world = world();
        let enemy = spawn(&mut world);

        let events = run(
            &mut world,
            vec![
                Command::DamageEnemy { enemy, amount: 60 },
                Command::DamageEnemy { enemy, amount: 60 },
                Command::DamageEnemy { enemy, amount: 60 },
                Command::PruneEnemies,
                Command::PruneEnemies,
            ],
        );

        assert_eq!(
            events,
            vec![
                Event::EnemyKilled { enemy, bounty: 10 },
                Event::MoneyChanged { money: 110 },
            ]
        );
        assert_eq!(query::economy(&world).money, 110);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn stale_handle_does_not_reach_a_reused_slot() {
        let mut world = world();
        let old = spawn(&mut world);
        let _ = run(
            &mut world,
            vec![
                Command::DamageEnemy {
                    enemy: old,
                    amount: 100,
                },
                Command::PruneEnemies,
            ],
        );
        let fresh = spawn(&mut world);

        let events = run(
            &mut world,
            vec![Command::DamageEnemy {
                enemy: old,
                amount: 30,
            }],
        );

        assert!(events.is_empty());
        let view = query::enemy_view(&world);
        assert_eq!(view.get(fresh).map(|enemy| enemy.health), Some(Health::new(100)));
    }

    #[test]
    fn firing_restarts_cooldown_and_launches_projectile() {
        let mut world = world();
        let tower = place(&mut world, TowerKind::Splash, CellCoord::new(1, 2));
        let enemy = spawn(&mut world);

        let events = run(
            &mut world,
            vec![
                Command::FireProjectile {
                    tower,
                    target: enemy,
                },
                Command::FireProjectile {
                    tower,
                    target: enemy,
                },
            ],
        );
        assert_eq!(events.len(), 1, "cooling tower must not fire twice");

        let projectiles = query::projectile_view(&world).into_vec();
        assert_eq!(projectiles.len(), 1);
        assert_eq!(projectiles[0].position, WorldPoint::new(150.0, 250.0));
        assert_eq!(projectiles[0].damage, 50);
        assert_eq!(projectiles[0].kind, TowerKind::Splash);
        assert_eq!(query::projectiles_of(&world, tower), vec![projectiles[0].id]);

        let cooldown = |world: &World| {
            query::tower_view(world)
                .iter()
                .next()
                .map(|tower| tower.cooldown)
        };
        assert_eq!(cooldown(&world), Some(60));

        let _ = run(
            &mut world,
            vec![Command::Tick {
                dt: Duration::from_millis(16),
            }],
        );
        assert_eq!(cooldown(&world), Some(60));

        let _ = run(
            &mut world,
            vec![Command::Tick {
                dt: Duration::from_millis(16),
            }],
        );
        assert_eq!(cooldown(&world), Some(59));
    }

    #[test]
    fn beam_target_is_hidden_once_the_enemy_is_gone() {
        let config = Config {
            starting_economy: EconomySnapshot {
                money: 500,
                lives: 10,
                wave: 1,
            },
            ..Config::default()
        };
        let mut world = World::new(&config).expect("valid config");
        let tower = place(&mut world, TowerKind::Beam, CellCoord::new(1, 2));
        let enemy = spawn(&mut world);

        let _ = run(
            &mut world,
            vec![Command::LockBeam {
                tower,
                target: enemy,
            }],
        );
        let beam_target = |world: &World| {
            query::tower_view(world)
                .iter()
                .next()
                .and_then(|tower| tower.beam_target)
        };
        assert_eq!(beam_target(&world), Some(enemy));

        let _ = run(
            &mut world,
            vec![
                Command::DamageEnemy { enemy, amount: 100 },
                Command::PruneEnemies,
            ],
        );
        assert_eq!(beam_target(&world), None);
    }

    #[test]
    fn slow_only_sticks_to_living_enemies() {
        let mut world = world();
        let alive = spawn(&mut world);
        let dead = spawn(&mut world);
        let debuff = SlowDebuff::new(0.5, 180);

        let _ = run(
            &mut world,
            vec![
                Command::DamageEnemy {
                    enemy: dead,
                    amount: 100,
                },
                Command::SlowEnemy {
                    enemy: alive,
                    debuff,
                },
                Command::SlowEnemy {
                    enemy: dead,
                    debuff,
                },
            ],
        );

        let view = query::enemy_view(&world);
        assert_eq!(view.get(alive).map(|enemy| enemy.slow), Some(debuff));
        assert_eq!(view.get(dead).map(|enemy| enemy.slow), Some(SlowDebuff::NONE));
    }

    #[test]
    fn restarted_world_keeps_topology_and_drops_state() {
        let mut world = world();
        let _ = place(&mut world, TowerKind::Basic, CellCoord::new(0, 0));
        let _ = spawn(&mut world);
        let _ = run(&mut world, vec![Command::AdvanceWave]);

        let fresh = world.restarted();

        assert_eq!(query::topology(&fresh), query::topology(&world));
        assert_eq!(
            query::economy(&fresh),
            EconomySnapshot {
                money: 100,
                lives: 10,
                wave: 1
            }
        );
        assert!(query::enemy_view(&fresh).is_empty());
        assert_eq!(query::tower_view(&fresh).iter().count(), 0);
        assert_eq!(query::bounty(&fresh), 10);
    }
}
