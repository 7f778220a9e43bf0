#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure kinematics system that advances enemies along their routes and
//! projectiles toward their targets.

use tower_defence_core::{
    Command, EnemySnapshot, EnemyView, ProjectileImpact, ProjectileView, RunState,
    PROJECTILE_IMPACT_RADIUS,
};
use tower_defence_world::GridTopology;

/// Slack absorbing float rounding when an enemy lands exactly on a waypoint.
const SNAP_TOLERANCE: f32 = 1.0e-3;

/// Movement system that converts immutable views into position commands.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `MoveEnemy` or `EscapeEnemy` for every living enemy.
    ///
    /// An enemy travels `speed * (1 - slow)` units toward its next waypoint.
    /// When the waypoint is within reach it snaps onto it and heads for the
    /// following one; surplus travel is discarded. Snapping onto the final
    /// waypoint of its route makes the enemy escape on the same tick.
    pub fn handle_enemies(
        &mut self,
        run_state: RunState,
        tick: u64,
        enemies: &EnemyView,
        topology: &GridTopology,
        out: &mut Vec<Command>,
    ) {
        if run_state != RunState::Running || enemies.is_empty() {
            return;
        }

        self.scratch.clear();
        for enemy in enemies.iter().filter(|enemy| enemy.is_alive()) {
            if let Some(command) = step_enemy(enemy, tick, topology) {
                self.scratch.push(command);
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Emits projectile movement commands and reports the projectiles that
    /// reached their target.
    ///
    /// Projectiles whose target has been removed are discarded without
    /// effect. A target that died this tick but is still awaiting pruning is
    /// tracked as usual, so a landing splash still hits its neighbours.
    /// Impacts are reported through `impacts` for the combat system to
    /// resolve; the projectile itself is removed once the impact is applied.
    pub fn handle_projectiles(
        &mut self,
        run_state: RunState,
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
        impacts: &mut Vec<ProjectileImpact>,
    ) {
        impacts.clear();
        if run_state != RunState::Running {
            return;
        }

        self.scratch.clear();
        for projectile in projectiles.iter() {
            let Some(target) = enemies.get(projectile.target) else {
                tracing::trace!(?projectile.id, "projectile lost its target");
                self.scratch.push(Command::RemoveProjectile {
                    projectile: projectile.id,
                });
                continue;
            };

            if projectile.position.distance(target.position) < PROJECTILE_IMPACT_RADIUS {
                impacts.push(ProjectileImpact {
                    projectile: projectile.id,
                    kind: projectile.kind,
                    damage: projectile.damage,
                    target: projectile.target,
                    point: target.position,
                });
                continue;
            }

            self.scratch.push(Command::MoveProjectile {
                projectile: projectile.id,
                position: projectile
                    .position
                    .step_towards(target.position, projectile.speed),
                target_position: target.position,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn step_enemy(enemy: &EnemySnapshot, tick: u64, topology: &GridTopology) -> Option<Command> {
    let route_len = topology.path().route(enemy.route)?.len();
    let index = usize::try_from(enemy.next_waypoint).ok()?;
    if index >= route_len {
        return Some(Command::EscapeEnemy { enemy: enemy.id });
    }

    let waypoint = topology.waypoint_position(enemy.route, enemy.next_waypoint)?;
    let travel = enemy.speed * (1.0 - enemy.slow.multiplier_at(tick));
    if enemy.position.distance(waypoint) <= travel + SNAP_TOLERANCE {
        let next_waypoint = enemy.next_waypoint.saturating_add(1);
        if index + 1 >= route_len {
            return Some(Command::EscapeEnemy { enemy: enemy.id });
        }
        return Some(Command::MoveEnemy {
            enemy: enemy.id,
            position: waypoint,
            next_waypoint,
        });
    }

    Some(Command::MoveEnemy {
        enemy: enemy.id,
        position: enemy.position.step_towards(waypoint, travel),
        next_waypoint: enemy.next_waypoint,
    })
}
