#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting data into attacks and resolves
//! projectile impacts.

use tower_defence_core::{
    Attack, Command, EnemyView, Impact, ProjectileImpact, RunState, SlowDebuff, TowerId,
    TowerSnapshot, TowerTarget, TowerView, SLOW_DURATION_TICKS,
};

/// Tower combat system that queues attack and impact commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits attack commands for the towers that acquired a target.
    ///
    /// Projectile towers fire once their cooldown has elapsed. Beam towers
    /// damage their target every tick, locking onto it first when it is a
    /// new acquisition. Beam towers left without a target release their beam.
    pub fn handle(
        &mut self,
        run_state: RunState,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if run_state != RunState::Running {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(tower) = find_tower(towers, target.tower) else {
                continue;
            };
            let stats = tower.kind.stats();
            match stats.attack {
                Attack::Projectile { .. } => {
                    if tower.cooldown == 0 {
                        self.scratch.push(Command::FireProjectile {
                            tower: tower.id,
                            target: target.enemy,
                        });
                    }
                }
                Attack::Beam => {
                    if tower.beam_target != Some(target.enemy) {
                        self.scratch.push(Command::LockBeam {
                            tower: tower.id,
                            target: target.enemy,
                        });
                    }
                    self.scratch.push(Command::DamageEnemy {
                        enemy: target.enemy,
                        amount: stats.damage,
                    });
                }
            }
        }

        for tower in towers.iter() {
            if tower.beam_target.is_some()
                && !tower_targets.iter().any(|target| target.tower == tower.id)
            {
                self.scratch.push(Command::ReleaseBeam { tower: tower.id });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Resolves landed projectiles into damage and slow commands.
    ///
    /// Every impacting projectile is removed. Splash damage is centred on the
    /// impact point and reaches every living enemy within the radius; single
    /// and slow impacts only affect the original target while it is alive.
    ///
    /// `tick` is the index of the tick being resolved. Impacts land after the
    /// movement phase, so a slow covers the following
    /// [`SLOW_DURATION_TICKS`] movement phases.
    pub fn resolve_impacts(
        &mut self,
        run_state: RunState,
        tick: u64,
        impacts: &[ProjectileImpact],
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if run_state != RunState::Running || impacts.is_empty() {
            return;
        }

        self.scratch.clear();

        for impact in impacts {
            self.scratch.push(Command::RemoveProjectile {
                projectile: impact.projectile,
            });

            let Attack::Projectile { impact: effect, .. } = impact.kind.stats().attack else {
                continue;
            };
            let target_alive = enemies
                .get(impact.target)
                .is_some_and(|enemy| enemy.is_alive());

            match effect {
                Impact::Single => {
                    if target_alive {
                        self.scratch.push(Command::DamageEnemy {
                            enemy: impact.target,
                            amount: impact.damage,
                        });
                    }
                }
                Impact::Splash { radius } => {
                    let radius_sq = radius * radius;
                    for enemy in enemies.iter().filter(|enemy| enemy.is_alive()) {
                        if enemy.position.distance_squared(impact.point) <= radius_sq {
                            self.scratch.push(Command::DamageEnemy {
                                enemy: enemy.id,
                                amount: impact.damage,
                            });
                        }
                    }
                }
                Impact::Slow { amount } => {
                    if target_alive {
                        self.scratch.push(Command::SlowEnemy {
                            enemy: impact.target,
                            debuff: SlowDebuff::new(amount, tick + 1 + SLOW_DURATION_TICKS),
                        });
                    }
                }
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(towers: &TowerView, tower: TowerId) -> Option<&TowerSnapshot> {
    towers.iter().find(|snapshot| snapshot.id == tower)
}
