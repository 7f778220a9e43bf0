#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use tower_defence_core::{
    Attack, EnemyId, EnemySnapshot, EnemyView, RunState, TowerSnapshot, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<EnemySnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers whose cooldown has elapsed receive the nearest
    /// enemy in range. A cooling beam tower keeps the enemy it holds while
    /// that enemy remains alive and in range.
    pub fn handle(
        &mut self,
        run_state: RunState,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if run_state != RunState::Running || enemies.is_empty() {
            return;
        }

        self.candidates.clear();
        self.candidates
            .extend(enemies.iter().filter(|enemy| enemy.is_alive()).copied());
        if self.candidates.is_empty() {
            return;
        }

        for tower in towers.iter() {
            if tower.cooldown > 0 {
                if let Some(enemy) = held_beam_target(tower, &self.candidates) {
                    out.push(TowerTarget {
                        tower: tower.id,
                        enemy,
                    });
                }
                continue;
            }

            if let Some(enemy) = nearest_in_range(tower, self.candidates.iter()) {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy,
                });
            }
        }
    }
}

/// Selects the enemy closest to the tower centre within the tower's range.
///
/// Dead enemies are ignored. When several enemies are equally close the one
/// spawned first wins, which is the iteration order of [`EnemyView`].
#[must_use]
pub fn find_target(tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    nearest_in_range(tower, enemies.iter().filter(|enemy| enemy.is_alive()))
}

fn nearest_in_range<'a>(
    tower: &TowerSnapshot,
    candidates: impl Iterator<Item = &'a EnemySnapshot>,
) -> Option<EnemyId> {
    let max_distance_sq = tower.range * tower.range;

    let mut best: Option<(f32, EnemyId)> = None;
    for enemy in candidates {
        let distance_sq = tower.center.distance_squared(enemy.position);
        if distance_sq > max_distance_sq {
            continue;
        }
        match best {
            Some((current, _)) if distance_sq >= current => {}
            _ => best = Some((distance_sq, enemy.id)),
        }
    }
    best.map(|(_, enemy)| enemy)
}

fn held_beam_target(tower: &TowerSnapshot, candidates: &[EnemySnapshot]) -> Option<EnemyId> {
    if tower.kind.stats().attack != Attack::Beam {
        return None;
    }
    let held = tower.beam_target?;
    let max_distance_sq = tower.range * tower.range;
    candidates
        .iter()
        .find(|enemy| enemy.id == held)
        .filter(|enemy| tower.center.distance_squared(enemy.position) <= max_distance_sq)
        .map(|enemy| enemy.id)
}
