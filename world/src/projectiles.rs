//! In-flight projectile arena.

use slotmap::SlotMap;
use tower_defence_core::{
    EnemyId, ProjectileId, ProjectileSnapshot, ProjectileView, TowerId, TowerKind, WorldPoint,
};

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) fired_order: u64,
    pub(crate) tower: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) position: WorldPoint,
    pub(crate) target: EnemyId,
    pub(crate) target_position: WorldPoint,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ProjectileArena {
    slots: SlotMap<ProjectileId, ProjectileState>,
    next_fired_order: u64,
}

/// Launch parameters captured from the firing tower.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) tower: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) origin: WorldPoint,
    pub(crate) target: EnemyId,
    pub(crate) target_position: WorldPoint,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
}

impl ProjectileArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let fired_order = self.next_fired_order;
        self.next_fired_order = self.next_fired_order.saturating_add(1);
        self.slots.insert(ProjectileState {
            fired_order,
            tower: launch.tower,
            kind: launch.kind,
            position: launch.origin,
            target: launch.target,
            target_position: launch.target_position,
            damage: launch.damage,
            speed: launch.speed,
        })
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut ProjectileState> {
        self.slots.get_mut(id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<ProjectileState> {
        self.slots.remove(id)
    }

    /// Projectiles launched by `tower`, earliest first.
    pub(crate) fn owned_by(&self, tower: TowerId) -> Vec<ProjectileId> {
        let mut owned: Vec<(u64, ProjectileId)> = self
            .slots
            .iter()
            .filter(|(_, projectile)| projectile.tower == tower)
            .map(|(id, projectile)| (projectile.fired_order, id))
            .collect();
        owned.sort_by_key(|(order, _)| *order);
        owned.into_iter().map(|(_, id)| id).collect()
    }

    pub(crate) fn view(&self) -> ProjectileView {
        ProjectileView::from_snapshots(
            self.slots
                .iter()
                .map(|(id, projectile)| ProjectileSnapshot {
                    id,
                    fired_order: projectile.fired_order,
                    tower: projectile.tower,
                    kind: projectile.kind,
                    position: projectile.position,
                    target: projectile.target,
                    target_position: projectile.target_position,
                    damage: projectile.damage,
                    speed: projectile.speed,
                })
                .collect(),
        )
    }
}
