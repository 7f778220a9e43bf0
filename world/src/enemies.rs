//! Enemy arena backed by generational handles.

use slotmap::SlotMap;
use tower_defence_core::{
    EnemyId, EnemySnapshot, EnemyView, Health, RouteId, SlowDebuff, WorldPoint,
};

/// Speed and durability assigned to newly spawned enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTemplate {
    /// Distance travelled per tick while unslowed.
    pub speed: f32,
    /// Health at spawn.
    pub health: u32,
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            speed: 4.0,
            health: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) spawn_order: u64,
    pub(crate) route: RouteId,
    pub(crate) position: WorldPoint,
    pub(crate) next_waypoint: u32,
    pub(crate) speed: f32,
    pub(crate) health: Health,
    pub(crate) max_health: Health,
    pub(crate) slow: SlowDebuff,
}

/// Live enemies plus the spawn counter that orders them.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnemyArena {
    slots: SlotMap<EnemyId, EnemyState>,
    next_spawn_order: u64,
}

impl EnemyArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates an enemy standing on the first waypoint and heading for the second.
    pub(crate) fn spawn(
        &mut self,
        route: RouteId,
        position: WorldPoint,
        template: EnemyTemplate,
    ) -> EnemyId {
        let spawn_order = self.next_spawn_order;
        self.next_spawn_order = self.next_spawn_order.saturating_add(1);
        self.slots.insert(EnemyState {
            spawn_order,
            route,
            position,
            next_waypoint: 1,
            speed: template.speed,
            health: Health::new(template.health),
            max_health: Health::new(template.health),
            slow: SlowDebuff::NONE,
        })
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&EnemyState> {
        self.slots.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.slots.get_mut(id)
    }

    pub(crate) fn contains(&self, id: EnemyId) -> bool {
        self.slots.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<EnemyState> {
        self.slots.remove(id)
    }

    /// Drops every enemy without health, returning how many were removed.
    pub(crate) fn prune_dead(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, enemy| !enemy.health.is_zero());
        before - self.slots.len()
    }

    pub(crate) fn view(&self) -> EnemyView {
        EnemyView::from_snapshots(
            self.slots
                .iter()
                .map(|(id, enemy)| EnemySnapshot {
                    id,
                    spawn_order: enemy.spawn_order,
                    route: enemy.route,
                    position: enemy.position,
                    next_waypoint: enemy.next_waypoint,
                    speed: enemy.speed,
                    health: enemy.health,
                    max_health: enemy.max_health,
                    slow: enemy.slow,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_orders_enemies_by_spawn_even_when_slots_are_reused() {
        let mut arena = EnemyArena::new();
        let template = EnemyTemplate::default();
        let first = arena.spawn(RouteId::new(0), WorldPoint::new(0.0, 0.0), template);
        let second = arena.spawn(RouteId::new(0), WorldPoint::new(1.0, 0.0), template);
        let _ = arena.remove(first);
        let third = arena.spawn(RouteId::new(0), WorldPoint::new(2.0, 0.0), template);

        let order: Vec<EnemyId> = arena.view().iter().map(|enemy| enemy.id).collect();
        assert_eq!(order, vec![second, third]);
        assert!(!arena.contains(first));
    }

    #[test]
    fn prune_is_idempotent() {
        let mut arena = EnemyArena::new();
        let template = EnemyTemplate::default();
        let doomed = arena.spawn(RouteId::new(0), WorldPoint::default(), template);
        let _survivor = arena.spawn(RouteId::new(0), WorldPoint::default(), template);
        if let Some(enemy) = arena.get_mut(doomed) {
            enemy.health = Health::new(0);
        }

        assert_eq!(arena.prune_dead(), 1);
        assert_eq!(arena.prune_dead(), 0);
        assert_eq!(arena.view().len(), 1);
    }
}
