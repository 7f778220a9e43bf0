//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use tower_defence_core::{CellCoord, EnemyId, TowerId, TowerKind};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Upgrade level; placement always yields level 1.
    pub(crate) level: u32,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// Ticks remaining before the tower may fire again.
    pub(crate) cooldown: u32,
    /// Set when the cooldown was restarted during the current tick.
    pub(crate) reloaded: bool,
    /// Weak handle to the enemy held by a beam tower.
    pub(crate) beam_target: Option<EnemyId>,
}

impl TowerState {
    /// Restarts the cooldown so the current tick does not count toward it.
    pub(crate) fn reload(&mut self) {
        self.cooldown = self.kind.stats().fire_rate;
        self.reloaded = true;
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                kind,
                level: 1,
                cell,
                cooldown: 0,
                reloaded: false,
                beam_target: None,
            },
        );
        id
    }

    /// Tower standing on `cell`, if any.
    pub(crate) fn at(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .iter()
            .find(|(_, tower)| tower.cell == cell)
            .map(|(id, _)| *id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TowerId, &TowerState)> {
        self.entries.iter().map(|(id, tower)| (*id, tower))
    }

    /// Counts every cooldown down by one tick, skipping towers that just reloaded.
    pub(crate) fn cool_down(&mut self) {
        for tower in self.entries.values_mut() {
            if tower.reloaded {
                tower.reloaded = false;
            } else {
                tower.cooldown = tower.cooldown.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        let second = registry.insert(TowerKind::Beam, CellCoord::new(1, 0));

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.at(CellCoord::new(1, 0)), Some(second));
        assert_eq!(registry.at(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn reloaded_tower_skips_one_cool_down() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, CellCoord::new(0, 0));
        if let Some(tower) = registry.get_mut(id) {
            tower.reload();
        }

        registry.cool_down();
        assert_eq!(registry.get_mut(id).map(|tower| tower.cooldown), Some(20));

        for _ in 0..25 {
            registry.cool_down();
        }
        assert_eq!(registry.get_mut(id).map(|tower| tower.cooldown), Some(0));
    }
}
