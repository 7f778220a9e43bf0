//! Money, lives and wave bookkeeping.

use tower_defence_core::EconomySnapshot;

/// Outcome of charging a life for an escaped enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LifeLoss {
    pub(crate) lives: u32,
    pub(crate) game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EconomyLedger {
    money: u32,
    lives: u32,
    wave: u32,
}

impl EconomyLedger {
    pub(crate) fn new(start: EconomySnapshot) -> Self {
        Self {
            money: start.money,
            lives: start.lives,
            wave: start.wave,
        }
    }

    /// Deducts `cost` only when the full amount is available.
    pub(crate) fn try_purchase(&mut self, cost: u32) -> bool {
        match self.money.checked_sub(cost) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    /// Credits a kill bounty and returns the new balance.
    pub(crate) fn credit_kill(&mut self, bounty: u32) -> u32 {
        self.money = self.money.saturating_add(bounty);
        self.money
    }

    /// Charges one life; the game ends when no lives remain.
    pub(crate) fn enemy_escaped(&mut self) -> LifeLoss {
        self.lives = self.lives.saturating_sub(1);
        LifeLoss {
            lives: self.lives,
            game_over: self.lives == 0,
        }
    }

    pub(crate) fn advance_wave(&mut self) -> u32 {
        self.wave = self.wave.saturating_add(1);
        self.wave
    }

    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            money: self.money,
            lives: self.lives,
            wave: self.wave,
        }
    }
}
