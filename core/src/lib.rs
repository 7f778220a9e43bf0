#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing every observable change. Systems read immutable views, such as
//! [`EnemyView`] and [`TowerView`], and respond exclusively with new command
//! batches.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

/// Number of ticks a slow debuff stays active once applied (three seconds at 60 ticks/s).
pub const SLOW_DURATION_TICKS: u64 = 180;

/// Distance at which a homing projectile is considered to have struck its target.
pub const PROJECTILE_IMPACT_RADIUS: f32 = 30.0;

new_key_type! {
    /// Generational handle to an enemy stored in the world's arena.
    ///
    /// A handle whose enemy was removed never resolves to a later occupant of
    /// the same slot.
    pub struct EnemyId;

    /// Generational handle to an in-flight projectile.
    pub struct ProjectileId;
}

/// Lifecycle state of a running simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Ticks advance the simulation.
    Running,
    /// Ticks are ignored until the simulation is resumed.
    Paused,
    /// Terminal state entered once the player runs out of lives.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that will hold the tower.
        cell: CellCoord,
    },
    /// Flips the simulation between running and paused.
    TogglePause,
    /// Advances the informational wave counter.
    AdvanceWave,
    /// Creates a new enemy at the first waypoint of the provided route.
    SpawnEnemy {
        /// Route the enemy will follow.
        route: RouteId,
    },
    /// Moves an enemy to a new position along its route.
    MoveEnemy {
        /// Enemy being moved.
        enemy: EnemyId,
        /// Position reached by the enemy this tick.
        position: WorldPoint,
        /// Index of the waypoint the enemy heads toward next.
        next_waypoint: u32,
    },
    /// Removes an enemy that reached the end of its route and charges a life.
    EscapeEnemy {
        /// Enemy that reached the end of its route.
        enemy: EnemyId,
    },
    /// Launches a homing projectile from a ready tower.
    FireProjectile {
        /// Tower firing the projectile.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
    /// Locks a beam tower onto a newly acquired target and restarts its cooldown.
    LockBeam {
        /// Beam tower acquiring the target.
        tower: TowerId,
        /// Enemy held by the beam.
        target: EnemyId,
    },
    /// Clears the active target of a beam tower.
    ReleaseBeam {
        /// Beam tower losing its target.
        tower: TowerId,
    },
    /// Subtracts health from an enemy.
    DamageEnemy {
        /// Enemy receiving damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Applies a slow debuff to an enemy.
    SlowEnemy {
        /// Enemy being slowed.
        enemy: EnemyId,
        /// Debuff that replaces any previous slow.
        debuff: SlowDebuff,
    },
    /// Moves a projectile toward its target.
    MoveProjectile {
        /// Projectile being moved.
        projectile: ProjectileId,
        /// Position reached by the projectile this tick.
        position: WorldPoint,
        /// Last known position of the projectile's target.
        target_position: WorldPoint,
    },
    /// Removes a projectile after impact or once its target vanished.
    RemoveProjectile {
        /// Projectile to remove.
        projectile: ProjectileId,
    },
    /// Removes every enemy whose health dropped to zero.
    PruneEnemies,
    /// Closes the current tick, cooling towers and advancing the tick counter.
    Tick {
        /// Host-provided frame duration; informational only.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Host-provided frame duration.
        dt: Duration,
        /// Tick counter after advancing.
        tick: u64,
    },
    /// Announces that the simulation entered a new run state.
    RunStateChanged {
        /// State that became active.
        state: RunState,
    },
    /// Reports the player's new balance.
    MoneyChanged {
        /// Money available after the change.
        money: u32,
    },
    /// Reports the player's remaining lives.
    LivesChanged {
        /// Lives remaining after the change.
        lives: u32,
    },
    /// Reports the new informational wave number.
    WaveChanged {
        /// Wave counter after the change.
        wave: u32,
    },
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Handle assigned to the new enemy.
        enemy: EnemyId,
        /// Route the enemy follows.
        route: RouteId,
    },
    /// Reports that an enemy's health reached zero.
    EnemyKilled {
        /// Enemy that was killed.
        enemy: EnemyId,
        /// Money credited for the kill.
        bounty: u32,
    },
    /// Reports that an enemy reached the end of its route.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
    },
    /// Announces that the player ran out of lives.
    GameOver,
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Handle assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes in on.
        target: EnemyId,
    },
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a route within the grid's path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(u32);

impl RouteId {
    /// Creates a new route identifier with the provided index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the route index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Continuous position measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Moves linearly toward `target` by at most `max_distance`.
    ///
    /// Returns `target` itself when it lies within `max_distance`, so callers
    /// never overshoot.
    #[must_use]
    pub fn step_towards(self, target: WorldPoint, max_distance: f32) -> WorldPoint {
        let distance = self.distance(target);
        if distance <= max_distance || distance == 0.0 {
            return target;
        }

        let scale = max_distance / distance;
        WorldPoint::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }
}

/// Remaining or maximum health of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage without dropping below zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Timed speed reduction carried by an enemy.
///
/// Expiry is plain data evaluated every tick, so a paused simulation or a
/// removed enemy can never observe a stale timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlowDebuff {
    amount: f32,
    until_tick: u64,
}

impl SlowDebuff {
    /// Debuff that never slows.
    pub const NONE: SlowDebuff = SlowDebuff {
        amount: 0.0,
        until_tick: 0,
    };

    /// Creates a debuff reducing speed by `amount` until `until_tick` (exclusive).
    #[must_use]
    pub const fn new(amount: f32, until_tick: u64) -> Self {
        Self { amount, until_tick }
    }

    /// Fraction of speed removed while active.
    #[must_use]
    pub const fn amount(&self) -> f32 {
        self.amount
    }

    /// First tick on which the debuff no longer applies.
    #[must_use]
    pub const fn until_tick(&self) -> u64 {
        self.until_tick
    }

    /// Reports whether the debuff slows movement on `tick`.
    #[must_use]
    pub const fn is_active(&self, tick: u64) -> bool {
        tick < self.until_tick
    }

    /// Slow multiplier in effect on `tick`; zero once expired.
    #[must_use]
    pub fn multiplier_at(&self, tick: u64) -> f32 {
        if self.is_active(tick) {
            self.amount.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Types of towers that can be constructed on buildable cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Single-target projectile tower.
    Basic,
    /// Projectile tower that slows instead of damaging.
    Slow,
    /// Slow projectile tower that damages everything around the impact.
    Splash,
    /// Continuous beam that damages its held target every tick.
    Beam,
}

impl TowerKind {
    /// Every constructible tower kind in menu order.
    pub const ALL: [TowerKind; 4] = [Self::Basic, Self::Slow, Self::Splash, Self::Beam];

    /// Human readable name suitable for purchase menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Shooter Tower",
            Self::Slow => "Slow Tower",
            Self::Splash => "Bomb Tower",
            Self::Beam => "Laser Tower",
        }
    }

    /// Combat statistics for the tower kind.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Basic => TowerStats {
                damage: 20,
                range: 250.0,
                fire_rate: 20,
                cost: 50,
                attack: Attack::Projectile {
                    speed: 12.0,
                    impact: Impact::Single,
                },
            },
            Self::Slow => TowerStats {
                damage: 0,
                range: 200.0,
                fire_rate: 30,
                cost: 75,
                attack: Attack::Projectile {
                    speed: 8.0,
                    impact: Impact::Slow { amount: 0.5 },
                },
            },
            Self::Splash => TowerStats {
                damage: 50,
                range: 250.0,
                fire_rate: 60,
                cost: 100,
                attack: Attack::Projectile {
                    speed: 5.0,
                    impact: Impact::Splash { radius: 100.0 },
                },
            },
            Self::Beam => TowerStats {
                damage: 2,
                range: 350.0,
                fire_rate: 7,
                cost: 125,
                attack: Attack::Beam,
            },
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "basic",
            Self::Slow => "slow",
            Self::Splash => "splash",
            Self::Beam => "beam",
        };
        f.write_str(name)
    }
}

/// Error returned when a tower kind name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower kind `{0}`; expected basic, slow, splash or beam")]
pub struct ParseTowerKindError(String);

impl FromStr for TowerKind {
    type Err = ParseTowerKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" | "shooter" => Ok(Self::Basic),
            "slow" => Ok(Self::Slow),
            "splash" | "bomb" => Ok(Self::Splash),
            "beam" | "laser" => Ok(Self::Beam),
            _ => Err(ParseTowerKindError(value.to_owned())),
        }
    }
}

/// Per-kind tower statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Damage dealt per hit, or per tick for beams.
    pub damage: u32,
    /// Targeting radius measured from the tower centre in world units.
    pub range: f32,
    /// Ticks between two shots; for beams, ticks between target acquisitions.
    pub fire_rate: u32,
    /// Purchase price.
    pub cost: u32,
    /// How the tower delivers its damage.
    pub attack: Attack,
}

/// Delivery mechanism used by a tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Attack {
    /// Homing projectile resolved on impact.
    Projectile {
        /// Distance travelled per tick.
        speed: f32,
        /// Effect applied when the projectile lands.
        impact: Impact,
    },
    /// Continuous damage applied to the held target every tick.
    Beam,
}

/// Effect applied when a projectile lands.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Impact {
    /// Damages only the original target, if it is still alive.
    Single,
    /// Damages every living enemy within `radius` of the impact point.
    Splash {
        /// Distance from the impact point that still takes damage.
        radius: f32,
    },
    /// Slows the original target instead of damaging it.
    Slow {
        /// Fraction of speed removed while the debuff lasts.
        amount: f32,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The cell lies on a path or outside the grid.
    #[error("cell is not buildable")]
    NotBuildable,
    /// Another tower already occupies the cell.
    #[error("cell already holds a tower")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The simulation is paused or over.
    #[error("simulation is not running")]
    NotRunning,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EnemyId,
    /// Monotonic spawn counter; smaller values spawned earlier.
    pub spawn_order: u64,
    /// Route the enemy follows.
    pub route: RouteId,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Index of the waypoint the enemy heads toward.
    pub next_waypoint: u32,
    /// Base distance travelled per tick.
    pub speed: f32,
    /// Remaining health.
    pub health: Health,
    /// Health at spawn.
    pub max_health: Health,
    /// Active or expired slow debuff.
    pub slow: SlowDebuff,
}

impl EnemySnapshot {
    /// Reports whether the enemy still has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_zero()
    }
}

/// Read-only snapshot describing all enemies on the grid.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view ordered from oldest to newest spawn.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.spawn_order);
        Self { snapshots }
    }

    /// Iterator over the captured enemies, oldest spawn first.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up an enemy by handle.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Upgrade level; always 1.
    pub level: u32,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Centre of the tower in world units.
    pub center: WorldPoint,
    /// Engagement radius measured from the centre, in world units.
    pub range: f32,
    /// Ticks remaining before the tower may fire or reacquire.
    pub cooldown: u32,
    /// Enemy currently held by a beam, if it still exists.
    pub beam_target: Option<EnemyId>,
}

/// Read-only snapshot describing all towers placed on the grid.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Handle of the projectile.
    pub id: ProjectileId,
    /// Monotonic launch counter; smaller values were fired earlier.
    pub fired_order: u64,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Kind of the owning tower, which decides the impact effect.
    pub kind: TowerKind,
    /// Current position in world units.
    pub position: WorldPoint,
    /// Enemy the projectile homes in on.
    pub target: EnemyId,
    /// Last known position of the target.
    pub target_position: WorldPoint,
    /// Damage carried by the projectile.
    pub damage: u32,
    /// Distance travelled per tick.
    pub speed: f32,
}

/// Read-only snapshot describing all in-flight projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view ordered by launch.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.fired_order);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles, earliest launch first.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Money, lives and wave counter at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Money available for purchases.
    pub money: u32,
    /// Lives remaining before the game ends.
    pub lives: u32,
    /// Informational wave counter.
    pub wave: u32,
}

/// Target assignment produced by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected for the tower.
    pub enemy: EnemyId,
}

/// Projectile that reached its target during the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileImpact {
    /// Projectile that landed.
    pub projectile: ProjectileId,
    /// Kind of the tower that fired it.
    pub kind: TowerKind,
    /// Damage carried by the projectile.
    pub damage: u32,
    /// Enemy the projectile was aimed at.
    pub target: EnemyId,
    /// Target position at impact time.
    pub point: WorldPoint,
}
