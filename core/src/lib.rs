#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared vocabulary of Waypoint Defence.
//!
//! Everything outside the world speaks to it through [`Command`] values and
//! learns what happened through [`Event`] values. Systems read snapshot views
//! and answer with command batches; they never hold references into the world.
//!
//! The static tables (enemy and turret statistics, rounds, level layout) are
//! defined here too, so the loader, the world and the systems share one set
//! of record types.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

mod level;
mod rounds;
mod stats;
mod views;

pub use level::{LevelLayout, NodeLayout, ObstacleKind};
pub use rounds::{Round, RoundTable, SpawnInfo};
pub use stats::{
    Armament, EffectHandle, EnemyCatalog, EnemyKind, EnemyStats, PrefabHandle, TurretBlueprint,
    TurretKind, TurretStats,
};
pub use views::{EnemySnapshot, EnemyView, NodeOccupant, NodeSnapshot, TurretSnapshot, TurretView};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waypoint Defence.";

/// Distance from a waypoint at which an enemy counts as having arrived.
pub const WAYPOINT_ARRIVAL_THRESHOLD: f32 = 0.4;

/// Cadence at which turrets search for the nearest enemy.
pub const TARGET_REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// Lifetime assigned to fire-and-forget visual effects.
pub const EFFECT_LIFETIME: Duration = Duration::from_secs(5);

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Announces that the scheduler opened a new round.
    BeginRound {
        /// Zero-based index of the round within the round table.
        round: u32,
    },
    /// Announces that every enemy of the round has been resolved.
    CompleteRound {
        /// Zero-based index of the round that finished.
        round: u32,
    },
    /// Announces that the final round has been cleared.
    DeclareVictory,
    /// Requests that an enemy of the provided kind enter at the spawn point.
    SpawnEnemy {
        /// Kind of enemy to instantiate.
        enemy: EnemyKind,
    },
    /// Moves an enemy along its path.
    MoveEnemy {
        /// Identifier of the enemy being moved.
        enemy: EnemyId,
        /// Position reached after the movement step.
        position: Vec3,
        /// Index of the waypoint the enemy heads for next.
        waypoint_index: usize,
    },
    /// Reports that an enemy reached the end of the path.
    EscapeEnemy {
        /// Identifier of the enemy leaving the field.
        enemy: EnemyId,
    },
    /// Assigns or clears a turret's current target.
    AssignTarget {
        /// Turret whose target changes.
        turret: TurretId,
        /// New target, or `None` when nothing is in range.
        target: Option<EnemyId>,
    },
    /// Rotates a turret pivot around the vertical axis.
    AimTurret {
        /// Turret being rotated.
        turret: TurretId,
        /// New yaw angle in radians.
        yaw: f32,
    },
    /// Launches a homing projectile from a turret.
    FireProjectile {
        /// Turret that fires.
        turret: TurretId,
        /// Enemy the projectile homes toward.
        target: EnemyId,
    },
    /// Applies an instantaneous hit from a turret without travel time.
    StrikeEnemy {
        /// Turret that fires.
        turret: TurretId,
        /// Enemy receiving the hit.
        target: EnemyId,
        /// Damage applied by the hit.
        damage: f32,
    },
    /// Applies one tick of continuous beam damage and its slow effect.
    BurnEnemy {
        /// Turret emitting the beam.
        turret: TurretId,
        /// Enemy under the beam.
        target: EnemyId,
        /// Damage applied during this tick.
        damage: f32,
        /// Fraction of default speed removed for this tick.
        slow: f32,
    },
    /// Toggles a turret's beam visuals.
    SetBeam {
        /// Turret whose beam changes state.
        turret: TurretId,
        /// Whether the beam should be visible.
        active: bool,
    },
    /// Requests construction of a turret on a build node.
    PlaceTurret {
        /// Node that should host the turret.
        node: NodeId,
        /// Kind of turret to construct.
        kind: TurretKind,
    },
    /// Requests the upgrade of an existing turret.
    UpgradeTurret {
        /// Turret targeted for the upgrade.
        turret: TurretId,
    },
    /// Requests the sale of an existing turret.
    SellTurret {
        /// Turret targeted for the sale.
        turret: TurretId,
    },
    /// Requests removal of the obstacle occupying a build node.
    ClearObstacle {
        /// Node whose obstacle should be removed.
        node: NodeId,
    },
    /// Removes every enemy and projectile without payouts.
    ClearField,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a round started.
    RoundStarted {
        /// Zero-based index of the round.
        round: u32,
    },
    /// Confirms that a round finished.
    RoundCompleted {
        /// Zero-based index of the round.
        round: u32,
    },
    /// Announces that every round of the level was cleared.
    LevelWon {
        /// Number of rounds the player started.
        rounds: u32,
        /// Track unlocked by winning this level, if any.
        unlocks_track: Option<u32>,
    },
    /// Announces that the player ran out of lives.
    LevelLost {
        /// Number of rounds the player started.
        rounds: u32,
    },
    /// Confirms that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Position where the enemy appeared.
        position: Vec3,
        /// Weight the enemy carries against lives and the alive counter.
        lives: u32,
        /// Whether the enemy came from the schedule or from a death cascade.
        origin: SpawnOrigin,
    },
    /// Reports that a spawn request named a kind without configured stats.
    EnemySpawnRejected {
        /// Kind that could not be spawned.
        kind: EnemyKind,
    },
    /// Reports that an enemy took damage.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage applied.
        amount: f32,
        /// Remaining health as a fraction of starting health, clamped to `0.0..=1.0`.
        health_fraction: f32,
    },
    /// Reports that an enemy died.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Position where the enemy died.
        position: Vec3,
        /// Weight released from the alive counter.
        lives: u32,
        /// Money credited for the kill.
        worth: u32,
        /// Damage that overshot zero health.
        excess_damage: f32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Lives deducted from the player and weight released from the alive counter.
        lives: u32,
    },
    /// Requests that the presentation layer play a visual effect.
    EffectSpawned {
        /// Handle of the effect asset.
        effect: EffectHandle,
        /// World position of the effect.
        position: Vec3,
        /// Time after which the effect expires.
        lifetime: Duration,
    },
    /// Reports the player's balance after a change.
    MoneyChanged {
        /// Current balance.
        money: u32,
    },
    /// Reports the player's life pool after a change.
    LivesChanged {
        /// Current life pool; may drop below zero.
        lives: i32,
    },
    /// Confirms that a turret acquired a target.
    TargetAcquired {
        /// Turret that acquired the target.
        turret: TurretId,
        /// Enemy selected as the target.
        enemy: EnemyId,
    },
    /// Confirms that a turret no longer has a target.
    TargetLost {
        /// Turret that lost its target.
        turret: TurretId,
    },
    /// Reports a turret's new yaw.
    TurretAimed {
        /// Turret that rotated.
        turret: TurretId,
        /// Yaw angle in radians.
        yaw: f32,
    },
    /// Confirms that a projectile left a turret.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Turret that fired.
        turret: TurretId,
        /// Kind of the firing turret, used to select the muzzle effect.
        kind: TurretKind,
        /// Enemy the projectile homes toward.
        target: EnemyId,
    },
    /// Reports that a projectile reached its target.
    ProjectileImpact {
        /// Projectile that hit.
        projectile: ProjectileId,
        /// Point of impact.
        position: Vec3,
    },
    /// Reports that a projectile vanished because its target disappeared.
    ProjectileExpired {
        /// Projectile that vanished.
        projectile: ProjectileId,
    },
    /// Reports that a turret fired an instantaneous shot.
    TurretStruck {
        /// Turret that fired.
        turret: TurretId,
        /// Enemy that was hit.
        target: EnemyId,
    },
    /// Reports that a turret's beam became visible.
    BeamEnabled {
        /// Turret emitting the beam.
        turret: TurretId,
    },
    /// Reports that a turret's beam was switched off.
    BeamDisabled {
        /// Turret whose beam stopped.
        turret: TurretId,
    },
    /// Confirms that a turret was built.
    TurretPlaced {
        /// Identifier allocated to the turret.
        turret: TurretId,
        /// Node hosting the turret.
        node: NodeId,
        /// Kind of turret that was built.
        kind: TurretKind,
    },
    /// Confirms that a turret was upgraded.
    TurretUpgraded {
        /// Turret that was upgraded.
        turret: TurretId,
    },
    /// Confirms that a turret was sold.
    TurretSold {
        /// Turret that was sold.
        turret: TurretId,
        /// Node released by the sale.
        node: NodeId,
        /// Money refunded to the player.
        refund: u32,
    },
    /// Confirms that an obstacle was cleared from a node.
    ObstacleCleared {
        /// Node that became free.
        node: NodeId,
    },
    /// Reports that a turret placement was rejected.
    PlacementRejected {
        /// Node named in the request.
        node: NodeId,
        /// Kind named in the request.
        kind: TurretKind,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a turret upgrade was rejected.
    UpgradeRejected {
        /// Turret named in the request.
        turret: TurretId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports that a turret sale was rejected.
    SaleRejected {
        /// Turret named in the request.
        turret: TurretId,
    },
    /// Reports that an obstacle clearance was rejected.
    ClearanceRejected {
        /// Node named in the request.
        node: NodeId,
        /// Specific reason the clearance failed.
        reason: ClearanceError,
    },
    /// Confirms that the field was cleared during teardown.
    FieldCleared {
        /// Number of enemies removed.
        enemies: usize,
        /// Number of projectiles removed.
        projectiles: usize,
    },
}

/// Explains why an enemy appeared on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Spawned by the round scheduler from the round table.
    Scheduled,
    /// Spawned as the weaker replacement of an enemy that died.
    Cascade {
        /// Enemy whose death produced the replacement.
        parent: EnemyId,
    },
}

/// Terminal result of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every round was cleared.
    Won,
    /// The life pool ran out.
    Lost,
}

/// Reasons a turret placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No build node with the provided identifier exists.
    UnknownNode,
    /// The node already hosts a turret or an obstacle.
    Occupied,
    /// No blueprint is configured for the requested kind.
    UnknownBlueprint,
    /// The player cannot afford the turret.
    InsufficientFunds,
    /// The level already ended.
    GameOver,
}

/// Reasons a turret upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No turret with the provided identifier exists.
    UnknownTurret,
    /// The turret was already upgraded.
    AlreadyUpgraded,
    /// The player cannot afford the upgrade.
    InsufficientFunds,
}

/// Reasons an obstacle clearance request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearanceError {
    /// No build node with the provided identifier exists.
    UnknownNode,
    /// The node holds no obstacle.
    NoObstacle,
    /// The obstacle cannot be removed.
    Immovable,
    /// The player cannot afford the clearance.
    InsufficientFunds,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the turret identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a build node, equal to its index in the level layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the node identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{EnemyId, NodeId, PlacementError, SpawnOrigin, TurretId};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_expose_their_numeric_value() {
        assert_eq!(EnemyId::new(7).get(), 7);
        assert_eq!(TurretId::new(3).get(), 3);
        assert_eq!(NodeId::new(11).get(), 11);
    }

    #[test]
    fn cascade_origin_round_trips_through_bincode() {
        assert_round_trip(&SpawnOrigin::Cascade {
            parent: EnemyId::new(42),
        });
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientFunds);
    }
}
