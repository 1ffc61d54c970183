use glam::Vec3;

use crate::{EnemyId, EnemyKind, NodeId, ObstacleKind, TurretId, TurretKind, TurretStats};

/// Read-only snapshot describing a live enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current world position.
    pub position: Vec3,
    /// Remaining health.
    pub health: f32,
    /// Health assigned at spawn.
    pub start_health: f32,
    /// Speed used for the next movement step.
    pub speed_factor: f32,
    /// Speed the enemy returns to after each movement step.
    pub default_speed: f32,
    /// Index of the waypoint the enemy heads for.
    pub waypoint_index: usize,
}

/// Immutable representation of all enemies on the field, ordered by id.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot of the provided enemy, if it is alive.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }
}

/// Read-only snapshot describing a placed turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret.
    pub id: TurretId,
    /// Node hosting the turret.
    pub node: NodeId,
    /// Kind of the turret.
    pub kind: TurretKind,
    /// World position of the turret pivot.
    pub position: Vec3,
    /// Current yaw of the pivot in radians.
    pub yaw: f32,
    /// Enemy the turret currently tracks.
    pub target: Option<EnemyId>,
    /// Seconds until the next discrete shot is allowed.
    pub fire_cooldown: f32,
    /// Whether the beam visuals are active.
    pub beam_active: bool,
    /// Whether the turret was upgraded.
    pub upgraded: bool,
    /// Statistics currently in effect.
    pub stats: TurretStats,
}

/// Immutable representation of all turrets, ordered by id.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Retrieves the snapshot of the provided turret.
    #[must_use]
    pub fn get(&self, id: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }
}

/// What currently occupies a build node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeOccupant {
    /// Free for construction.
    Empty,
    /// Hosts the referenced turret.
    Turret(TurretId),
    /// Blocked by scenery.
    Obstacle(ObstacleKind),
}

/// Read-only snapshot describing a build node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Identifier of the node.
    pub id: NodeId,
    /// Position where a turret on the node stands.
    pub position: Vec3,
    /// Current occupant.
    pub occupant: NodeOccupant,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Red,
            position: Vec3::ZERO,
            health: 100.0,
            start_health: 100.0,
            speed_factor: 10.0,
            default_speed: 10.0,
            waypoint_index: 0,
        }
    }

    #[test]
    fn enemy_view_orders_and_resolves_by_id() {
        let view = EnemyView::from_snapshots(vec![enemy(9), enemy(2), enemy(5)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert!(view.get(EnemyId::new(5)).is_some());
        assert!(view.get(EnemyId::new(4)).is_none());
    }
}
