//! Build nodes, turret state and the commands that mutate them.

use std::collections::BTreeMap;

use glam::Vec3;
use tracing::{debug, warn};
use waypoint_defence_core::{
    Armament, ClearanceError, EffectHandle, EnemyId, Event, NodeId, NodeLayout, NodeOccupant,
    NodeSnapshot, PlacementError, TurretBlueprint, TurretId, TurretKind, TurretSnapshot,
    TurretStats, UpgradeError, EFFECT_LIFETIME,
};

use crate::{projectiles::Warhead, World};

/// Build node stored inside the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BuildNode {
    position: Vec3,
    occupant: NodeOccupant,
}

impl BuildNode {
    pub(crate) fn from_layout(layout: &NodeLayout) -> Self {
        let occupant = layout
            .obstacle
            .map_or(NodeOccupant::Empty, NodeOccupant::Obstacle);
        Self {
            position: layout.position,
            occupant,
        }
    }

    pub(crate) fn snapshot(&self, index: usize) -> NodeSnapshot {
        NodeSnapshot {
            id: NodeId::new(u32::try_from(index).unwrap_or(u32::MAX)),
            position: self.position,
            occupant: self.occupant,
        }
    }
}

/// Snapshot of a turret stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TurretState {
    pub(crate) id: TurretId,
    node: NodeId,
    blueprint: TurretBlueprint,
    position: Vec3,
    stats: TurretStats,
    upgraded: bool,
    yaw: f32,
    pub(crate) target: Option<EnemyId>,
    fire_cooldown: f32,
    pub(crate) beam_active: bool,
}

impl TurretState {
    pub(crate) fn snapshot(&self) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            node: self.node,
            kind: self.blueprint.kind,
            position: self.position,
            yaw: self.yaw,
            target: self.target,
            fire_cooldown: self.fire_cooldown,
            beam_active: self.beam_active,
            upgraded: self.upgraded,
            stats: self.stats,
        }
    }

    fn is_loaded(&self) -> bool {
        self.fire_cooldown <= 0.0
    }

    fn reload(&mut self) {
        self.fire_cooldown = self.stats.reload_seconds();
    }
}

/// Registry that stores turrets and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TurretRegistry {
    entries: BTreeMap<TurretId, TurretState>,
    next_turret_id: u32,
}

impl TurretRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_turret_id: 0,
        }
    }

    fn allocate_id(&mut self) -> TurretId {
        let id = TurretId::new(self.next_turret_id);
        self.next_turret_id = self.next_turret_id.wrapping_add(1);
        id
    }

    fn get_mut(&mut self, id: TurretId) -> Option<&mut TurretState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TurretState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TurretState> {
        self.entries.values_mut()
    }

    pub(crate) fn decay_cooldowns(&mut self, dt: f32) {
        for turret in self.entries.values_mut() {
            turret.fire_cooldown = (turret.fire_cooldown - dt).max(0.0);
        }
    }

    /// Clears every reference to an enemy that left the field.
    pub(crate) fn release_target(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        for turret in self.entries.values_mut() {
            if turret.target == Some(enemy) {
                turret.target = None;
                out_events.push(Event::TargetLost { turret: turret.id });
            }
        }
    }
}

impl World {
    fn node_index(&self, node: NodeId) -> Option<usize> {
        let index = usize::try_from(node.get()).ok()?;
        (index < self.nodes.len()).then_some(index)
    }

    fn spawn_effect(effect: Option<EffectHandle>, position: Vec3, out_events: &mut Vec<Event>) {
        if let Some(effect) = effect {
            out_events.push(Event::EffectSpawned {
                effect,
                position,
                lifetime: EFFECT_LIFETIME,
            });
        }
    }

    fn resolve_placement(
        &self,
        node: NodeId,
        kind: TurretKind,
    ) -> Result<(usize, TurretBlueprint), PlacementError> {
        if self.outcome.is_some() {
            return Err(PlacementError::GameOver);
        }
        let index = self.node_index(node).ok_or(PlacementError::UnknownNode)?;
        if self.nodes[index].occupant != NodeOccupant::Empty {
            return Err(PlacementError::Occupied);
        }
        let blueprint = *self.blueprint(kind).ok_or(PlacementError::UnknownBlueprint)?;
        if self.economy.money() < blueprint.cost {
            return Err(PlacementError::InsufficientFunds);
        }
        Ok((index, blueprint))
    }

    pub(crate) fn place_turret(
        &mut self,
        node: NodeId,
        kind: TurretKind,
        out_events: &mut Vec<Event>,
    ) {
        let (index, blueprint) = match self.resolve_placement(node, kind) {
            Ok(resolved) => resolved,
            Err(reason) => {
                out_events.push(Event::PlacementRejected { node, kind, reason });
                return;
            }
        };
        if !self.economy.try_debit(blueprint.cost) {
            out_events.push(Event::PlacementRejected {
                node,
                kind,
                reason: PlacementError::InsufficientFunds,
            });
            return;
        }

        let id = self.turrets.allocate_id();
        let position = self.nodes[index].position;
        let _ = self.turrets.entries.insert(
            id,
            TurretState {
                id,
                node,
                blueprint,
                position,
                stats: blueprint.base,
                upgraded: false,
                yaw: 0.0,
                target: None,
                fire_cooldown: 0.0,
                beam_active: false,
            },
        );
        self.nodes[index].occupant = NodeOccupant::Turret(id);

        debug!(turret = id.get(), node = node.get(), ?kind, "turret placed");
        out_events.push(Event::TurretPlaced {
            turret: id,
            node,
            kind,
        });
        out_events.push(Event::MoneyChanged {
            money: self.economy.money(),
        });
        Self::spawn_effect(self.build_effect, position, out_events);
    }

    pub(crate) fn upgrade_turret(&mut self, turret: TurretId, out_events: &mut Vec<Event>) {
        let Some(state) = self.turrets.entries.get(&turret) else {
            out_events.push(Event::UpgradeRejected {
                turret,
                reason: UpgradeError::UnknownTurret,
            });
            return;
        };
        if state.upgraded {
            out_events.push(Event::UpgradeRejected {
                turret,
                reason: UpgradeError::AlreadyUpgraded,
            });
            return;
        }
        let cost = state.blueprint.upgrade_cost;
        if !self.economy.try_debit(cost) {
            out_events.push(Event::UpgradeRejected {
                turret,
                reason: UpgradeError::InsufficientFunds,
            });
            return;
        }

        let Some(state) = self.turrets.get_mut(turret) else {
            return;
        };
        state.upgraded = true;
        state.stats = state.blueprint.upgraded;
        let position = state.position;

        out_events.push(Event::TurretUpgraded { turret });
        out_events.push(Event::MoneyChanged {
            money: self.economy.money(),
        });
        Self::spawn_effect(self.build_effect, position, out_events);
    }

    pub(crate) fn sell_turret(&mut self, turret: TurretId, out_events: &mut Vec<Event>) {
        let Some(state) = self.turrets.entries.remove(&turret) else {
            out_events.push(Event::SaleRejected { turret });
            return;
        };
        if let Some(index) = self.node_index(state.node) {
            self.nodes[index].occupant = NodeOccupant::Empty;
        }
        let refund = state.blueprint.sell_value();
        self.economy.credit(refund);

        out_events.push(Event::TurretSold {
            turret,
            node: state.node,
            refund,
        });
        out_events.push(Event::MoneyChanged {
            money: self.economy.money(),
        });
        Self::spawn_effect(self.sell_effect, state.position, out_events);
    }

    pub(crate) fn clear_obstacle(&mut self, node: NodeId, out_events: &mut Vec<Event>) {
        let result = self.node_index(node).ok_or(ClearanceError::UnknownNode).and_then(|index| {
            match self.nodes[index].occupant {
                NodeOccupant::Obstacle(obstacle) if obstacle.is_removable() => Ok(index),
                NodeOccupant::Obstacle(_) => Err(ClearanceError::Immovable),
                _ => Err(ClearanceError::NoObstacle),
            }
        });
        let index = match result {
            Ok(index) if self.economy.try_debit(self.obstacle_clearance_cost) => index,
            Ok(_) => {
                out_events.push(Event::ClearanceRejected {
                    node,
                    reason: ClearanceError::InsufficientFunds,
                });
                return;
            }
            Err(reason) => {
                out_events.push(Event::ClearanceRejected { node, reason });
                return;
            }
        };

        self.nodes[index].occupant = NodeOccupant::Empty;
        out_events.push(Event::ObstacleCleared { node });
        out_events.push(Event::MoneyChanged {
            money: self.economy.money(),
        });
    }

    pub(crate) fn assign_target(
        &mut self,
        turret: TurretId,
        target: Option<EnemyId>,
        out_events: &mut Vec<Event>,
    ) {
        let target = target.filter(|enemy| {
            let alive = self.enemies.get(*enemy).is_some_and(|enemy| enemy.is_alive());
            if !alive {
                warn!(enemy = enemy.get(), "target assignment names a missing enemy");
            }
            alive
        });
        let Some(state) = self.turrets.get_mut(turret) else {
            warn!(turret = turret.get(), "target assignment for missing turret");
            return;
        };
        if state.target == target {
            return;
        }
        state.target = target;
        match target {
            Some(enemy) => out_events.push(Event::TargetAcquired { turret, enemy }),
            None => out_events.push(Event::TargetLost { turret }),
        }
    }

    pub(crate) fn aim_turret(&mut self, turret: TurretId, yaw: f32, out_events: &mut Vec<Event>) {
        if let Some(state) = self.turrets.get_mut(turret) {
            state.yaw = yaw;
            out_events.push(Event::TurretAimed { turret, yaw });
        }
    }

    pub(crate) fn set_beam(&mut self, turret: TurretId, active: bool, out_events: &mut Vec<Event>) {
        let Some(state) = self.turrets.get_mut(turret) else {
            return;
        };
        if state.beam_active == active {
            return;
        }
        state.beam_active = active;
        if active {
            out_events.push(Event::BeamEnabled { turret });
        } else {
            out_events.push(Event::BeamDisabled { turret });
        }
    }

    /// Resolves a turret that may fire a discrete shot at a live enemy.
    fn ready_shooter(&mut self, turret: TurretId, target: EnemyId) -> Option<&mut TurretState> {
        let target_alive = self.enemies.get(target).is_some_and(|enemy| enemy.is_alive());
        let state = self.turrets.get_mut(turret)?;
        if !target_alive {
            debug!(turret = turret.get(), enemy = target.get(), "shot at missing enemy");
            return None;
        }
        if !state.is_loaded() {
            warn!(turret = turret.get(), "shot requested while reloading");
            return None;
        }
        Some(state)
    }

    pub(crate) fn fire_projectile(
        &mut self,
        turret: TurretId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.ready_shooter(turret, target) else {
            return;
        };
        let Armament::Projectile {
            speed,
            damage,
            blast_radius,
            impact_effect,
        } = state.stats.armament
        else {
            warn!(turret = turret.get(), "projectile requested from a turret without one");
            return;
        };
        state.reload();
        let kind = state.blueprint.kind;
        let origin = state.position;
        let fire_effect = state.stats.fire_effect;

        let projectile = self.projectiles.launch(
            target,
            origin,
            speed,
            Warhead {
                damage,
                blast_radius,
                impact_effect,
            },
        );
        out_events.push(Event::ProjectileFired {
            projectile,
            turret,
            kind,
            target,
        });
        Self::spawn_effect(fire_effect, origin, out_events);
    }

    pub(crate) fn strike_enemy(
        &mut self,
        turret: TurretId,
        target: EnemyId,
        damage: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.ready_shooter(turret, target) else {
            return;
        };
        state.reload();
        let fire_effect = state.stats.fire_effect;
        let origin = state.position;

        out_events.push(Event::TurretStruck { turret, target });
        Self::spawn_effect(fire_effect, origin, out_events);
        self.damage_enemy(target, damage, out_events);
    }

    pub(crate) fn burn_enemy(
        &mut self,
        turret: TurretId,
        target: EnemyId,
        damage: f32,
        slow: f32,
        out_events: &mut Vec<Event>,
    ) {
        if !self.turrets.entries.contains_key(&turret) {
            warn!(turret = turret.get(), "beam damage from missing turret");
            return;
        }
        self.damage_enemy(target, damage, out_events);
        self.slow_enemy(target, slow);
    }
}
