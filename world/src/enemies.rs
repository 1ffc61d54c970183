//! Enemy registry and the damage, death and cascade lifecycle.

use std::collections::BTreeMap;

use glam::Vec3;
use tracing::{debug, error, warn};
use waypoint_defence_core::{
    EnemyId, EnemyKind, EnemySnapshot, EnemyStats, Event, Outcome, SpawnOrigin, EFFECT_LIFETIME,
};

use crate::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifeState {
    Alive,
    Dead,
}

/// Runtime state of a single enemy.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) stats: EnemyStats,
    pub(crate) health: f32,
    pub(crate) speed_factor: f32,
    pub(crate) waypoint_index: usize,
    pub(crate) position: Vec3,
    state: LifeState,
}

impl Enemy {
    fn spawn(id: EnemyId, stats: EnemyStats, position: Vec3, waypoint_index: usize) -> Self {
        Self {
            id,
            stats,
            health: stats.start_health,
            speed_factor: stats.default_speed,
            waypoint_index,
            position,
            state: LifeState::Alive,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.stats.kind,
            position: self.position,
            health: self.health,
            start_health: self.stats.start_health,
            speed_factor: self.speed_factor,
            default_speed: self.stats.default_speed,
            waypoint_index: self.waypoint_index,
        }
    }

    fn health_fraction(&self) -> f32 {
        if self.stats.start_health > 0.0 {
            (self.health / self.stats.start_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: u32,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: 0,
        }
    }

    fn insert(&mut self, stats: EnemyStats, position: Vec3, waypoint_index: usize) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let _ = self
            .entries
            .insert(id, Enemy::spawn(id, stats, position, waypoint_index));
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    /// Live enemies whose position lies within `radius` of `center`, in id order.
    pub(crate) fn within(&self, center: Vec3, radius: f32) -> Vec<EnemyId> {
        self.entries
            .values()
            .filter(|enemy| enemy.is_alive() && enemy.position.distance(center) <= radius)
            .map(|enemy| enemy.id)
            .collect()
    }

    /// Removes every enemy, returning how many were alive.
    pub(crate) fn drain(&mut self) -> usize {
        let alive = self.entries.values().filter(|enemy| enemy.is_alive()).count();
        self.entries.clear();
        alive
    }
}

impl World {
    pub(crate) fn spawn_scheduled(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let Some(stats) = self.catalog.stats_for(kind).copied() else {
            error!(?kind, "no statistics configured for enemy kind; spawn skipped");
            out_events.push(Event::EnemySpawnRejected { kind });
            return;
        };
        let _ = self.spawn_enemy(stats, self.spawn_point, 0, SpawnOrigin::Scheduled, out_events);
    }

    fn spawn_enemy(
        &mut self,
        stats: EnemyStats,
        position: Vec3,
        waypoint_index: usize,
        origin: SpawnOrigin,
        out_events: &mut Vec<Event>,
    ) -> EnemyId {
        let enemy = self.enemies.insert(stats, position, waypoint_index);
        out_events.push(Event::EnemySpawned {
            enemy,
            kind: stats.kind,
            position,
            lives: stats.lives,
            origin,
        });
        enemy
    }

    pub(crate) fn move_enemy(&mut self, id: EnemyId, position: Vec3, waypoint_index: usize) {
        match self.enemies.get_mut(id) {
            Some(enemy) if enemy.is_alive() => {
                enemy.position = position;
                enemy.waypoint_index = waypoint_index;
                enemy.speed_factor = enemy.stats.default_speed;
            }
            _ => warn!(enemy = id.get(), "move requested for missing enemy"),
        }
    }

    /// Overrides the enemy's speed for its next movement step.
    pub(crate) fn slow_enemy(&mut self, id: EnemyId, fraction: f32) {
        if let Some(enemy) = self.enemies.get_mut(id) {
            if enemy.is_alive() {
                enemy.speed_factor = enemy.stats.default_speed * (1.0 - fraction.clamp(0.0, 1.0));
            }
        }
    }

    pub(crate) fn damage_enemy(&mut self, id: EnemyId, amount: f32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        if !enemy.is_alive() {
            return;
        }

        let amount = amount.max(0.0);
        enemy.health -= amount;
        out_events.push(Event::EnemyDamaged {
            enemy: id,
            amount,
            health_fraction: enemy.health_fraction(),
        });

        if enemy.health <= 0.0 {
            let excess = enemy.health.abs();
            self.kill_enemy(id, excess, out_events);
        }
    }

    pub(crate) fn kill_enemy(&mut self, id: EnemyId, excess: f32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        if !enemy.is_alive() {
            debug!(enemy = id.get(), "ignored repeated death");
            return;
        }
        enemy.state = LifeState::Dead;
        let stats = enemy.stats;
        let position = enemy.position;
        let waypoint_index = enemy.waypoint_index;

        self.economy.credit(stats.worth);
        out_events.push(Event::MoneyChanged {
            money: self.economy.money(),
        });
        out_events.push(Event::EnemyDied {
            enemy: id,
            kind: stats.kind,
            position,
            lives: stats.lives,
            worth: stats.worth,
            excess_damage: excess,
        });

        if let Some(weaker) = stats.kind.weaker() {
            match self.catalog.stats_for(weaker).copied() {
                Some(weaker_stats) => {
                    let replacement = self.spawn_enemy(
                        weaker_stats,
                        position,
                        waypoint_index,
                        SpawnOrigin::Cascade { parent: id },
                        out_events,
                    );
                    let remainder = weaker_stats.start_health - excess;
                    if remainder > 0.0 {
                        if excess > 0.0 {
                            self.damage_enemy(replacement, excess, out_events);
                        }
                    } else {
                        self.kill_enemy(replacement, remainder.abs(), out_events);
                    }
                }
                None => error!(?weaker, "no statistics configured for cascade kind"),
            }
        }

        if let Some(effect) = stats.death_effect {
            out_events.push(Event::EffectSpawned {
                effect,
                position,
                lifetime: EFFECT_LIFETIME,
            });
        }

        self.remove_enemy(id, out_events);
    }

    pub(crate) fn escape_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get(id) else {
            warn!(enemy = id.get(), "escape requested for missing enemy");
            return;
        };
        if !enemy.is_alive() {
            return;
        }
        let stats = enemy.stats;

        self.economy.lose_lives(stats.lives);
        out_events.push(Event::LivesChanged {
            lives: self.economy.lives(),
        });
        out_events.push(Event::EnemyEscaped {
            enemy: id,
            kind: stats.kind,
            lives: stats.lives,
        });
        self.remove_enemy(id, out_events);

        if self.economy.is_depleted() {
            self.declare_outcome(Outcome::Lost, out_events);
        }
    }

    fn remove_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.entries.remove(&id).is_some() {
            self.turrets.release_target(id, out_events);
        }
    }
}
