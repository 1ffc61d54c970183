#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waypoint Defence.
//!
//! The world owns every mutable entity of a level: enemies, turrets, build
//! nodes, projectiles and the player's economy. It is mutated exclusively
//! through [`apply`] and read through the [`query`] module.

use std::time::Duration;

use glam::Vec3;
use tracing::debug;
use waypoint_defence_core::{
    Command, EffectHandle, EnemyCatalog, Event, LevelLayout, Outcome, TurretBlueprint,
    TurretKind, WELCOME_BANNER,
};

mod economy;
mod enemies;
mod projectiles;
mod turrets;

pub use economy::Economy;

use enemies::EnemyRegistry;
use projectiles::ProjectileRegistry;
use turrets::{BuildNode, TurretRegistry};

/// Represents the authoritative Waypoint Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    spawn_point: Vec3,
    waypoints: Vec<Vec3>,
    obstacle_clearance_cost: u32,
    build_effect: Option<EffectHandle>,
    sell_effect: Option<EffectHandle>,
    unlocks_track: Option<u32>,
    catalog: EnemyCatalog,
    blueprints: Vec<TurretBlueprint>,
    enemies: EnemyRegistry,
    turrets: TurretRegistry,
    nodes: Vec<BuildNode>,
    projectiles: ProjectileRegistry,
    economy: Economy,
    outcome: Option<Outcome>,
    tick_index: u64,
}

impl World {
    /// Creates a world for the provided level using the supplied tables.
    #[must_use]
    pub fn new(
        level: LevelLayout,
        catalog: EnemyCatalog,
        blueprints: Vec<TurretBlueprint>,
    ) -> Self {
        let nodes = level
            .nodes
            .iter()
            .map(BuildNode::from_layout)
            .collect();
        Self {
            banner: WELCOME_BANNER,
            spawn_point: level.spawn_point,
            waypoints: level.waypoints,
            obstacle_clearance_cost: level.obstacle_clearance_cost,
            build_effect: level.build_effect,
            sell_effect: level.sell_effect,
            unlocks_track: level.unlocks_track,
            catalog,
            blueprints,
            enemies: EnemyRegistry::new(),
            turrets: TurretRegistry::new(),
            nodes,
            projectiles: ProjectileRegistry::new(),
            economy: Economy::new(level.starting_money, level.starting_lives),
            outcome: None,
            tick_index: 0,
        }
    }

    fn blueprint(&self, kind: TurretKind) -> Option<&TurretBlueprint> {
        self.blueprints
            .iter()
            .find(|blueprint| blueprint.kind == kind)
    }

    fn declare_outcome(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        let rounds = self.economy.rounds();
        match outcome {
            Outcome::Won => out_events.push(Event::LevelWon {
                rounds,
                unlocks_track: self.unlocks_track,
            }),
            Outcome::Lost => out_events.push(Event::LevelLost { rounds }),
        }
        debug!(?outcome, rounds, "level finished");
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
        self.turrets.decay_cooldowns(dt.as_secs_f32());
        self.advance_projectiles(dt.as_secs_f32(), out_events);
    }

    fn clear_field(&mut self, out_events: &mut Vec<Event>) {
        let enemies = self.enemies.drain();
        let projectiles = self.projectiles.drain();
        for turret in self.turrets.iter_mut() {
            if turret.target.take().is_some() {
                out_events.push(Event::TargetLost { turret: turret.id });
            }
            if turret.beam_active {
                turret.beam_active = false;
                out_events.push(Event::BeamDisabled { turret: turret.id });
            }
        }
        out_events.push(Event::FieldCleared {
            enemies,
            projectiles,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::BeginRound { round } => {
            world.economy.record_round();
            out_events.push(Event::RoundStarted { round });
        }
        Command::CompleteRound { round } => out_events.push(Event::RoundCompleted { round }),
        Command::DeclareVictory => world.declare_outcome(Outcome::Won, out_events),
        Command::SpawnEnemy { enemy } => world.spawn_scheduled(enemy, out_events),
        Command::MoveEnemy {
            enemy,
            position,
            waypoint_index,
        } => world.move_enemy(enemy, position, waypoint_index),
        Command::EscapeEnemy { enemy } => world.escape_enemy(enemy, out_events),
        Command::AssignTarget { turret, target } => {
            world.assign_target(turret, target, out_events)
        }
        Command::AimTurret { turret, yaw } => world.aim_turret(turret, yaw, out_events),
        Command::FireProjectile { turret, target } => {
            world.fire_projectile(turret, target, out_events)
        }
        Command::StrikeEnemy {
            turret,
            target,
            damage,
        } => world.strike_enemy(turret, target, damage, out_events),
        Command::BurnEnemy {
            turret,
            target,
            damage,
            slow,
        } => world.burn_enemy(turret, target, damage, slow, out_events),
        Command::SetBeam { turret, active } => world.set_beam(turret, active, out_events),
        Command::PlaceTurret { node, kind } => world.place_turret(node, kind, out_events),
        Command::UpgradeTurret { turret } => world.upgrade_turret(turret, out_events),
        Command::SellTurret { turret } => world.sell_turret(turret, out_events),
        Command::ClearObstacle { node } => world.clear_obstacle(node, out_events),
        Command::ClearField => world.clear_field(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use waypoint_defence_core::{
        EnemyId, EnemySnapshot, EnemyView, NodeSnapshot, Outcome, TurretSnapshot, TurretView,
    };

    use super::{Economy, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Position where scheduled enemies enter the field.
    #[must_use]
    pub fn spawn_point(world: &World) -> Vec3 {
        world.spawn_point
    }

    /// Ordered path shared by every enemy.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Vec3] {
        &world.waypoints
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| enemy.snapshot())
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Reports whether the provided enemy is on the field.
    #[must_use]
    pub fn is_enemy_alive(world: &World, enemy: EnemyId) -> bool {
        world.enemies.get(enemy).is_some_and(|enemy| enemy.is_alive())
    }

    /// Number of live enemies on the field.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Captures a read-only view of the placed turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        let snapshots: Vec<TurretSnapshot> =
            world.turrets.iter().map(|turret| turret.snapshot()).collect();
        TurretView::from_snapshots(snapshots)
    }

    /// Captures the state of every build node in identifier order.
    #[must_use]
    pub fn nodes(world: &World) -> Vec<NodeSnapshot> {
        world
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| node.snapshot(index))
            .collect()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Provides the player's money, lives and round counter.
    #[must_use]
    pub fn economy(world: &World) -> &Economy {
        &world.economy
    }

    /// Terminal result of the level, once decided.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec3;
    use waypoint_defence_core::{
        Armament, EnemyCatalog, EnemyKind, EnemyStats, LevelLayout, NodeLayout, ObstacleKind,
        PrefabHandle, TurretBlueprint, TurretKind, TurretStats,
    };

    use super::World;

    pub(crate) fn enemy_stats(kind: EnemyKind, health: f32, lives: u32, worth: u32) -> EnemyStats {
        EnemyStats {
            kind,
            default_speed: 10.0,
            start_health: health,
            lives,
            worth,
            death_effect: None,
            prefab: PrefabHandle::new(0),
        }
    }

    pub(crate) fn standard_blueprint() -> TurretBlueprint {
        let stats = TurretStats {
            range: 15.0,
            fire_rate: 1.0,
            turn_speed: 10.0,
            infinite_range: false,
            fire_effect: None,
            armament: Armament::Projectile {
                speed: 70.0,
                damage: 50.0,
                blast_radius: 0.0,
                impact_effect: None,
            },
        };
        TurretBlueprint {
            kind: TurretKind::Standard,
            cost: 100,
            upgrade_cost: 60,
            base: stats,
            upgraded: TurretStats {
                fire_rate: 2.0,
                ..stats
            },
        }
    }

    pub(crate) fn world_with(catalog: Vec<EnemyStats>) -> World {
        let level = LevelLayout {
            spawn_point: Vec3::ZERO,
            waypoints: vec![Vec3::new(0.0, 0.0, 20.0), Vec3::new(20.0, 0.0, 20.0)],
            nodes: vec![
                NodeLayout {
                    position: Vec3::new(5.0, 0.0, 5.0),
                    obstacle: None,
                },
                NodeLayout {
                    position: Vec3::new(-5.0, 0.0, 5.0),
                    obstacle: Some(ObstacleKind::Tree),
                },
                NodeLayout {
                    position: Vec3::new(-5.0, 0.0, 15.0),
                    obstacle: Some(ObstacleKind::Rock),
                },
            ],
            starting_money: 1_000,
            starting_lives: 3,
            obstacle_clearance_cost: 500,
            build_effect: None,
            sell_effect: None,
            unlocks_track: Some(2),
        };
        World::new(level, EnemyCatalog::new(catalog), vec![standard_blueprint()])
    }
}
