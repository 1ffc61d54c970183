#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims turrets and emits their weapon commands.
//!
//! The world decides whether a shot is legal; this system only proposes
//! shots for turrets whose target still resolves and whose cooldown ran out.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use tracing::trace;
use waypoint_defence_core::{
    Armament, Command, EnemySnapshot, EnemyView, Event, TurretSnapshot, TurretView,
};

/// Yaw changes smaller than this are not worth a command.
const AIM_EPSILON: f32 = 1e-4;

/// Turret combat system that queues aiming and firing commands.
#[derive(Debug, Default)]
pub struct TurretCombat {
    scratch: Vec<Command>,
}

impl TurretCombat {
    /// Creates a new turret combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits aiming, firing and beam commands for every turret.
    pub fn handle(
        &mut self,
        events: &[Event],
        turrets: &TurretView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();

        self.scratch.clear();
        for turret in turrets.iter() {
            let target = turret.target.and_then(|id| enemies.get(id));
            match target {
                Some(enemy) => self.engage(turret, enemy, dt),
                None if turret.beam_active => self.scratch.push(Command::SetBeam {
                    turret: turret.id,
                    active: false,
                }),
                None => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn engage(&mut self, turret: &TurretSnapshot, enemy: &EnemySnapshot, dt: f32) {
        if turret.kind.rotates() && dt > 0.0 {
            let desired = bearing(turret.position, enemy.position);
            let yaw = turn_toward(turret.yaw, desired, (dt * turret.stats.turn_speed).min(1.0));
            if (yaw - turret.yaw).abs() > AIM_EPSILON {
                self.scratch.push(Command::AimTurret {
                    turret: turret.id,
                    yaw,
                });
            }
        }

        let loaded = turret.fire_cooldown <= 0.0;
        match turret.stats.armament {
            Armament::Projectile { .. } if loaded => {
                trace!(turret = turret.id.get(), enemy = enemy.id.get(), "fire");
                self.scratch.push(Command::FireProjectile {
                    turret: turret.id,
                    target: enemy.id,
                });
            }
            Armament::Instant { damage } if loaded => {
                trace!(turret = turret.id.get(), enemy = enemy.id.get(), "strike");
                self.scratch.push(Command::StrikeEnemy {
                    turret: turret.id,
                    target: enemy.id,
                    damage,
                });
            }
            Armament::Beam {
                damage_per_second,
                slow_fraction,
            } => {
                if !turret.beam_active {
                    self.scratch.push(Command::SetBeam {
                        turret: turret.id,
                        active: true,
                    });
                }
                if dt > 0.0 {
                    self.scratch.push(Command::BurnEnemy {
                        turret: turret.id,
                        target: enemy.id,
                        damage: damage_per_second * dt,
                        slow: slow_fraction,
                    });
                }
            }
            Armament::Projectile { .. } | Armament::Instant { .. } => {}
        }
    }
}

/// Yaw around the vertical axis that faces `to` from `from`. Zero looks along +Z.
#[must_use]
pub fn bearing(from: Vec3, to: Vec3) -> f32 {
    let offset = to - from;
    offset.x.atan2(offset.z)
}

/// Rotates `current` toward `desired` by the fraction `t` of the shortest arc.
#[must_use]
pub fn turn_toward(current: f32, desired: f32, t: f32) -> f32 {
    let delta = wrap_angle(desired - current);
    wrap_angle(current + delta * t.clamp(0.0, 1.0))
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
