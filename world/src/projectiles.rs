//! Homing projectiles fired by Standard and Cannon turrets.

use std::collections::BTreeMap;

use glam::Vec3;
use waypoint_defence_core::{EffectHandle, EnemyId, Event, ProjectileId, EFFECT_LIFETIME};

use crate::World;

/// Damage delivered when a projectile reaches its target.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Warhead {
    pub(crate) damage: f32,
    pub(crate) blast_radius: f32,
    pub(crate) impact_effect: Option<EffectHandle>,
}

#[derive(Clone, Debug)]
struct Projectile {
    target: EnemyId,
    position: Vec3,
    speed: f32,
    warhead: Warhead,
}

/// Registry that stores projectiles in flight.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: u32,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: 0,
        }
    }

    pub(crate) fn launch(
        &mut self,
        target: EnemyId,
        origin: Vec3,
        speed: f32,
        warhead: Warhead,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        let _ = self.entries.insert(
            id,
            Projectile {
                target,
                position: origin,
                speed,
                warhead,
            },
        );
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every projectile, returning how many were in flight.
    pub(crate) fn drain(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}

enum Flight {
    Expired,
    Travelling(Vec3),
    Impact(Vec3),
}

impl World {
    /// Moves every projectile toward its target and resolves impacts.
    pub(crate) fn advance_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let ids: Vec<ProjectileId> = self.projectiles.entries.keys().copied().collect();
        for id in ids {
            let Some(projectile) = self.projectiles.entries.get(&id) else {
                continue;
            };
            let target = self
                .enemies
                .get(projectile.target)
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.position);

            let flight = match target {
                None => Flight::Expired,
                Some(destination) => {
                    let offset = destination - projectile.position;
                    let step = projectile.speed * dt;
                    if offset.length() <= step {
                        Flight::Impact(destination)
                    } else {
                        Flight::Travelling(projectile.position + offset.normalize_or_zero() * step)
                    }
                }
            };

            match flight {
                Flight::Expired => {
                    let _ = self.projectiles.entries.remove(&id);
                    out_events.push(Event::ProjectileExpired { projectile: id });
                }
                Flight::Travelling(position) => {
                    if let Some(projectile) = self.projectiles.entries.get_mut(&id) {
                        projectile.position = position;
                    }
                }
                Flight::Impact(position) => {
                    if let Some(projectile) = self.projectiles.entries.remove(&id) {
                        out_events.push(Event::ProjectileImpact {
                            projectile: id,
                            position,
                        });
                        self.detonate(&projectile, position, out_events);
                    }
                }
            }
        }
    }

    fn detonate(&mut self, projectile: &Projectile, position: Vec3, out_events: &mut Vec<Event>) {
        let warhead = projectile.warhead;
        if let Some(effect) = warhead.impact_effect {
            out_events.push(Event::EffectSpawned {
                effect,
                position,
                lifetime: EFFECT_LIFETIME,
            });
        }

        if warhead.blast_radius > 0.0 {
            for enemy in self.enemies.within(position, warhead.blast_radius) {
                self.damage_enemy(enemy, warhead.damage, out_events);
            }
        } else {
            self.damage_enemy(projectile.target, warhead.damage, out_events);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec3;
    use waypoint_defence_core::{Command, EnemyKind, Event, ProjectileId};

    use super::Warhead;
    use crate::{
        apply, query,
        test_support::{enemy_stats, world_with},
    };

    #[test]
    fn projectile_homes_and_damages_its_target() {
        let mut world = world_with(vec![enemy_stats(EnemyKind::Red, 100.0, 1, 1)]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                enemy: EnemyKind::Red,
            },
            &mut events,
        );
        let enemy = query::enemy_view(&world).iter().next().expect("enemy").id;
        let _ = world.projectiles.launch(
            enemy,
            Vec3::new(10.0, 0.0, 0.0),
            4.0,
            Warhead {
                damage: 30.0,
                blast_radius: 0.0,
                impact_effect: None,
            },
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::projectile_count(&world), 1);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyDamaged { .. })));

        for _ in 0..2 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        assert_eq!(query::projectile_count(&world), 0);
        let health = query::enemy_view(&world).get(enemy).expect("enemy").health;
        assert!((health - 70.0).abs() < 1e-4);
    }

    #[test]
    fn projectile_expires_when_target_disappears() {
        let mut world = world_with(vec![enemy_stats(EnemyKind::Red, 10.0, 1, 1)]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                enemy: EnemyKind::Red,
            },
            &mut events,
        );
        let enemy = query::enemy_view(&world).iter().next().expect("enemy").id;
        let projectile = world.projectiles.launch(
            enemy,
            Vec3::new(50.0, 0.0, 0.0),
            1.0,
            Warhead {
                damage: 5.0,
                blast_radius: 0.0,
                impact_effect: None,
            },
        );
        world.kill_enemy(enemy, 0.0, &mut events);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert!(events.contains(&Event::ProjectileExpired { projectile }));
        assert_eq!(projectile, ProjectileId::new(0));
    }

    #[test]
    fn blast_damages_every_enemy_in_radius() {
        let mut world = world_with(vec![enemy_stats(EnemyKind::Red, 100.0, 1, 1)]);
        let mut events = Vec::new();
        for _ in 0..3 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    enemy: EnemyKind::Red,
                },
                &mut events,
            );
        }
        let ids: Vec<_> = query::enemy_view(&world).iter().map(|e| e.id).collect();
        apply(
            &mut world,
            Command::MoveEnemy {
                enemy: ids[2],
                position: Vec3::new(0.0, 0.0, 30.0),
                waypoint_index: 0,
            },
            &mut events,
        );
        let _ = world.projectiles.launch(
            ids[0],
            Vec3::new(1.0, 0.0, 0.0),
            10.0,
            Warhead {
                damage: 40.0,
                blast_radius: 10.0,
                impact_effect: None,
            },
        );

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );

        let view = query::enemy_view(&world);
        let health = |index: usize| view.get(ids[index]).expect("enemy").health;
        assert!((health(0) - 60.0).abs() < 1e-4);
        assert!((health(1) - 60.0).abs() < 1e-4);
        assert!((health(2) - 100.0).abs() < 1e-4);
    }
}
