#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic path follower that walks enemies along the shared waypoints.

use glam::Vec3;
use waypoint_defence_core::{Command, EnemySnapshot, EnemyView, Event, WAYPOINT_ARRIVAL_THRESHOLD};

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Clone, Copy, Debug)]
pub struct Movement {
    arrival_threshold: f32,
}

impl Movement {
    /// Creates a movement system using the provided arrival threshold.
    #[must_use]
    pub const fn new(arrival_threshold: f32) -> Self {
        Self { arrival_threshold }
    }

    /// Consumes world events and the enemy view to emit movement commands.
    ///
    /// Every live enemy steps toward its current waypoint at its speed factor.
    /// Enemies that arrive at the final waypoint are reported as escaped.
    pub fn handle(
        &self,
        events: &[Event],
        enemies: &EnemyView,
        waypoints: &[Vec3],
        out: &mut Vec<Command>,
    ) {
        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();
        if dt <= 0.0 {
            return;
        }

        for enemy in enemies.iter() {
            out.push(self.step(enemy, waypoints, dt));
        }
    }

    fn step(&self, enemy: &EnemySnapshot, waypoints: &[Vec3], dt: f32) -> Command {
        let Some(&target) = waypoints.get(enemy.waypoint_index) else {
            return Command::EscapeEnemy { enemy: enemy.id };
        };

        let offset = target - enemy.position;
        let travel = enemy.speed_factor.max(0.0) * dt;
        let position = if offset.length() <= travel {
            target
        } else {
            enemy.position + offset.normalize_or_zero() * travel
        };

        let mut waypoint_index = enemy.waypoint_index;
        if position.distance(target) <= self.arrival_threshold {
            if waypoint_index + 1 >= waypoints.len() {
                return Command::EscapeEnemy { enemy: enemy.id };
            }
            waypoint_index += 1;
        }

        Command::MoveEnemy {
            enemy: enemy.id,
            position,
            waypoint_index,
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(WAYPOINT_ARRIVAL_THRESHOLD)
    }
}
