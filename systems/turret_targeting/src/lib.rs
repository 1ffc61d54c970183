#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that periodically assigns every turret its nearest enemy.
//!
//! Each turret owns a retarget timer. A turret scans the first time it shows
//! up in the turret view and then whenever its timer runs out. Between scans
//! the previous assignment stands; the world clears targets that die or escape.

use std::{collections::BTreeMap, time::Duration};

use tracing::trace;
use waypoint_defence_core::{
    Command, EnemyId, EnemyView, Event, TurretId, TurretSnapshot, TurretView,
    TARGET_REFRESH_INTERVAL,
};

/// Turret targeting system holding one retarget timer per turret.
#[derive(Debug)]
pub struct TurretTargeting {
    interval: Duration,
    /// Time accumulated since each turret's last scan.
    timers: BTreeMap<TurretId, Duration>,
}

impl TurretTargeting {
    /// Creates a targeting system that rescans every `interval` of simulated time.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timers: BTreeMap::new(),
        }
    }

    /// Advances the retarget timers and emits assignment changes.
    ///
    /// [`Command::AssignTarget`] is only emitted when a scan picks something
    /// different from the target the turret already holds.
    pub fn handle(
        &mut self,
        events: &[Event],
        turrets: &TurretView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        self.timers.retain(|id, _| turrets.get(*id).is_some());

        for turret in turrets.iter() {
            let due = match self.timers.get_mut(&turret.id) {
                Some(since_scan) => {
                    *since_scan = since_scan.saturating_add(elapsed);
                    if *since_scan < self.interval {
                        false
                    } else {
                        *since_scan = carry_over(*since_scan, self.interval);
                        true
                    }
                }
                None => {
                    let _ = self.timers.insert(turret.id, Duration::ZERO);
                    true
                }
            };
            if !due {
                continue;
            }

            let target = nearest_in_reach(turret, enemies);
            if target != turret.target {
                trace!(
                    turret = turret.id.get(),
                    target = ?target.map(|enemy| enemy.get()),
                    "retargeted"
                );
                out.push(Command::AssignTarget {
                    turret: turret.id,
                    target,
                });
            }
        }
    }

    /// Number of turrets with a running retarget timer.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TurretTargeting {
    fn default() -> Self {
        Self::new(TARGET_REFRESH_INTERVAL)
    }
}

/// Time left over once a scan consumes whole intervals.
fn carry_over(since_scan: Duration, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }
    let remainder = since_scan.as_nanos() % interval.as_nanos();
    Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX))
}

/// Nearest live enemy, kept only when the turret can reach it.
fn nearest_in_reach(turret: &TurretSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    let mut best: Option<BestCandidate> = None;
    for enemy in enemies.iter() {
        let current = BestCandidate {
            distance: turret.position.distance(enemy.position),
            enemy: enemy.id,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.filter(|candidate| turret.stats.reaches(candidate.distance))
        .map(|candidate| candidate.enemy)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }
        self.enemy < other.enemy
    }
}
