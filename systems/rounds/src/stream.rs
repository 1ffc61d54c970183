//! Explicit state machine for a round's timed spawn sequence.

use std::time::Duration;

use waypoint_defence_core::{EnemyKind, Round, SpawnInfo};

/// Walks a round's entries in order, releasing one enemy per delay.
#[derive(Clone, Debug)]
pub(crate) struct SpawnStream {
    entries: Vec<SpawnInfo>,
    entry: usize,
    spawned: u32,
    accumulator: Duration,
    pending_delay: Duration,
}

impl SpawnStream {
    pub(crate) fn new(round: &Round) -> Self {
        Self {
            entries: round
                .spawns
                .iter()
                .filter(|entry| entry.count > 0)
                .copied()
                .collect(),
            entry: 0,
            spawned: 0,
            accumulator: Duration::ZERO,
            pending_delay: Duration::ZERO,
        }
    }

    /// Advances the stream by `dt`, pushing every enemy that became due.
    pub(crate) fn advance(&mut self, dt: Duration, out: &mut Vec<EnemyKind>) {
        self.accumulator = self.accumulator.saturating_add(dt);
        while let Some(entry) = self.entries.get(self.entry).copied() {
            if self.accumulator < self.pending_delay {
                break;
            }
            self.accumulator -= self.pending_delay;
            out.push(entry.enemy);
            self.pending_delay = spawn_delay(entry.delay_between);
            self.spawned += 1;
            if self.spawned >= entry.count {
                self.entry += 1;
                self.spawned = 0;
            }
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.entry >= self.entries.len()
    }
}

/// Converts a configured delay, saturating values too large for a `Duration`.
fn spawn_delay(seconds: f32) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(entries: &[(EnemyKind, u32, f32)]) -> Round {
        Round {
            spawns: entries
                .iter()
                .map(|&(enemy, count, delay_between)| SpawnInfo {
                    enemy,
                    count,
                    delay_between,
                })
                .collect(),
        }
    }

    #[test]
    fn first_enemy_is_due_immediately() {
        let mut stream = SpawnStream::new(&round(&[(EnemyKind::Red, 3, 1.0)]));
        let mut due = Vec::new();
        stream.advance(Duration::ZERO, &mut due);
        assert_eq!(due, vec![EnemyKind::Red]);
    }

    #[test]
    fn delay_separates_entries_too() {
        let mut stream = SpawnStream::new(&round(&[
            (EnemyKind::Red, 2, 1.0),
            (EnemyKind::Blue, 1, 0.5),
        ]));
        let mut due = Vec::new();
        stream.advance(Duration::ZERO, &mut due);
        stream.advance(Duration::from_millis(999), &mut due);
        assert_eq!(due, vec![EnemyKind::Red]);

        stream.advance(Duration::from_millis(1), &mut due);
        assert_eq!(due, vec![EnemyKind::Red, EnemyKind::Red]);

        stream.advance(Duration::from_millis(999), &mut due);
        assert_eq!(due.len(), 2);
        assert!(!stream.is_exhausted());

        stream.advance(Duration::from_millis(1), &mut due);
        assert_eq!(due, vec![EnemyKind::Red, EnemyKind::Red, EnemyKind::Blue]);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn empty_entries_are_skipped() {
        let mut stream = SpawnStream::new(&round(&[
            (EnemyKind::Red, 0, 5.0),
            (EnemyKind::Green, 1, 0.4),
        ]));
        let mut due = Vec::new();
        stream.advance(Duration::ZERO, &mut due);
        assert_eq!(due, vec![EnemyKind::Green]);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn large_step_releases_every_due_enemy() {
        let mut stream = SpawnStream::new(&round(&[(EnemyKind::Yellow, 5, 0.25)]));
        let mut due = Vec::new();
        stream.advance(Duration::from_secs(10), &mut due);
        assert_eq!(due.len(), 5);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn oversized_delay_holds_the_rest_of_the_entry_back() {
        let mut stream = SpawnStream::new(&round(&[(EnemyKind::Red, 2, 1e20)]));
        let mut due = Vec::new();
        stream.advance(Duration::ZERO, &mut due);
        stream.advance(Duration::from_secs(3600), &mut due);
        assert_eq!(due, vec![EnemyKind::Red]);
        assert!(!stream.is_exhausted());

        let mut endless = SpawnStream::new(&round(&[(EnemyKind::Blue, 2, f32::INFINITY)]));
        endless.advance(Duration::from_secs(60), &mut due);
        assert_eq!(due, vec![EnemyKind::Red, EnemyKind::Blue]);
    }
}
