use serde::{Deserialize, Serialize};

use crate::{EnemyCatalog, EnemyKind};

/// One batch of identical enemies within a round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnInfo {
    /// Kind of enemy spawned by the entry.
    pub enemy: EnemyKind,
    /// Number of enemies spawned by the entry.
    pub count: u32,
    /// Seconds waited after every spawn of the entry.
    pub delay_between: f32,
}

/// Ordered spawn entries making up a single round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Entries executed strictly in order.
    #[serde(default)]
    pub spawns: Vec<SpawnInfo>,
}

impl Round {
    /// Weighted population of the round: the sum of `count × lives` over
    /// every entry whose enemy kind is configured in the catalog.
    #[must_use]
    pub fn weight(&self, catalog: &EnemyCatalog) -> u32 {
        self.spawns
            .iter()
            .filter_map(|entry| {
                catalog
                    .stats_for(entry.enemy)
                    .map(|stats| entry.count.saturating_mul(stats.lives))
            })
            .fold(0, u32::saturating_add)
    }

    /// Number of enemies the round spawns, ignoring weights.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.spawns
            .iter()
            .map(|entry| entry.count)
            .fold(0, u32::saturating_add)
    }
}

/// Ordered sequence of rounds for one level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundTable {
    rounds: Vec<Round>,
}

impl RoundTable {
    /// Creates a table from the provided rounds.
    #[must_use]
    pub fn new(rounds: Vec<Round>) -> Self {
        Self { rounds }
    }

    /// Number of rounds in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Retrieves the round at the provided zero-based index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    /// Iterator over the rounds in play order.
    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnemyStats, PrefabHandle};

    fn catalog() -> EnemyCatalog {
        EnemyCatalog::new(vec![
            EnemyStats {
                kind: EnemyKind::Red,
                default_speed: 10.0,
                start_health: 100.0,
                lives: 1,
                worth: 1,
                death_effect: None,
                prefab: PrefabHandle::new(1),
            },
            EnemyStats {
                kind: EnemyKind::Blue,
                default_speed: 12.0,
                start_health: 100.0,
                lives: 2,
                worth: 2,
                death_effect: None,
                prefab: PrefabHandle::new(2),
            },
        ])
    }

    #[test]
    fn weight_multiplies_counts_by_lives() {
        let round = Round {
            spawns: vec![
                SpawnInfo {
                    enemy: EnemyKind::Red,
                    count: 5,
                    delay_between: 1.0,
                },
                SpawnInfo {
                    enemy: EnemyKind::Blue,
                    count: 3,
                    delay_between: 0.8,
                },
            ],
        };
        assert_eq!(round.weight(&catalog()), 11);
        assert_eq!(round.enemy_count(), 8);
    }

    #[test]
    fn unconfigured_entries_carry_no_weight() {
        let round = Round {
            spawns: vec![SpawnInfo {
                enemy: EnemyKind::Yellow,
                count: 4,
                delay_between: 0.2,
            }],
        };
        assert_eq!(round.weight(&catalog()), 0);
    }

    #[test]
    fn table_round_trips_through_bincode() {
        let table = RoundTable::new(vec![Round {
            spawns: vec![SpawnInfo {
                enemy: EnemyKind::Red,
                count: 12,
                delay_between: 1.0,
            }],
        }]);
        let bytes = bincode::serialize(&table).expect("serialize");
        let restored: RoundTable = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, table);
    }
}
