#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Loading and validation of the static tables that drive a level.
//!
//! A level is described by one TOML document holding the enemy catalog, the
//! turret blueprints, the round table, the level layout and the scheduling
//! options. Documents are validated once at load time and treated as
//! immutable afterwards.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use waypoint_defence_core::{
    EnemyCatalog, EnemyKind, LevelLayout, RoundTable, TurretBlueprint, TurretKind, TurretStats,
};

const DEFAULT_TRACK: &str = include_str!("../assets/track01.toml");

/// Errors raised while loading or validating a level document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read from disk.
    #[error("failed to read level document {}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse level document")]
    Parse(#[from] toml::de::Error),
    /// An enemy entry carries an invalid value.
    #[error("enemy {kind:?}: {reason}")]
    InvalidEnemy {
        /// Kind of the offending entry.
        kind: EnemyKind,
        /// Description of the violated constraint.
        reason: &'static str,
    },
    /// Two enemy entries share a kind.
    #[error("enemy {0:?} is configured more than once")]
    DuplicateEnemy(EnemyKind),
    /// A turret entry carries an invalid value.
    #[error("turret {kind:?}: {reason}")]
    InvalidTurret {
        /// Kind of the offending blueprint.
        kind: TurretKind,
        /// Description of the violated constraint.
        reason: &'static str,
    },
    /// Two blueprints share a kind.
    #[error("turret {0:?} is configured more than once")]
    DuplicateTurret(TurretKind),
    /// A turret kind has no blueprint.
    #[error("turret {0:?} has no blueprint")]
    MissingBlueprint(TurretKind),
    /// A round references an enemy kind without statistics.
    #[error("round {round} spawns {enemy:?}, which has no statistics")]
    UnknownEnemy {
        /// Zero-based index of the round.
        round: usize,
        /// Kind referenced by the round.
        enemy: EnemyKind,
    },
    /// A spawn entry carries a negative or non-finite delay.
    #[error("round {round}, entry {entry}: delay must be a finite, non-negative number")]
    InvalidDelay {
        /// Zero-based index of the round.
        round: usize,
        /// Zero-based index of the entry within the round.
        entry: usize,
    },
    /// The level layout is unusable.
    #[error("level: {0}")]
    InvalidLevel(&'static str),
    /// Schedule timings are unusable.
    #[error("schedule: {0}")]
    InvalidSchedule(&'static str),
}

/// Round scheduling options.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Starts rounds automatically once the field is clear.
    pub auto_advance: bool,
    /// Seconds before the first automatic round.
    pub initial_countdown: f32,
    /// Seconds between automatic rounds.
    pub time_between_rounds: f32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            auto_advance: false,
            initial_countdown: 2.0,
            time_between_rounds: 5.5,
        }
    }
}

/// Complete static description of a playable level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Statistics per enemy kind.
    pub enemies: EnemyCatalog,
    /// Purchase data per turret kind.
    pub turrets: Vec<TurretBlueprint>,
    /// Rounds played in order.
    pub rounds: RoundTable,
    /// Geometry and starting economy.
    pub level: LevelLayout,
    /// Round scheduling options.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl GameConfig {
    /// Parses and validates a level document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the level document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in first track.
    pub fn default_track() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_TRACK)
    }

    /// Checks every table invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_enemies(&self.enemies)?;
        validate_turrets(&self.turrets)?;
        validate_rounds(&self.rounds, &self.enemies)?;
        validate_level(&self.level)?;
        validate_schedule(&self.schedule)
    }

    /// Blueprint configured for the provided kind.
    #[must_use]
    pub fn blueprint(&self, kind: TurretKind) -> Option<&TurretBlueprint> {
        self.turrets.iter().find(|blueprint| blueprint.kind == kind)
    }
}

fn validate_enemies(catalog: &EnemyCatalog) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for stats in catalog.iter() {
        let kind = stats.kind;
        if !seen.insert(kind) {
            return Err(ConfigError::DuplicateEnemy(kind));
        }
        if !(stats.default_speed.is_finite() && stats.default_speed > 0.0) {
            return Err(ConfigError::InvalidEnemy {
                kind,
                reason: "default_speed must be positive",
            });
        }
        if !(stats.start_health.is_finite() && stats.start_health > 0.0) {
            return Err(ConfigError::InvalidEnemy {
                kind,
                reason: "start_health must be positive",
            });
        }
        if stats.lives == 0 {
            return Err(ConfigError::InvalidEnemy {
                kind,
                reason: "lives must be at least one",
            });
        }
    }
    Ok(())
}

fn validate_turrets(blueprints: &[TurretBlueprint]) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for blueprint in blueprints {
        if !seen.insert(blueprint.kind) {
            return Err(ConfigError::DuplicateTurret(blueprint.kind));
        }
        validate_turret_stats(blueprint.kind, &blueprint.base)?;
        validate_turret_stats(blueprint.kind, &blueprint.upgraded)?;
    }
    match TurretKind::ALL.into_iter().find(|kind| !seen.contains(kind)) {
        Some(kind) => Err(ConfigError::MissingBlueprint(kind)),
        None => Ok(()),
    }
}

fn validate_turret_stats(kind: TurretKind, stats: &TurretStats) -> Result<(), ConfigError> {
    let invalid = |reason| Err(ConfigError::InvalidTurret { kind, reason });
    if !kind.accepts(&stats.armament) {
        return invalid("armament does not match the turret kind");
    }
    if stats.infinite_range && kind != TurretKind::Sniper {
        return invalid("only snipers may have infinite range");
    }
    if !(stats.range.is_finite() && stats.range >= 0.0) {
        return invalid("range must be a non-negative number");
    }
    if !(stats.fire_rate.is_finite() && stats.fire_rate > 0.0) {
        return invalid("fire_rate must be positive");
    }
    if !(stats.turn_speed.is_finite() && stats.turn_speed >= 0.0) {
        return invalid("turn_speed must be a non-negative number");
    }
    Ok(())
}

fn validate_rounds(rounds: &RoundTable, catalog: &EnemyCatalog) -> Result<(), ConfigError> {
    for (round, table) in rounds.iter().enumerate() {
        for (entry, spawn) in table.spawns.iter().enumerate() {
            if catalog.stats_for(spawn.enemy).is_none() {
                return Err(ConfigError::UnknownEnemy {
                    round,
                    enemy: spawn.enemy,
                });
            }
            if !(spawn.delay_between.is_finite() && spawn.delay_between >= 0.0) {
                return Err(ConfigError::InvalidDelay { round, entry });
            }
        }
    }
    Ok(())
}

fn validate_level(level: &LevelLayout) -> Result<(), ConfigError> {
    if level.waypoints.is_empty() {
        return Err(ConfigError::InvalidLevel("the path needs at least one waypoint"));
    }
    if level.starting_lives <= 0 {
        return Err(ConfigError::InvalidLevel("starting_lives must be positive"));
    }
    Ok(())
}

fn validate_schedule(schedule: &ScheduleConfig) -> Result<(), ConfigError> {
    let valid = |seconds: f32| seconds.is_finite() && seconds >= 0.0;
    if !valid(schedule.initial_countdown) || !valid(schedule.time_between_rounds) {
        return Err(ConfigError::InvalidSchedule(
            "countdowns must be finite, non-negative numbers",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [[enemies]]
        kind = "Red"
        default_speed = 10.0
        start_health = 100.0
        lives = 1
        worth = 1
        prefab = 1

        [[rounds]]
        [[rounds.spawns]]
        enemy = "Red"
        count = 3
        delay_between = 1.0

        [level]
        spawn_point = [0.0, 0.0, 0.0]
        waypoints = [[0.0, 0.0, 10.0]]
        starting_money = 100
        starting_lives = 10
    "#;

    fn turret_tables() -> String {
        let mut tables = String::new();
        for (kind, armament) in [
            ("Standard", "type = \"projectile\"\nspeed = 70.0\ndamage = 50.0"),
            ("Cannon", "type = \"projectile\"\nspeed = 40.0\ndamage = 50.0\nblast_radius = 10.0"),
            ("Laser", "type = \"beam\"\ndamage_per_second = 30.0\nslow_fraction = 0.5"),
            ("Sniper", "type = \"instant\"\ndamage = 100.0"),
        ] {
            let infinite = if kind == "Sniper" { "true" } else { "false" };
            for level in ["base", "upgraded"] {
                if level == "base" {
                    tables.push_str(&format!(
                        "[[turrets]]\nkind = \"{kind}\"\ncost = 100\nupgrade_cost = 50\n"
                    ));
                }
                tables.push_str(&format!(
                    "[turrets.{level}]\nrange = 15.0\nfire_rate = 1.0\nturn_speed = 10.0\ninfinite_range = {infinite}\n[turrets.{level}.armament]\n{armament}\n"
                ));
            }
        }
        tables
    }

    fn document() -> String {
        format!("{}\n{MINIMAL}", turret_tables())
    }

    #[test]
    fn minimal_document_parses() {
        let config = GameConfig::from_toml_str(&document()).expect("valid document");
        assert_eq!(config.rounds.len(), 1);
        assert_eq!(config.level.obstacle_clearance_cost, 500);
        assert_eq!(config.schedule, ScheduleConfig::default());
        assert_eq!(config.blueprint(TurretKind::Sniper).map(|b| b.sell_value()), Some(50));
    }

    #[test]
    fn unknown_round_enemy_is_rejected() {
        let broken = document().replace("enemy = \"Red\"", "enemy = \"Blue\"");
        assert!(matches!(
            GameConfig::from_toml_str(&broken),
            Err(ConfigError::UnknownEnemy {
                round: 0,
                enemy: EnemyKind::Blue
            })
        ));
    }

    #[test]
    fn zero_lives_are_rejected() {
        let broken = document().replacen("lives = 1", "lives = 0", 1);
        assert!(matches!(
            GameConfig::from_toml_str(&broken),
            Err(ConfigError::InvalidEnemy {
                kind: EnemyKind::Red,
                ..
            })
        ));
    }

    #[test]
    fn mismatched_armament_is_rejected() {
        let broken = document().replacen("type = \"beam\"", "type = \"instant\"\ndamage = 1.0", 1);
        let broken = broken.replacen("damage_per_second = 30.0\nslow_fraction = 0.5\n", "", 1);
        assert!(matches!(
            GameConfig::from_toml_str(&broken),
            Err(ConfigError::InvalidTurret {
                kind: TurretKind::Laser,
                ..
            })
        ));
    }

    #[test]
    fn negative_delay_is_rejected() {
        let broken = document().replace("delay_between = 1.0", "delay_between = -1.0");
        assert!(matches!(
            GameConfig::from_toml_str(&broken),
            Err(ConfigError::InvalidDelay { round: 0, entry: 0 })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = GameConfig::load("does/not/exist.toml").expect_err("missing file");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
