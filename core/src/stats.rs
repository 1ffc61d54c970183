use serde::{Deserialize, Serialize};

/// Enemy variants ordered from weakest to strongest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Weakest enemy; never cascades.
    Red,
    /// Cascades into [`EnemyKind::Red`].
    Blue,
    /// Cascades into [`EnemyKind::Blue`].
    Green,
    /// Strongest enemy; cascades into [`EnemyKind::Green`].
    Yellow,
}

impl EnemyKind {
    /// Every enemy kind from weakest to strongest.
    pub const ALL: [Self; 4] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    /// Kind spawned when an enemy of this kind dies, if any.
    #[must_use]
    pub const fn weaker(self) -> Option<Self> {
        match self {
            Self::Yellow => Some(Self::Green),
            Self::Green => Some(Self::Blue),
            Self::Blue => Some(Self::Red),
            Self::Red => None,
        }
    }
}

/// Opaque handle to a visual effect owned by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectHandle(u32);

impl EffectHandle {
    /// Wraps the provided presentation-side identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Opaque handle to a prefab owned by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefabHandle(u32);

impl PrefabHandle {
    /// Wraps the provided presentation-side identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Immutable per-kind enemy configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Kind these statistics describe.
    pub kind: EnemyKind,
    /// Movement speed in world units per second before any slow.
    pub default_speed: f32,
    /// Health assigned at spawn.
    pub start_health: f32,
    /// Weight charged against the life pool and the alive counter.
    pub lives: u32,
    /// Money credited when the enemy dies.
    pub worth: u32,
    /// Effect played where the enemy dies.
    #[serde(default)]
    pub death_effect: Option<EffectHandle>,
    /// Prefab the presentation layer instantiates for this kind.
    pub prefab: PrefabHandle,
}

/// Ordered list of enemy statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyCatalog {
    entries: Vec<EnemyStats>,
}

impl EnemyCatalog {
    /// Creates a catalog from the provided entries.
    #[must_use]
    pub fn new(entries: Vec<EnemyStats>) -> Self {
        Self { entries }
    }

    /// Looks up the statistics configured for the provided kind.
    #[must_use]
    pub fn stats_for(&self, kind: EnemyKind) -> Option<&EnemyStats> {
        self.entries.iter().find(|stats| stats.kind == kind)
    }

    /// Iterator over the configured entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemyStats> {
        self.entries.iter()
    }
}

/// Turret variants available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurretKind {
    /// Single-target projectile turret.
    Standard,
    /// Slow projectile turret with splash damage.
    Cannon,
    /// Continuous beam that damages and slows.
    Laser,
    /// Instant hit at unlimited range.
    Sniper,
}

impl TurretKind {
    /// Every turret kind in declaration order.
    pub const ALL: [Self; 4] = [Self::Standard, Self::Cannon, Self::Laser, Self::Sniper];

    /// Reports whether the turret pivot follows its target.
    #[must_use]
    pub const fn rotates(self) -> bool {
        !matches!(self, Self::Sniper)
    }

    /// Reports whether the armament is valid for this kind.
    #[must_use]
    pub const fn accepts(self, armament: &Armament) -> bool {
        matches!(
            (self, armament),
            (Self::Standard | Self::Cannon, Armament::Projectile { .. })
                | (Self::Laser, Armament::Beam { .. })
                | (Self::Sniper, Armament::Instant { .. })
        )
    }
}

/// Weapon parameters selected by turret kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Armament {
    /// Discrete homing projectile.
    Projectile {
        /// Flight speed in world units per second.
        speed: f32,
        /// Damage applied on impact.
        damage: f32,
        /// Splash radius; zero hits the target only.
        #[serde(default)]
        blast_radius: f32,
        /// Effect played at the impact point.
        #[serde(default)]
        impact_effect: Option<EffectHandle>,
    },
    /// Continuous damage with a per-tick slow.
    Beam {
        /// Damage applied per second of contact.
        damage_per_second: f32,
        /// Fraction of default speed removed while under the beam.
        slow_fraction: f32,
    },
    /// Discrete hit without travel time.
    Instant {
        /// Damage applied per shot.
        damage: f32,
    },
}

/// Statistics of a turret at one upgrade level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretStats {
    /// Acquisition range in world units.
    pub range: f32,
    /// Shots per second for discrete armaments.
    pub fire_rate: f32,
    /// Rotation interpolation rate.
    pub turn_speed: f32,
    /// Accepts targets at any distance.
    #[serde(default)]
    pub infinite_range: bool,
    /// Muzzle effect played per shot.
    #[serde(default)]
    pub fire_effect: Option<EffectHandle>,
    /// Weapon parameters.
    pub armament: Armament,
}

impl TurretStats {
    /// Seconds between consecutive discrete shots.
    #[must_use]
    pub fn reload_seconds(&self) -> f32 {
        if self.fire_rate > 0.0 {
            1.0 / self.fire_rate
        } else {
            f32::INFINITY
        }
    }

    /// Reports whether an enemy at the provided distance may be targeted.
    #[must_use]
    pub fn reaches(&self, distance: f32) -> bool {
        self.infinite_range || distance <= self.range
    }
}

/// Purchase and upgrade data for one turret kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretBlueprint {
    /// Kind produced by the blueprint.
    pub kind: TurretKind,
    /// Price of construction.
    pub cost: u32,
    /// Price of the single upgrade.
    pub upgrade_cost: u32,
    /// Statistics before the upgrade.
    pub base: TurretStats,
    /// Statistics after the upgrade.
    pub upgraded: TurretStats,
}

impl TurretBlueprint {
    /// Money refunded when the turret is sold.
    #[must_use]
    pub const fn sell_value(&self) -> u32 {
        self.cost / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(kind: EnemyKind, lives: u32) -> EnemyStats {
        EnemyStats {
            kind,
            default_speed: 10.0,
            start_health: 100.0,
            lives,
            worth: 1,
            death_effect: None,
            prefab: PrefabHandle::new(0),
        }
    }

    #[test]
    fn weaker_chain_terminates_at_red() {
        let mut chain = vec![EnemyKind::Yellow];
        while let Some(next) = chain.last().and_then(|kind| kind.weaker()) {
            chain.push(next);
        }
        assert_eq!(
            chain,
            vec![
                EnemyKind::Yellow,
                EnemyKind::Green,
                EnemyKind::Blue,
                EnemyKind::Red
            ]
        );
    }

    #[test]
    fn catalog_lookup_skips_missing_kinds() {
        let catalog = EnemyCatalog::new(vec![stats(EnemyKind::Red, 1), stats(EnemyKind::Blue, 2)]);
        assert_eq!(catalog.stats_for(EnemyKind::Blue).map(|s| s.lives), Some(2));
        assert!(catalog.stats_for(EnemyKind::Yellow).is_none());
    }

    #[test]
    fn only_sniper_keeps_a_fixed_pivot() {
        let rotating: Vec<_> = TurretKind::ALL
            .into_iter()
            .filter(|kind| kind.rotates())
            .collect();
        assert_eq!(
            rotating,
            vec![TurretKind::Standard, TurretKind::Cannon, TurretKind::Laser]
        );
    }

    #[test]
    fn armament_pairing_matches_kind() {
        let beam = Armament::Beam {
            damage_per_second: 30.0,
            slow_fraction: 0.5,
        };
        assert!(TurretKind::Laser.accepts(&beam));
        assert!(!TurretKind::Sniper.accepts(&beam));
        assert!(TurretKind::Sniper.accepts(&Armament::Instant { damage: 100.0 }));
    }

    #[test]
    fn zero_fire_rate_never_reloads() {
        let stats = TurretStats {
            range: 15.0,
            fire_rate: 0.0,
            turn_speed: 10.0,
            infinite_range: false,
            fire_effect: None,
            armament: Armament::Instant { damage: 1.0 },
        };
        assert!(stats.reload_seconds().is_infinite());
        assert!(stats.reaches(15.0));
        assert!(!stats.reaches(15.1));
    }
}
