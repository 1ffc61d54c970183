use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::EffectHandle;

/// Scenery that blocks a build node until it is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Removable for a fee.
    Tree,
    /// Permanent.
    Rock,
}

impl ObstacleKind {
    /// Reports whether the player may pay to remove the obstacle.
    #[must_use]
    pub const fn is_removable(self) -> bool {
        matches!(self, Self::Tree)
    }
}

/// Static description of a build node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Position where a turret on the node stands.
    pub position: Vec3,
    /// Obstacle present when the level starts.
    #[serde(default)]
    pub obstacle: Option<ObstacleKind>,
}

/// Geometry and starting economy of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Where scheduled enemies enter the field.
    pub spawn_point: Vec3,
    /// Ordered path shared by every enemy.
    pub waypoints: Vec<Vec3>,
    /// Build nodes; a node's identifier equals its index.
    #[serde(default)]
    pub nodes: Vec<NodeLayout>,
    /// Money available when the level starts.
    pub starting_money: u32,
    /// Life pool when the level starts.
    pub starting_lives: i32,
    /// Fee charged to clear a removable obstacle.
    #[serde(default = "default_clearance_cost")]
    pub obstacle_clearance_cost: u32,
    /// Effect played when a turret is built or upgraded.
    #[serde(default)]
    pub build_effect: Option<EffectHandle>,
    /// Effect played when a turret is sold.
    #[serde(default)]
    pub sell_effect: Option<EffectHandle>,
    /// Track unlocked by winning the level.
    #[serde(default)]
    pub unlocks_track: Option<u32>,
}

const fn default_clearance_cost() -> u32 {
    500
}
