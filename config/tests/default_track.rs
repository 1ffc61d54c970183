use waypoint_defence_config::GameConfig;
use waypoint_defence_core::{EnemyKind, ObstacleKind, TurretKind};

#[test]
fn default_track_is_valid() {
    let config = GameConfig::default_track().expect("built-in track must validate");

    assert_eq!(config.rounds.len(), 26);
    assert_eq!(config.level.nodes.len(), 12);
    assert!(!config.schedule.auto_advance);
    for kind in EnemyKind::ALL {
        assert!(config.enemies.stats_for(kind).is_some(), "{kind:?} missing");
    }
    for kind in TurretKind::ALL {
        assert!(config.blueprint(kind).is_some(), "{kind:?} missing");
    }
}

#[test]
fn opening_round_sends_every_enemy_kind() {
    let config = GameConfig::default_track().expect("built-in track must validate");
    let opening = config.rounds.get(0).expect("first round");

    let kinds: Vec<_> = opening.spawns.iter().map(|entry| entry.enemy).collect();
    assert_eq!(
        kinds,
        vec![
            EnemyKind::Red,
            EnemyKind::Blue,
            EnemyKind::Green,
            EnemyKind::Yellow
        ]
    );
    assert_eq!(opening.enemy_count(), 20);
    assert_eq!(opening.weight(&config.enemies), 5 * (1 + 2 + 3 + 4));
}

#[test]
fn sniper_alone_has_unlimited_range() {
    let config = GameConfig::default_track().expect("built-in track must validate");
    for blueprint in &config.turrets {
        assert_eq!(
            blueprint.base.infinite_range,
            blueprint.kind == TurretKind::Sniper
        );
    }
}

#[test]
fn obstacles_are_declared_on_nodes() {
    let config = GameConfig::default_track().expect("built-in track must validate");
    let obstacles: Vec<_> = config
        .level
        .nodes
        .iter()
        .filter_map(|node| node.obstacle)
        .collect();
    assert_eq!(
        obstacles,
        vec![ObstacleKind::Tree, ObstacleKind::Rock, ObstacleKind::Tree]
    );
}
