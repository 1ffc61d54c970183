use std::time::Duration;

use glam::Vec3;
use waypoint_defence_core::{
    Armament, Command, EnemyCatalog, EnemyKind, EnemyStats, Event, LevelLayout, NodeId,
    NodeLayout, PrefabHandle, TurretBlueprint, TurretKind, TurretStats,
};
use waypoint_defence_system_turret_combat::TurretCombat;
use waypoint_defence_system_turret_targeting::TurretTargeting;
use waypoint_defence_world::{self as world, query, World};

fn blueprint(kind: TurretKind, armament: Armament) -> TurretBlueprint {
    let stats = TurretStats {
        range: 15.0,
        fire_rate: 1.0,
        turn_speed: 10.0,
        infinite_range: kind == TurretKind::Sniper,
        fire_effect: None,
        armament,
    };
    TurretBlueprint {
        kind,
        cost: 100,
        upgrade_cost: 100,
        base: stats,
        upgraded: stats,
    }
}

fn build_world() -> World {
    let level = LevelLayout {
        spawn_point: Vec3::ZERO,
        waypoints: vec![Vec3::new(0.0, 0.0, 40.0)],
        nodes: vec![NodeLayout {
            position: Vec3::new(0.0, 0.0, 5.0),
            obstacle: None,
        }],
        starting_money: 1_000,
        starting_lives: 10,
        obstacle_clearance_cost: 500,
        build_effect: None,
        sell_effect: None,
        unlocks_track: None,
    };
    let catalog = EnemyCatalog::new(vec![
        EnemyStats {
            kind: EnemyKind::Red,
            default_speed: 10.0,
            start_health: 100.0,
            lives: 1,
            worth: 5,
            death_effect: None,
            prefab: PrefabHandle::new(0),
        },
        EnemyStats {
            kind: EnemyKind::Blue,
            default_speed: 12.0,
            start_health: 100.0,
            lives: 2,
            worth: 5,
            death_effect: None,
            prefab: PrefabHandle::new(1),
        },
    ]);
    let blueprints = vec![
        blueprint(
            TurretKind::Standard,
            Armament::Projectile {
                speed: 70.0,
                damage: 50.0,
                blast_radius: 0.0,
                impact_effect: None,
            },
        ),
        blueprint(
            TurretKind::Laser,
            Armament::Beam {
                damage_per_second: 30.0,
                slow_fraction: 0.5,
            },
        ),
        blueprint(TurretKind::Sniper, Armament::Instant { damage: 100.0 }),
    ];
    World::new(level, catalog, blueprints)
}

struct Pipeline {
    world: World,
    targeting: TurretTargeting,
    combat: TurretCombat,
}

impl Pipeline {
    fn new(kind: TurretKind, enemy: EnemyKind) -> Self {
        let mut world = build_world();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::PlaceTurret {
                node: NodeId::new(0),
                kind,
            },
            &mut events,
        );
        world::apply(&mut world, Command::SpawnEnemy { enemy }, &mut events);
        Self {
            world,
            targeting: TurretTargeting::default(),
            combat: TurretCombat::new(),
        }
    }

    fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.targeting.handle(
            &events,
            &query::turret_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        self.combat.handle(
            &events,
            &query::turret_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }
}

fn deaths(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count()
}

#[test]
fn sniper_kills_in_one_shot_and_pays_out() {
    let mut pipeline = Pipeline::new(TurretKind::Sniper, EnemyKind::Red);
    let money_before = query::economy(&pipeline.world).money();

    let events = pipeline.tick(Duration::from_millis(16));

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TurretStruck { .. })));
    assert_eq!(deaths(&events), 1);
    assert_eq!(query::enemy_count(&pipeline.world), 0);
    assert_eq!(query::economy(&pipeline.world).money(), money_before + 5);
}

#[test]
fn sniper_kill_on_blue_cascades_into_red() {
    let mut pipeline = Pipeline::new(TurretKind::Sniper, EnemyKind::Blue);

    let events = pipeline.tick(Duration::from_millis(16));

    assert_eq!(deaths(&events), 1);
    let view = query::enemy_view(&pipeline.world);
    let survivor = view.iter().next().expect("cascaded enemy");
    assert_eq!(survivor.kind, EnemyKind::Red);
    assert!((survivor.position - Vec3::ZERO).length() < f32::EPSILON);
}

#[test]
fn laser_burns_down_its_target_and_switches_off() {
    let mut pipeline = Pipeline::new(TurretKind::Laser, EnemyKind::Red);

    let first = pipeline.tick(Duration::from_secs(1));
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::BeamEnabled { .. })));

    let mut log = Vec::new();
    for _ in 0..3 {
        log.extend(pipeline.tick(Duration::from_secs(1)));
    }
    assert_eq!(deaths(&log), 1);

    let after = pipeline.tick(Duration::from_secs(1));
    assert!(after
        .iter()
        .any(|event| matches!(event, Event::BeamDisabled { .. })));
    assert!(!query::turret_view(&pipeline.world)
        .iter()
        .any(|turret| turret.beam_active));
}

#[test]
fn standard_turret_respects_its_reload() {
    let mut pipeline = Pipeline::new(TurretKind::Standard, EnemyKind::Red);

    let mut fired = 0;
    for _ in 0..10 {
        let events = pipeline.tick(Duration::from_millis(100));
        fired += events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count();
    }

    assert_eq!(fired, 1);
    assert_eq!(query::projectile_count(&pipeline.world), 0);
    let enemy = query::enemy_view(&pipeline.world);
    let enemy = enemy.iter().next().expect("enemy survives one shot");
    assert!((enemy.health - 50.0).abs() < f32::EPSILON);
}
