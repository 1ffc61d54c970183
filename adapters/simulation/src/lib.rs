#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order simulation pipeline that wires the world to its systems.
//!
//! Every [`Simulation::step`] runs the same sequence: the world tick, turret
//! targeting, turret combat, enemy movement and finally the round scheduler.
//! Commands produced by one stage are applied before the next stage reads
//! its views, so each stage observes the consequences of the previous one.

use std::time::Duration;

use tracing::{debug, info, warn};
use waypoint_defence_config::{GameConfig, ScheduleConfig};
use waypoint_defence_core::{Command, Event, NodeId, Outcome, TurretId, TurretKind};
use waypoint_defence_system_movement::Movement;
use waypoint_defence_system_rounds::{AdvanceMode, Config as RoundsConfig, RoundManager};
use waypoint_defence_system_turret_combat::TurretCombat;
use waypoint_defence_system_turret_targeting::TurretTargeting;
use waypoint_defence_world::{self as world, query, World};

/// Receives every event the simulation produces, in order.
pub trait Observer {
    /// Called once per event after the stage that produced it completed.
    fn on_event(&mut self, event: &Event);
}

impl<F> Observer for F
where
    F: FnMut(&Event),
{
    fn on_event(&mut self, event: &Event) {
        self(event);
    }
}

/// Multiplier applied to the externally supplied tick duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeScale {
    /// Simulated time matches the supplied time.
    #[default]
    Normal,
    /// Simulated time runs twice as fast.
    Double,
}

impl TimeScale {
    /// Factor applied to every tick.
    #[must_use]
    pub const fn factor(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::Double => 2,
        }
    }

    const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Double,
            Self::Double => Self::Normal,
        }
    }
}

/// Translates the schedule table into the scheduler's advance mode.
#[must_use]
pub fn advance_mode(schedule: &ScheduleConfig) -> AdvanceMode {
    if !schedule.auto_advance {
        return AdvanceMode::Manual;
    }
    let seconds =
        |value: f32| Duration::try_from_secs_f32(value.max(0.0)).unwrap_or_default();
    AdvanceMode::Countdown {
        initial: seconds(schedule.initial_countdown),
        between_rounds: seconds(schedule.time_between_rounds),
    }
}

/// One running level: the world, its systems and the observers watching it.
pub struct Simulation {
    world: World,
    rounds: RoundManager,
    targeting: TurretTargeting,
    combat: TurretCombat,
    movement: Movement,
    observers: Vec<Box<dyn Observer>>,
    time_scale: TimeScale,
    torn_down: bool,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Builds a simulation for the provided configuration.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let world = World::new(
            config.level.clone(),
            config.enemies.clone(),
            config.turrets.clone(),
        );
        let rounds = RoundManager::new(RoundsConfig::new(
            config.rounds.clone(),
            config.enemies.clone(),
            advance_mode(&config.schedule),
        ));
        Self {
            world,
            rounds,
            targeting: TurretTargeting::default(),
            combat: TurretCombat::new(),
            movement: Movement::default(),
            observers: Vec::new(),
            time_scale: TimeScale::Normal,
            torn_down: false,
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Registers an observer notified with every subsequent event.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Advances the level by `dt`, scaled by the current time scale.
    ///
    /// Returns the events of the tick. Once the level is decided or torn down
    /// the call does nothing and returns no events.
    pub fn step(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        if self.is_inert() {
            return &self.events;
        }

        let dt = dt.saturating_mul(self.time_scale.factor());
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.targeting.handle(
            &self.events,
            &query::turret_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.combat.handle(
            &self.events,
            &query::turret_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.movement.handle(
            &self.events,
            &query::enemy_view(&self.world),
            query::waypoints(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.rounds.handle(&self.events, &mut self.commands);
        self.flush_commands();

        self.finish_batch()
    }

    /// Starts the next round immediately.
    pub fn start_next_round(&mut self) -> &[Event] {
        self.events.clear();
        if self.is_inert() {
            warn!("round start requested on an inert simulation");
            return &self.events;
        }
        self.rounds.start_next_round(&mut self.commands);
        self.flush_commands();
        self.finish_batch()
    }

    /// Buys a turret of `kind` on `node`.
    pub fn place_turret(&mut self, node: NodeId, kind: TurretKind) -> &[Event] {
        self.execute(Command::PlaceTurret { node, kind })
    }

    /// Applies the single upgrade of `turret`.
    pub fn upgrade_turret(&mut self, turret: TurretId) -> &[Event] {
        self.execute(Command::UpgradeTurret { turret })
    }

    /// Sells `turret` for half its cost.
    pub fn sell_turret(&mut self, turret: TurretId) -> &[Event] {
        self.execute(Command::SellTurret { turret })
    }

    /// Pays for removing the obstacle on `node`.
    pub fn clear_obstacle(&mut self, node: NodeId) -> &[Event] {
        self.execute(Command::ClearObstacle { node })
    }

    /// Switches between normal and double speed, returning the new scale.
    ///
    /// A decided level always runs at normal speed.
    pub fn toggle_time_scale(&mut self) -> TimeScale {
        if query::outcome(&self.world).is_none() {
            self.time_scale = self.time_scale.toggled();
        }
        self.time_scale
    }

    /// Stops scheduling and removes every enemy and projectile without payout.
    ///
    /// The simulation is inert afterwards.
    pub fn teardown(&mut self) -> &[Event] {
        self.events.clear();
        if self.torn_down {
            return &self.events;
        }
        self.rounds.abort();
        world::apply(&mut self.world, Command::ClearField, &mut self.events);
        self.torn_down = true;
        debug!("simulation torn down");
        self.finish_batch()
    }

    /// Read-only access to the world for the [`query`] functions.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether a round is currently running.
    #[must_use]
    pub fn round_in_progress(&self) -> bool {
        self.rounds.round_in_progress()
    }

    /// Weighted number of enemies alive or still pending spawn.
    #[must_use]
    pub fn enemies_alive(&self) -> u32 {
        self.rounds.enemies_alive()
    }

    /// Zero-based index of the next round to start.
    #[must_use]
    pub fn round_index(&self) -> usize {
        self.rounds.round_index()
    }

    /// Number of rounds in the level.
    #[must_use]
    pub fn rounds_total(&self) -> usize {
        self.rounds.rounds_total()
    }

    /// Time until the next automatic round, when rounds advance on their own.
    #[must_use]
    pub fn countdown(&self) -> Option<Duration> {
        self.rounds.countdown()
    }

    /// Current time scale.
    #[must_use]
    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    /// Terminal result of the level, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        query::outcome(&self.world)
    }

    /// Reports whether further steps are ignored.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.torn_down || query::outcome(&self.world).is_some()
    }

    fn execute(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        if self.torn_down {
            warn!(?command, "command submitted after teardown");
            return &self.events;
        }
        world::apply(&mut self.world, command, &mut self.events);
        self.finish_batch()
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn finish_batch(&mut self) -> &[Event] {
        if let Some(outcome) = query::outcome(&self.world) {
            self.time_scale = TimeScale::Normal;
            let decided_now = self
                .events
                .iter()
                .any(|event| matches!(event, Event::LevelWon { .. } | Event::LevelLost { .. }));
            if decided_now {
                info!(
                    ?outcome,
                    rounds = query::economy(&self.world).rounds(),
                    "level decided"
                );
            }
        }
        for event in &self.events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
        }
        &self.events
    }
}
