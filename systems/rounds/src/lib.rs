#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduler that spawns enemies on a timed cadence and tracks the
//! weighted number of enemies still alive.
//!
//! The scheduler never touches the world. It consumes the events of a tick,
//! advances its spawn stream by the simulated time that elapsed and responds
//! with [`Command::SpawnEnemy`], [`Command::BeginRound`],
//! [`Command::CompleteRound`] and [`Command::DeclareVictory`] batches.

use std::time::Duration;

use tracing::{debug, warn};
use waypoint_defence_core::{
    Command, EnemyCatalog, EnemyKind, Event, Round, RoundTable, SpawnInfo, SpawnOrigin,
};

mod stream;

use stream::SpawnStream;

/// Decides when rounds start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Rounds start only through [`RoundManager::start_next_round`].
    Manual,
    /// Rounds also start automatically after the field has been clear for a while.
    Countdown {
        /// Delay before the first round.
        initial: Duration,
        /// Delay between a completed round and the next one.
        between_rounds: Duration,
    },
}

impl AdvanceMode {
    /// Countdown mode with the default delays of two and five and a half seconds.
    #[must_use]
    pub const fn countdown() -> Self {
        Self::Countdown {
            initial: Duration::from_secs(2),
            between_rounds: Duration::from_millis(5_500),
        }
    }
}

/// Configuration parameters required to construct the round manager.
#[derive(Clone, Debug)]
pub struct Config {
    rounds: RoundTable,
    catalog: EnemyCatalog,
    mode: AdvanceMode,
}

impl Config {
    /// Creates a configuration from the round table and the enemy catalog.
    #[must_use]
    pub fn new(rounds: RoundTable, catalog: EnemyCatalog, mode: AdvanceMode) -> Self {
        Self {
            rounds,
            catalog,
            mode,
        }
    }
}

/// Wave scheduler owning the weighted alive counter.
#[derive(Debug)]
pub struct RoundManager {
    rounds: RoundTable,
    catalog: EnemyCatalog,
    mode: AdvanceMode,
    round_index: usize,
    current_round: Option<u32>,
    enemies_alive: u32,
    round_in_progress: bool,
    stream: Option<SpawnStream>,
    countdown: Option<Duration>,
    halted: bool,
}

impl RoundManager {
    /// Creates a scheduler positioned before the first round.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let countdown = match config.mode {
            AdvanceMode::Manual => None,
            AdvanceMode::Countdown { initial, .. } => Some(initial),
        };
        Self {
            rounds: config.rounds,
            catalog: config.catalog,
            mode: config.mode,
            round_index: 0,
            current_round: None,
            enemies_alive: 0,
            round_in_progress: false,
            stream: None,
            countdown,
            halted: false,
        }
    }

    /// Starts the next round of the table.
    ///
    /// Does nothing while a round is running or after the scheduler halted.
    /// Past the end of the table the level is declared won instead.
    pub fn start_next_round(&mut self, out: &mut Vec<Command>) {
        if self.halted {
            warn!("round start requested after scheduling halted");
            return;
        }
        if self.round_in_progress {
            warn!(
                round = self.round_index,
                "round start requested while a round is in progress"
            );
            return;
        }

        let Some(round) = self.rounds.get(self.round_index) else {
            self.declare_victory(out);
            return;
        };
        let index = u32::try_from(self.round_index).unwrap_or(u32::MAX);
        let weight = population(round, &self.catalog);
        let mut stream = SpawnStream::new(round);

        self.round_in_progress = true;
        self.current_round = Some(index);
        out.push(Command::BeginRound { round: index });
        self.enemies_alive = self.enemies_alive.saturating_add(weight);
        debug!(round = index, weight, "round started");

        emit_spawns(&mut stream, Duration::ZERO, out);
        self.stream = (!stream.is_exhausted()).then_some(stream);
        self.round_index += 1;
    }

    /// Consumes the events of a tick and emits the resulting commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::EnemyDied { lives, .. } | Event::EnemyEscaped { lives, .. } => {
                    self.decrement_enemies_alive(*lives);
                }
                Event::EnemySpawned {
                    lives,
                    origin: SpawnOrigin::Cascade { .. },
                    ..
                } => self.enemies_alive = self.enemies_alive.saturating_add(*lives),
                Event::LevelLost { .. } => self.abort(),
                _ => {}
            }
        }

        if self.halted {
            return;
        }

        if let Some(stream) = self.stream.as_mut() {
            emit_spawns(stream, elapsed, out);
            if stream.is_exhausted() {
                self.stream = None;
            }
        }

        self.check_completion(out);
        self.advance_countdown(elapsed, out);
    }

    /// Removes `weight` from the alive counter, flooring at zero.
    pub fn decrement_enemies_alive(&mut self, weight: u32) {
        if weight > self.enemies_alive {
            warn!(
                weight,
                alive = self.enemies_alive,
                "alive counter decremented below zero"
            );
            self.enemies_alive = 0;
        } else {
            self.enemies_alive -= weight;
        }
    }

    /// Drops any pending spawns and stops all further scheduling.
    pub fn abort(&mut self) {
        if self.stream.take().is_some() {
            debug!("spawn stream aborted");
        }
        self.countdown = None;
        self.halted = true;
    }

    /// Reports whether a round is currently running.
    #[must_use]
    pub fn round_in_progress(&self) -> bool {
        self.round_in_progress
    }

    /// Weighted number of enemies alive or still pending spawn.
    #[must_use]
    pub fn enemies_alive(&self) -> u32 {
        self.enemies_alive
    }

    /// Zero-based index of the next round to start.
    #[must_use]
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// Number of rounds in the table.
    #[must_use]
    pub fn rounds_total(&self) -> usize {
        self.rounds.len()
    }

    /// Reports whether scheduling stopped for good.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Time left before the next automatic round, in countdown mode.
    #[must_use]
    pub fn countdown(&self) -> Option<Duration> {
        self.countdown
    }

    fn check_completion(&mut self, out: &mut Vec<Command>) {
        if !self.round_in_progress || self.stream.is_some() || self.enemies_alive > 0 {
            return;
        }
        self.round_in_progress = false;
        if let Some(round) = self.current_round.take() {
            out.push(Command::CompleteRound { round });
            debug!(round, "round complete");
        }

        if self.round_index >= self.rounds.len() {
            self.declare_victory(out);
        } else if let AdvanceMode::Countdown { between_rounds, .. } = self.mode {
            self.countdown = Some(between_rounds);
        }
    }

    fn advance_countdown(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        if self.round_in_progress || self.enemies_alive > 0 {
            return;
        }
        let AdvanceMode::Countdown { between_rounds, .. } = self.mode else {
            return;
        };
        let Some(remaining) = self.countdown else {
            return;
        };

        let remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.countdown = Some(between_rounds);
            self.start_next_round(out);
        } else {
            self.countdown = Some(remaining);
        }
    }

    fn declare_victory(&mut self, out: &mut Vec<Command>) {
        out.push(Command::DeclareVictory);
        self.stream = None;
        self.countdown = None;
        self.halted = true;
        debug!(rounds = self.rounds.len(), "all rounds cleared");
    }
}

/// Weighted population of a round, warning about unconfigured entries.
fn population(round: &Round, catalog: &EnemyCatalog) -> u32 {
    for SpawnInfo { enemy, .. } in &round.spawns {
        if catalog.stats_for(*enemy).is_none() {
            warn!(?enemy, "no statistics configured; entry carries no weight");
        }
    }
    round.weight(catalog)
}

fn emit_spawns(stream: &mut SpawnStream, elapsed: Duration, out: &mut Vec<Command>) {
    let mut due: Vec<EnemyKind> = Vec::new();
    stream.advance(elapsed, &mut due);
    out.extend(due.into_iter().map(|enemy| Command::SpawnEnemy { enemy }));
}
