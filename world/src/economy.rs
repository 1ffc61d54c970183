//! Player money, life pool and round counter.

/// Counters the core mutates on kills, escapes, purchases and round starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Economy {
    money: u32,
    lives: i32,
    rounds: u32,
}

impl Economy {
    pub(crate) const fn new(money: u32, lives: i32) -> Self {
        Self {
            money,
            lives,
            rounds: 0,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Current life pool; negative once more lives were lost than owned.
    #[must_use]
    pub const fn lives(&self) -> i32 {
        self.lives
    }

    /// Number of rounds started.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Withdraws `amount` when the balance covers it.
    pub(crate) fn try_debit(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn lose_lives(&mut self, lives: u32) {
        let lost = i32::try_from(lives).unwrap_or(i32::MAX);
        self.lives = self.lives.saturating_sub(lost);
    }

    pub(crate) fn record_round(&mut self) {
        self.rounds = self.rounds.saturating_add(1);
    }

    pub(crate) const fn is_depleted(&self) -> bool {
        self.lives <= 0
    }
}
