//! Session progression
//!
//! Lives, coins, key possession, current level and the game-started flag
//! live here for the whole process. They change only through the named
//! transactions below; every level (re)load bumps `epoch`, which deferred
//! effects carry so they can tell when the level they targeted is gone.

/// Result of applying the death policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathOutcome {
    /// Lives remain: replay this level with coins and lives as they are.
    Retry { level: usize },
    /// Out of lives: play resumes at this level once the game-over overlay
    /// is dismissed and `full_reset` has run.
    GameOver { level: usize },
}

#[derive(Debug, Clone)]
pub struct Session {
    lives: u32,
    coins: u32,
    has_key: bool,
    level: usize,
    game_started: bool,
    epoch: u64,
    level_count: usize,
    starting_lives: u32,
}

impl Session {
    pub fn new(starting_lives: u32, level_count: usize) -> Self {
        Self {
            lives: starting_lives,
            coins: 0,
            has_key: false,
            level: 0,
            game_started: false,
            epoch: 0,
            level_count: level_count.max(1),
            starting_lives,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Wrap a requested level index into range.
    pub fn wrap_level(&self, requested: usize) -> usize {
        requested % self.level_count
    }

    /// Enter a level: wraps the index, drops the key, opens a new epoch.
    /// Returns the level actually entered.
    pub fn begin_level(&mut self, requested: usize) -> usize {
        self.level = self.wrap_level(requested);
        self.has_key = false;
        self.epoch += 1;
        log::info!("level {} starts (requested {}, epoch {})", self.level, requested, self.epoch);
        self.level
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    pub fn take_key(&mut self) {
        self.has_key = true;
    }

    /// First input seen: the start overlay goes away for good (until a full reset).
    pub fn start_game(&mut self) {
        self.game_started = true;
    }

    /// One death costs one life. Never goes below zero.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Decide what happens after the hero's death has played out.
    ///
    /// Out of lives sends play back to level 0 but leaves the counters alone
    /// so the HUD still reads zero behind the game-over box; otherwise the
    /// current level is replayed unchanged.
    pub fn apply_death_policy(&mut self) -> DeathOutcome {
        if self.lives < 1 {
            log::info!("out of lives: game over");
            DeathOutcome::GameOver { level: 0 }
        } else {
            log::info!("{} lives left, retrying level {}", self.lives, self.level);
            DeathOutcome::Retry { level: self.level }
        }
    }

    /// Back to a fresh game: starting lives, no coins, start menu up.
    pub fn full_reset(&mut self) {
        self.lives = self.starting_lives;
        self.coins = 0;
        self.game_started = false;
        log::info!("full reset: {} lives", self.lives);
    }
}
