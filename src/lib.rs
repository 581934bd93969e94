//! Number Quest - an arithmetic tile puzzle
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (tiles, synthesis, targets, rewards, countdown)
//! - `settings`: Data-driven game balance
//! - `highscores`: Leaderboard collaborator
//! - `persistence`: Local preferences, session analytics and feedback sinks

pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use highscores::{HighScores, Leaderboard, LocalLeaderboard, ScoreEntry};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Countdown tick interval (10 ticks per second)
    pub const TIMER_TICK_MS: u64 = 100;
    /// Deciseconds removed from the countdown per tick
    pub const TIMER_TICK_DECREMENT: u32 = 1;
    /// Deciseconds per second (countdown is kept in tenths to avoid float drift)
    pub const DECISECONDS_PER_SECOND: u32 = 10;

    /// Grid shape
    pub const NUM_HEIGHT: usize = 3;
    pub const OP_HEIGHT: usize = 4;
    pub const NUMBER_COLUMNS: [usize; 2] = [0, 2];
    pub const OPERATOR_COLUMN: usize = 1;

    /// Fresh number tiles are drawn uniformly from this range
    pub const MIN_TILE_VALUE: i64 = 1;
    pub const MAX_TILE_VALUE: i64 = 9;

    /// Targets cleared before the selector leaves the warmup bucket
    pub const WARMUP_TARGETS: u32 = 3;
    /// Fewer completed draws than this keeps the long (6-slot) selector cycle
    pub const LONG_CYCLE_DRAW_LIMIT: u32 = 2;

    /// Fewer number-bearing entities than this ends the round
    pub const MIN_NUMBERS_TO_CONTINUE: usize = 2;
    /// Every synthesis consumes two operands
    pub const NUMBERS_PER_SYNTHESIS: u32 = 2;
}
