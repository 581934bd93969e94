//! Round state and core simulation types
//!
//! `RoundState` is owned by `Game` and only changes through its commands and
//! ticks. Everything here is plain data so snapshots can be serialized.

use serde::{Deserialize, Serialize};

use super::catalog::{DifficultyTier, TargetData, select_target};
use super::cell::{ItemKind, Operator, Position, StorageItem};
use super::dealer::Dealer;
use super::grid::{Grid, Previews, Storage};
use super::synthesis::SynthesisError;
use crate::settings::Settings;

/// Player's in-progress selection. Illegal mixes (an operator with no
/// operand) cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Empty,
    /// A number is chosen
    Operand(Position),
    /// Number and operator (row in the operator column) are chosen
    Ready { operand: Position, operator: usize },
}

impl Selection {
    pub fn operand(&self) -> Option<Position> {
        match self {
            Selection::Empty => None,
            Selection::Operand(pos) | Selection::Ready { operand: pos, .. } => Some(*pos),
        }
    }

    pub fn operator(&self) -> Option<usize> {
        match self {
            Selection::Ready { operator, .. } => Some(*operator),
            _ => None,
        }
    }
}

/// Current phase of play, derived from the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No operand chosen
    Selecting,
    OperandChosen,
    ReadyToSynthesize,
    /// Synthesis lock: input rejected until the settle step fires
    Resolving,
    /// Round ended
    GameOver,
}

/// Why the round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    /// Fewer than two number-bearing entities left
    Exhausted,
}

/// Reward draw modal lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawState {
    #[default]
    Closed,
    /// Threshold reached, waiting for the player to draw
    Offered,
    /// Reward applied, waiting for the player to claim/dismiss
    Revealed(StorageItem),
}

/// A synthesis that passed evaluation and is waiting out the resolve lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSynthesis {
    pub first: Position,
    pub operator: Operator,
    pub second: Position,
    pub result: i64,
    pub is_match: bool,
}

/// Deep copy of the attempt-start layout, restored by "reset attempt"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub grid: Grid,
    pub storage: Storage,
    pub numbers_used: u32,
}

/// Complete round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub grid: Grid,
    pub storage: Storage,
    /// Upcoming tile per number column
    pub previews: Previews,
    pub current_target: TargetData,
    pub next_target: TargetData,
    pub total_targets_cleared: u32,
    pub score: u64,
    pub combo: u32,
    pub highest_combo: u32,
    /// Hardest tier matched so far
    pub highest_tier_cleared: Option<DifficultyTier>,
    /// Numbers consumed since the last reward draw
    pub numbers_used: u32,
    pub total_draws: u32,
    pub selection: Selection,
    pub is_over: bool,
    pub end_reason: Option<EndReason>,
    pub is_paused: bool,
    pub checkpoint: Checkpoint,
    pub draw: DrawState,
    /// Highest threshold multiple that already opened a draw offer
    pub last_draw_threshold: u32,
    pub resolving: Option<PendingSynthesis>,
    /// Exhaustion detected, game over lands after the grace delay
    pub game_over_pending: bool,
}

impl RoundState {
    /// Fresh round: full grid, empty storage, zero counters
    pub fn new(settings: &Settings, dealer: &mut Dealer) -> Self {
        let grid = Grid::new(dealer);
        let storage = Storage::new(settings.storage_size);
        let previews = Previews::new(dealer);
        let current_target = select_target(0, 0, dealer.rng());
        let next_target = select_target(1, 0, dealer.rng());
        let checkpoint = Checkpoint {
            grid: grid.clone(),
            storage: storage.clone(),
            numbers_used: 0,
        };

        Self {
            grid,
            storage,
            previews,
            current_target,
            next_target,
            total_targets_cleared: 0,
            score: 0,
            combo: 0,
            highest_combo: 0,
            highest_tier_cleared: None,
            numbers_used: 0,
            total_draws: 0,
            selection: Selection::Empty,
            is_over: false,
            end_reason: None,
            is_paused: false,
            checkpoint,
            draw: DrawState::Closed,
            last_draw_threshold: 0,
            resolving: None,
            game_over_pending: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_over {
            return GamePhase::GameOver;
        }
        if self.resolving.is_some() || self.game_over_pending {
            return GamePhase::Resolving;
        }
        match self.selection {
            Selection::Empty => GamePhase::Selecting,
            Selection::Operand(_) => GamePhase::OperandChosen,
            Selection::Ready { .. } => GamePhase::ReadyToSynthesize,
        }
    }

    /// Replace the checkpoint with the current layout
    pub fn capture_checkpoint(&mut self) {
        self.checkpoint = Checkpoint {
            grid: self.grid.clone(),
            storage: self.storage.clone(),
            numbers_used: self.numbers_used,
        };
    }

    /// Restore grid, storage and numbers-used from the checkpoint
    pub fn restore_checkpoint(&mut self) {
        self.grid = self.checkpoint.grid.clone();
        self.storage = self.checkpoint.storage.clone();
        self.numbers_used = self.checkpoint.numbers_used;
        self.selection = Selection::Empty;
    }

    /// Progress toward the next draw offer (0.0 - 1.0)
    pub fn draw_progress(&self, threshold: u32) -> f32 {
        if threshold == 0 {
            return 0.0;
        }
        (self.total_targets_cleared % threshold) as f32 / threshold as f32
    }
}

/// Notifications for presentation, audio and analytics collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    RoundStarted { target: TargetData },
    SelectionChanged(Selection),
    /// Recoverable synthesis failure; selection was cleared
    SynthesisRejected(SynthesisError),
    /// Evaluation passed, resolve lock engaged
    SynthesisStarted { result: i64, is_match: bool },
    /// Non-matching result settled onto the board
    Synthesized { result: i64, position: Option<Position> },
    TargetCleared { target: TargetData, score_gained: u64, combo: u32 },
    DrawOffered,
    RewardDrawn { reward: StorageItem, slot: Option<usize> },
    RewardClaimed,
    ItemUsed(ItemKind),
    AttemptReset,
    Paused,
    Resumed,
    TimeUp,
    GameOver(EndReason),
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub round: &'a RoundState,
    pub phase: GamePhase,
    pub timer_remaining_secs: f32,
    pub timer_fraction: f32,
    pub difficulty_label: &'static str,
    pub next_difficulty_label: &'static str,
    pub draw_progress: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::Position;

    #[test]
    fn test_new_round_defaults() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(12345);
        let round = RoundState::new(&settings, &mut dealer);

        assert_eq!(round.phase(), GamePhase::Selecting);
        assert_eq!(round.storage.capacity(), settings.storage_size);
        assert!(round.storage.slots().iter().all(Option::is_none));
        assert_eq!(round.score, 0);
        assert_eq!(round.checkpoint.grid, round.grid);
        assert!(round.current_target.value < 40);
        assert!(round.next_target.value < 40);
    }

    #[test]
    fn test_phase_follows_selection() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(1);
        let mut round = RoundState::new(&settings, &mut dealer);

        round.selection = Selection::Operand(Position::grid(0, 0));
        assert_eq!(round.phase(), GamePhase::OperandChosen);
        round.selection = Selection::Ready {
            operand: Position::grid(0, 0),
            operator: 2,
        };
        assert_eq!(round.phase(), GamePhase::ReadyToSynthesize);
        round.game_over_pending = true;
        assert_eq!(round.phase(), GamePhase::Resolving);
        round.is_over = true;
        assert_eq!(round.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_checkpoint_is_a_deep_copy() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(9);
        let mut round = RoundState::new(&settings, &mut dealer);
        let initial = round.checkpoint.clone();

        round.grid.refresh(&mut dealer);
        round.numbers_used = 8;
        assert_eq!(round.checkpoint, initial);

        round.restore_checkpoint();
        assert_eq!(round.grid, initial.grid);
        assert_eq!(round.numbers_used, 0);
    }

    #[test]
    fn test_draw_progress() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(9);
        let mut round = RoundState::new(&settings, &mut dealer);
        round.total_targets_cleared = 9;
        assert!((round.draw_progress(6) - 0.5).abs() < 1e-6);
    }
}
