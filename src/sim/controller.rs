//! Progression controller
//!
//! `Game` owns the round exclusively. Presentation layers send `Command`s and
//! advance time with `Game::tick`; both return the events they produced.

use serde::{Deserialize, Serialize};

use super::catalog::select_target;
use super::cell::{Item, Position};
use super::dealer::Dealer;
use super::gacha;
use super::grid::{apply_synthesis, operand_value};
use super::state::{DrawState, GameEvent, PendingSynthesis, RoundState, Selection, Snapshot};
use super::synthesis::evaluate;
use super::tick::{Effect, Scheduled};
use super::timer::Countdown;
use crate::consts::{NUMBER_COLUMNS, NUMBERS_PER_SYNTHESIS, OPERATOR_COLUMN};
use crate::settings::Settings;

/// The only ways the presentation layer can change a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Click a grid cell or storage slot
    SelectCell(Position),
    /// Use a Timer or Refresh item
    ConsumeStorageItem(usize),
    /// Restore the layout captured at the start of the current target
    ResetAttempt,
    Pause,
    Resume,
    StartNewRound,
    /// Draw a reward while an offer is open
    RequestDraw,
    /// Dismiss a revealed reward
    ClaimDraw,
}

pub struct Game {
    pub(super) settings: Settings,
    pub(super) round: RoundState,
    pub(super) timer: Countdown,
    pub(super) dealer: Dealer,
    /// Simulation clock (ms since the game was created)
    pub(super) clock_ms: u64,
    /// Bumped whenever pending delayed effects must be discarded
    pub(super) generation: u64,
    pub(super) scheduled: Vec<Scheduled>,
    /// A leaderboard or tutorial overlay is covering the board
    pub(super) overlay_open: bool,
}

impl Game {
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut dealer = Dealer::new(seed);
        let round = RoundState::new(&settings, &mut dealer);
        let timer = Countdown::new(settings.target_seconds(round.current_target.core_base));
        log::info!(
            "Round started (seed {}), target {} [{}]",
            seed,
            round.current_target.value,
            round.current_target.tier.label()
        );

        let mut game = Self {
            settings,
            round,
            timer,
            dealer,
            clock_ms: 0,
            generation: 0,
            scheduled: Vec::new(),
            overlay_open: false,
        };
        game.sync_timer();
        game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn timer(&self) -> &Countdown {
        &self.timer
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn seed(&self) -> u64 {
        self.dealer.seed
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Read-only view with the derived display fields
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            round: &self.round,
            phase: self.round.phase(),
            timer_remaining_secs: self.timer.remaining_secs(),
            timer_fraction: self.timer.fraction(),
            difficulty_label: self.round.current_target.tier.label(),
            next_difficulty_label: self.round.next_target.tier.label(),
            draw_progress: self.round.draw_progress(self.settings.draw_target_threshold),
        }
    }

    /// Report a blocking overlay (leaderboard, tutorial) opening or closing
    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
        self.sync_timer();
    }

    /// Apply one command
    pub fn apply(&mut self, command: Command) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match command {
            Command::SelectCell(pos) => self.select_cell(pos, &mut events),
            Command::ConsumeStorageItem(index) => self.consume_storage_item(index, &mut events),
            Command::ResetAttempt => self.reset_attempt(&mut events),
            Command::Pause => self.set_paused(true, &mut events),
            Command::Resume => self.set_paused(false, &mut events),
            Command::StartNewRound => self.start_new_round(&mut events),
            Command::RequestDraw => self.request_draw(&mut events),
            Command::ClaimDraw => self.claim_draw(&mut events),
        }
        self.check_draw_offer(&mut events);
        self.sync_timer();
        events
    }

    /// Board input is accepted only in a live, unblocked round
    fn accepts_input(&self) -> bool {
        let round = &self.round;
        !round.is_over
            && !round.is_paused
            && round.resolving.is_none()
            && !round.game_over_pending
            && round.draw == DrawState::Closed
            && !self.overlay_open
    }

    /// The countdown runs under the same conditions as board input
    pub(super) fn sync_timer(&mut self) {
        let live = self.accepts_input();
        self.timer.set_armed(live);
    }

    fn select_cell(&mut self, pos: Position, events: &mut Vec<GameEvent>) {
        if !self.accepts_input() {
            log::debug!("Ignoring selection at {:?}: input blocked", pos);
            return;
        }

        match pos {
            Position::Grid { col, row } if col == OPERATOR_COLUMN => {
                if row >= self.round.grid.operators().len() {
                    return;
                }
                self.select_operator(row, events);
            }
            Position::Grid { col, row } if NUMBER_COLUMNS.contains(&col) => {
                if self.round.grid.number_at(col, row).is_some() {
                    self.select_number(pos, events);
                }
            }
            Position::Grid { .. } => {}
            Position::Storage { index } => match self.round.storage.get(index).map(|s| s.item) {
                Some(Item::Number(_)) => self.select_number(pos, events),
                Some(Item::Timer | Item::Refresh) => self.consume_storage_item(index, events),
                Some(Item::Score) | None => {}
            },
        }
    }

    fn select_operator(&mut self, row: usize, events: &mut Vec<GameEvent>) {
        let selection = match self.round.selection {
            // An operator alone is never a valid selection
            Selection::Empty => return,
            Selection::Operand(operand) => Selection::Ready { operand, operator: row },
            Selection::Ready { operand, operator } if operator == row => Selection::Operand(operand),
            Selection::Ready { operand, .. } => Selection::Ready { operand, operator: row },
        };
        self.set_selection(selection, events);
    }

    fn select_number(&mut self, pos: Position, events: &mut Vec<GameEvent>) {
        match self.round.selection {
            Selection::Empty => self.set_selection(Selection::Operand(pos), events),
            Selection::Operand(current) | Selection::Ready { operand: current, .. } if current == pos => {
                self.set_selection(Selection::Empty, events)
            }
            Selection::Operand(_) => self.set_selection(Selection::Operand(pos), events),
            Selection::Ready { operand, operator } => self.begin_synthesis(operand, operator, pos, events),
        }
    }

    fn set_selection(&mut self, selection: Selection, events: &mut Vec<GameEvent>) {
        if self.round.selection != selection {
            self.round.selection = selection;
            events.push(GameEvent::SelectionChanged(selection));
        }
    }

    /// Evaluate and engage the resolve lock. Failures clear the selection.
    fn begin_synthesis(&mut self, first: Position, operator_row: usize, second: Position, events: &mut Vec<GameEvent>) {
        let round = &self.round;
        let (Some(lhs), Some(op), Some(rhs)) = (
            operand_value(&round.grid, &round.storage, first),
            round.grid.operator_at(operator_row),
            operand_value(&round.grid, &round.storage, second),
        ) else {
            log::debug!("Stale selection, clearing");
            self.set_selection(Selection::Empty, events);
            return;
        };

        match evaluate(lhs, op, rhs) {
            Ok(result) => {
                let is_match = result == round.current_target.value;
                log::debug!("{} {} {} = {} (match: {})", lhs, op.symbol(), rhs, result, is_match);
                self.round.resolving = Some(PendingSynthesis {
                    first,
                    operator: op,
                    second,
                    result,
                    is_match,
                });
                self.schedule(self.settings.resolve_delay_ms, Effect::ResolveSynthesis);
                events.push(GameEvent::SynthesisStarted { result, is_match });
            }
            Err(err) => {
                log::debug!("Synthesis rejected: {}", err);
                self.round.selection = Selection::Empty;
                events.push(GameEvent::SynthesisRejected(err));
            }
        }
    }

    /// Settle a synthesis once its resolve lock has elapsed
    pub(super) fn settle_synthesis(&mut self, events: &mut Vec<GameEvent>) {
        let Some(pending) = self.round.resolving.take() else {
            return;
        };

        let round = &mut self.round;
        let outcome = apply_synthesis(
            &round.grid,
            &round.storage,
            pending.first,
            pending.second,
            pending.result,
            pending.is_match,
            &mut round.previews,
            &mut self.dealer,
        );
        round.grid = outcome.grid;
        round.storage = outcome.storage;
        round.numbers_used += NUMBERS_PER_SYNTHESIS;

        if pending.is_match {
            self.clear_target(events);
            return;
        }

        events.push(GameEvent::Synthesized {
            result: pending.result,
            position: outcome.result_position,
        });
        if outcome.exhausted {
            log::info!("No playable numbers left, ending round");
            self.round.selection = Selection::Empty;
            self.round.game_over_pending = true;
            self.schedule(self.settings.game_over_grace_ms, Effect::GameOver);
        } else {
            // Keep chaining from the fresh result
            self.round.selection = outcome.result_position.map_or(Selection::Empty, Selection::Operand);
        }
    }

    fn clear_target(&mut self, events: &mut Vec<GameEvent>) {
        let round = &mut self.round;
        let target = round.current_target;
        let gained = self.settings.match_score(target.core_base, round.combo);

        round.score += gained;
        round.combo += 1;
        round.highest_combo = round.highest_combo.max(round.combo);
        round.highest_tier_cleared = round.highest_tier_cleared.max(Some(target.tier));
        round.total_targets_cleared += 1;
        round.current_target = round.next_target;
        round.next_target = select_target(round.total_targets_cleared + 1, round.total_draws, self.dealer.rng());
        round.selection = Selection::Empty;
        round.capture_checkpoint();
        self.timer
            .reset(self.settings.target_seconds(round.current_target.core_base));

        log::info!(
            "Target {} cleared (+{}, combo {}), next target {} [{}]",
            target.value,
            gained,
            round.combo,
            round.current_target.value,
            round.current_target.tier.label()
        );
        events.push(GameEvent::TargetCleared {
            target,
            score_gained: gained,
            combo: round.combo,
        });
    }

    fn consume_storage_item(&mut self, index: usize, events: &mut Vec<GameEvent>) {
        if !self.accepts_input() {
            log::debug!("Ignoring item use in slot {}: input blocked", index);
            return;
        }

        let kind = match self.round.storage.get(index).map(|s| s.item) {
            Some(Item::Timer) => {
                self.timer.extend(self.settings.timer_item_seconds);
                Item::Timer.kind()
            }
            Some(Item::Refresh) => {
                self.round.grid.refresh(&mut self.dealer);
                self.round.selection = Selection::Empty;
                Item::Refresh.kind()
            }
            other => {
                log::debug!("Slot {} holds no usable item ({:?})", index, other);
                return;
            }
        };
        self.round.storage.take(index);
        log::info!("Used {} item", kind.as_str());
        events.push(GameEvent::ItemUsed(kind));
    }

    fn reset_attempt(&mut self, events: &mut Vec<GameEvent>) {
        let round = &self.round;
        if round.is_over
            || round.is_paused
            || round.game_over_pending
            || round.draw != DrawState::Closed
            || self.overlay_open
        {
            log::debug!("Ignoring reset: round not resettable");
            return;
        }

        if self.round.resolving.take().is_some() {
            log::debug!("Reset cancelled an in-flight synthesis");
            self.generation += 1;
            self.scheduled.clear();
        }
        self.round.restore_checkpoint();
        log::info!("Attempt reset");
        events.push(GameEvent::AttemptReset);
    }

    fn set_paused(&mut self, paused: bool, events: &mut Vec<GameEvent>) {
        if self.round.is_over || self.round.is_paused == paused {
            return;
        }
        self.round.is_paused = paused;
        events.push(if paused { GameEvent::Paused } else { GameEvent::Resumed });
    }

    fn start_new_round(&mut self, events: &mut Vec<GameEvent>) {
        self.generation += 1;
        self.scheduled.clear();
        self.round = RoundState::new(&self.settings, &mut self.dealer);
        self.timer = Countdown::new(self.settings.target_seconds(self.round.current_target.core_base));
        log::info!(
            "Round started, target {} [{}]",
            self.round.current_target.value,
            self.round.current_target.tier.label()
        );
        events.push(GameEvent::RoundStarted {
            target: self.round.current_target,
        });
    }

    fn request_draw(&mut self, events: &mut Vec<GameEvent>) {
        if self.round.is_over || self.round.draw != DrawState::Offered {
            log::debug!("No draw on offer");
            return;
        }
        let reward = gacha::draw(&mut self.dealer);
        let slot = gacha::apply_reward(&mut self.round, reward, &self.settings);
        self.round.draw = DrawState::Revealed(reward);
        log::info!("Drew {} reward", reward.item.kind().as_str());
        events.push(GameEvent::RewardDrawn { reward, slot });
    }

    fn claim_draw(&mut self, events: &mut Vec<GameEvent>) {
        if let DrawState::Revealed(_) = self.round.draw {
            self.round.draw = DrawState::Closed;
            events.push(GameEvent::RewardClaimed);
        }
    }

    /// Open a reward offer once per threshold crossing, as soon as storage has room
    pub(super) fn check_draw_offer(&mut self, events: &mut Vec<GameEvent>) {
        let threshold = self.settings.draw_target_threshold;
        let round = &mut self.round;
        if threshold == 0 || round.is_over || round.game_over_pending || round.draw != DrawState::Closed {
            return;
        }
        let crossed = round.total_targets_cleared / threshold;
        if crossed > round.last_draw_threshold && round.storage.has_room() {
            round.last_draw_threshold = crossed;
            round.draw = DrawState::Offered;
            log::info!("Reward draw offered after {} targets", round.total_targets_cleared);
            events.push(GameEvent::DrawOffered);
        }
    }
}
