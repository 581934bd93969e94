//! Fixed timestep time advance
//!
//! Moves the simulation clock forward in sub-steps that stop at every
//! countdown tick and every scheduled effect, so the result does not depend on
//! how the host slices its frames.

use super::controller::Game;
use super::state::{EndReason, GameEvent, Selection};

/// Delayed effect waiting on the simulation clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Effect {
    /// Release the resolve lock and settle the pending synthesis
    ResolveSynthesis,
    /// Exhaustion grace delay elapsed
    GameOver,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Scheduled {
    pub due_ms: u64,
    /// Generation the effect was scheduled in; stale effects are dropped
    pub generation: u64,
    pub effect: Effect,
}

impl Game {
    pub(super) fn schedule(&mut self, delay_ms: u64, effect: Effect) {
        self.scheduled.push(Scheduled {
            due_ms: self.clock_ms + delay_ms,
            generation: self.generation,
            effect,
        });
    }

    /// Advance the game by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let end = self.clock_ms + dt_ms;

        loop {
            self.sync_timer();

            let next_effect = self.scheduled.iter().map(|s| s.due_ms).min();
            let next_timer = self.timer.until_next_tick().map(|ms| self.clock_ms + ms);
            let step_to = [next_effect, next_timer]
                .into_iter()
                .flatten()
                .fold(end, u64::min)
                .max(self.clock_ms);

            if self.timer.advance(step_to - self.clock_ms) {
                self.expire(&mut events);
            }
            self.clock_ms = step_to;
            self.run_due_effects(&mut events);

            if self.clock_ms >= end {
                break;
            }
        }

        self.check_draw_offer(&mut events);
        self.sync_timer();
        events
    }

    fn run_due_effects(&mut self, events: &mut Vec<GameEvent>) {
        let now = self.clock_ms;
        let (mut due, pending): (Vec<_>, Vec<_>) = self.scheduled.drain(..).partition(|s| s.due_ms <= now);
        self.scheduled = pending;
        due.sort_by_key(|s| s.due_ms);

        for scheduled in due {
            if scheduled.generation != self.generation {
                log::debug!("Dropping stale {:?}", scheduled.effect);
                continue;
            }
            match scheduled.effect {
                Effect::ResolveSynthesis => {
                    self.settle_synthesis(events);
                    self.check_draw_offer(events);
                }
                Effect::GameOver => self.end_round(EndReason::Exhausted, events),
            }
        }
    }

    fn expire(&mut self, events: &mut Vec<GameEvent>) {
        log::info!("Time up");
        events.push(GameEvent::TimeUp);
        self.end_round(EndReason::TimeUp, events);
    }

    fn end_round(&mut self, reason: EndReason, events: &mut Vec<GameEvent>) {
        let round = &mut self.round;
        if round.is_over {
            return;
        }
        round.is_over = true;
        round.game_over_pending = false;
        round.end_reason = Some(reason);
        round.selection = Selection::Empty;
        log::info!(
            "Game over ({:?}): score {}, {} targets, best combo {}",
            reason,
            round.score,
            round.total_targets_cleared,
            round.highest_combo
        );
        events.push(GameEvent::GameOver(reason));
    }
}
