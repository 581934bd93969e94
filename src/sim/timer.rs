//! Per-target countdown
//!
//! Kept in deciseconds and advanced on a fixed 100 ms tick. The countdown only
//! runs while armed; the owner re-evaluates arming every step and tearing it
//! down drops any partially elapsed interval, like clearing an interval timer.

use serde::{Deserialize, Serialize};

use crate::consts::{DECISECONDS_PER_SECOND, TIMER_TICK_DECREMENT, TIMER_TICK_MS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// Remaining time (deciseconds)
    remaining: u32,
    /// Current ceiling (deciseconds)
    ceiling: u32,
    /// Milliseconds into the current tick interval
    phase_ms: u64,
    armed: bool,
    expired: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        let ds = seconds * DECISECONDS_PER_SECOND;
        Self {
            remaining: ds,
            ceiling: ds,
            phase_ms: 0,
            armed: false,
            expired: false,
        }
    }

    /// Restart with a new budget (on every target match)
    pub fn reset(&mut self, seconds: u32) {
        let ds = seconds * DECISECONDS_PER_SECOND;
        self.remaining = ds;
        self.ceiling = ds;
        self.expired = false;
    }

    /// Timer item: raise the ceiling and the remaining time by `seconds`
    pub fn extend(&mut self, seconds: u32) {
        let ds = seconds * DECISECONDS_PER_SECOND;
        self.ceiling += ds;
        self.remaining = (self.remaining + ds).min(self.ceiling);
    }

    /// Arm or tear down the interval
    pub fn set_armed(&mut self, armed: bool) {
        if armed && !self.armed {
            self.phase_ms = 0;
        }
        self.armed = armed && !self.expired;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Milliseconds until the next tick fires, if armed
    pub fn until_next_tick(&self) -> Option<u64> {
        self.armed.then(|| TIMER_TICK_MS - self.phase_ms)
    }

    /// Advance by `ms` (never past the next tick boundary).
    ///
    /// Returns true exactly once, on the tick that reaches zero; the
    /// countdown then disarms itself.
    pub fn advance(&mut self, ms: u64) -> bool {
        if !self.armed {
            return false;
        }
        self.phase_ms += ms;
        if self.phase_ms < TIMER_TICK_MS {
            return false;
        }
        self.phase_ms = 0;
        self.remaining = self.remaining.saturating_sub(TIMER_TICK_DECREMENT);
        if self.remaining == 0 {
            self.expired = true;
            self.armed = false;
            return true;
        }
        false
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining as f32 / DECISECONDS_PER_SECOND as f32
    }

    pub fn ceiling_secs(&self) -> f32 {
        self.ceiling as f32 / DECISECONDS_PER_SECOND as f32
    }

    /// Remaining fraction of the ceiling (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.ceiling == 0 {
            0.0
        } else {
            self.remaining as f32 / self.ceiling as f32
        }
    }
}
