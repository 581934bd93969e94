//! Analytics session lifecycle
//!
//! One `SessionContext` per device. Each round is bracketed by `start` and
//! `end`; ending produces a `SessionRecord` for an `AnalyticsSink`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::sim::{EndReason, RoundState};

/// Outcome of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSessionSummary {
    pub score: u64,
    pub targets_cleared: u32,
    pub highest_combo: u32,
    /// Tier index (0-5) of the hardest target cleared
    pub highest_difficulty: u8,
    pub end_reason: Option<EndReason>,
}

impl GameSessionSummary {
    pub fn from_round(round: &RoundState) -> Self {
        Self {
            score: round.score,
            targets_cleared: round.total_targets_cleared,
            highest_combo: round.highest_combo,
            highest_difficulty: round.highest_tier_cleared.map_or(0, |t| t.index()),
            end_reason: round.end_reason,
        }
    }
}

/// A finished session, ready for a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub device_id: String,
    pub session_id: String,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub duration_secs: u64,
    #[serde(flatten)]
    pub summary: GameSessionSummary,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    id: String,
    started_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    device_id: String,
    active: Option<ActiveSession>,
    sessions_started: u32,
}

impl SessionContext {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            active: None,
            sessions_started: 0,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Id of the running session, if any
    pub fn current_session(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.id.as_str())
    }

    pub fn start(&mut self) -> &str {
        self.start_at(now_ms())
    }

    /// Start a session at an explicit time. Replaces any unfinished one.
    pub fn start_at(&mut self, started_at_ms: u64) -> &str {
        if let Some(old) = &self.active {
            log::warn!("Session {} replaced before it ended", old.id);
        }
        self.sessions_started += 1;
        let id = format!("{}-{:x}-{}", self.device_id, started_at_ms, self.sessions_started);
        log::debug!("Session {} started", id);
        &self
            .active
            .insert(ActiveSession {
                id,
                started_at_ms,
            })
            .id
    }

    pub fn end(&mut self, summary: GameSessionSummary) -> Option<SessionRecord> {
        self.end_at(summary, now_ms())
    }

    /// Finish the running session. `None` if nothing was started.
    pub fn end_at(&mut self, summary: GameSessionSummary, ended_at_ms: u64) -> Option<SessionRecord> {
        let Some(session) = self.active.take() else {
            log::warn!("No active session to end");
            return None;
        };
        let ended_at_ms = ended_at_ms.max(session.started_at_ms);
        Some(SessionRecord {
            device_id: self.device_id.clone(),
            session_id: session.id,
            started_at_ms: session.started_at_ms,
            ended_at_ms,
            duration_secs: (ended_at_ms - session.started_at_ms + 500) / 1000,
            summary,
        })
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{DifficultyTier, Dealer};

    fn summary() -> GameSessionSummary {
        GameSessionSummary {
            score: 1500,
            targets_cleared: 7,
            highest_combo: 5,
            highest_difficulty: 3,
            end_reason: Some(EndReason::TimeUp),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut ctx = SessionContext::new("device_abc");
        assert!(ctx.current_session().is_none());

        let id = ctx.start_at(10_000).to_string();
        assert_eq!(ctx.current_session(), Some(id.as_str()));

        let record = ctx.end_at(summary(), 71_400).unwrap();
        assert_eq!(record.session_id, id);
        assert_eq!(record.device_id, "device_abc");
        assert_eq!(record.duration_secs, 61);
        assert_eq!(record.summary, summary());
        assert!(ctx.current_session().is_none());
    }

    #[test]
    fn test_end_without_start() {
        let mut ctx = SessionContext::new("d");
        assert!(ctx.end_at(summary(), 5).is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let mut ctx = SessionContext::new("d");
        let a = ctx.start_at(1).to_string();
        let b = ctx.start_at(1).to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_summary_from_round() {
        let settings = Settings::default();
        let mut dealer = Dealer::new(5);
        let mut round = RoundState::new(&settings, &mut dealer);
        assert_eq!(GameSessionSummary::from_round(&round).highest_difficulty, 0);

        round.score = 880;
        round.highest_tier_cleared = Some(DifficultyTier::Master);
        round.end_reason = Some(EndReason::Exhausted);
        let summary = GameSessionSummary::from_round(&round);
        assert_eq!(summary.score, 880);
        assert_eq!(summary.highest_difficulty, DifficultyTier::Master.index());
        assert_eq!(summary.end_reason, Some(EndReason::Exhausted));
    }

    #[test]
    fn test_record_json_is_flat() {
        let mut ctx = SessionContext::new("d");
        ctx.start_at(0);
        let record = ctx.end_at(summary(), 1_000).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["score"], 1500);
        assert_eq!(json["end_reason"], "TimeUp");
    }
}
