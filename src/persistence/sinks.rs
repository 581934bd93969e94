//! Fire-and-forget outbound sinks for analytics and feedback

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PersistenceError;
use super::session::SessionRecord;

/// Receives finished session records
pub trait AnalyticsSink {
    fn record_session(&mut self, record: &SessionRecord) -> Result<(), PersistenceError>;

    /// Record and swallow any failure
    fn record_session_logged(&mut self, record: &SessionRecord) {
        if let Err(e) = self.record_session(record) {
            log::warn!("Failed to record session {}: {}", record.session_id, e);
        }
    }
}

/// Receives player feedback
pub trait FeedbackSink {
    fn submit(&mut self, feedback: &Feedback) -> Result<(), PersistenceError>;

    /// Validate and submit. Blank messages are rejected.
    fn submit_feedback(&mut self, message: &str, contact: Option<&str>) -> Result<(), PersistenceError> {
        let feedback = Feedback::new(message, contact)?;
        self.submit(&feedback)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message: String,
    pub contact: Option<String>,
}

impl Feedback {
    /// Trimmed feedback; blank contacts are dropped
    pub fn new(message: &str, contact: Option<&str>) -> Result<Self, PersistenceError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PersistenceError::Rejected("message cannot be empty".to_string()));
        }
        let contact = contact.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);
        Ok(Self {
            message: message.to_string(),
            contact,
        })
    }
}

/// Appends one JSON document per line
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append<T: Serialize>(&self, value: &T) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(value)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

impl AnalyticsSink for JsonLinesSink {
    fn record_session(&mut self, record: &SessionRecord) -> Result<(), PersistenceError> {
        self.append(record)
    }
}

impl FeedbackSink for JsonLinesSink {
    fn submit(&mut self, feedback: &Feedback) -> Result<(), PersistenceError> {
        self.append(feedback)
    }
}

/// Writes everything to the log and nowhere else
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn record_session(&mut self, record: &SessionRecord) -> Result<(), PersistenceError> {
        log::info!(
            "Session {}: score {}, {} targets, {}s",
            record.session_id,
            record.summary.score,
            record.summary.targets_cleared,
            record.duration_secs
        );
        Ok(())
    }
}

impl FeedbackSink for LogSink {
    fn submit(&mut self, feedback: &Feedback) -> Result<(), PersistenceError> {
        log::info!("Feedback: {}", feedback.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::session::{GameSessionSummary, SessionContext};

    #[test]
    fn test_feedback_validation() {
        let fb = Feedback::new("  too hard  ", Some("  ")).unwrap();
        assert_eq!(fb.message, "too hard");
        assert_eq!(fb.contact, None);
        assert!(matches!(Feedback::new(" \n ", None), Err(PersistenceError::Rejected(_))));
    }

    #[test]
    fn test_blank_feedback_never_reaches_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonLinesSink::new(dir.path().join("feedback.jsonl"));
        assert!(sink.submit_feedback("", None).is_err());
        assert!(!sink.path().exists());

        sink.submit_feedback("love it", Some("me@example.com")).unwrap();
        sink.submit_feedback("more items", None).unwrap();
        let lines: Vec<Feedback> = fs::read_to_string(sink.path())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].contact.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_session_records_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonLinesSink::new(dir.path().join("sessions.jsonl"));
        let mut ctx = SessionContext::new("d");
        let summary = GameSessionSummary {
            score: 10,
            targets_cleared: 1,
            highest_combo: 1,
            highest_difficulty: 0,
            end_reason: None,
        };
        for i in 0..3 {
            ctx.start_at(i * 1_000);
            let record = ctx.end_at(summary, i * 1_000 + 500).unwrap();
            sink.record_session(&record).unwrap();
        }
        let records: Vec<SessionRecord> = fs::read_to_string(sink.path())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].started_at_ms, 2_000);
    }

    #[test]
    fn test_logged_helper_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the append fail
        let mut sink = JsonLinesSink::new(dir.path());
        let mut ctx = SessionContext::new("d");
        ctx.start_at(0);
        let summary = GameSessionSummary {
            score: 0,
            targets_cleared: 0,
            highest_combo: 0,
            highest_difficulty: 0,
            end_reason: None,
        };
        let record = ctx.end_at(summary, 1).unwrap();
        assert!(sink.record_session(&record).is_err());
        sink.record_session_logged(&record);
    }
}
