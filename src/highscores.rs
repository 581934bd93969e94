//! High score leaderboard
//!
//! The gameplay core only talks to the `Leaderboard` trait. `LocalLeaderboard`
//! keeps the top 10 in a JSON file under the config dir.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, read_json, write_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Leaderboard file name inside the config dir
pub const HIGHSCORES_FILE: &str = "highscores.json";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub username: String,
    pub score: u64,
}

/// Score persistence collaborator. No gameplay logic depends on success.
pub trait Leaderboard {
    /// Best scores, highest first
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, PersistenceError>;

    fn submit_score(&mut self, username: &str, score: u64) -> Result<(), PersistenceError>;

    /// Fetch, logging and swallowing failures
    fn fetch_top_scores_logged(&self, limit: usize) -> Vec<ScoreEntry> {
        self.fetch_top_scores(limit).unwrap_or_else(|e| {
            log::warn!("Failed to fetch leaderboard: {}", e);
            Vec::new()
        })
    }

    /// Submit unless the name is blank or the score is zero; failures are logged
    fn submit_score_logged(&mut self, username: &str, score: u64) {
        let name = username.trim();
        if name.is_empty() || score == 0 {
            log::debug!("Skipping leaderboard submission");
            return;
        }
        if let Err(e) = self.submit_score(name, score) {
            log::warn!("Failed to submit score: {}", e);
        }
    }
}

/// Top scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct HighScores {
    pub entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    ///
    /// Equal scores rank behind the ones already on the board.
    pub fn add_score(&mut self, username: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry {
            username: username.to_string(),
            score,
        };
        let rank = match self.entries.iter().position(|e| score > e.score) {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// File-backed leaderboard
#[derive(Debug, Clone)]
pub struct LocalLeaderboard {
    path: PathBuf,
}

impl LocalLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<HighScores, PersistenceError> {
        let mut scores: HighScores = read_json(&self.path)?.unwrap_or_default();
        // Hand-edited files may be unsorted or oversized
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }
}

impl Leaderboard for LocalLeaderboard {
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>, PersistenceError> {
        let mut entries = self.load()?.entries;
        entries.truncate(limit);
        Ok(entries)
    }

    fn submit_score(&mut self, username: &str, score: u64) -> Result<(), PersistenceError> {
        let mut scores = self.load()?;
        match scores.add_score(username, score) {
            Some(rank) => {
                write_json(&self.path, &scores)?;
                log::info!("High score saved: {} ({}) at rank {}", username, score, rank);
            }
            None => log::debug!("Score {} did not make the leaderboard", score),
        }
        Ok(())
    }
}
