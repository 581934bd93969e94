//! Cross-session device preferences

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{PersistenceError, read_json, write_json};
use crate::sim::ItemKind;

/// Preferences file name inside the config dir
pub const PREFS_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub personal_best: u64,
    /// Pre-fills the leaderboard name prompt
    pub last_username: Option<String>,
    /// Item kinds the player has already drawn at least once
    pub seen_items: BTreeSet<ItemKind>,
    /// UI language code ("en", "zh")
    pub language: String,
    pub tutorial_seen: bool,
    /// Stable anonymous id for analytics sessions
    pub device_id: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            personal_best: 0,
            last_username: None,
            seen_items: BTreeSet::new(),
            language: "en".to_string(),
            tutorial_seen: false,
            device_id: None,
        }
    }
}

impl Preferences {
    /// Load preferences, starting fresh if the file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match read_json(path) {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Failed to load preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        write_json(path, self)
    }

    /// Record a drawn item kind. True the first time a kind is seen.
    pub fn mark_seen(&mut self, kind: ItemKind) -> bool {
        self.seen_items.insert(kind)
    }

    /// Update the personal best. True if `score` is a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.personal_best {
            self.personal_best = score;
            true
        } else {
            false
        }
    }

    /// Remember a non-blank username
    pub fn remember_username(&mut self, username: &str) {
        let name = username.trim();
        if !name.is_empty() {
            self.last_username = Some(name.to_string());
        }
    }

    /// The device id, minted on first use
    pub fn device_id(&mut self) -> &str {
        self.device_id
            .get_or_insert_with(|| format!("device_{:016x}", rand::random::<u64>()))
    }
}
