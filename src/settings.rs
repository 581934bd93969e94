//! Game balance settings
//!
//! Persisted as JSON next to the player's preferences. Missing fields fall back
//! to the shipped balance, so older files keep loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::PersistenceError;

/// Tunable balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Storage & rewards ===
    /// Number of item slots
    pub storage_size: usize,
    /// Targets cleared per reward draw offer
    pub draw_target_threshold: u32,
    /// Points granted by a score pack
    pub score_pack_points: u64,
    /// Seconds added by a timer item
    pub timer_item_seconds: u32,

    // === Scoring ===
    /// Points per core_base unit on a match
    pub base_score_multiplier: u64,
    /// Points per combo step on a match
    pub combo_score_bonus: u64,

    // === Time ===
    /// Countdown seconds per core_base unit (e.g. 2 * 18 = 36s)
    pub timer_multiplier: u32,
    /// Synthesis lock before the result settles
    pub resolve_delay_ms: u64,
    /// Delay between exhaustion and game over
    pub game_over_grace_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_size: 4,
            draw_target_threshold: 6,
            score_pack_points: 500,
            timer_item_seconds: 15,

            base_score_multiplier: 50,
            combo_score_bonus: 20,

            timer_multiplier: 18,
            resolve_delay_ms: 400,
            game_over_grace_ms: 600,
        }
    }
}

impl Settings {
    /// Countdown budget for a target
    pub fn target_seconds(&self, core_base: u32) -> u32 {
        core_base * self.timer_multiplier
    }

    /// Score for matching a target at the given (pre-increment) combo
    pub fn match_score(&self, core_base: u32, combo: u32) -> u64 {
        core_base as u64 * self.base_score_multiplier + combo as u64 * self.combo_score_bonus
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_balance() {
        let s = Settings::default();
        assert_eq!(s.target_seconds(2), 36);
        assert_eq!(s.match_score(2, 0), 100);
        assert_eq!(s.match_score(5, 3), 310);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "storage_size": 6 }"#).unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.storage_size, 6);
        assert_eq!(s.draw_target_threshold, 6);
        assert_eq!(s.timer_multiplier, 18);
    }

    #[test]
    fn test_missing_or_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(&dir.path().join("nope.json")), Settings::default());

        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            combo_score_bonus: 25,
            ..Default::default()
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path), s);
    }
}
