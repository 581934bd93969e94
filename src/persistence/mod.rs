//! Local persistence and outbound collaborators
//!
//! Nothing in here is authoritative for round state. Failures surface as
//! `PersistenceError` and callers on the gameplay path log and swallow them.

pub mod prefs;
pub mod session;
pub mod sinks;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use prefs::Preferences;
pub use session::{GameSessionSummary, SessionContext, SessionRecord};
pub use sinks::{AnalyticsSink, Feedback, FeedbackSink, JsonLinesSink, LogSink};

/// Directory name under the user's config dir
pub const APP_DIR: &str = "number-quest";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("rejected: {0}")]
    Rejected(String),
}

/// `$XDG_CONFIG_HOME/number-quest`, falling back to `$HOME/.config/number-quest`
pub fn config_dir() -> PathBuf {
    let home_config = || {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_config(),
    };
    base.join(APP_DIR)
}

/// Read a JSON file. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write pretty JSON via a temp file, creating the parent directory if needed
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
