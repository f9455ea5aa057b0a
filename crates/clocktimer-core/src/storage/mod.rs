mod bridge;
mod config;
pub mod database;

pub use bridge::{PersistenceBridge, SETTINGS_KEY, STATE_KEY, THEME_KEY};
pub use config::{AudioConfig, Config, LoggingConfig, WakeLockConfig, WindowConfig};
pub use database::Database;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::StorageError;

/// String key-value capability behind both the persistent and the
/// session-scoped store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store. Used in tests and whenever an on-disk store cannot
/// be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `CLOCKTIMER_HOME` overrides the location; otherwise it is
/// `~/.config/clocktimer`, or `~/.config/clocktimer-dev` when
/// `CLOCKTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("CLOCKTIMER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CLOCKTIMER_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("clocktimer-dev")
            } else {
                base_dir.join("clocktimer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::Unavailable {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Session identifier: `CLOCKTIMER_SESSION`, or `default`.
pub fn session_id() -> String {
    std::env::var("CLOCKTIMER_SESSION")
        .ok()
        .map(|s| {
            s.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Session-scoped database path. Lives in the temp dir so it does not
/// outlive the machine session.
pub fn session_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("clocktimer-session-{}.db", session_id()))
}
