//! Persistence bridge between the engine/settings and the two stores.
//!
//! Engine state goes to the session-scoped store so a restart within the
//! same session picks up where it left off. Settings and theme go to the
//! persistent store. Every failure here is logged and swallowed: reads fall
//! back to defaults and writes are dropped.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Database, KeyValueStore, MemoryStore};
use crate::error::StorageError;
use crate::settings::Settings;
use crate::theme::Theme;
use crate::timer::{CountdownEngine, PersistedTimerState};

/// Session-scoped engine record.
pub const STATE_KEY: &str = "timer-state";
/// Persistent theme name (plain string).
pub const THEME_KEY: &str = "timer-theme";
/// Persistent settings record.
pub const SETTINGS_KEY: &str = "timer-settings";

pub struct PersistenceBridge {
    persistent: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl PersistenceBridge {
    pub fn new(persistent: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Open the on-disk stores, substituting an in-memory store for any
    /// that cannot be opened.
    pub fn open_default() -> Self {
        let persistent: Box<dyn KeyValueStore> = match Database::open() {
            Ok(db) => Box::new(db),
            Err(e) => {
                warn!("persistent store unavailable, settings will not be saved: {e}");
                Box::new(MemoryStore::new())
            }
        };
        let session: Box<dyn KeyValueStore> = match Database::open_session() {
            Ok(db) => Box::new(db),
            Err(e) => {
                warn!("session store unavailable, timer state will not be saved: {e}");
                Box::new(MemoryStore::new())
            }
        };
        Self::new(persistent, session)
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    // ── Engine (session scope) ───────────────────────────────────────

    pub fn load_engine(&self) -> CountdownEngine {
        match read_json::<PersistedTimerState>(self.session.as_ref(), STATE_KEY) {
            Ok(Some(state)) => CountdownEngine::from_persisted(&state),
            Ok(None) => CountdownEngine::new(),
            Err(e) => {
                warn!("discarding stored timer state: {e}");
                CountdownEngine::new()
            }
        }
    }

    pub fn save_engine(&self, engine: &CountdownEngine) {
        if let Err(e) = write_json(self.session.as_ref(), STATE_KEY, &engine.to_persisted()) {
            warn!("failed to save timer state: {e}");
        }
    }

    // ── Settings and theme (persistent scope) ────────────────────────

    pub fn load_settings(&self) -> Settings {
        match read_json::<Settings>(self.persistent.as_ref(), SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("discarding stored settings: {e}");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) {
        if let Err(e) = write_json(self.persistent.as_ref(), SETTINGS_KEY, settings) {
            warn!("failed to save settings: {e}");
        }
    }

    pub fn load_theme(&self) -> Theme {
        match self.persistent.get(THEME_KEY) {
            Ok(Some(name)) => name.parse().unwrap_or_else(|_| {
                debug!("ignoring unknown stored theme '{name}'");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("failed to read theme: {e}");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = self.persistent.set(THEME_KEY, theme.as_str()) {
            warn!("failed to save theme: {e}");
        }
    }
}

fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}
