//! Durable local key-value store.
//!
//! Four namespaces live side by side under the storage root, one JSON file
//! each: `sessions`, `timer_state`, `notes_list` and `theme`.
//!
//! # Defensive Design
//!
//! Reads never fail the caller:
//! - Missing files read as the type's default (`[]`, idle timer, dark theme)
//! - Empty or corrupt JSON is logged and treated as absent
//!
//! Writes fully overwrite the namespace through a temp file + rename, so an
//! interrupted write leaves the previous contents intact.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{FocusError, Result};
use crate::storage::StorageConfig;
use crate::types::{Note, Session, Theme, TimerState};

/// The stable names of the local namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKey {
    Sessions,
    TimerState,
    NotesList,
    Theme,
}

impl LocalKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalKey::Sessions => "sessions",
            LocalKey::TimerState => "timer_state",
            LocalKey::NotesList => "notes_list",
            LocalKey::Theme => "theme",
        }
    }
}

enum Backing {
    Disk(StorageConfig),
    Memory(Mutex<HashMap<LocalKey, String>>),
}

/// Key-value persistence on the device.
///
/// Create with [`LocalStore::open`] for file-backed storage or
/// [`LocalStore::in_memory`] for tests.
pub struct LocalStore {
    backing: Backing,
}

impl LocalStore {
    pub fn open(storage: StorageConfig) -> Self {
        Self {
            backing: Backing::Disk(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backing: Backing::Memory(Mutex::new(HashMap::new())),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Generic Access
    // ─────────────────────────────────────────────────────────────────────────────

    /// Reads a namespace, falling back to `T::default()` when the data is
    /// missing or malformed.
    pub fn read<T: DeserializeOwned + Default>(&self, key: LocalKey) -> T {
        let content = match self.read_raw(key) {
            Ok(Some(content)) => content,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "Failed to read local data, using default");
                return T::default();
            }
        };

        if content.trim().is_empty() {
            debug!(key = key.as_str(), "Empty local data, using default");
            return T::default();
        }

        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "Malformed local data, using default");
                T::default()
            }
        }
    }

    /// Overwrites a namespace with `value`.
    pub fn write<T: Serialize + ?Sized>(&self, key: LocalKey, value: &T) -> Result<()> {
        let content = serde_json::to_string(value).map_err(|e| FocusError::Json {
            context: format!("serializing {}", key.as_str()),
            source: e,
        })?;
        self.write_raw(key, content)
    }

    fn read_raw(&self, key: LocalKey) -> Result<Option<String>> {
        match &self.backing {
            Backing::Memory(map) => {
                let map = map.lock().unwrap_or_else(|p| p.into_inner());
                Ok(map.get(&key).cloned())
            }
            Backing::Disk(storage) => {
                let path = storage.key_file(key.as_str());
                match fs_err::read_to_string(&path) {
                    Ok(content) => Ok(Some(content)),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(err) => Err(FocusError::Io {
                        context: format!("reading {}", path.display()),
                        source: err,
                    }),
                }
            }
        }
    }

    fn write_raw(&self, key: LocalKey, content: String) -> Result<()> {
        match &self.backing {
            Backing::Memory(map) => {
                let mut map = map.lock().unwrap_or_else(|p| p.into_inner());
                map.insert(key, content);
                Ok(())
            }
            Backing::Disk(storage) => {
                storage.ensure_dirs()?;
                let path = storage.key_file(key.as_str());

                let mut tmp = NamedTempFile::new_in(storage.root()).map_err(|e| FocusError::Io {
                    context: format!("creating temp file in {}", storage.root().display()),
                    source: e,
                })?;
                tmp.write_all(content.as_bytes())
                    .and_then(|_| tmp.flush())
                    .map_err(|e| FocusError::Io {
                        context: format!("writing temp file for {}", path.display()),
                        source: e,
                    })?;
                tmp.persist(&path).map_err(|e| FocusError::Io {
                    context: format!("persisting temp file to {}", path.display()),
                    source: e.error,
                })?;
                Ok(())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Sessions (newest first)
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn sessions(&self) -> Vec<Session> {
        self.read(LocalKey::Sessions)
    }

    pub fn save_sessions(&self, sessions: &[Session]) -> Result<()> {
        self.write(LocalKey::Sessions, sessions)
    }

    /// Prepends `session` and persists the whole list.
    ///
    /// Returns the updated list even if the write failed; the failure is logged.
    pub fn append_session(&self, session: Session) -> Vec<Session> {
        let mut sessions = self.sessions();
        sessions.insert(0, session);
        if let Err(err) = self.save_sessions(&sessions) {
            warn!(error = %err, "Failed to persist session list");
        }
        sessions
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Timer State
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn timer_state(&self) -> TimerState {
        self.read(LocalKey::TimerState)
    }

    pub fn save_timer_state(&self, state: &TimerState) -> Result<()> {
        self.write(LocalKey::TimerState, state)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn notes(&self) -> Vec<Note> {
        self.read(LocalKey::NotesList)
    }

    pub fn save_notes(&self, notes: &[Note]) -> Result<()> {
        self.write(LocalKey::NotesList, notes)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Theme
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        self.read(LocalKey::Theme)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.write(LocalKey::Theme, &theme)
    }
}
