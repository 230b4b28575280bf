//! Session-scoped key/value storage.
//!
//! The sidebar hands a single value from one page load to the next: the
//! scroll offset captured when a link was clicked. [`SessionStore`] is the
//! narrow get/set/remove interface it needs. Two backends exist:
//!
//! - [`MemorySessionStore`] lives as long as the process, which is the session
//!   of the interactive browser runtime.
//! - [`JsonSessionStore`] keeps the values in a JSON file under the temp
//!   directory so that separate CLI invocations share one session.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Key under which the sidebar stores its scroll offset.
pub const SCROLL_KEY: &str = "sidebar-scroll";

/// Environment variable allowing callers to override the session file path.
pub const SESSION_PATH_ENV: &str = "SIDENAV_SESSION_PATH";

/// Default filename for the JSON session payload.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Error surfaced when reading or writing session values fails.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// I/O failure (for example, permissions or a missing directory).
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The backing storage cannot be used at all.
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage with browsing-session lifetime.
pub trait SessionStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError>;

    /// Deletes the value under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SessionStoreError> {
        self.values
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session lock poisoned".into()))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonSessionStore {
    /// Opens the store at `path`, or at the default location when `None`.
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, SessionStoreError> {
        let resolved_path = match path.into() {
            Some(path) => path,
            None => default_session_path(),
        };
        let values = load_values(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            values: Mutex::new(values),
        })
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<(), SessionStoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut values = self
            .values
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session lock poisoned".into()))?;
        mutate(&mut values);
        self.save_locked(&values)
    }

    fn save_locked(&self, values: &BTreeMap<String, String>) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| SessionStoreError::Unavailable("session lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// Resolves the session file location, honoring [`SESSION_PATH_ENV`].
pub fn default_session_path() -> PathBuf {
    if let Ok(path) = env::var(SESSION_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    env::temp_dir().join("sidenav").join(SESSION_FILE_NAME)
}

fn load_values(path: &Path) -> Result<BTreeMap<String, String>, SessionStoreError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(values) => Ok(values),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse session file; starting with an empty session"
                );
                Ok(BTreeMap::new())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(error) => Err(SessionStoreError::Io(error)),
    }
}
