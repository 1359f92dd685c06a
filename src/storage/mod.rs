//! Durable key-value storage for session data.
//!
//! DESIGN
//! ======
//! Stores see storage as a flat string map with `get`/`set`/`remove`, the
//! same contract as browser local storage. Writes never fail from the
//! caller's point of view: `FileStorage` logs I/O failures and keeps the
//! in-memory copy authoritative for the rest of the process.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Key holding the raw session token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-serialized session user.
pub const USER_KEY: &str = "user";

// =============================================================================
// TRAIT
// =============================================================================

/// String key-value store shared between the session store and the HTTP
/// client.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Errors raised while opening file-backed storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read storage file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Storage persisted as a single JSON object of string values.
///
/// The whole map is rewritten on every mutation. The file is small (two
/// keys in practice) so there is no batching.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`, loading any existing entries.
    ///
    /// A missing file starts empty. A file whose contents are not a JSON
    /// object of strings also starts empty and is overwritten on the next
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => parse_entries(&path, &raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        let rendered = match serde_json::to_string_pretty(entries) {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "storage serialize failed");
                return;
            }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, path = %parent.display(), "storage directory create failed");
                return;
            }
        }

        if let Err(e) = std::fs::write(&self.path, rendered) {
            warn!(error = %e, path = %self.path.display(), "storage write failed");
        }
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

fn parse_entries(path: &Path, raw: &str) -> HashMap<String, String> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str::<HashMap<String, String>>(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, path = %path.display(), "storage file unreadable, starting empty");
            HashMap::new()
        }
    }
}
