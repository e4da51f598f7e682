//! Durable key-value storage for the session list
//!
//! The session store persists its whole state as one opaque blob under a
//! single key. This module defines the [`KeyValueStore`] port that blob is
//! written through, a `sled`-backed implementation for real use, and an
//! in-memory implementation for tests.

use crate::error::{ChatpadError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub mod writer;
pub use writer::PersistenceWriter;

/// Storage key holding the serialized session list
pub const SESSIONS_KEY: &str = "chatSessions";

/// A single-slot-per-key string store
///
/// Implementations must be usable from a background task, hence the
/// `Send + Sync` bound.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was ever written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Storage backend using an embedded `sled` database
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a store at the given database directory
    ///
    /// # Errors
    ///
    /// Returns `ChatpadError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> chatpad::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::new(dir.path().join("sessions.db"))?;
    /// store.set("greeting", "hello")?;
    /// assert_eq!(store.get("greeting")?, Some("hello".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChatpadError::Storage(format!("Failed to create parent directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| ChatpadError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened session database at {}", path.display());
        Ok(Self { db, path })
    }

    /// Open the store in the user's data directory
    pub fn open_default() -> Result<Self> {
        Self::new(default_storage_path()?)
    }

    /// Path of the underlying database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| ChatpadError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ChatpadError::Storage(format!("Stored value is not UTF-8: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| ChatpadError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ChatpadError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// Default database location under the platform data directory
pub fn default_storage_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "chatpad", "chatpad")
        .ok_or_else(|| ChatpadError::Storage("Could not determine data directory".into()))?;

    Ok(proj_dirs.data_dir().join("sessions.db"))
}

/// In-memory store, mainly for tests
///
/// Counts successful writes so tests can observe persistence activity.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one value already present
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Number of `set` calls that completed
    pub fn write_count(&self) -> usize {
        self.writes.read().map(|w| *w).unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ChatpadError::Storage("Memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChatpadError::Storage("Memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());

        if let Ok(mut writes) = self.writes.write() {
            *writes += 1;
        }
        Ok(())
    }
}
