//! SQLite-backed state store.
//!
//! Persists the configuration and the timer snapshot as JSON values in a
//! single key-value table, one row per storage key.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::config::Config;
use super::snapshot::TimerSnapshot;
use super::store::StateStore;
use super::{data_dir, SETTINGS_KEY, TIMER_STATE_KEY};
use crate::error::StorageError;

/// SQLite database holding the `kv` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/tab.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or the database cannot be
    /// opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir().map_err(StorageError::DataDir)?.join("tab.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        tracing::debug!("opened state store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key from the kv table.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv_get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to read {key}: {e}");
                None
            }
        }
    }

    fn write<T: serde::Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|json| self.kv_set(key, &json));
        if let Err(e) = result {
            tracing::warn!("failed to save {key}: {e}");
        }
    }
}

impl StateStore for SqliteStore {
    fn load_config(&self) -> Config {
        self.read(SETTINGS_KEY)
            .map(|raw| Config::from_json_str(&raw))
            .unwrap_or_default()
    }

    fn save_config(&mut self, config: &Config) {
        self.write(SETTINGS_KEY, &config.clamped());
    }

    fn read_snapshot(&self) -> Option<TimerSnapshot> {
        self.read(TIMER_STATE_KEY)
            .and_then(|raw| TimerSnapshot::from_json_str(&raw))
    }

    fn save_snapshot(&mut self, snapshot: &TimerSnapshot) {
        self.write(TIMER_STATE_KEY, snapshot);
    }

    fn clear_snapshot(&mut self) {
        if let Err(e) = self.kv_delete(TIMER_STATE_KEY) {
            tracing::warn!("failed to clear timer snapshot: {e}");
        }
    }
}
