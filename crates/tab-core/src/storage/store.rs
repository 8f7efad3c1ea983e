//! The persistence contract the engine relies on.

use std::collections::HashMap;

use super::config::Config;
use super::snapshot::{reconcile, TimerSnapshot};
use super::{SETTINGS_KEY, TIMER_STATE_KEY};

/// Durable storage for the configuration and the timer snapshot.
///
/// Every operation is synchronous and infallible at this boundary. Backends
/// log their failures and degrade to defaults (on read) or no-ops (on write).
pub trait StateStore {
    /// Load the configuration, falling back to defaults field by field.
    fn load_config(&self) -> Config;

    fn save_config(&mut self, config: &Config);

    /// The stored snapshot exactly as written, `None` when absent or malformed.
    fn read_snapshot(&self) -> Option<TimerSnapshot>;

    fn save_snapshot(&mut self, snapshot: &TimerSnapshot);

    /// Remove the snapshot entirely.
    fn clear_snapshot(&mut self);

    /// Load the snapshot already reconciled against elapsed wall-clock time.
    fn load_snapshot(
        &self,
        default_focus_secs: u64,
        default_break_secs: u64,
        now_ms: u64,
    ) -> TimerSnapshot {
        reconcile(
            self.read_snapshot(),
            default_focus_secs,
            default_break_secs,
            now_ms,
        )
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn load_config(&self) -> Config {
        (**self).load_config()
    }

    fn save_config(&mut self, config: &Config) {
        (**self).save_config(config)
    }

    fn read_snapshot(&self) -> Option<TimerSnapshot> {
        (**self).read_snapshot()
    }

    fn save_snapshot(&mut self, snapshot: &TimerSnapshot) {
        (**self).save_snapshot(snapshot)
    }

    fn clear_snapshot(&mut self) {
        (**self).clear_snapshot()
    }
}

/// In-memory store keeping the same JSON records a disk backend would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overwrite a raw value, bypassing serialization.
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }

    /// Number of write operations (saves and clears) performed.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn put<T: serde::Serialize>(&mut self, key: &str, value: &T) {
        self.writes += 1;
        match serde_json::to_string(value) {
            Ok(json) => {
                self.entries.insert(key.to_string(), json);
            }
            Err(e) => tracing::warn!("failed to serialize {key}: {e}"),
        }
    }
}

impl StateStore for MemoryStore {
    fn load_config(&self) -> Config {
        self.raw(SETTINGS_KEY)
            .map(Config::from_json_str)
            .unwrap_or_default()
    }

    fn save_config(&mut self, config: &Config) {
        self.put(SETTINGS_KEY, &config.clamped());
    }

    fn read_snapshot(&self) -> Option<TimerSnapshot> {
        self.raw(TIMER_STATE_KEY).and_then(TimerSnapshot::from_json_str)
    }

    fn save_snapshot(&mut self, snapshot: &TimerSnapshot) {
        self.put(TIMER_STATE_KEY, snapshot);
    }

    fn clear_snapshot(&mut self) {
        self.writes += 1;
        self.entries.remove(TIMER_STATE_KEY);
    }
}
