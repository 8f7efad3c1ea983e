mod config;
pub mod database;
mod snapshot;
mod store;

pub use config::{Config, BREAK_MINUTES_RANGE, FOCUS_MINUTES_RANGE};
pub use database::SqliteStore;
pub use snapshot::{reconcile, TimerSnapshot};
pub use store::{MemoryStore, StateStore};

use std::path::PathBuf;

/// Storage key of the configuration record.
pub const SETTINGS_KEY: &str = "tab-settings";
/// Storage key of the timer snapshot.
pub const TIMER_STATE_KEY: &str = "tab-timer-state";

/// Returns the data directory, creating it if needed.
///
/// `TAB_DATA_DIR` overrides the location. Otherwise it is `~/.config/tab`, or
/// `~/.config/tab-dev` when `TAB_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("TAB_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TAB_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tab-dev")
            } else {
                base_dir.join("tab")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
