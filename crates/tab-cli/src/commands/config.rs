use clap::Subcommand;
use tab_core::Config;

use super::{open_engine, print_event};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (focusDuration, breakDuration, soundEnabled,
        /// notificationsEnabled, workStart, workEnd)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value; durations are clamped to their allowed range, times
        /// are HH:MM or "unset"
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(|_| {});
    match action {
        ConfigAction::Get { key } => println!("{}", engine.config().get(&key)?),
        ConfigAction::Set { key, value } => {
            let mut config = *engine.config();
            config.set(&key, &value)?;
            if let Some(event) = engine.update_config(config) {
                print_event(&event)?;
            }
        }
        ConfigAction::List => {
            let json = serde_json::to_string_pretty(engine.config())?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            engine.update_config(Config::default());
            println!("config reset to defaults");
        }
    }
    Ok(())
}
