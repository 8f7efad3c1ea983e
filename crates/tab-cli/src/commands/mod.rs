pub mod completions;
pub mod config;
pub mod timer;

use tab_core::{
    CompletionMessage, Config, Event, MemoryStore, Phase, SqliteStore, StateStore, SystemClock,
    TimerEngine,
};

pub type CliEngine = TimerEngine<Box<dyn StateStore>, SystemClock>;

/// Open the on-disk store, degrading to a throwaway in-memory one when the
/// database is unavailable.
fn open_store() -> Box<dyn StateStore> {
    match SqliteStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("state store unavailable, timer state will not persist: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

/// Open the store and build an engine that alerts on completion, then
/// reconcile the persisted snapshot.
pub fn open_engine(mut on_complete: impl FnMut(Phase) + 'static) -> CliEngine {
    let store = open_store();
    let config = store.load_config();
    let mut engine = TimerEngine::new(store, SystemClock, move |ended| {
        alert(&config, ended);
        on_complete(ended);
    });
    engine.resume_from_storage();
    engine
}

/// Deliver the completion alert on the terminal.
fn alert(config: &Config, ended: Phase) {
    if !config.notifications_enabled {
        return;
    }
    let message = CompletionMessage::for_phase(ended);
    let bell = if config.alert_sound() { "\x07" } else { "" };
    eprintln!("{bell}{}\n{}", message.title, message.body);
}

pub fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}
