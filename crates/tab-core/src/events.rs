use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of the engine produces an Event.
/// The CLI prints them; a GUI would render from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: Phase,
        to: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        remaining_secs: u64,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A phase ran out during a live session.
    TimerCompleted {
        phase: Phase,
        next: Phase,
        next_remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Persisted state was reconciled at start-up.
    StateRestored {
        phase: Phase,
        running: bool,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ConfigChanged {
        focus_duration: u32,
        break_duration: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        ends_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

/// Convert epoch milliseconds into a UTC timestamp.
pub fn timestamp(epoch_ms: u64) -> DateTime<Utc> {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
