//! Durable timer snapshot and resume reconciliation.

use serde::{Deserialize, Serialize};

use crate::timer::Phase;

const MS_PER_SEC: u64 = 1000;

/// The durable representation of engine state.
///
/// `remaining_secs` is relative to `saved_at_ms` only while `running`; a
/// paused snapshot is an exact resume value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    #[serde(rename = "mode")]
    pub phase: Phase,
    #[serde(rename = "isActive")]
    pub running: bool,
    #[serde(rename = "timeLeft")]
    pub remaining_secs: u64,
    #[serde(rename = "lastUpdated")]
    pub saved_at_ms: u64,
}

impl TimerSnapshot {
    /// A paused Focus snapshot at the full focus duration.
    pub fn fresh(focus_secs: u64, now_ms: u64) -> Self {
        Self {
            phase: Phase::Focus,
            running: false,
            remaining_secs: focus_secs,
            saved_at_ms: now_ms,
        }
    }

    /// Parse a stored record; anything malformed is "no data".
    pub fn from_json_str(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("discarding malformed timer snapshot: {e}");
                None
            }
        }
    }
}

/// Reconcile a stored snapshot against the wall-clock time elapsed since it
/// was written.
///
/// - No snapshot: a fresh paused Focus phase.
/// - Paused snapshot: returned as saved.
/// - Running snapshot: whole elapsed seconds (floored) are subtracted. If
///   nothing is left the phase ended while nobody was watching, so the result
///   is the next phase, paused, at its full duration. Otherwise the result is
///   still running with the adjusted remaining time.
///
/// The returned snapshot is stamped with `now_ms`.
pub fn reconcile(
    stored: Option<TimerSnapshot>,
    focus_secs: u64,
    break_secs: u64,
    now_ms: u64,
) -> TimerSnapshot {
    let Some(snapshot) = stored else {
        return TimerSnapshot::fresh(focus_secs, now_ms);
    };

    if !snapshot.running {
        return TimerSnapshot {
            saved_at_ms: now_ms,
            ..snapshot
        };
    }

    let elapsed_secs = now_ms.saturating_sub(snapshot.saved_at_ms) / MS_PER_SEC;
    let adjusted = snapshot.remaining_secs.saturating_sub(elapsed_secs);

    if adjusted == 0 {
        let next = snapshot.phase.other();
        return TimerSnapshot {
            phase: next,
            running: false,
            remaining_secs: match next {
                Phase::Focus => focus_secs,
                Phase::Break => break_secs,
            },
            saved_at_ms: now_ms,
        };
    }

    TimerSnapshot {
        remaining_secs: adjusted,
        saved_at_ms: now_ms,
        ..snapshot
    }
}
