//! Timer engine implementation.
//!
//! The timer engine is a deadline-based state machine over
//! `{Focus, Break} x {Running, Paused}`. It does not use internal threads;
//! the caller is responsible for calling `tick()` periodically while
//! [`TimerEngine::tick_interval`] returns `Some`.
//!
//! Remaining time is always derived from an absolute deadline, never
//! decremented per tick, so slow or missed ticks cannot accumulate drift.
//!
//! ## State Transitions
//!
//! ```text
//! (Phase, Paused)  --start-->        (Phase, Running)
//! (Phase, Running) --pause-->        (Phase, Paused)
//! (Phase, Running) --tick at 0-->    (Other, Paused)   + completion callback
//! (Phase, _)       --skip-->         (Other, Paused)
//! (Phase, _)       --reset-->        (Phase, Paused)
//! (_, _)           --start_break-->  (Break, Running)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(store, SystemClock, |ended| notify(ended));
//! engine.resume_from_storage();
//! engine.start();
//! // In a loop, every `engine.tick_interval()`:
//! engine.tick(); // Returns Some(Event) when the phase completes
//! ```

use super::phase::Phase;
use super::ticker::Ticker;
use crate::clock::{Clock, SystemClock};
use crate::events::{timestamp, Event};
use crate::storage::{Config, StateStore, TimerSnapshot};

const MS_PER_SEC: u64 = 1000;

/// Invoked with the phase that just completed naturally.
pub type CompletionCallback = Box<dyn FnMut(Phase)>;

/// Core timer engine.
///
/// Owns the runtime state exclusively. Every state-changing command writes
/// the store before returning, so a reader of the store always observes the
/// post-command state.
pub struct TimerEngine<S: StateStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: Config,
    enabled: bool,
    phase: Phase,
    running: bool,
    remaining_secs: u64,
    /// Deadline (ms since epoch) while running.
    scheduled_end_ms: Option<u64>,
    ticker: Ticker,
    initialized: bool,
    visible: bool,
    on_complete: CompletionCallback,
}

impl<S: StateStore, C: Clock> TimerEngine<S, C> {
    /// Create an engine over `store`, reading the configuration from it.
    ///
    /// Starts paused in Focus at the full focus duration. Call
    /// [`resume_from_storage`](Self::resume_from_storage) to pick up a
    /// persisted snapshot.
    pub fn new(store: S, clock: C, on_complete: impl FnMut(Phase) + 'static) -> Self {
        let config = store.load_config().clamped();
        Self {
            store,
            clock,
            config,
            enabled: true,
            phase: Phase::Focus,
            running: false,
            remaining_secs: config.focus_secs(),
            scheduled_end_ms: None,
            ticker: Ticker::default(),
            initialized: false,
            visible: true,
            on_complete: Box::new(on_complete),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Full duration of the current phase.
    pub fn total_secs(&self) -> u64 {
        self.phase.duration_secs(&self.config)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn scheduled_end_ms(&self) -> Option<u64> {
        self.scheduled_end_ms
    }

    /// How often the host should call `tick()`; `None` when nothing is armed.
    pub fn tick_interval(&self) -> Option<std::time::Duration> {
        self.ticker.interval()
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            ends_at: self.scheduled_end_ms.map(timestamp),
            at: timestamp(self.clock.now_ms()),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Reconcile the persisted snapshot against elapsed time.
    ///
    /// Runs once per engine lifetime; later calls return `None` and change
    /// nothing. A phase that ran out while the engine was gone moves on to
    /// the next phase without firing the completion callback.
    pub fn resume_from_storage(&mut self) -> Option<Event> {
        if self.initialized {
            return None;
        }
        self.initialized = true;

        let now = self.clock.now_ms();
        let restored = self
            .store
            .load_snapshot(self.config.focus_secs(), self.config.break_secs(), now);

        self.disarm();
        self.phase = restored.phase;
        self.remaining_secs = restored.remaining_secs;
        if restored.running && restored.remaining_secs > 0 {
            self.arm(now);
        }

        tracing::debug!(
            phase = %self.phase,
            running = self.running,
            remaining_secs = self.remaining_secs,
            "restored timer state"
        );
        Some(Event::StateRestored {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            at: timestamp(now),
        })
    }

    /// Enable or disable `start()`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down from the current remaining time.
    ///
    /// Returns `None` when the engine is disabled. Calling it while already
    /// running re-bases the deadline from the current remaining time.
    pub fn start(&mut self) -> Option<Event> {
        if !self.enabled {
            tracing::debug!("start ignored: engine disabled");
            return None;
        }
        let now = self.clock.now_ms();
        let ends_at = self.arm(now);
        self.persist(now);
        tracing::debug!(phase = %self.phase, remaining_secs = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            ends_at: timestamp(ends_at),
            at: timestamp(now),
        })
    }

    /// Stop counting, keeping the remaining time as is.
    pub fn pause(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        self.disarm();
        self.persist(now);
        tracing::debug!(phase = %self.phase, remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: timestamp(now),
        })
    }

    /// Restore the full duration of the current phase, paused.
    pub fn reset(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        self.disarm();
        self.remaining_secs = self.total_secs();
        self.persist(now);
        tracing::debug!(phase = %self.phase, "timer reset");
        Some(Event::TimerReset {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: timestamp(now),
        })
    }

    /// Move to the other phase without completing the current one.
    ///
    /// The new phase is paused at its full duration and the completion
    /// callback is not invoked.
    pub fn skip(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let from = self.phase;
        self.disarm();
        self.phase = from.other();
        self.remaining_secs = self.total_secs();
        self.persist(now);
        tracing::debug!(%from, to = %self.phase, "timer skipped");
        Some(Event::TimerSkipped {
            from,
            to: self.phase,
            remaining_secs: self.remaining_secs,
            at: timestamp(now),
        })
    }

    /// Switch to a full-length break and start it immediately.
    ///
    /// Called during a break, this restarts the break from its full duration.
    pub fn start_break(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        self.phase = Phase::Break;
        self.remaining_secs = self.config.break_secs();
        let ends_at = self.arm(now);
        self.persist(now);
        tracing::debug!(remaining_secs = self.remaining_secs, "break started");
        Some(Event::BreakStarted {
            remaining_secs: self.remaining_secs,
            ends_at: timestamp(ends_at),
            at: timestamp(now),
        })
    }

    /// Call periodically. Returns `Some(Event::TimerCompleted)` when the
    /// phase finishes.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.ticker.is_armed() {
            return None;
        }
        let deadline = self.scheduled_end_ms?;
        let now = self.clock.now_ms();
        self.remaining_secs = remaining_until(deadline, now);
        if self.remaining_secs == 0 {
            return Some(self.complete(now));
        }
        None
    }

    /// Report a change of host visibility.
    ///
    /// Becoming visible again while running resynchronizes with the deadline
    /// at once, completing the phase if it ran out in the background.
    pub fn set_visibility(&mut self, visible: bool) -> Option<Event> {
        let was_hidden = !self.visible;
        self.visible = visible;
        if !(visible && was_hidden && self.running) {
            return None;
        }
        tracing::debug!("host visible again, resynchronizing with deadline");
        self.tick()
    }

    /// Adopt and persist a new configuration.
    ///
    /// While idle, a change to the current phase's duration resets the
    /// remaining time to the new full duration. A running countdown is never
    /// truncated.
    pub fn update_config(&mut self, config: Config) -> Option<Event> {
        let now = self.clock.now_ms();
        let config = config.clamped();
        let previous = std::mem::replace(&mut self.config, config);
        self.store.save_config(&config);

        let current_changed =
            self.phase.duration_secs(&previous) != self.phase.duration_secs(&config);
        if self.initialized && !self.running && current_changed {
            self.remaining_secs = self.total_secs();
            self.persist(now);
            tracing::debug!(
                phase = %self.phase,
                remaining_secs = self.remaining_secs,
                "idle timer resized"
            );
        }

        Some(Event::ConfigChanged {
            focus_duration: config.focus_duration,
            break_duration: config.break_duration,
            remaining_secs: self.remaining_secs,
            at: timestamp(now),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Arm the deadline and tick from `now`; returns the deadline.
    fn arm(&mut self, now: u64) -> u64 {
        let deadline = now.saturating_add(self.remaining_secs.saturating_mul(MS_PER_SEC));
        self.scheduled_end_ms = Some(deadline);
        self.running = true;
        self.ticker.arm();
        deadline
    }

    fn disarm(&mut self) {
        self.ticker.cancel();
        self.scheduled_end_ms = None;
        self.running = false;
    }

    fn persist(&mut self, now: u64) {
        self.store.save_snapshot(&TimerSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            saved_at_ms: now,
        });
    }

    fn complete(&mut self, now: u64) -> Event {
        self.disarm();
        let ended = self.phase;
        self.phase = ended.other();
        self.remaining_secs = self.total_secs();
        self.store.clear_snapshot();
        tracing::info!(%ended, next = %self.phase, "phase completed");
        (self.on_complete)(ended);
        Event::TimerCompleted {
            phase: ended,
            next: self.phase,
            next_remaining_secs: self.remaining_secs,
            at: timestamp(now),
        }
    }
}

/// Whole seconds left until `deadline`, rounded up, never negative.
fn remaining_until(deadline: u64, now: u64) -> u64 {
    deadline.saturating_sub(now).div_ceil(MS_PER_SEC)
}
