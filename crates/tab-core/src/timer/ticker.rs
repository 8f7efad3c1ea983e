//! Cancellable periodic tick registration.
//!
//! The engine does not spawn threads or timers itself. Instead it owns a
//! [`Ticker`] describing whether a periodic check is wanted and at what
//! granularity. The host loop polls [`Ticker::interval`] and calls
//! `TimerEngine::tick()` on that cadence while a registration is armed.

use std::time::Duration;

/// Default check granularity, independent of the one-second display.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Identifier of a single tick registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(u64);

/// Holds zero or one live tick registration.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    active: Option<TickId>,
    next_id: u64,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: None,
            next_id: 0,
        }
    }

    /// Arm a new registration, cancelling the previous one first.
    pub fn arm(&mut self) -> TickId {
        self.cancel();
        self.next_id += 1;
        let id = TickId(self.next_id);
        self.active = Some(id);
        id
    }

    /// Cancel the live registration, if any.
    pub fn cancel(&mut self) -> Option<TickId> {
        self.active.take()
    }

    pub fn active(&self) -> Option<TickId> {
        self.active
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    /// The polling cadence while armed, `None` when idle.
    pub fn interval(&self) -> Option<Duration> {
        self.active.map(|_| self.interval)
    }
}
