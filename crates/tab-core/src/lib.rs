//! # TAB! Core Library
//!
//! This library provides the core logic for the TAB! ("Take a Break") interval
//! timer. The CLI binary is a thin layer over the same engine and store.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A deadline-based state machine alternating between the
//!   Focus and Break phases. The caller drives it by invoking `tick()` while a
//!   tick registration is armed.
//! - **Storage**: An injected key-value store holding the configuration and
//!   the timer snapshot. SQLite-backed on disk, in-memory for tests.
//! - **Reconciliation**: On start-up the persisted snapshot is compared
//!   against elapsed wall-clock time to decide whether the phase already ended.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`StateStore`]: Persistence contract for configuration and snapshots
//! - [`Config`]: Phase durations and alert preferences
//! - [`Clock`]: Wall-clock source, swappable for a [`ManualClock`] in tests

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, StorageError};
pub use events::Event;
pub use notify::CompletionMessage;
pub use storage::{Config, MemoryStore, SqliteStore, StateStore, TimerSnapshot};
pub use timer::{Phase, Ticker, TimerEngine};
