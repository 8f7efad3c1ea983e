mod engine;
mod phase;
mod ticker;

pub use engine::{CompletionCallback, TimerEngine};
pub use phase::Phase;
pub use ticker::{TickId, Ticker, DEFAULT_TICK_INTERVAL};
