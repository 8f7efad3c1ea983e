//! Text of the alert shown when a phase completes.
//!
//! Delivery (bell, desktop notification) belongs to the caller's completion
//! callback; this only decides what to say.

use serde::Serialize;

use crate::timer::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionMessage {
    pub title: &'static str,
    pub body: &'static str,
}

impl CompletionMessage {
    /// Message for the phase that just ended.
    pub fn for_phase(ended: Phase) -> Self {
        match ended {
            Phase::Focus => Self {
                title: "Time to Take a Break!",
                body: "Great work! Stand up, stretch, and walk around for a few minutes.",
            },
            Phase::Break => Self {
                title: "Break Over!",
                body: "Ready to get back to work? Start a new focus session.",
            },
        }
    }
}

/// Format whole seconds as `MM:SS`. Minutes keep counting past an hour.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_completion_prompts_a_break() {
        assert_eq!(
            CompletionMessage::for_phase(Phase::Focus).title,
            "Time to Take a Break!"
        );
        assert_eq!(CompletionMessage::for_phase(Phase::Break).title, "Break Over!");
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(7200), "120:00");
    }
}
