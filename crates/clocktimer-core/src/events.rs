use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerDuration;

/// Every engine state change produces an Event.
/// The controller hands it to the fan-out; the CLI prints it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining: TimerDuration,
        initial: TimerDuration,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining: TimerDuration,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining: TimerDuration,
        at: DateTime<Utc>,
    },
    /// Manual edit or quick adjust while stopped.
    RemainingChanged {
        remaining: TimerDuration,
        at: DateTime<Utc>,
    },
    RepeatChanged {
        repeat: bool,
        at: DateTime<Utc>,
    },
    /// One second elapsed without reaching zero.
    TimerTicked {
        remaining: TimerDuration,
        /// Total seconds before this tick's decrement.
        before_secs: u32,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. With `repeated`, it has already restarted
    /// from `remaining`; otherwise it stopped at zero.
    TimerCompleted {
        repeated: bool,
        remaining: TimerDuration,
        /// Total seconds before this tick; 1 for a normal run-down.
        before_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        remaining: TimerDuration,
        initial: TimerDuration,
        running: bool,
        repeat: bool,
        formatted: String,
        total_secs: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event flipped the running flag.
    pub fn toggles_running(&self) -> bool {
        matches!(
            self,
            Event::TimerStarted { .. }
                | Event::TimerPaused { .. }
                | Event::TimerReset { .. }
                | Event::TimerCompleted {
                    repeated: false,
                    ..
                }
        )
    }

    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. })
    }
}
