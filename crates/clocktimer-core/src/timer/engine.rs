//! Countdown engine implementation.
//!
//! The engine is a plain state machine. It does not own a clock or spawn
//! threads: the caller invokes `tick()` once per elapsed second while the
//! timer is running (see [`TickScheduler`](super::TickScheduler)).
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new();
//! engine.start();
//! // Once per second:
//! if let Some(Event::TimerCompleted { .. }) = engine.tick() {
//!     // play the alarm
//! }
//! ```
//!
//! Commands return `Some(Event)` when they changed something and `None`
//! when they were rejected (edits while running) or had nothing to do.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::duration::TimerDuration;
use crate::events::Event;

/// Duration a fresh engine counts down from.
pub const DEFAULT_DURATION_MIN: u32 = 15;

/// Session-scoped wire form of the engine, stored under `timer-state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTimerState {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub is_running: bool,
    pub is_repeat: bool,
    pub initial_hours: u32,
    pub initial_minutes: u32,
    pub initial_seconds: u32,
}

/// Core countdown engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownEngine {
    remaining: TimerDuration,
    /// Restored on reset and on repeat-driven restart.
    initial: TimerDuration,
    running: bool,
    repeat: bool,
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownEngine {
    /// A stopped, non-repeating engine at the default duration.
    pub fn new() -> Self {
        Self::with_duration(TimerDuration::from_minutes(DEFAULT_DURATION_MIN))
    }

    pub fn with_duration(duration: TimerDuration) -> Self {
        Self {
            remaining: duration,
            initial: duration,
            running: false,
            repeat: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn remaining(&self) -> TimerDuration {
        self.remaining
    }

    pub fn initial(&self) -> TimerDuration {
        self.initial
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    pub fn formatted(&self) -> String {
        self.remaining.to_string()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            remaining: self.remaining,
            initial: self.initial,
            running: self.running,
            repeat: self.repeat,
            formatted: self.formatted(),
            total_secs: self.remaining.total_secs(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Toggle running.
    ///
    /// Starting from zero restores `initial` first; starting from any other
    /// value makes that value the new baseline for reset and repeat.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return self.pause();
        }
        if self.remaining.is_zero() {
            self.remaining = self.initial;
        } else {
            self.initial = self.remaining;
        }
        self.running = true;
        Some(Event::TimerStarted {
            remaining: self.remaining,
            initial: self.initial,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.running = false;
        self.remaining = self.initial;
        Some(Event::TimerReset {
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Overwrite the remaining time. Rejected while running; never touches
    /// `initial`.
    pub fn set_remaining(&mut self, duration: TimerDuration) -> Option<Event> {
        if self.running {
            return None;
        }
        self.remaining = duration;
        Some(Event::RemainingChanged {
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Add or remove whole minutes. Rejected while running.
    pub fn quick_adjust(&mut self, delta_minutes: i32) -> Option<Event> {
        if self.running {
            return None;
        }
        let adjusted = self.remaining.add_minutes(delta_minutes);
        self.set_remaining(adjusted)
    }

    pub fn set_repeat(&mut self, repeat: bool) -> Option<Event> {
        if self.repeat == repeat {
            return None;
        }
        self.repeat = repeat;
        Some(Event::RepeatChanged {
            repeat,
            at: Utc::now(),
        })
    }

    /// Advance one second. Call once per elapsed second while running.
    ///
    /// Returns `None` when stopped, `TimerTicked` for an ordinary second and
    /// `TimerCompleted` on the tick that reaches zero. A repeating timer is
    /// already restarted from `initial` when `TimerCompleted` is returned, so
    /// the next tick continues the new cycle with no skipped second. A
    /// repeating timer with a zero `initial` stops instead of alarming on
    /// every tick.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let before_secs = self.remaining.total_secs();

        // Already at zero (restored state or a zero-length start): this tick
        // is the completion edge itself.
        if !self.remaining.decrement() || self.remaining.is_zero() {
            return Some(self.complete(before_secs));
        }

        Some(Event::TimerTicked {
            remaining: self.remaining,
            before_secs,
            at: Utc::now(),
        })
    }

    fn complete(&mut self, before_secs: u32) -> Event {
        let repeated = self.repeat && !self.initial.is_zero();
        if repeated {
            self.remaining = self.initial;
        } else {
            self.running = false;
            self.remaining = TimerDuration::ZERO;
        }
        Event::TimerCompleted {
            repeated,
            remaining: self.remaining,
            before_secs,
            at: Utc::now(),
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn to_persisted(&self) -> PersistedTimerState {
        PersistedTimerState {
            hours: self.remaining.hours() as u32,
            minutes: self.remaining.minutes() as u32,
            seconds: self.remaining.seconds() as u32,
            is_running: self.running,
            is_repeat: self.repeat,
            initial_hours: self.initial.hours() as u32,
            initial_minutes: self.initial.minutes() as u32,
            initial_seconds: self.initial.seconds() as u32,
        }
    }

    /// Rebuild from a stored record. Out-of-range fields are clamped.
    pub fn from_persisted(state: &PersistedTimerState) -> Self {
        Self {
            remaining: TimerDuration::new(state.hours, state.minutes, state.seconds),
            initial: TimerDuration::new(
                state.initial_hours,
                state.initial_minutes,
                state.initial_seconds,
            ),
            running: state.is_running,
            repeat: state.is_repeat,
        }
    }
}
