//! Hours/minutes/seconds value counted down by the engine.
//!
//! Fields are always normalized: hours in `0..=99`, minutes and seconds in
//! `0..=59`. Every constructor clamps, so a `TimerDuration` can never hold an
//! out-of-range field.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MAX_HOURS: u8 = 99;
pub const MAX_MINUTES: u8 = 59;
pub const MAX_SECONDS: u8 = 59;

/// Largest representable value, `99:59:59`.
pub const MAX_TOTAL_SECS: u32 = MAX_HOURS as u32 * 3600 + MAX_MINUTES as u32 * 60 + MAX_SECONDS as u32;

/// Saturating clamp into `min..=max`.
pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// One of the three editable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub fn max(self) -> u8 {
        match self {
            Field::Hours => MAX_HOURS,
            Field::Minutes => MAX_MINUTES,
            Field::Seconds => MAX_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "DurationFields")]
pub struct TimerDuration {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

/// Unvalidated wire form; deserializing always goes through the clamp.
#[derive(Deserialize)]
struct DurationFields {
    #[serde(default)]
    hours: u32,
    #[serde(default)]
    minutes: u32,
    #[serde(default)]
    seconds: u32,
}

impl From<DurationFields> for TimerDuration {
    fn from(raw: DurationFields) -> Self {
        TimerDuration::new(raw.hours, raw.minutes, raw.seconds)
    }
}

impl TimerDuration {
    pub const ZERO: TimerDuration = TimerDuration {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Build from raw fields, clamping each into its range.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours: clamp(hours as i64, 0, MAX_HOURS as i64) as u8,
            minutes: clamp(minutes as i64, 0, MAX_MINUTES as i64) as u8,
            seconds: clamp(seconds as i64, 0, MAX_SECONDS as i64) as u8,
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::from_total_secs(minutes.saturating_mul(60))
    }

    /// Normalize a total-seconds count; values past `99:59:59` saturate.
    pub fn from_total_secs(total: u32) -> Self {
        let total = total.min(MAX_TOTAL_SECS);
        Self {
            hours: (total / 3600) as u8,
            minutes: (total % 3600 / 60) as u8,
            seconds: (total % 60) as u8,
        }
    }

    /// Coerce manually entered text.
    ///
    /// Each field is trimmed and parsed as an integer. Anything that does not
    /// parse becomes zero; the result is then clamped into the field's range.
    pub fn from_input(hours: &str, minutes: &str, seconds: &str) -> Self {
        let field = |raw: &str, max: u8| -> u8 {
            let parsed = raw.trim().parse::<i64>().unwrap_or(0);
            clamp(parsed, 0, max as i64) as u8
        };
        Self {
            hours: field(hours, MAX_HOURS),
            minutes: field(minutes, MAX_MINUTES),
            seconds: field(seconds, MAX_SECONDS),
        }
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn total_secs(&self) -> u32 {
        self.hours as u32 * 3600 + self.minutes as u32 * 60 + self.seconds as u32
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Step one second backward, borrowing across fields.
    ///
    /// Seconds borrow a minute, minutes borrow an hour. Returns `false` and
    /// leaves the value untouched when it is already zero.
    pub fn decrement(&mut self) -> bool {
        if self.seconds > 0 {
            self.seconds -= 1;
            return true;
        }
        if self.minutes > 0 {
            self.minutes -= 1;
            self.seconds = MAX_SECONDS;
            return true;
        }
        if self.hours > 0 {
            self.hours -= 1;
            self.minutes = MAX_MINUTES;
            self.seconds = MAX_SECONDS;
            return true;
        }
        false
    }

    /// Add (or remove) whole minutes without touching the seconds field.
    ///
    /// Minutes roll into hours. Past `99:59` the result saturates at `99:59`;
    /// below zero it floors at `00:SS`.
    pub fn add_minutes(&self, delta: i32) -> Self {
        let current = self.hours as i64 * 60 + self.minutes as i64;
        let max = MAX_HOURS as i64 * 60 + MAX_MINUTES as i64;
        let total = clamp(current + delta as i64, 0, max);
        Self {
            hours: (total / 60) as u8,
            minutes: (total % 60) as u8,
            seconds: self.seconds,
        }
    }

    /// Single-field edit, clamped to that field with no carry.
    pub fn nudge(&self, field: Field, delta: i32) -> Self {
        let apply = |value: u8| clamp(value as i64 + delta as i64, 0, field.max() as i64) as u8;
        let mut next = *self;
        match field {
            Field::Hours => next.hours = apply(self.hours),
            Field::Minutes => next.minutes = apply(self.minutes),
            Field::Seconds => next.seconds = apply(self.seconds),
        }
        next
    }
}

/// `MM:SS`, or `HH:MM:SS` when hours are non-zero.
impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{:02}:{:02}", self.minutes, self.seconds)
        }
    }
}
