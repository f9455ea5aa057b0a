//! User settings persisted under `timer-settings`.
//!
//! The wire format is a JSON object
//! `{countdownSound, customCountdownValues, timerSound}`. Loading is lenient:
//! each field that is missing or outside its known set falls back to its
//! default on its own, so one bad field never discards the others.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::sound::{is_valid_sound, DEFAULT_SOUND_ID};

/// Built-in countdown thresholds offered next to the custom ones.
pub const BUILTIN_THRESHOLDS: [u32; 3] = [5, 10, 15];

/// How many custom thresholds are remembered.
pub const CUSTOM_THRESHOLD_CAPACITY: usize = 2;

/// When the per-second countdown cue starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CountdownThreshold {
    #[default]
    Off,
    /// Cue while total remaining seconds are in `(0, n]`.
    Seconds(u32),
}

impl CountdownThreshold {
    pub fn seconds(self) -> Option<u32> {
        match self {
            CountdownThreshold::Off => None,
            CountdownThreshold::Seconds(n) => Some(n),
        }
    }

    /// Whether a tick that started at `before_secs` falls inside the window.
    pub fn covers(self, before_secs: u32) -> bool {
        match self {
            CountdownThreshold::Off => false,
            CountdownThreshold::Seconds(n) => before_secs > 0 && before_secs <= n,
        }
    }
}

impl fmt::Display for CountdownThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownThreshold::Off => f.write_str("off"),
            CountdownThreshold::Seconds(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for CountdownThreshold {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("off") {
            return Ok(CountdownThreshold::Off);
        }
        parse_positive_secs(s).map(CountdownThreshold::Seconds)
    }
}

impl From<CountdownThreshold> for String {
    fn from(value: CountdownThreshold) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CountdownThreshold {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn parse_positive_secs(s: &str) -> Result<u32, ValidationError> {
    match s.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ValidationError::InvalidValue {
            field: "countdownSound".into(),
            message: format!("'{s}' is not a positive number of seconds"),
        }),
    }
}

/// Recently submitted custom thresholds, oldest first.
///
/// Bounded to [`CUSTOM_THRESHOLD_CAPACITY`] entries with no duplicates.
/// Submitting a value that is already present leaves the order unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomThresholds(Vec<String>);

impl CustomThresholds {
    pub fn push(&mut self, secs: u32) {
        let value = secs.to_string();
        if !self.0.contains(&value) {
            self.0.push(value);
        }
        while self.0.len() > CUSTOM_THRESHOLD_CAPACITY {
            self.0.remove(0);
        }
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only well-formed entries from stored data.
    fn sanitized(values: Vec<String>) -> Self {
        let mut out = CustomThresholds::default();
        for v in values {
            if let Ok(n) = parse_positive_secs(&v) {
                out.push(n);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "countdownSound")]
    pub countdown_threshold: CountdownThreshold,
    #[serde(rename = "customCountdownValues")]
    pub custom_thresholds: CustomThresholds,
    #[serde(rename = "timerSound")]
    pub alarm_sound_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            countdown_threshold: CountdownThreshold::Off,
            custom_thresholds: CustomThresholds::default(),
            alarm_sound_id: DEFAULT_SOUND_ID.to_string(),
        }
    }
}

/// Unvalidated stored form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    countdown_sound: Option<String>,
    custom_countdown_values: Option<Vec<String>>,
    timer_sound: Option<String>,
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Settings::from_raw(RawSettings::deserialize(deserializer)?))
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Self {
        let defaults = Settings::default();
        Self {
            countdown_threshold: raw
                .countdown_sound
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.countdown_threshold),
            custom_thresholds: raw
                .custom_countdown_values
                .map(CustomThresholds::sanitized)
                .unwrap_or(defaults.custom_thresholds),
            alarm_sound_id: raw
                .timer_sound
                .filter(|id| is_valid_sound(id))
                .unwrap_or(defaults.alarm_sound_id),
        }
    }

    /// Accept a user-entered custom threshold: it becomes the active
    /// threshold and joins the recent-values history.
    pub fn submit_custom_threshold(&mut self, input: &str) -> Result<u32, ValidationError> {
        let secs = parse_positive_secs(input)?;
        self.countdown_threshold = CountdownThreshold::Seconds(secs);
        self.custom_thresholds.push(secs);
        Ok(secs)
    }

    pub fn set_alarm_sound(&mut self, id: &str) -> Result<(), ValidationError> {
        if !is_valid_sound(id) {
            return Err(ValidationError::InvalidValue {
                field: "timerSound".into(),
                message: format!("unknown sound '{id}'"),
            });
        }
        self.alarm_sound_id = id.to_string();
        Ok(())
    }

    /// Threshold choices in menu order: `off`, the numeric options sorted
    /// ascending without duplicates, then `custom`.
    pub fn threshold_options(&self) -> Vec<String> {
        let mut numeric: Vec<u32> = BUILTIN_THRESHOLDS
            .iter()
            .copied()
            .chain(
                self.custom_thresholds
                    .values()
                    .iter()
                    .filter_map(|v| v.parse().ok()),
            )
            .collect();
        numeric.sort_unstable();
        numeric.dedup();

        std::iter::once("off".to_string())
            .chain(numeric.into_iter().map(|n| n.to_string()))
            .chain(std::iter::once("custom".to_string()))
            .collect()
    }
}
