//! User configuration: phase durations and alert preferences.
//!
//! Stored as a flat JSON record under the `tab-settings` key. Durations are in
//! whole minutes at this boundary; the engine works in seconds.
//!
//! Loading is lenient field by field. A missing, zero, non-numeric or wrongly
//! typed field falls back to its default without invalidating the others,
//! and every duration is clamped into its domain before use or persistence.
//!
//! The working-day bounds (`workStart`, `workEnd`) are optional `HH:MM` times.
//! The timer never reads them; they are kept so a stored record survives a
//! load/save round trip.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

use crate::error::{CoreError, Result};

pub const FOCUS_MINUTES_RANGE: RangeInclusive<u32> = 1..=120;
pub const BREAK_MINUTES_RANGE: RangeInclusive<u32> = 1..=30;

const SECS_PER_MINUTE: u64 = 60;

/// Application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Focus phase length in minutes, 1..=120.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    /// Break phase length in minutes, 1..=30.
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Start of the working day.
    #[serde(default, with = "clock_time")]
    pub work_start: Option<NaiveTime>,
    /// End of the working day.
    #[serde(default, with = "clock_time")]
    pub work_end: Option<NaiveTime>,
}

fn default_focus_duration() -> u32 {
    25
}
fn default_break_duration() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            break_duration: default_break_duration(),
            sound_enabled: true,
            notifications_enabled: true,
            work_start: None,
            work_end: None,
        }
    }
}

impl Config {
    /// Configuration keys accepted by [`Config::get`] and [`Config::set`].
    pub const KEYS: [&'static str; 6] = [
        "focusDuration",
        "breakDuration",
        "soundEnabled",
        "notificationsEnabled",
        "workStart",
        "workEnd",
    ];

    /// Copy of `self` with every duration clamped into its domain.
    pub fn clamped(self) -> Self {
        Self {
            focus_duration: clamp_u32(self.focus_duration, &FOCUS_MINUTES_RANGE),
            break_duration: clamp_u32(self.break_duration, &BREAK_MINUTES_RANGE),
            ..self
        }
    }

    pub fn focus_secs(&self) -> u64 {
        u64::from(self.focus_duration) * SECS_PER_MINUTE
    }

    pub fn break_secs(&self) -> u64 {
        u64::from(self.break_duration) * SECS_PER_MINUTE
    }

    /// Build a configuration from an arbitrary JSON value, falling back to
    /// defaults field by field.
    pub fn from_json_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(obj) = value.as_object() else {
            return defaults;
        };
        Self {
            focus_duration: minutes_field(
                obj.get("focusDuration"),
                defaults.focus_duration,
                &FOCUS_MINUTES_RANGE,
            ),
            break_duration: minutes_field(
                obj.get("breakDuration"),
                defaults.break_duration,
                &BREAK_MINUTES_RANGE,
            ),
            sound_enabled: bool_field(obj.get("soundEnabled"), defaults.sound_enabled),
            notifications_enabled: bool_field(
                obj.get("notificationsEnabled"),
                defaults.notifications_enabled,
            ),
            work_start: time_field(obj.get("workStart")),
            work_end: time_field(obj.get("workEnd")),
        }
    }

    /// Parse a stored record. Malformed JSON yields the defaults.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_json_value(&value),
            Err(e) => {
                tracing::warn!("stored settings are not valid JSON, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Get a config value as string by key. Unset times read as `unset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "focusDuration" => self.focus_duration.to_string(),
            "breakDuration" => self.break_duration.to_string(),
            "soundEnabled" => self.sound_enabled.to_string(),
            "notificationsEnabled" => self.notifications_enabled.to_string(),
            "workStart" => format_time(self.work_start),
            "workEnd" => format_time(self.work_end),
            _ => return Err(CoreError::UnknownConfigKey(key.to_string())),
        };
        Ok(value)
    }

    /// Set a config value by key.
    ///
    /// Durations are never rejected: an unparseable value falls back to the
    /// field default and anything else is clamped into range. Times accept
    /// `HH:MM`; an empty value or `unset` clears them.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, or if a flag or time cannot be
    /// parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |message: &str| CoreError::InvalidConfigValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "focusDuration" => {
                self.focus_duration = match parse_minutes(value) {
                    Some(minutes) => clamp_f64(minutes, &FOCUS_MINUTES_RANGE),
                    None => default_focus_duration(),
                };
            }
            "breakDuration" => {
                self.break_duration = match parse_minutes(value) {
                    Some(minutes) => clamp_f64(minutes, &BREAK_MINUTES_RANGE),
                    None => default_break_duration(),
                };
            }
            "soundEnabled" | "notificationsEnabled" => {
                let flag = value
                    .trim()
                    .parse::<bool>()
                    .map_err(|_| invalid(&format!("cannot parse '{value}' as bool")))?;
                if key == "soundEnabled" {
                    self.sound_enabled = flag;
                } else {
                    self.notifications_enabled = flag;
                }
            }
            "workStart" | "workEnd" => {
                let raw = value.trim();
                let time = match parse_clock_time(raw) {
                    Some(t) => Some(t),
                    None if raw.is_empty() || raw == UNSET => None,
                    None => return Err(invalid(&format!("cannot parse '{value}' as HH:MM"))),
                };
                if key == "workStart" {
                    self.work_start = time;
                } else {
                    self.work_end = time;
                }
            }
            _ => return Err(CoreError::UnknownConfigKey(key.to_string())),
        }
        Ok(())
    }

    /// Whether the completion alert should ring.
    pub fn alert_sound(&self) -> bool {
        self.sound_enabled && self.notifications_enabled
    }
}

const UNSET: &str = "unset";
const TIME_FORMAT: &str = "%H:%M";

fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn format_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => t.format(TIME_FORMAT).to_string(),
        None => UNSET.to_string(),
    }
}

/// Serde adapter storing `Option<NaiveTime>` as `"HH:MM"` or `null`.
/// Unreadable times deserialize as unset.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_str(&t.format(super::TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_clock_time))
    }
}

fn parse_minutes(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn minutes_field(value: Option<&Value>, default: u32, range: &RangeInclusive<u32>) -> u32 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_minutes(s),
        _ => None,
    };
    match raw {
        // Zero counts as unset.
        Some(v) if v.is_finite() && v != 0.0 => clamp_f64(v, range),
        _ => default,
    }
}

fn time_field(value: Option<&Value>) -> Option<NaiveTime> {
    value.and_then(Value::as_str).and_then(parse_clock_time)
}

fn bool_field(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

fn clamp_u32(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn clamp_f64(value: f64, range: &RangeInclusive<u32>) -> u32 {
    value
        .round()
        .clamp(f64::from(*range.start()), f64::from(*range.end())) as u32
}
