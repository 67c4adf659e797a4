//! Configuration types for the reminder scheduler.
//!
//! [`ReminderConfiguration`] mirrors the reminder columns of the user's
//! profile row and is read-only to this crate. [`AppConfig`] is the daemon's
//! own TOML file wrapping it with scheduler, registry and logging settings.

use crate::error::{ReminderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A validated 24-hour local wall-clock minute, written `HH:MM`.
///
/// Both components must be exactly two digits, so two values are equal
/// exactly when their `HH:MM` strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Build from components, rejecting out-of-range values.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ReminderError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Hour of day (0-23).
    pub fn hour(self) -> u8 {
        self.hour
    }

    /// Minute of hour (0-59).
    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl FromStr for ClockTime {
    type Err = ReminderError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ReminderError::InvalidTime(s.to_owned());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(h) || !two_digits(m) {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ReminderError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl From<chrono::NaiveTime> for ClockTime {
    fn from(time: chrono::NaiveTime) -> Self {
        use chrono::Timelike;
        // chrono keeps hour < 24 and minute < 60, leap seconds included.
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// How often the medication is taken.
///
/// Profiles store the Portuguese labels; English names are accepted too.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationFrequency {
    /// Every day.
    #[default]
    #[serde(rename = "Diariamente", alias = "daily")]
    Daily,
    /// Once a week on `application_day`.
    #[serde(rename = "Semanalmente", alias = "weekly")]
    Weekly,
    /// Every other week on `application_day`.
    #[serde(rename = "Quinzenalmente", alias = "biweekly")]
    Biweekly,
    /// Once a month on `application_day`.
    #[serde(rename = "Mensalmente", alias = "monthly")]
    Monthly,
}

/// Optional meal and check-in reminder times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealTimes {
    #[serde(alias = "breakfastTime", skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<ClockTime>,
    #[serde(alias = "lunchTime", skip_serializing_if = "Option::is_none")]
    pub lunch: Option<ClockTime>,
    #[serde(alias = "snackTime", skip_serializing_if = "Option::is_none")]
    pub snack: Option<ClockTime>,
    #[serde(alias = "dinnerTime", skip_serializing_if = "Option::is_none")]
    pub dinner: Option<ClockTime>,
    #[serde(alias = "checkinTime", skip_serializing_if = "Option::is_none")]
    pub checkin: Option<ClockTime>,
}

/// The user's reminder settings as stored on their profile.
///
/// Meal times are read either from a nested `meal_times`/`mealTimes` table or
/// from flat `breakfastTime`-style keys next to `enabled`. Nested values win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReminderConfiguration")]
pub struct ReminderConfiguration {
    /// Master switch. When false the scheduler stays idle.
    pub enabled: bool,
    /// Time of day the medication reminder fires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_time: Option<ClockTime>,
    /// Medication cadence.
    pub application_frequency: ApplicationFrequency,
    /// Target weekday name for non-daily cadences (e.g. `"segunda-feira"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_day: Option<String>,
    /// Hours between hydration reminders; 0 disables them.
    pub hydration_interval_hours: u32,
    /// Meal and check-in times.
    pub meal_times: MealTimes,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawReminderConfiguration {
    enabled: bool,
    #[serde(alias = "medicationTime")]
    medication_time: Option<ClockTime>,
    #[serde(alias = "applicationFrequency")]
    application_frequency: ApplicationFrequency,
    #[serde(alias = "applicationDay")]
    application_day: Option<String>,
    #[serde(alias = "hydrationIntervalHours")]
    hydration_interval_hours: u32,
    #[serde(alias = "mealTimes")]
    meal_times: MealTimes,
    #[serde(alias = "breakfastTime")]
    breakfast_time: Option<ClockTime>,
    #[serde(alias = "lunchTime")]
    lunch_time: Option<ClockTime>,
    #[serde(alias = "snackTime")]
    snack_time: Option<ClockTime>,
    #[serde(alias = "dinnerTime")]
    dinner_time: Option<ClockTime>,
    #[serde(alias = "checkinTime")]
    checkin_time: Option<ClockTime>,
}

impl From<RawReminderConfiguration> for ReminderConfiguration {
    fn from(raw: RawReminderConfiguration) -> Self {
        let nested = raw.meal_times;
        Self {
            enabled: raw.enabled,
            medication_time: raw.medication_time,
            application_frequency: raw.application_frequency,
            application_day: raw.application_day,
            hydration_interval_hours: raw.hydration_interval_hours,
            meal_times: MealTimes {
                breakfast: nested.breakfast.or(raw.breakfast_time),
                lunch: nested.lunch.or(raw.lunch_time),
                snack: nested.snack.or(raw.snack_time),
                dinner: nested.dinner.or(raw.dinner_time),
                checkin: nested.checkin.or(raw.checkin_time),
            },
        }
    }
}

/// Scheduler loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between clock samples. Must stay below 60 so no minute is missed.
    pub tick_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_secs: 30 }
    }
}

/// Remote token registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the BaaS project (e.g. `https://xyz.supabase.co`).
    /// Empty keeps tokens in memory only.
    pub base_url: String,
    /// API key sent as `apikey` and bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset.
    pub api_key_env: String,
    /// Table holding push tokens.
    pub table: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            api_key_env: "FITMIND_REGISTRY_KEY".to_owned(),
            table: "push_tokens".to_owned(),
            timeout_secs: 10,
        }
    }
}

impl RegistryConfig {
    /// Resolve the API key from the config value or the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
    }
}

/// Log output settings for the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files. `None` logs to stderr only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            filter: "fitmind_reminders=info".to_owned(),
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Profile identity used as `owner_id` in the token registry.
    pub owner_id: String,
    /// The reminder settings to schedule.
    pub reminders: ReminderConfiguration,
    /// Loop timing.
    pub scheduler: SchedulerConfig,
    /// Token registry endpoint.
    pub registry: RegistryConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ReminderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ReminderError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/fitmind/reminders.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("fitmind").join("reminders.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("fitmind")
                .join("reminders.toml")
        } else {
            PathBuf::from("/tmp/fitmind-config/reminders.toml")
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.tick_secs == 0 || self.scheduler.tick_secs >= 60 {
            return Err(ReminderError::Config(format!(
                "scheduler.tick_secs must be between 1 and 59, got {}",
                self.scheduler.tick_secs
            )));
        }
        Ok(())
    }
}
