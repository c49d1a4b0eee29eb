//! Configuration management

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DATETIME_FORMAT, DEFAULT_DB_PATH, DEFAULT_IDLE_POLL_INTERVAL_SECS,
    DEFAULT_IDLE_THRESHOLD_SECS, DEFAULT_LOG_FILTER, DEFAULT_LOOKBACK_DAYS, DEFAULT_TIME_ZONE,
    MAX_LOOKBACK_DAYS,
};
use crate::errors::{IdleTallyError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Timer and idle detection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Minimum gap between the last user input and now that counts as idle
    pub idle_threshold_seconds: u64,
    /// How often the driver polls `check_idle_time`
    pub idle_poll_interval_seconds: u64,
}

/// Date-time rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// IANA zone name used for rendering and parsing
    pub time_zone: String,
    /// chrono strftime pattern for rendering
    pub datetime_format: String,
    /// How far back `load_time_segments` reaches
    pub lookback_days: u32,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, `RUST_LOG` takes precedence
    pub filter: String,
    pub json: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            idle_threshold_seconds: DEFAULT_IDLE_THRESHOLD_SECS,
            idle_poll_interval_seconds: DEFAULT_IDLE_POLL_INTERVAL_SECS,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

impl TimingConfig {
    /// Idle threshold as a chrono duration
    pub fn idle_threshold(&self) -> Duration {
        Duration::seconds(i64::try_from(self.idle_threshold_seconds).unwrap_or(i64::MAX))
    }

    pub fn idle_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.idle_poll_interval_seconds)
    }
}

impl DisplayConfig {
    pub fn lookback(&self) -> Duration {
        Duration::days(i64::from(self.lookback_days))
    }
}

impl Config {
    /// Reject values the session cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.timing.idle_threshold_seconds == 0 {
            return Err(IdleTallyError::Config(
                "timing.idle_threshold_seconds must be greater than zero".to_string(),
            ));
        }
        // Bounded so the threshold always fits a chrono duration
        if self.timing.idle_threshold_seconds > u64::from(u32::MAX) {
            return Err(IdleTallyError::Config(format!(
                "timing.idle_threshold_seconds is too large: {}",
                self.timing.idle_threshold_seconds
            )));
        }
        if self.timing.idle_poll_interval_seconds == 0 {
            return Err(IdleTallyError::Config(
                "timing.idle_poll_interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.display.datetime_format.trim().is_empty() {
            return Err(IdleTallyError::Config(
                "display.datetime_format must not be empty".to_string(),
            ));
        }
        if self.display.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(IdleTallyError::Config(format!(
                "display.lookback_days must be at most {MAX_LOOKBACK_DAYS}, got {}",
                self.display.lookback_days
            )));
        }
        if self.display.time_zone.trim().is_empty() {
            return Err(IdleTallyError::Config("display.time_zone must not be empty".to_string()));
        }
        if self.storage.path.trim().is_empty() {
            return Err(IdleTallyError::Config("storage.path must not be empty".to_string()));
        }
        Ok(())
    }
}
