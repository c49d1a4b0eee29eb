//! Application constants
//!
//! Centralized location for domain-level constants.

// Start/stop button labels
pub const START_TEXT: &str = "Start";
pub const STOP_TEXT: &str = "Stop";

// Field validation messages
pub const INVALID_START_TIME_MESSAGE: &str = "Please enter a valid start date and time.";
pub const INVALID_END_TIME_MESSAGE: &str = "Please enter a valid end date and time.";
pub const VALIDATION_MESSAGE_SEPARATOR: &str = "\n";

// Activity feed
pub const ACTIVITY_SIGNAL_TOPIC: &str = "activity-signal";

// Configuration defaults
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_IDLE_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_TIME_ZONE: &str = "UTC";
pub const DEFAULT_DATETIME_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;
/// Upper bound for `display.lookback_days` (about a century)
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;
pub const DEFAULT_DB_PATH: &str = "idletally.db";
pub const DEFAULT_LOG_FILTER: &str = "info";
