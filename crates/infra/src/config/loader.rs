//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `IDLETALLY_DB_PATH` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `IDLETALLY_DB_PATH`: Database file path (required)
//! - `IDLETALLY_IDLE_THRESHOLD`: Idle threshold in seconds
//! - `IDLETALLY_IDLE_POLL_INTERVAL`: Idle poll interval in seconds
//! - `IDLETALLY_TIME_ZONE`: IANA time zone for display
//! - `IDLETALLY_DATETIME_FORMAT`: strftime pattern for display
//! - `IDLETALLY_LOOKBACK_DAYS`: Days of segments loaded per activity
//! - `IDLETALLY_LOG_FILTER`: Default tracing filter directive
//! - `IDLETALLY_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./idletally.json` or `./idletally.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use idletally_domain::{
    Config, DisplayConfig, IdleTallyError, LoggingConfig, Result, StorageConfig, TimingConfig,
};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `IdleTallyError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration only when a source exists
///
/// Returns `Ok(None)` when neither `IDLETALLY_DB_PATH` nor a config file is
/// present. A source that exists but fails to parse or validate is an error,
/// never a silent fallback.
///
/// # Errors
/// Returns `IdleTallyError::Config` if the found source is invalid.
pub fn load_if_present() -> Result<Option<Config>> {
    if std::env::var_os("IDLETALLY_DB_PATH").is_some() {
        return load_from_env().map(Some);
    }
    match find_config_paths() {
        Some(path) => load_from_file(Some(path)).map(Some),
        None => Ok(None),
    }
}

/// Load configuration from environment variables
///
/// Only `IDLETALLY_DB_PATH` is required; every other value falls back to
/// its default.
///
/// # Errors
/// Returns `IdleTallyError::Config` if the database path is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let path = env_var("IDLETALLY_DB_PATH")?;
    let idle_threshold_seconds = env_parse(
        "IDLETALLY_IDLE_THRESHOLD",
        defaults.timing.idle_threshold_seconds,
        "idle threshold",
    )?;
    let idle_poll_interval_seconds = env_parse(
        "IDLETALLY_IDLE_POLL_INTERVAL",
        defaults.timing.idle_poll_interval_seconds,
        "idle poll interval",
    )?;
    let lookback_days =
        env_parse("IDLETALLY_LOOKBACK_DAYS", defaults.display.lookback_days, "lookback days")?;

    let config = Config {
        timing: TimingConfig { idle_threshold_seconds, idle_poll_interval_seconds },
        display: DisplayConfig {
            time_zone: env_or("IDLETALLY_TIME_ZONE", defaults.display.time_zone),
            datetime_format: env_or("IDLETALLY_DATETIME_FORMAT", defaults.display.datetime_format),
            lookback_days,
        },
        storage: StorageConfig { path },
        logging: LoggingConfig {
            filter: env_or("IDLETALLY_LOG_FILTER", defaults.logging.filter),
            json: env_bool("IDLETALLY_LOG_JSON", defaults.logging.json),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `IdleTallyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(IdleTallyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_paths().ok_or_else(|| {
            IdleTallyError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| IdleTallyError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`). Sections and
/// fields that are absent take their defaults.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| IdleTallyError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| IdleTallyError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(IdleTallyError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["idletally.json", "idletally.toml", "config.json", "config.toml"];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        IdleTallyError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional string variable with a default
fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty()).unwrap_or(default)
}

/// Optional numeric variable with a default
fn env_parse<T>(key: &str, default: T, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| IdleTallyError::Config(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
