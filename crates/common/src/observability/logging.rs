//! Tracing subscriber initialisation
//!
//! Library crates only emit `tracing` events; binaries call
//! [`init_tracing`] once at startup to install a formatter.

use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Pick the format from a `json` flag
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// The filter directive string could not be parsed
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Directive that failed to parse
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Build the filter: `RUST_LOG` wins over the configured default directive
pub fn build_filter(default_directive: &str) -> Result<EnvFilter, ObservabilityError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(default_directive).map_err(|err| ObservabilityError::InvalidFilter {
        directive: default_directive.to_string(),
        reason: err.to_string(),
    })
}

/// Formatting subscriber writing to `writer`
fn build_subscriber<W>(
    filter: EnvFilter,
    format: LogFormat,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(writer);
    match format {
        LogFormat::Pretty => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}

/// Install the global tracing subscriber on stderr
///
/// stdout is left to the binary's own output.
///
/// # Errors
/// Returns [`ObservabilityError`] if the directive is invalid or a subscriber
/// is already installed.
pub fn init_tracing(default_directive: &str, format: LogFormat) -> Result<(), ObservabilityError> {
    let filter = build_filter(default_directive)?;
    let subscriber = build_subscriber(filter, format, std::io::stderr);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| ObservabilityError::AlreadyInitialised(err.to_string()))
}
