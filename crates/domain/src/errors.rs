//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for IdleTally
///
/// Date-time validation failures are deliberately absent: they are recovered
/// inside the session as field messages and never surface as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum IdleTallyError {
    /// The caller asked for a transition the current state does not allow
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The repository failed to load, save or delete
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed external input (feed payloads, driver commands)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record looked up by id does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdleTallyError {
    /// Stable label suitable for structured log fields
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for IdleTally operations
pub type Result<T> = std::result::Result<T, IdleTallyError>;
