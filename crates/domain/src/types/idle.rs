//! Idle window detected during an open segment

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The pair `(signal, now)` captured by the most recent idle check
///
/// Ephemeral: never persisted and recomputed on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleWindow {
    /// Last observed user input
    pub signal: DateTime<Utc>,
    /// Clock reading at detection
    pub now: DateTime<Utc>,
}

impl IdleWindow {
    pub const fn new(signal: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self { signal, now }
    }

    pub fn idle_duration(&self) -> Duration {
        self.now - self.signal
    }
}
