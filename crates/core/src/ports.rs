//! Port interfaces for the timer session
//!
//! These traits define the boundaries between the timing logic and
//! infrastructure implementations. All ports are synchronous: the session
//! runs every operation to completion on the caller's thread.

use chrono::{DateTime, Utc};
pub use idletally_common::time::Clock;
use idletally_domain::{Activity, Result, TimeSegment};
use thiserror::Error;

/// Durable storage of activities and their segments
///
/// Writes are staged until `save_changes` commits them.
pub trait ActivityRepository: Send + Sync {
    /// Load every activity with its segments
    fn load_activities(&self) -> Result<Vec<Activity>>;

    /// Load the segments of one activity that overlap `[from, to]`
    fn load_time_segments(
        &self,
        activity_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeSegment>>;

    /// Stage an insert or update of the activity and all its segments
    ///
    /// Assigns ids to the activity and to any segment that has none.
    fn save_activity(&self, activity: &mut Activity) -> Result<()>;

    /// Stage removal of a persisted activity and its segments
    fn delete_activity(&self, activity: &Activity) -> Result<()>;

    /// Stage removal of a persisted segment
    fn delete_time_segment(&self, segment: &TimeSegment) -> Result<()>;

    /// Commit all staged writes
    fn save_changes(&self) -> Result<()>;
}

/// Source of the most recent observed user input
pub trait ActivityFeed: Send + Sync {
    /// Newest pending reading, discarding older ones; `None` when empty
    fn latest_activity_signal(&self) -> Option<DateTime<Utc>>;
}

/// Text that could not be turned into an instant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{input}' as a date and time: {reason}")]
pub struct ParseFailure {
    pub input: String,
    pub reason: String,
}

impl ParseFailure {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { input: input.into(), reason: reason.into() }
    }
}

/// Locale-aware rendering and parsing of instants
pub trait DateTimeFormat: Send + Sync {
    fn format(&self, instant: DateTime<Utc>) -> String;

    /// Total: malformed text is a `ParseFailure`, never a panic
    fn parse(&self, text: &str) -> std::result::Result<DateTime<Utc>, ParseFailure>;
}
