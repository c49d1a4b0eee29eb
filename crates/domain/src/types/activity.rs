//! Activities and their time segments

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session-local handle of an in-memory activity
///
/// Stable for the lifetime of a session regardless of position or
/// persistence id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityKey(pub u64);

/// Session-local handle of an in-memory time segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey(pub u64);

/// A contiguous interval of time attributed to an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSegment {
    /// Assigned on persistence
    pub id: Option<i64>,
    pub activity_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// While open, consumers treat the end as tracking now
    pub is_open: bool,
}

impl TimeSegment {
    /// Closed segment covering `[start, end]`
    pub const fn closed(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self { id: None, activity_id: None, start_time, end_time, is_open: false }
    }

    /// Open segment starting and ending at `now`
    pub const fn open_at(now: DateTime<Utc>) -> Self {
        Self { id: None, activity_id: None, start_time: now, end_time: now, is_open: true }
    }

    /// Effective end: `now` while open, the frozen end otherwise
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.is_open {
            now.max(self.end_time)
        } else {
            self.end_time
        }
    }

    /// Effective duration, never negative
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = self.effective_end(now) - self.start_time;
        elapsed.max(Duration::zero())
    }

    /// Freeze the end at `end_time`
    pub fn close_at(&mut self, end_time: DateTime<Utc>) {
        self.end_time = end_time;
        self.is_open = false;
    }
}

/// A named, user-defined category of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Activity {
    pub id: Option<i64>,
    /// May be empty
    pub name: String,
    /// Creation order, not necessarily chronological
    pub time_segments: Vec<TimeSegment>,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into(), time_segments: Vec::new() }
    }

    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Sum of all segment durations, open segments counted up to `now`
    pub fn total_elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.time_segments.iter().fold(Duration::zero(), |acc, segment| acc + segment.elapsed(now))
    }

    /// Number of segments still flagged open
    pub fn open_segment_count(&self) -> usize {
        self.time_segments.iter().filter(|segment| segment.is_open).count()
    }
}
