//! Scriptable activity feed

use std::sync::Arc;

use chrono::{DateTime, Utc};
use idletally_core::ActivityFeed;
use parking_lot::Mutex;

/// Feed whose reading persists until changed, with a read counter
#[derive(Default, Clone)]
pub struct StubFeed {
    signal: Arc<Mutex<Option<DateTime<Utc>>>>,
    reads: Arc<Mutex<usize>>,
}

impl StubFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, signal: DateTime<Utc>) {
        *self.signal.lock() = Some(signal);
    }

    pub fn clear(&self) {
        *self.signal.lock() = None;
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

impl ActivityFeed for StubFeed {
    fn latest_activity_signal(&self) -> Option<DateTime<Utc>> {
        *self.reads.lock() += 1;
        *self.signal.lock()
    }
}
