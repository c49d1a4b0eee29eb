//! Shared test helpers for `idletally-core` integration tests.
//!
//! These helpers provide lightweight doubles for every port so session tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod feed;
pub mod format;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use idletally_common::time::MockClock;
use idletally_core::TimerSession;

pub use feed::StubFeed;
pub use format::IsoFormat;
pub use repositories::MockActivityRepository;

/// Instant on 1 March 2017, the day every scenario runs on
pub fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 3, 1, hour, min, sec).unwrap()
}

/// A session wired to doubles the test keeps handles to
pub struct Harness {
    pub session: TimerSession,
    pub repository: MockActivityRepository,
    pub feed: StubFeed,
    pub clock: Arc<MockClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repository(MockActivityRepository::new())
    }

    pub fn with_repository(repository: MockActivityRepository) -> Self {
        let feed = StubFeed::new();
        let clock = Arc::new(MockClock::at(at(9, 0, 0)));
        let session = TimerSession::new(
            Arc::new(repository.clone()),
            Arc::new(feed.clone()),
            Arc::new(IsoFormat),
            clock.clone(),
        )
        .with_idle_threshold(chrono::Duration::minutes(5));
        Self { session, repository, feed, clock }
    }
}
