//! Shared fixtures for infrastructure integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use idletally_domain::{Activity, TimeSegment};
use idletally_infra::database::{DbManager, SqliteActivityRepository};
use tempfile::TempDir;

/// Instant on 2017-03-01 in UTC.
pub fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2017, 3, 1, hour, minute, second).unwrap()
}

/// Temporary database file that lives as long as the fixture.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    pub repository: SqliteActivityRepository,
    temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = Arc::new(
            DbManager::open(temp_dir.path().join("idletally.db"))
                .expect("database should open"),
        );
        let repository = SqliteActivityRepository::new(Arc::clone(&manager));
        Self { manager, repository, temp_dir }
    }

    /// A second, independent connection to the same file.
    pub fn reopen(&self) -> SqliteActivityRepository {
        let manager = DbManager::open(self.temp_dir.path().join("idletally.db"))
            .expect("database should reopen");
        SqliteActivityRepository::new(Arc::new(manager))
    }
}

/// Activity with closed segments over the given hour ranges.
pub fn activity_with_hours(name: &str, hours: &[(u32, u32)]) -> Activity {
    let mut activity = Activity::new(name);
    for &(start, end) in hours {
        activity.time_segments.push(TimeSegment::closed(at(start, 0, 0), at(end, 0, 0)));
    }
    activity
}
