//! Integration tests for the clock abstraction and elapsed formatting.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use idletally_common::time::{format_elapsed, format_stopwatch, Clock, MockClock, SystemClock};

/// Components usually hold the clock as a trait object; a test keeps a
/// second handle to the same mock and moves time underneath them.
#[test]
fn shared_mock_clock_drives_trait_object() {
    let start = Utc.with_ymd_and_hms(2017, 3, 1, 10, 0, 0).unwrap();
    let handle = MockClock::at(start);
    let component_clock: Arc<dyn Clock> = Arc::new(handle.clone());

    handle.advance(Duration::minutes(15));
    let elapsed = component_clock.now() - start;

    assert_eq!(elapsed, Duration::minutes(15));
    assert_eq!(format_elapsed(elapsed), "15m 0s");
    assert_eq!(format_stopwatch(elapsed), "00:15:00");
}

#[test]
fn system_clock_tracks_real_time() {
    let before = Utc::now();
    let now = SystemClock.now();
    let after = Utc::now();

    assert!(before <= now && now <= after);
}
