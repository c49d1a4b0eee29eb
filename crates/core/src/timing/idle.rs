//! Idle detection and resolution

use chrono::Duration;
use idletally_domain::{IdleTallyError, IdleWindow, Result};
use tracing::{debug, info};

use super::machine::{StartedSegment, TimingStateMachine};
use super::store::ActivityStore;
use crate::ports::{ActivityFeed, ActivityRepository, Clock};

/// Tracks the current idle window of the open segment
#[derive(Debug)]
pub struct IdleReconciliation {
    threshold: Duration,
    window: Option<IdleWindow>,
}

impl IdleReconciliation {
    pub const fn new(threshold: Duration) -> Self {
        Self { threshold, window: None }
    }

    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: Duration) {
        self.threshold = threshold;
    }

    pub const fn window(&self) -> Option<IdleWindow> {
        self.window
    }

    pub const fn is_resolution_enabled(&self) -> bool {
        self.window.is_some()
    }

    pub fn clear(&mut self) -> Option<IdleWindow> {
        self.window.take()
    }

    /// Recompute the idle window from the latest feed and clock readings
    ///
    /// Does not read the feed while nothing is running. A missing reading
    /// leaves any existing window in place.
    pub fn check(
        &mut self,
        machine: &TimingStateMachine,
        feed: &dyn ActivityFeed,
        clock: &dyn Clock,
    ) -> bool {
        if !machine.is_running() {
            self.window = None;
            return false;
        }
        let Some(signal) = feed.latest_activity_signal() else {
            debug!("No activity signal pending");
            return false;
        };
        let now = clock.now();
        let gap = now - signal;
        if gap >= self.threshold {
            self.window = Some(IdleWindow::new(signal, now));
            debug!(gap_secs = gap.num_seconds(), signal = %signal, "User is idle");
            true
        } else {
            self.window = None;
            debug!(gap_secs = gap.num_seconds(), "User is active");
            false
        }
    }

    /// Count the idle window as active time and keep timing
    pub fn include(
        &mut self,
        machine: &TimingStateMachine,
        store: &mut ActivityStore,
    ) -> Result<StartedSegment> {
        let window = self.require_window()?;
        let started = require_started(machine)?;
        let segment = store.segment_mut(started.activity, started.segment).ok_or_else(|| {
            IdleTallyError::Internal(format!("started segment {:?} is not in the store", started.segment))
        })?;
        segment.end_time = window.now;
        self.window = None;
        info!(
            activity = ?started.activity,
            idle_secs = window.idle_duration().num_seconds(),
            "Idle time included"
        );
        Ok(started)
    }

    /// Truncate the open segment where idling began and stop timing
    pub fn exclude(
        &mut self,
        machine: &mut TimingStateMachine,
        store: &mut ActivityStore,
        repository: &dyn ActivityRepository,
    ) -> Result<StartedSegment> {
        let window = self.require_window()?;
        let started = require_started(machine)?;
        let start_time = store
            .segment(started.activity, started.segment)
            .map(|stored| stored.segment.start_time)
            .ok_or_else(|| {
                IdleTallyError::Internal(format!(
                    "started segment {:?} is not in the store",
                    started.segment
                ))
            })?;
        let end = window.signal.max(start_time);

        machine.stop_with_persist(store, repository, end)?;
        self.window = None;
        info!(
            activity = ?started.activity,
            idle_secs = window.idle_duration().num_seconds(),
            "Idle time excluded"
        );
        Ok(started)
    }

    fn require_window(&self) -> Result<IdleWindow> {
        self.window.ok_or_else(|| {
            IdleTallyError::InvalidOperation("there is no idle time to resolve".to_string())
        })
    }
}

fn require_started(machine: &TimingStateMachine) -> Result<StartedSegment> {
    machine.started().ok_or_else(|| {
        IdleTallyError::Internal("idle window exists while timing is not running".to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};
    use idletally_common::time::MockClock;
    use idletally_domain::Activity;

    use super::*;

    struct FixedFeed(Mutex<Vec<DateTime<Utc>>>);

    impl FixedFeed {
        fn repeating(signal: DateTime<Utc>) -> Self {
            Self(Mutex::new(vec![signal; 8]))
        }

        fn empty() -> Self {
            Self(Mutex::new(Vec::new()))
        }

        fn reads(&self) -> usize {
            8 - self.0.lock().unwrap().len()
        }
    }

    impl ActivityFeed for FixedFeed {
        fn latest_activity_signal(&self) -> Option<DateTime<Utc>> {
            self.0.lock().unwrap().pop()
        }
    }

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 1, hour, min, sec).unwrap()
    }

    fn running(start: DateTime<Utc>) -> (ActivityStore, TimingStateMachine) {
        let mut store = ActivityStore::new();
        store.push_activity(Activity::new("Focus"));
        store.set_selected_activity_index(0);
        let mut machine = TimingStateMachine::new();
        machine.start(&mut store, start).unwrap();
        (store, machine)
    }

    #[test]
    fn test_check_detects_gap_at_threshold() {
        let (_store, machine) = running(at(9, 0, 0));
        let feed = FixedFeed::repeating(at(10, 0, 0));
        let clock = MockClock::at(at(10, 15, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(15));

        assert!(idle.check(&machine, &feed, &clock));
        assert_eq!(idle.window(), Some(IdleWindow::new(at(10, 0, 0), at(10, 15, 0))));
        assert!(idle.is_resolution_enabled());
    }

    #[test]
    fn test_check_below_threshold_clears_window() {
        let (_store, machine) = running(at(9, 0, 0));
        let feed = FixedFeed::repeating(at(10, 0, 0));
        let clock = MockClock::at(at(10, 15, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(5));
        assert!(idle.check(&machine, &feed, &clock));

        clock.set(at(10, 0, 1));
        assert!(!idle.check(&machine, &feed, &clock));
        assert_eq!(idle.window(), None);
    }

    #[test]
    fn test_check_without_signal_keeps_window() {
        let (_store, machine) = running(at(9, 0, 0));
        let clock = MockClock::at(at(10, 15, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(5));
        idle.check(&machine, &FixedFeed::repeating(at(10, 0, 0)), &clock);

        assert!(!idle.check(&machine, &FixedFeed::empty(), &clock));
        assert!(idle.window().is_some());
    }

    #[test]
    fn test_check_while_idle_skips_feed() {
        let machine = TimingStateMachine::new();
        let feed = FixedFeed::repeating(at(10, 0, 0));
        let clock = MockClock::at(at(10, 15, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(5));

        assert!(!idle.check(&machine, &feed, &clock));
        assert_eq!(feed.reads(), 0);
    }

    #[test]
    fn test_include_moves_end_and_keeps_running() {
        let (mut store, machine) = running(at(9, 0, 0));
        let clock = MockClock::at(at(10, 15, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(5));
        idle.check(&machine, &FixedFeed::repeating(at(10, 0, 0)), &clock);

        let started = idle.include(&machine, &mut store).unwrap();

        assert!(machine.is_running());
        assert_eq!(idle.window(), None);
        let segment = &store.segment(started.activity, started.segment).unwrap().segment;
        assert!(segment.is_open);
        assert_eq!(segment.end_time, at(10, 15, 0));
    }

    #[test]
    fn test_resolution_without_window_is_rejected() {
        let (mut store, machine) = running(at(9, 0, 0));
        let mut idle = IdleReconciliation::new(Duration::minutes(5));

        let err = idle.include(&machine, &mut store).unwrap_err();

        assert!(matches!(err, IdleTallyError::InvalidOperation(_)));
        assert!(machine.is_running());
    }
}
