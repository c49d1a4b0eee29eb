//! Timing state machine
//!
//! Owns the single "started" reference. Every transition that opens or
//! closes a segment goes through here so at most one segment is ever open.

use chrono::{DateTime, Utc};
use idletally_domain::constants::{START_TEXT, STOP_TEXT};
use idletally_domain::{
    ActivityKey, IdleTallyError, Result, SegmentKey, TimeSegment, TimingState,
};
use tracing::info;

use super::store::ActivityStore;
use crate::ports::ActivityRepository;

/// The open segment and the activity that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StartedSegment {
    pub activity: ActivityKey,
    pub segment: SegmentKey,
}

/// `Idle` when nothing is started, `Running` with exactly one open segment
#[derive(Debug, Default)]
pub struct TimingStateMachine {
    started: Option<StartedSegment>,
}

impl TimingStateMachine {
    pub const fn new() -> Self {
        Self { started: None }
    }

    pub const fn state(&self) -> TimingState {
        match self.started {
            Some(_) => TimingState::Running,
            None => TimingState::Idle,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub const fn started(&self) -> Option<StartedSegment> {
        self.started
    }

    pub const fn start_stop_text(&self) -> &'static str {
        match self.started {
            Some(_) => STOP_TEXT,
            None => START_TEXT,
        }
    }

    pub fn owns_activity(&self, activity: ActivityKey) -> bool {
        self.started.is_some_and(|started| started.activity == activity)
    }

    pub fn is_started_segment(&self, activity: ActivityKey, segment: SegmentKey) -> bool {
        self.started == Some(StartedSegment { activity, segment })
    }

    /// Open a segment at `now` on the selected activity
    pub fn start(&mut self, store: &mut ActivityStore, now: DateTime<Utc>) -> Result<StartedSegment> {
        if self.started.is_some() {
            return Err(IdleTallyError::InvalidOperation("timing is already running".to_string()));
        }
        let selected = store.selected_activity().ok_or_else(|| {
            IdleTallyError::InvalidOperation("select an activity before starting timing".to_string())
        })?;
        let activity = selected.key;

        let mut segment = TimeSegment::open_at(now);
        segment.activity_id = selected.id;
        let (segment, _) = store.push_segment(activity, segment).ok_or_else(|| {
            IdleTallyError::Internal(format!("selected activity {activity:?} vanished"))
        })?;

        let started = StartedSegment { activity, segment };
        self.started = Some(started);
        info!(activity = ?activity, segment = ?segment, start = %now, "Timing started");
        Ok(started)
    }

    /// Close the open segment at `end` and persist its activity
    ///
    /// The repository sees a prepared copy first; the store and the started
    /// reference change only once `save_activity` and a single
    /// `save_changes` have both succeeded.
    pub fn stop_with_persist(
        &mut self,
        store: &mut ActivityStore,
        repository: &dyn ActivityRepository,
        end: DateTime<Utc>,
    ) -> Result<StartedSegment> {
        let started = self
            .started
            .ok_or_else(|| IdleTallyError::InvalidOperation("timing is not running".to_string()))?;
        let owner = store.activity(started.activity).ok_or_else(|| {
            IdleTallyError::Internal(format!("started activity {:?} is not in the store", started.activity))
        })?;
        let position = owner.segment_position(started.segment).ok_or_else(|| {
            IdleTallyError::Internal(format!("started segment {:?} is not in the store", started.segment))
        })?;

        let mut prepared = owner.to_activity();
        if let Some(segment) = prepared.time_segments.get_mut(position) {
            segment.close_at(end);
        }

        repository.save_activity(&mut prepared)?;
        repository.save_changes()?;

        if let Some(owner) = store.activity_mut(started.activity) {
            owner.apply_saved(prepared);
        }
        self.started = None;
        info!(activity = ?started.activity, segment = ?started.segment, end = %end, "Timing stopped");
        Ok(started)
    }

    /// Drop the started reference without touching any timestamp
    pub fn abort(&mut self) -> Option<StartedSegment> {
        let aborted = self.started.take();
        if let Some(started) = aborted {
            info!(activity = ?started.activity, segment = ?started.segment, "Timing aborted");
        }
        aborted
    }
}
