//! Mock repository implementation for testing
//!
//! Keeps committed activities in memory, stages writes until
//! `save_changes`, counts calls and can be told to fail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use idletally_core::ActivityRepository;
use idletally_domain::{Activity, IdleTallyError, Result as DomainResult, TimeSegment};
use parking_lot::Mutex;

#[derive(Default)]
struct State {
    committed: Vec<Activity>,
    staged: Vec<Activity>,
    staged_deletes: Vec<i64>,
    staged_segment_deletes: Vec<i64>,
    next_id: i64,
    save_activity_calls: usize,
    save_changes_calls: usize,
    delete_calls: usize,
    fail_save: bool,
    fail_commit: bool,
}

/// In-memory mock for `ActivityRepository`.
#[derive(Default, Clone)]
pub struct MockActivityRepository {
    state: Arc<Mutex<State>>,
}

impl MockActivityRepository {
    pub fn new() -> Self {
        let repository = Self::default();
        repository.state.lock().next_id = 1;
        repository
    }

    /// Seed committed activities, assigning ids where missing.
    pub fn with_activities(self, activities: Vec<Activity>) -> Self {
        {
            let mut state = self.state.lock();
            for mut activity in activities {
                assign_ids(&mut state.next_id, &mut activity);
                state.committed.push(activity);
            }
        }
        self
    }

    pub fn fail_saves(&self, fail: bool) {
        self.state.lock().fail_save = fail;
    }

    pub fn fail_commits(&self, fail: bool) {
        self.state.lock().fail_commit = fail;
    }

    pub fn save_activity_calls(&self) -> usize {
        self.state.lock().save_activity_calls
    }

    pub fn save_changes_calls(&self) -> usize {
        self.state.lock().save_changes_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().delete_calls
    }

    pub fn committed(&self) -> Vec<Activity> {
        self.state.lock().committed.clone()
    }

    /// Replace a committed activity wholesale, bypassing staging.
    pub fn overwrite(&self, activity: Activity) {
        let mut state = self.state.lock();
        if let Some(existing) = state.committed.iter_mut().find(|a| a.id == activity.id) {
            *existing = activity;
        }
    }
}

fn assign_ids(next_id: &mut i64, activity: &mut Activity) {
    let id = *activity.id.get_or_insert_with(|| {
        let id = *next_id;
        *next_id += 1;
        id
    });
    for segment in &mut activity.time_segments {
        segment.activity_id = Some(id);
        segment.id.get_or_insert_with(|| {
            let id = *next_id;
            *next_id += 1;
            id
        });
    }
}

impl ActivityRepository for MockActivityRepository {
    fn load_activities(&self) -> DomainResult<Vec<Activity>> {
        Ok(self.state.lock().committed.clone())
    }

    fn load_time_segments(
        &self,
        activity_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<TimeSegment>> {
        let state = self.state.lock();
        Ok(state
            .committed
            .iter()
            .filter(|activity| activity.id == Some(activity_id))
            .flat_map(|activity| activity.time_segments.iter())
            .filter(|segment| segment.end_time >= from && segment.start_time <= to)
            .cloned()
            .collect())
    }

    fn save_activity(&self, activity: &mut Activity) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.save_activity_calls += 1;
        if state.fail_save {
            return Err(IdleTallyError::Persistence("save rejected".into()));
        }
        assign_ids(&mut state.next_id, activity);
        state.staged.push(activity.clone());
        Ok(())
    }

    fn delete_activity(&self, activity: &Activity) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.delete_calls += 1;
        let id = activity.id.ok_or_else(|| IdleTallyError::NotFound("unsaved activity".into()))?;
        state.staged_deletes.push(id);
        Ok(())
    }

    fn delete_time_segment(&self, segment: &TimeSegment) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.delete_calls += 1;
        let id = segment.id.ok_or_else(|| IdleTallyError::NotFound("unsaved segment".into()))?;
        state.staged_segment_deletes.push(id);
        Ok(())
    }

    fn save_changes(&self) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.save_changes_calls += 1;
        if state.fail_commit {
            state.staged.clear();
            state.staged_deletes.clear();
            state.staged_segment_deletes.clear();
            return Err(IdleTallyError::Persistence("commit rejected".into()));
        }
        let staged = std::mem::take(&mut state.staged);
        for activity in staged {
            match state.committed.iter_mut().find(|a| a.id == activity.id) {
                Some(existing) => *existing = activity,
                None => state.committed.push(activity),
            }
        }
        let deletes = std::mem::take(&mut state.staged_deletes);
        state.committed.retain(|a| a.id.map_or(true, |id| !deletes.contains(&id)));
        let segment_deletes = std::mem::take(&mut state.staged_segment_deletes);
        for activity in &mut state.committed {
            activity
                .time_segments
                .retain(|s| s.id.map_or(true, |id| !segment_deletes.contains(&id)));
        }
        Ok(())
    }
}
