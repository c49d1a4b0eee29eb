//! In-memory activity repository.
//!
//! Mirrors the SQLite repository's staging semantics: writes are buffered
//! and become visible to loads only after `save_changes`. A failed commit
//! discards everything staged.

use chrono::{DateTime, Utc};
use idletally_core::ActivityRepository as ActivityRepositoryPort;
use idletally_domain::{Activity, IdleTallyError, Result as DomainResult, TimeSegment};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum StagedWrite {
    Save(Activity),
    DeleteActivity(i64),
    DeleteSegment(i64),
}

#[derive(Debug, Default)]
struct MemoryState {
    committed: Vec<Activity>,
    staged: Vec<StagedWrite>,
    last_id: i64,
    failure: Option<String>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn fail_if_requested(&mut self) -> DomainResult<()> {
        match &self.failure {
            Some(message) => {
                self.staged.clear();
                Err(IdleTallyError::Persistence(message.clone()))
            }
            None => Ok(()),
        }
    }

    fn apply(&mut self, write: StagedWrite) {
        match write {
            StagedWrite::Save(activity) => {
                match self.committed.iter_mut().find(|existing| existing.id == activity.id) {
                    Some(existing) => merge_segments(existing, activity),
                    None => self.committed.push(activity),
                }
            }
            StagedWrite::DeleteActivity(id) => {
                self.committed.retain(|activity| activity.id != Some(id));
            }
            StagedWrite::DeleteSegment(id) => {
                for activity in &mut self.committed {
                    activity.time_segments.retain(|segment| segment.id != Some(id));
                }
            }
        }
    }
}

/// Update name and upsert segments by id, leaving segments absent from
/// `saved` untouched
fn merge_segments(existing: &mut Activity, saved: Activity) {
    existing.name = saved.name;
    for segment in saved.time_segments {
        match existing.time_segments.iter_mut().find(|current| current.id == segment.id) {
            Some(current) => *current = segment,
            None => existing.time_segments.push(segment),
        }
    }
}

/// Process-local repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryActivityRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed committed activities, assigning ids where missing.
    pub fn with_activities(activities: Vec<Activity>) -> Self {
        let repository = Self::new();
        {
            let mut state = repository.state.lock();
            for mut activity in activities {
                assign_ids(&mut state, &mut activity);
                state.committed.push(activity);
            }
        }
        repository
    }

    /// Make every following write and commit fail with `message`; `None` heals.
    pub fn set_failure(&self, message: Option<&str>) {
        self.state.lock().failure = message.map(str::to_string);
    }

    /// Number of writes waiting for `save_changes`.
    pub fn pending_changes(&self) -> usize {
        self.state.lock().staged.len()
    }
}

fn assign_ids(state: &mut MemoryState, activity: &mut Activity) {
    let known = activity.time_segments.iter().filter_map(|segment| segment.id).chain(activity.id);
    state.last_id = known.fold(state.last_id, i64::max);
    let id = match activity.id {
        Some(id) => id,
        None => state.next_id(),
    };
    activity.id = Some(id);
    for segment in &mut activity.time_segments {
        segment.activity_id = Some(id);
        if segment.id.is_none() {
            segment.id = Some(state.next_id());
        }
    }
}

impl ActivityRepositoryPort for InMemoryActivityRepository {
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
        state.fail_if_requested()?;
        assign_ids(&mut state, activity);
        state.staged.push(StagedWrite::Save(activity.clone()));
        Ok(())
    }

    fn delete_activity(&self, activity: &Activity) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.fail_if_requested()?;
        let id = activity
            .id
            .ok_or_else(|| IdleTallyError::NotFound("activity has never been saved".into()))?;
        state.staged.push(StagedWrite::DeleteActivity(id));
        Ok(())
    }

    fn delete_time_segment(&self, segment: &TimeSegment) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.fail_if_requested()?;
        let id = segment
            .id
            .ok_or_else(|| IdleTallyError::NotFound("time segment has never been saved".into()))?;
        state.staged.push(StagedWrite::DeleteSegment(id));
        Ok(())
    }

    fn save_changes(&self) -> DomainResult<()> {
        let mut state = self.state.lock();
        state.fail_if_requested()?;
        let staged = std::mem::take(&mut state.staged);
        for write in staged {
            state.apply(write);
        }
        Ok(())
    }
}
