//! Timer session façade
//!
//! Every public operation mutates the store through the state machine or the
//! idle engine, then recomputes the observable snapshot and queues property
//! notifications for whatever changed. Collection events are queued at the
//! point of mutation, so they always precede the property pass.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use idletally_domain::{
    ActivityKey, CollectionChange, Config, IdleTallyError, IdleWindow, Result, SegmentKey,
    SessionEvent, TimeSegment, TimingConfig, TimingState,
};
use tracing::{debug, info, warn};

use super::flags::{DerivedFlags, ObservableSnapshot};
use super::idle::IdleReconciliation;
use super::machine::TimingStateMachine;
use super::store::{index_of, ActivityStore, StoredActivity, StoredSegment, NO_SELECTION};
use super::validation::{DateField, ValidationMessages};
use crate::ports::{ActivityFeed, ActivityRepository, Clock, DateTimeFormat};

/// One user's timing session
pub struct TimerSession {
    repository: Arc<dyn ActivityRepository>,
    feed: Arc<dyn ActivityFeed>,
    format: Arc<dyn DateTimeFormat>,
    clock: Arc<dyn Clock>,
    lookback: Duration,
    store: ActivityStore,
    machine: TimingStateMachine,
    idle: IdleReconciliation,
    validation: ValidationMessages,
    events: Vec<SessionEvent>,
    published: ObservableSnapshot,
}

impl TimerSession {
    /// Create an empty session with the default idle threshold and lookback
    pub fn new(
        repository: Arc<dyn ActivityRepository>,
        feed: Arc<dyn ActivityFeed>,
        format: Arc<dyn DateTimeFormat>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let defaults = Config::default();
        let store = ActivityStore::new();
        let machine = TimingStateMachine::new();
        let idle = IdleReconciliation::new(TimingConfig::default().idle_threshold());
        let validation = ValidationMessages::new();
        let published = ObservableSnapshot::capture(&store, &machine, &idle, &validation);
        Self {
            repository,
            feed,
            format,
            clock,
            lookback: defaults.display.lookback(),
            store,
            machine,
            idle,
            validation,
            events: Vec::new(),
            published,
        }
    }

    /// Minimum gap between last input and now that counts as idle
    pub fn with_idle_threshold(mut self, threshold: Duration) -> Self {
        self.idle.set_threshold(threshold);
        self
    }

    /// How far back `load_time_segments` reaches
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_config(self, config: &Config) -> Self {
        self.with_idle_threshold(config.timing.idle_threshold())
            .with_lookback(config.display.lookback())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn activities(&self) -> &[StoredActivity] {
        self.store.activities()
    }

    pub const fn store(&self) -> &ActivityStore {
        &self.store
    }

    pub const fn timing_state(&self) -> TimingState {
        self.machine.state()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub const fn idle_threshold(&self) -> Duration {
        self.idle.threshold()
    }

    pub const fn selected_activity_index(&self) -> i64 {
        self.store.selected_activity_index()
    }

    pub const fn selected_time_segment_index(&self) -> i64 {
        self.store.selected_time_segment_index()
    }

    pub fn selected_activity(&self) -> Option<&StoredActivity> {
        self.store.selected_activity()
    }

    pub fn selected_time_segment(&self) -> Option<&StoredSegment> {
        self.store.selected_segment()
    }

    /// Activity owning the open segment
    pub fn started_activity(&self) -> Option<&StoredActivity> {
        self.machine.started().and_then(|started| self.store.activity(started.activity))
    }

    /// The open segment
    pub fn started_time_segment(&self) -> Option<&StoredSegment> {
        self.machine
            .started()
            .and_then(|started| self.store.segment(started.activity, started.segment))
    }

    pub const fn start_stop_text(&self) -> &'static str {
        self.machine.start_stop_text()
    }

    pub const fn idle_window(&self) -> Option<IdleWindow> {
        self.idle.window()
    }

    pub fn flags(&self) -> DerivedFlags {
        self.published.flags()
    }

    pub fn is_save_enabled(&self) -> bool {
        self.flags().is_save_enabled
    }

    pub fn is_time_segment_add_enabled(&self) -> bool {
        self.flags().is_time_segment_add_enabled
    }

    pub fn is_time_segment_delete_enabled(&self) -> bool {
        self.flags().is_time_segment_delete_enabled
    }

    pub fn is_include_exclude_enabled(&self) -> bool {
        self.flags().is_include_exclude_enabled
    }

    pub fn validation_messages(&self) -> String {
        self.validation.joined()
    }

    /// Selected segment's start as display text, empty when none is selected
    pub fn selected_time_segment_start_time(&self) -> String {
        self.selected_time_segment()
            .map(|stored| self.format.format(stored.segment.start_time))
            .unwrap_or_default()
    }

    /// Selected segment's end as display text, empty when none is selected
    pub fn selected_time_segment_end_time(&self) -> String {
        self.selected_time_segment()
            .map(|stored| self.format.format(stored.segment.end_time))
            .unwrap_or_default()
    }

    /// Take all queued notifications
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn set_selected_activity_index(&mut self, index: i64) {
        self.store.set_selected_activity_index(index);
        debug!(index, selected = self.store.selected_activity().is_some(), "Activity selection changed");
        self.publish_changes();
    }

    pub fn set_selected_time_segment_index(&mut self, index: i64) {
        self.store.set_selected_time_segment_index(index);
        debug!(index, selected = self.store.selected_segment().is_some(), "Segment selection changed");
        self.publish_changes();
    }

    /// Rename the selected activity; no-op without a selection
    pub fn set_selected_activity_name(&mut self, name: impl Into<String>) {
        let Some(key) = self.store.selected_activity().map(|stored| stored.key) else {
            debug!("Rename ignored, no activity selected");
            return;
        };
        if let Some(stored) = self.store.activity_mut(key) {
            stored.name = name.into();
            self.activities_changed(CollectionChange::Replaced, Some(key));
        }
        self.publish_changes();
    }

    pub fn set_selected_time_segment_start_time(&mut self, text: &str) {
        self.set_selected_time_segment_time(DateField::Start, text);
    }

    pub fn set_selected_time_segment_end_time(&mut self, text: &str) {
        self.set_selected_time_segment_time(DateField::End, text);
    }

    // ------------------------------------------------------------------
    // Collection management
    // ------------------------------------------------------------------

    /// Append an empty activity and select it
    pub fn add_activity(&mut self) {
        let (key, position) = self.store.push_activity(idletally_domain::Activity::default());
        self.store.set_selected_activity_index(index_of(position));
        self.store.set_selected_time_segment_index(NO_SELECTION);
        self.activities_changed(CollectionChange::Added, Some(key));
        debug!(activity = ?key, position, "Activity added");
        self.publish_changes();
    }

    /// Append a closed, zero-length segment at now to the selected activity and select it
    pub fn add_time_segment(&mut self) -> Result<()> {
        self.run(|session| {
            let (activity, activity_id) = session
                .store
                .selected_activity()
                .map(|stored| (stored.key, stored.id))
                .ok_or_else(|| invalid("select an activity before adding a time segment"))?;
            let now = session.clock.now();
            let mut segment = TimeSegment::closed(now, now);
            segment.activity_id = activity_id;
            let (key, position) = session
                .store
                .push_segment(activity, segment)
                .ok_or_else(|| IdleTallyError::Internal(format!("activity {activity:?} vanished")))?;
            session.store.set_selected_time_segment_index(index_of(position));
            session.segments_changed(CollectionChange::Added, activity, Some(key));
            debug!(activity = ?activity, segment = ?key, "Time segment added");
            Ok(())
        })
    }

    /// Remove the selected activity, deleting it from storage when persisted
    pub fn delete_activity(&mut self) -> Result<()> {
        self.run(|session| {
            let selected = session
                .store
                .selected_activity()
                .ok_or_else(|| invalid("no activity is selected"))?;
            let key = selected.key;
            if selected.id.is_some() {
                let activity = selected.to_activity();
                session.repository.delete_activity(&activity)?;
                session.repository.save_changes()?;
            }

            if session.machine.owns_activity(key) {
                session.abort_timing();
            }
            session.store.remove_activity(key);
            session.activities_changed(CollectionChange::Removed, Some(key));
            debug!(activity = ?key, "Activity deleted");
            Ok(())
        })
    }

    /// Remove the selected segment, deleting it from storage when persisted
    pub fn delete_time_segment(&mut self) -> Result<()> {
        self.run(|session| {
            let (activity, segment) = session
                .store
                .selected_keys()
                .ok_or_else(|| invalid("no time segment is selected"))?;
            if let Some(stored) = session.store.segment(activity, segment) {
                if stored.segment.id.is_some() {
                    session.repository.delete_time_segment(&stored.segment)?;
                    session.repository.save_changes()?;
                }
            }

            if session.machine.is_started_segment(activity, segment) {
                session.abort_timing();
            }
            session.store.remove_segment(activity, segment);
            session.segments_changed(CollectionChange::Removed, activity, Some(segment));
            debug!(activity = ?activity, segment = ?segment, "Time segment deleted");
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Timing
    // ------------------------------------------------------------------

    /// Start timing on the selected activity, or stop and persist
    pub fn start_stop(&mut self) -> Result<()> {
        self.run(|session| {
            if session.machine.is_running() {
                let now = session.clock.now();
                let stopped = session.machine.stop_with_persist(
                    &mut session.store,
                    session.repository.as_ref(),
                    now,
                )?;
                session.idle.clear();
                session.segments_changed(
                    CollectionChange::Replaced,
                    stopped.activity,
                    Some(stopped.segment),
                );
            } else {
                let now = session.clock.now();
                let started = session.machine.start(&mut session.store, now)?;
                session.segments_changed(
                    CollectionChange::Added,
                    started.activity,
                    Some(started.segment),
                );
            }
            Ok(())
        })
    }

    /// Compare the latest activity signal with the clock
    ///
    /// Returns `true` when the user has been idle for at least the threshold.
    pub fn check_idle_time(&mut self) -> bool {
        let idle = self.idle.check(&self.machine, self.feed.as_ref(), self.clock.as_ref());
        self.publish_changes();
        idle
    }

    /// Count the idle window as worked time and keep timing
    pub fn include_idle_time(&mut self) -> Result<()> {
        self.run(|session| {
            let started = session.idle.include(&session.machine, &mut session.store)?;
            session.segments_changed(
                CollectionChange::Replaced,
                started.activity,
                Some(started.segment),
            );
            Ok(())
        })
    }

    /// Cut the open segment where idling began and stop timing
    pub fn exclude_idle_time(&mut self) -> Result<()> {
        self.run(|session| {
            let started = session.idle.exclude(
                &mut session.machine,
                &mut session.store,
                session.repository.as_ref(),
            )?;
            session.segments_changed(
                CollectionChange::Replaced,
                started.activity,
                Some(started.segment),
            );
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save the selected activity and commit
    pub fn save(&mut self) -> Result<()> {
        self.run(|session| {
            let selected = session
                .store
                .selected_activity()
                .ok_or_else(|| invalid("no activity is selected"))?;
            let key = selected.key;
            let mut prepared = selected.to_activity();
            session.repository.save_activity(&mut prepared)?;
            session.repository.save_changes()?;

            let id = prepared.id;
            if let Some(stored) = session.store.activity_mut(key) {
                stored.apply_saved(prepared);
            }
            session.activities_changed(CollectionChange::Replaced, Some(key));
            info!(activity = ?key, id = ?id, "Activity saved");
            Ok(())
        })
    }

    /// Replace the store with every persisted activity
    pub fn load_activities(&mut self) -> Result<()> {
        self.run(|session| {
            if session.machine.is_running() {
                return Err(invalid("stop timing before reloading activities"));
            }
            let mut activities = session.repository.load_activities()?;
            for activity in &mut activities {
                for segment in activity.time_segments.iter_mut().filter(|segment| segment.is_open) {
                    warn!(
                        activity_id = ?activity.id,
                        segment_id = ?segment.id,
                        end = %segment.end_time,
                        "Closing segment left open by an earlier session"
                    );
                    segment.is_open = false;
                }
            }

            let count = activities.len();
            session.store.replace_all(activities);
            session.idle.clear();
            session.activities_changed(CollectionChange::Reset, None);
            info!(count, "Activities loaded");
            Ok(())
        })
    }

    /// Reload the selected activity's recent segments
    ///
    /// A started segment on this activity stays in place after the reloaded
    /// ones so timing continues.
    pub fn load_time_segments(&mut self) -> Result<()> {
        self.run(|session| {
            let (key, id) = session
                .store
                .selected_activity()
                .map(|stored| (stored.key, stored.id))
                .ok_or_else(|| invalid("no activity is selected"))?;
            let id = id.ok_or_else(|| invalid("save the activity before loading its time segments"))?;

            let to = session.clock.now();
            let from =
                to.checked_sub_signed(session.lookback).unwrap_or(DateTime::<Utc>::MIN_UTC);
            let mut segments = session.repository.load_time_segments(id, from, to)?;

            let keep = session
                .machine
                .started()
                .filter(|started| started.activity == key)
                .map(|started| started.segment);
            let kept_id = keep
                .and_then(|segment| session.store.segment(key, segment))
                .and_then(|stored| stored.segment.id);
            segments.retain(|segment| kept_id.is_none() || segment.id != kept_id);
            for segment in segments.iter_mut().filter(|segment| segment.is_open) {
                warn!(activity = ?key, segment_id = ?segment.id, "Closing stale open segment");
                segment.is_open = false;
            }

            let count = segments.len();
            session.store.replace_segments(key, segments, keep);
            session.store.set_selected_time_segment_index(NO_SELECTION);
            session.segments_changed(CollectionChange::Reset, key, None);
            debug!(activity = ?key, count, from = %from, "Time segments loaded");
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run<T>(&mut self, operation: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = operation(self);
        if let Err(err) = &result {
            warn!(error = %err, kind = err.label(), "Operation rejected");
        }
        self.publish_changes();
        result
    }

    fn set_selected_time_segment_time(&mut self, field: DateField, text: &str) {
        let Some((activity, segment)) = self.store.selected_keys() else {
            debug!(?field, "Time text ignored, no segment selected");
            return;
        };
        match self.format.parse(text) {
            Ok(instant) => {
                if let Some(target) = self.store.segment_mut(activity, segment) {
                    match field {
                        DateField::Start => target.start_time = instant,
                        DateField::End => target.end_time = instant,
                    }
                }
                self.validation.clear(field);
                self.segments_changed(CollectionChange::Replaced, activity, Some(segment));
            }
            Err(failure) => {
                debug!(?field, error = %failure, "Time text rejected");
                self.validation.mark_invalid(field);
            }
        }
        self.publish_changes();
    }

    fn abort_timing(&mut self) {
        self.machine.abort();
        self.idle.clear();
    }

    fn activities_changed(&mut self, change: CollectionChange, activity: Option<ActivityKey>) {
        self.events.push(SessionEvent::ActivitiesChanged { change, activity });
    }

    fn segments_changed(
        &mut self,
        change: CollectionChange,
        activity: ActivityKey,
        segment: Option<SegmentKey>,
    ) {
        self.events.push(SessionEvent::SegmentsChanged { change, activity, segment });
    }

    fn publish_changes(&mut self) {
        let next =
            ObservableSnapshot::capture(&self.store, &self.machine, &self.idle, &self.validation);
        self.events.extend(
            self.published.changed_properties(&next).into_iter().map(SessionEvent::property),
        );
        self.published = next;
    }
}

fn invalid(message: &str) -> IdleTallyError {
    IdleTallyError::InvalidOperation(message.to_string())
}
