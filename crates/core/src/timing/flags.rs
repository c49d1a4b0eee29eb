//! Derived flags and the observable snapshot used for change notification

use idletally_domain::{ActivityKey, IdleWindow, Property, SegmentKey};

use super::idle::IdleReconciliation;
use super::machine::TimingStateMachine;
use super::store::ActivityStore;
use super::validation::ValidationMessages;

/// Booleans recomputed from store, selection and idle window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedFlags {
    pub is_save_enabled: bool,
    pub is_time_segment_add_enabled: bool,
    pub is_time_segment_delete_enabled: bool,
    pub is_include_exclude_enabled: bool,
}

impl DerivedFlags {
    pub fn compute(store: &ActivityStore, idle: &IdleReconciliation) -> Self {
        let activity_selected = store.selected_activity().is_some();
        Self {
            is_save_enabled: activity_selected,
            is_time_segment_add_enabled: activity_selected,
            is_time_segment_delete_enabled: store.selected_segment().is_some(),
            is_include_exclude_enabled: idle.is_resolution_enabled(),
        }
    }
}

/// Every observable property value at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObservableSnapshot {
    selected_activity_index: i64,
    selected_activity: Option<ActivityKey>,
    selected_time_segment_index: i64,
    selected_time_segment: Option<SegmentKey>,
    started_activity: Option<ActivityKey>,
    start_stop_text: &'static str,
    idle_window: Option<IdleWindow>,
    validation_messages: String,
    flags: DerivedFlags,
}

impl ObservableSnapshot {
    pub(crate) fn capture(
        store: &ActivityStore,
        machine: &TimingStateMachine,
        idle: &IdleReconciliation,
        validation: &ValidationMessages,
    ) -> Self {
        Self {
            selected_activity_index: store.selected_activity_index(),
            selected_activity: store.selected_activity().map(|stored| stored.key),
            selected_time_segment_index: store.selected_time_segment_index(),
            selected_time_segment: store.selected_segment().map(|stored| stored.key),
            started_activity: machine.started().map(|started| started.activity),
            start_stop_text: machine.start_stop_text(),
            idle_window: idle.window(),
            validation_messages: validation.joined(),
            flags: DerivedFlags::compute(store, idle),
        }
    }

    pub(crate) const fn flags(&self) -> DerivedFlags {
        self.flags
    }

    /// Properties whose value differs in `next`, in notification order
    pub(crate) fn changed_properties(&self, next: &Self) -> Vec<Property> {
        Property::ALL.into_iter().filter(|property| !self.same(next, *property)).collect()
    }

    fn same(&self, other: &Self, property: Property) -> bool {
        match property {
            Property::SelectedActivityIndex => {
                self.selected_activity_index == other.selected_activity_index
            }
            Property::IsSaveEnabled => self.flags.is_save_enabled == other.flags.is_save_enabled,
            Property::IsTimeSegmentAddEnabled => {
                self.flags.is_time_segment_add_enabled == other.flags.is_time_segment_add_enabled
            }
            Property::SelectedActivity => self.selected_activity == other.selected_activity,
            Property::SelectedTimeSegmentIndex => {
                self.selected_time_segment_index == other.selected_time_segment_index
            }
            Property::IsTimeSegmentDeleteEnabled => {
                self.flags.is_time_segment_delete_enabled
                    == other.flags.is_time_segment_delete_enabled
            }
            Property::SelectedTimeSegment => {
                self.selected_time_segment == other.selected_time_segment
            }
            Property::StartedActivity => self.started_activity == other.started_activity,
            Property::StartStopText => self.start_stop_text == other.start_stop_text,
            Property::IdleWindow => self.idle_window == other.idle_window,
            Property::IsIncludeExcludeEnabled => {
                self.flags.is_include_exclude_enabled == other.flags.is_include_exclude_enabled
            }
            Property::ValidationMessages => self.validation_messages == other.validation_messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use idletally_domain::Activity;

    use super::*;

    fn capture(store: &ActivityStore, machine: &TimingStateMachine) -> ObservableSnapshot {
        ObservableSnapshot::capture(
            store,
            machine,
            &IdleReconciliation::new(Duration::minutes(5)),
            &ValidationMessages::new(),
        )
    }

    #[test]
    fn test_flags_follow_selection() {
        let mut store = ActivityStore::new();
        let idle = IdleReconciliation::new(Duration::minutes(5));
        assert_eq!(DerivedFlags::compute(&store, &idle), DerivedFlags::default());

        let mut activity = Activity::new("A");
        activity.time_segments.push(idletally_domain::TimeSegment::open_at(chrono::Utc::now()));
        store.push_activity(activity);
        store.set_selected_activity_index(0);
        let flags = DerivedFlags::compute(&store, &idle);
        assert!(flags.is_save_enabled);
        assert!(flags.is_time_segment_add_enabled);
        assert!(!flags.is_time_segment_delete_enabled);

        store.set_selected_time_segment_index(0);
        assert!(DerivedFlags::compute(&store, &idle).is_time_segment_delete_enabled);
    }

    #[test]
    fn test_selecting_first_activity_changes_in_order() {
        let mut store = ActivityStore::new();
        let machine = TimingStateMachine::new();
        let before = capture(&store, &machine);

        store.push_activity(Activity::new("A"));
        store.set_selected_activity_index(0);
        let after = capture(&store, &machine);

        assert_eq!(
            before.changed_properties(&after),
            vec![
                Property::SelectedActivityIndex,
                Property::IsSaveEnabled,
                Property::IsTimeSegmentAddEnabled,
                Property::SelectedActivity,
            ]
        );
    }

    #[test]
    fn test_unchanged_state_yields_nothing() {
        let store = ActivityStore::new();
        let machine = TimingStateMachine::new();
        let snapshot = capture(&store, &machine);
        assert!(snapshot.changed_properties(&snapshot.clone()).is_empty());
    }
}
