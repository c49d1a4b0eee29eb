//! Change notifications emitted by the timer session

use serde::{Deserialize, Serialize};

use super::activity::{ActivityKey, SegmentKey};
use crate::impl_name_conversions;

/// Timing state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimingState {
    /// No open segment
    #[default]
    Idle,
    /// Exactly one open segment
    Running,
}

impl_name_conversions!(TimingState {
    Idle => "Idle",
    Running => "Running",
});

/// Observable session properties, declared in notification order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    SelectedActivityIndex,
    IsSaveEnabled,
    IsTimeSegmentAddEnabled,
    SelectedActivity,
    SelectedTimeSegmentIndex,
    IsTimeSegmentDeleteEnabled,
    SelectedTimeSegment,
    StartedActivity,
    StartStopText,
    IdleWindow,
    IsIncludeExcludeEnabled,
    ValidationMessages,
}

impl_name_conversions!(Property {
    SelectedActivityIndex => "SelectedActivityIndex",
    IsSaveEnabled => "IsSaveEnabled",
    IsTimeSegmentAddEnabled => "IsTimeSegmentAddEnabled",
    SelectedActivity => "SelectedActivity",
    SelectedTimeSegmentIndex => "SelectedTimeSegmentIndex",
    IsTimeSegmentDeleteEnabled => "IsTimeSegmentDeleteEnabled",
    SelectedTimeSegment => "SelectedTimeSegment",
    StartedActivity => "StartedActivity",
    StartStopText => "StartStopText",
    IdleWindow => "IdleWindow",
    IsIncludeExcludeEnabled => "IsIncludeExcludeEnabled",
    ValidationMessages => "ValidationMessages",
});

impl Property {
    /// All properties in notification order
    pub const ALL: [Self; 12] = [
        Self::SelectedActivityIndex,
        Self::IsSaveEnabled,
        Self::IsTimeSegmentAddEnabled,
        Self::SelectedActivity,
        Self::SelectedTimeSegmentIndex,
        Self::IsTimeSegmentDeleteEnabled,
        Self::SelectedTimeSegment,
        Self::StartedActivity,
        Self::StartStopText,
        Self::IdleWindow,
        Self::IsIncludeExcludeEnabled,
        Self::ValidationMessages,
    ];
}

/// Kind of change applied to a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionChange {
    Added,
    Removed,
    Replaced,
    /// The whole collection was swapped out
    Reset,
}

/// A single notification drained by the outer layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    ActivitiesChanged { change: CollectionChange, activity: Option<ActivityKey> },
    SegmentsChanged { change: CollectionChange, activity: ActivityKey, segment: Option<SegmentKey> },
    PropertyChanged { property: Property },
}

impl SessionEvent {
    pub const fn property(property: Property) -> Self {
        Self::PropertyChanged { property }
    }

    /// The property carried by a `PropertyChanged` event
    pub const fn as_property(&self) -> Option<Property> {
        match self {
            Self::PropertyChanged { property } => Some(*property),
            _ => None,
        }
    }
}
