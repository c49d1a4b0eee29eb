//! Domain types

pub mod activity;
pub mod events;
pub mod idle;

pub use activity::{Activity, ActivityKey, SegmentKey, TimeSegment};
pub use events::{CollectionChange, Property, SessionEvent, TimingState};
pub use idle::IdleWindow;
