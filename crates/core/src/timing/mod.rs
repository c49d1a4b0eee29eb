//! Timing and idle reconciliation
//!
//! [`TimerSession`] is the entry point; the other components are exposed for
//! direct testing and for callers that want a narrower surface.

pub mod flags;
pub mod idle;
pub mod machine;
pub mod session;
pub mod store;
pub mod validation;

pub use flags::DerivedFlags;
pub use idle::IdleReconciliation;
pub use machine::{StartedSegment, TimingStateMachine};
pub use session::TimerSession;
pub use store::{ActivityStore, StoredActivity, StoredSegment, NO_SELECTION};
pub use validation::{DateField, ValidationMessages};
