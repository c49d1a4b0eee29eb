//! # IdleTally Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The timer session: activity store, timing state machine, idle
//!   reconciliation, validation and derived flags
//!
//! ## Architecture Principles
//! - Only depends on `idletally-common` and `idletally-domain`
//! - No database, network, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod ports;
pub mod timing;

pub use ports::{ActivityFeed, ActivityRepository, Clock, DateTimeFormat, ParseFailure};
pub use timing::{
    ActivityStore, DateField, DerivedFlags, IdleReconciliation, StartedSegment, StoredActivity,
    StoredSegment, TimerSession, TimingStateMachine, ValidationMessages, NO_SELECTION,
};
