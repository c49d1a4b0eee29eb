//! # IdleTally Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - Activity repositories (SQLite and in-memory)
//! - The activity feed inbox and its wire message
//! - Zone-aware date-time formatting
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `idletally-core`
//! - Depends on `idletally-domain` and `idletally-core`
//! - Contains all "impure" code (I/O, files, channels)

pub mod config;
pub mod database;
pub mod errors;
pub mod feed;
pub mod format;

// Re-export commonly used items
pub use database::{DbManager, InMemoryActivityRepository, SqliteActivityRepository};
pub use errors::InfraError;
pub use feed::{spawn_forwarder, FeedMessage, SignalInbox};
pub use format::LocaleDateTimeFormat;
