//! # IdleTally Domain
//!
//! Domain types and models for IdleTally.
//!
//! This crate contains:
//! - Activities, time segments and the idle window
//! - Session change notifications
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other IdleTally crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
