//! Modular common utilities shared across IdleTally crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: wall-clock abstraction and elapsed-time formatting
//! - `observability`: tracing subscriber setup (not included by default)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Observability tier
// --------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod observability;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "observability")]
pub use observability::{init_tracing, LogFormat, ObservabilityError};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
