//! Observability primitives
//!
//! Only logging lives here today: subscriber setup for binaries.

pub mod logging;

pub use logging::{init_tracing, LogFormat, ObservabilityError};
