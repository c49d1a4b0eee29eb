//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock wall clocks
//! - **[`format`]**: elapsed-time formatting

pub mod clock;
pub mod format;

// Re-export commonly used items
pub use clock::{Clock, MockClock, SystemClock};
pub use format::{format_elapsed, format_stopwatch};
