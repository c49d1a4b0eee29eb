//! Date-time format adapters

mod locale;

pub use locale::LocaleDateTimeFormat;
