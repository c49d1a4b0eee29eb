//! Human-readable elapsed-time formatting
//!
//! Segment and activity totals are `chrono` deltas; these helpers render
//! them for status lines and log fields. Negative deltas render as zero.

use chrono::TimeDelta;

/// Format an elapsed delta as `"1h 5m 3s"`, dropping leading zero units
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use idletally_common::time::format::format_elapsed;
///
/// assert_eq!(format_elapsed(TimeDelta::seconds(5)), "5s");
/// assert_eq!(format_elapsed(TimeDelta::seconds(65)), "1m 5s");
/// assert_eq!(format_elapsed(TimeDelta::seconds(3665)), "1h 1m 5s");
/// ```
pub fn format_elapsed(delta: TimeDelta) -> String {
    let total_secs = delta.num_seconds().max(0);

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let components = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")];
    let start_index =
        components.iter().position(|(value, _)| *value > 0).unwrap_or(components.len() - 1);

    components[start_index..]
        .iter()
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format an elapsed delta as a stopwatch reading, `"HH:MM:SS"`
///
/// Hours are not wrapped at 24.
///
/// ```
/// use chrono::TimeDelta;
/// use idletally_common::time::format::format_stopwatch;
///
/// assert_eq!(format_stopwatch(TimeDelta::seconds(3665)), "01:01:05");
/// assert_eq!(format_stopwatch(TimeDelta::hours(30)), "30:00:00");
/// ```
pub fn format_stopwatch(delta: TimeDelta) -> String {
    let total_secs = delta.num_seconds().max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
