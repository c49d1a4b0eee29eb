//! Locale-independent date-time format

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use idletally_core::{DateTimeFormat, ParseFailure};

/// Renders RFC 3339 and parses RFC 3339 or `YYYY-MM-DD HH:MM:SS` as UTC
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoFormat;

impl DateTimeFormat for IsoFormat {
    fn format(&self, instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn parse(&self, text: &str) -> Result<DateTime<Utc>, ParseFailure> {
        let text = text.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return Ok(instant.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|err| ParseFailure::new(text, err.to_string()))
    }
}
