//! Zone-aware rendering and parsing of segment boundaries

use chrono::format::{Item, StrftimeItems};
use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use idletally_core::{DateTimeFormat, ParseFailure};
use idletally_domain::{DisplayConfig, IdleTallyError, Result as DomainResult};

/// Fallback patterns tried after the display pattern
const FALLBACK_PATTERNS: [&str; 2] = ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %I:%M %p"];

const ROUND_TRIP_SAMPLE_SECS: i64 = 1_488_380_645;

/// Renders instants in an IANA zone with a strftime pattern.
///
/// Parsing accepts RFC 3339, the display pattern, and US-style text with or
/// without seconds, all interpreted in the configured zone.
#[derive(Debug, Clone)]
pub struct LocaleDateTimeFormat {
    zone: Tz,
    pattern: String,
}

impl LocaleDateTimeFormat {
    pub fn new(zone: &str, pattern: impl Into<String>) -> DomainResult<Self> {
        let zone: Tz = zone
            .parse()
            .map_err(|_| IdleTallyError::Config(format!("unknown time zone '{zone}'")))?;
        let pattern = pattern.into();
        if pattern.trim().is_empty()
            || StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error))
        {
            return Err(IdleTallyError::Config(format!("invalid datetime format '{pattern}'")));
        }

        let candidate = Self { zone, pattern };
        candidate.check_reads_back()?;
        Ok(candidate)
    }

    /// Text shown in the segment editor must parse back to the same instant
    fn check_reads_back(&self) -> DomainResult<()> {
        // 2017-03-01T15:04:05Z: afternoon, nonzero minutes and seconds
        let sample = DateTime::<Utc>::from_timestamp(ROUND_TRIP_SAMPLE_SECS, 0)
            .ok_or_else(|| IdleTallyError::Config("round-trip sample out of range".to_string()))?;
        let text = self.format(sample);
        if self.parse(&text) == Ok(sample) {
            return Ok(());
        }
        Err(IdleTallyError::Config(format!(
            "datetime format '{}' cannot be read back: '{text}' does not parse to the instant it shows",
            self.pattern
        )))
    }

    pub fn from_config(display: &DisplayConfig) -> DomainResult<Self> {
        Self::new(&display.time_zone, display.datetime_format.clone())
    }

    pub const fn zone(&self) -> Tz {
        self.zone
    }

    fn resolve_local(&self, text: &str, naive: NaiveDateTime) -> Result<DateTime<Utc>, ParseFailure> {
        match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, latest) => {
                Ok(earliest.min(latest).with_timezone(&Utc))
            }
            LocalResult::None => Err(ParseFailure::new(
                text,
                format!("local time does not exist in {}", self.zone.name()),
            )),
        }
    }
}

impl Default for LocaleDateTimeFormat {
    fn default() -> Self {
        Self {
            zone: Tz::UTC,
            pattern: idletally_domain::constants::DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

impl DateTimeFormat for LocaleDateTimeFormat {
    fn format(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.zone).format(&self.pattern).to_string()
    }

    fn parse(&self, text: &str) -> Result<DateTime<Utc>, ParseFailure> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseFailure::new(text, "empty input"));
        }
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(instant.with_timezone(&Utc));
        }

        let mut last_error = None;
        for pattern in std::iter::once(self.pattern.as_str()).chain(FALLBACK_PATTERNS) {
            match NaiveDateTime::parse_from_str(trimmed, pattern) {
                Ok(naive) => return self.resolve_local(text, naive),
                Err(e) => last_error = Some(e),
            }
        }
        Err(ParseFailure::new(
            text,
            last_error.map_or_else(|| "unrecognised format".to_string(), |e| e.to_string()),
        ))
    }
}
