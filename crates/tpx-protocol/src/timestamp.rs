//! Canonical timestamp handling.
//!
//! Records carry `DateTime<Utc>` in memory. Storage backends persist the
//! fixed-width ISO-8601 form produced by [`format`] and read it back through
//! [`parse`], so stored strings sort in chronological order.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A stored timestamp string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{value}': {reason}")]
pub struct TimestampError {
    pub value: String,
    pub reason: String,
}

/// Current time at the precision the storage format keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts any RFC 3339 offset (normalised to UTC). Strings without an offset
/// are taken to be UTC.
pub fn parse(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| TimestampError {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Serde helper for optional client-supplied timestamps.
///
/// Reads through [`parse`] and truncates to microseconds, so every backend
/// stores and echoes the same value. Use with `#[serde(default)]`.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|value| {
            parse(&value)
                .map(|ts| ts.trunc_subsecs(6))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format(whole), "2024-03-01T12:00:00.000000Z");

        let later = whole + chrono::Duration::microseconds(1500);
        assert_eq!(format(later), "2024-03-01T12:00:00.001500Z");
        assert!(format(whole) < format(later));
    }

    #[test]
    fn parse_reads_back_formatted_value() {
        let ts = now();
        assert_eq!(parse(&format(ts)).unwrap(), ts);
    }

    #[test]
    fn parse_normalises_offsets() {
        let ts = parse("2024-03-01T14:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn parse_accepts_naive_as_utc() {
        let ts = parse("2024-03-01T12:00:00.250").unwrap();
        assert_eq!(format(ts), "2024-03-01T12:00:00.250000Z");

        let ts = parse("2024-03-01T12:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse("yesterday").unwrap_err();
        assert_eq!(err.value, "yesterday");
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn now_has_microsecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
    }
}
