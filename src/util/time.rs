//! Boundary timestamp parsing.
//!
//! The core exchanges timestamps as native `DateTime<Utc>` values; this is
//! the boundary codec that turns wire strings into them, rejecting anything
//! un-parseable before it reaches the store.

use crate::error::{Result, TrackerError};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parse a wire timestamp into a `DateTime<Utc>`.
///
/// Supports:
/// - RFC 3339: `2026-01-15T12:00:00Z`, `2026-01-15T12:00:00+02:00`
/// - Simple date: `2026-01-15` (midnight UTC)
///
/// # Errors
///
/// Returns `TrackerError::InvalidTimestamp` for any other input.
pub fn parse_timestamp(s: &str, field_name: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(TrackerError::InvalidTimestamp {
        field: field_name.to_string(),
        value: s.to_string(),
    })
}
