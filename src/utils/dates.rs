// ABOUTME: Date and timestamp helpers shared by handlers and database managers
// ABOUTME: Parses client dates, formats storage timestamps and computes day boundaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Timestamps are stored as RFC 3339 UTC strings with second precision
//! (`2026-02-15T08:00:00Z`). With a fixed width and a `Z` suffix, string
//! comparison in SQL orders them chronologically.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};

const CALENDAR_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Current time truncated to whole seconds
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_opt(now.timestamp(), 0).single().unwrap_or(now)
}

/// Today's date in UTC
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a timestamp for storage and JSON output
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a calendar date as `YYYY-MM-DD`
#[must_use]
pub fn format_date(value: NaiveDate) -> String {
    value.format(CALENDAR_FORMAT).to_string()
}

/// Parse a stored timestamp
///
/// # Errors
///
/// Returns an internal error when the stored value is not RFC 3339
pub fn parse_stored_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid stored timestamp '{value}': {e}")))
}

/// Parse a stored calendar date
///
/// # Errors
///
/// Returns an internal error when the stored value is not `YYYY-MM-DD`
pub fn parse_stored_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, CALENDAR_FORMAT)
        .map_err(|e| AppError::internal(format!("Invalid stored date '{value}': {e}")))
}

/// Parse a client-supplied meal date.
///
/// Accepts RFC 3339 with any offset, a naive date-time taken as UTC, or a
/// bare `YYYY-MM-DD` meaning midnight UTC. Sub-second precision is dropped.
///
/// # Errors
///
/// Returns an invalid format error for anything else
pub fn parse_timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();

    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, CALENDAR_FORMAT)
                .ok()
                .map(start_of_day)
        })
        .ok_or_else(|| {
            AppError::invalid_format(format!(
                "Invalid {field}: '{value}' (expected RFC 3339 or YYYY-MM-DD)"
            ))
        })?;

    Ok(Utc
        .timestamp_opt(parsed.timestamp(), 0)
        .single()
        .unwrap_or(parsed))
}

/// Parse a client-supplied calendar date (`YYYY-MM-DD`)
///
/// # Errors
///
/// Returns an invalid format error when the value is not a valid date
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), CALENDAR_FORMAT).map_err(|_| {
        AppError::invalid_format(format!("Invalid {field}: '{value}' (expected YYYY-MM-DD)"))
    })
}

/// First instant of a day in UTC
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Last whole second of a day in UTC
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(last_second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        let rfc = parse_timestamp("date", "2026-02-15T08:30:00+02:00").unwrap();
        assert_eq!(format_timestamp(&rfc), "2026-02-15T06:30:00Z");

        let plain = parse_timestamp("date", "2026-02-15").unwrap();
        assert_eq!(format_timestamp(&plain), "2026-02-15T00:00:00Z");

        let naive = parse_timestamp("date", "2026-02-15 12:00:00").unwrap();
        assert_eq!(format_timestamp(&naive), "2026-02-15T12:00:00Z");

        let fractional = parse_timestamp("date", "2026-02-15T12:00:00.750Z").unwrap();
        assert_eq!(format_timestamp(&fractional), "2026-02-15T12:00:00Z");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("date", "next tuesday").unwrap_err();
        assert_eq!(err.http_status(), 400);
        assert!(parse_timestamp("date", "2026-02-30").is_err());
    }

    #[test]
    fn test_day_bounds() {
        let day = parse_date("start", "2026-03-01").unwrap();
        assert_eq!(format_timestamp(&start_of_day(day)), "2026-03-01T00:00:00Z");
        assert_eq!(format_timestamp(&end_of_day(day)), "2026-03-01T23:59:59Z");
    }

    #[test]
    fn test_storage_format_sorts_chronologically() {
        let earlier = format_timestamp(&parse_timestamp("d", "2026-01-09T23:00:00Z").unwrap());
        let later = format_timestamp(&parse_timestamp("d", "2026-01-10T01:00:00Z").unwrap());
        assert!(earlier < later);
    }
}
