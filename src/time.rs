// File: src/time.rs

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use humantime::parse_duration;
use std::time::SystemTime;
use thiserror::Error;

use crate::parsers::LogRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("could not parse time string: {0}")]
    Unparseable(String),
    #[error("relative time '{0}' reaches before the epoch")]
    OutOfRange(String),
}

/// Wall-clock layouts seen in Windows Event and application timestamps.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S,%3f", // log4j / python logging: 2025-01-02 10:15:32,123
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses a user-provided bound: `now`, a relative duration (`15m`, `2h ago`),
/// RFC 3339, or one of the naive layouts above (taken as UTC).
pub fn parse_time_string(time_str: &str) -> Result<NaiveDateTime, TimeError> {
    let trimmed = time_str.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().naive_utc());
    }

    let clean_str = trimmed.strip_suffix(" ago").unwrap_or(trimmed);
    if let Ok(duration) = parse_duration(clean_str) {
        let target_time = SystemTime::now()
            .checked_sub(duration)
            .ok_or_else(|| TimeError::OutOfRange(time_str.to_string()))?;
        return Ok(DateTime::<Utc>::from(target_time).naive_utc());
    }

    parse_naive(trimmed).ok_or_else(|| TimeError::Unparseable(time_str.to_string()))
}

/// Syslog lines carry no year; `year` fills it in.
pub fn syslog_timestamp(record: &LogRecord, year: i32) -> Option<NaiveDateTime> {
    let month = record.get("month")?;
    let day = record.get("day")?;
    let time = record.get("time")?;

    let joined = format!("{year} {month} {day} {time}");
    NaiveDateTime::parse_from_str(&joined, "%Y %b %d %H:%M:%S").ok()
}

/// Whether `record` falls inside `start..=end`.
///
/// Syslog records have no year, so each year the window touches is tried in
/// turn; a window spanning New Year keeps both the December and January rows.
pub fn record_within(record: &LogRecord, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    let in_window = |ts: NaiveDateTime| ts >= start && ts <= end;

    match record.get("timestamp") {
        Some(ts) => parse_naive(ts).map_or(false, in_window),
        None => (start.year()..=end.year())
            .filter_map(|year| syslog_timestamp(record, year))
            .any(in_window),
    }
}

/// The point in time a record describes, if it can be worked out.
/// Syslog records are placed in the current UTC year.
pub fn record_timestamp(record: &LogRecord) -> Option<NaiveDateTime> {
    match record.get("timestamp") {
        Some(ts) => parse_naive(ts),
        None => syslog_timestamp(record, Utc::now().year()),
    }
}
