//! Shared utilities for CLI commands.

use std::io::Write;
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use regex::Regex;
use tat_core::TrackerError;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
/// - "now"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s == "now" {
        return Ok(now);
    }

    // Try ISO 8601 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let duration = match &caps[2] {
        "second" if n <= MAX_RELATIVE_MINUTES * 60 => Duration::seconds(n),
        "minute" if n <= MAX_RELATIVE_MINUTES => Duration::minutes(n),
        "hour" if n <= MAX_RELATIVE_MINUTES / 60 => Duration::hours(n),
        "day" if n <= MAX_RELATIVE_MINUTES / (60 * 24) => Duration::days(n),
        "week" if n <= MAX_RELATIVE_MINUTES / (60 * 24 * 7) => Duration::weeks(n),
        unit => anyhow::bail!("Relative time value too large: {n} {unit}"),
    };

    Ok(now - duration)
}

/// Formats a duration as `HH:MM:SS`. Hours are not capped at 24.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats an event instant as wall-clock time in `tz`.
///
/// Commands pass `chrono::Local`; storage stays in UTC.
pub fn format_timestamp<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String {
    timestamp
        .with_timezone(tz)
        .naive_local()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Turns recoverable tracker errors into a notice on `writer`.
///
/// `InvalidOperation` and `NotFound` are printed and yield `Ok(None)`.
/// Store failures are returned as errors.
pub fn recover<W: Write, T>(
    writer: &mut W,
    result: Result<T, TrackerError>,
) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TrackerError::InvalidOperation(reason)) => {
            tracing::debug!(%reason, "command rejected");
            writeln!(writer, "Nothing to do: {reason}.")?;
            Ok(None)
        }
        Err(TrackerError::NotFound { id }) => {
            tracing::debug!(%id, "event not found");
            writeln!(writer, "Event {id} was already removed.")?;
            Ok(None)
        }
        Err(err @ TrackerError::StoreUnavailable(_)) => Err(err.into()),
    }
}
