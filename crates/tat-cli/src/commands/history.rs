//! History command: every interval, most recent first.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tat_core::{EventId, EventStore, Interval, Tracker};

use super::util::{format_duration, format_timestamp};

/// History row for display and JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub task_name: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub start_id: EventId,
    pub end_id: Option<EventId>,
    /// Closed duration; `None` for open intervals.
    pub duration_secs: Option<i64>,
    /// Whether this is the currently running session.
    pub running: bool,
}

impl HistoryEntry {
    fn new(interval: &Interval, running_id: Option<EventId>) -> Self {
        Self {
            task_name: interval.task_name.to_string(),
            start: interval.start,
            end: interval.end,
            start_id: interval.start_id,
            end_id: interval.end_id,
            duration_secs: interval.duration().map(|d| d.num_seconds()),
            running: running_id == Some(interval.start_id),
        }
    }
}

/// Format history entries for human-readable output.
///
/// The running session shows its elapsed time at `now`. Open sessions that
/// were never stopped show no duration. Times are shown in `tz`.
pub fn format_history<Tz: TimeZone>(
    entries: &[HistoryEntry],
    now: DateTime<Utc>,
    tz: &Tz,
) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        writeln!(output, "No history yet.").unwrap();
        return output;
    }

    let width = entries
        .iter()
        .map(|e| e.task_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("TASK".len());

    writeln!(
        output,
        "{:<width$}  {:<19}  {:<19}  {:>8}",
        "TASK", "START", "END", "DURATION"
    )
    .unwrap();
    for entry in entries {
        let (end, duration) = match (entry.end, entry.duration_secs) {
            (Some(end), Some(secs)) => (
                format_timestamp(end, tz),
                format_duration(chrono::Duration::seconds(secs)),
            ),
            _ if entry.running => ("running".to_string(), format_duration(now - entry.start)),
            _ => ("open".to_string(), "-".to_string()),
        };
        writeln!(
            output,
            "{:<width$}  {:<19}  {:<19}  {:>8}",
            entry.task_name,
            format_timestamp(entry.start, tz),
            end,
            duration
        )
        .unwrap();
    }

    output
}

pub fn run<W: Write, S: EventStore, Tz: TimeZone>(
    writer: &mut W,
    tracker: &Tracker<S>,
    json: bool,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let reconciliation = tracker.reconcile()?;
    let running_id = reconciliation.running().map(|interval| interval.start_id);
    let entries: Vec<HistoryEntry> = reconciliation
        .history()
        .iter()
        .map(|interval| HistoryEntry::new(interval, running_id))
        .collect();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_history(&entries, now, tz))?;
    }
    Ok(())
}
