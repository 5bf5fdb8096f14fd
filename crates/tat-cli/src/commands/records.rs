//! Records command: the raw events of one task.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;
use tat_core::{Event, EventStore, Tracker};

use super::util::format_timestamp;

/// Format one task's events for human-readable output, with times in `tz`.
pub fn format_records<Tz: TimeZone>(task_name: &str, events: &[Event], tz: &Tz) -> String {
    let mut output = String::new();

    if events.is_empty() {
        writeln!(output, "No records for '{task_name}'.").unwrap();
        return output;
    }

    let id_width = events
        .iter()
        .map(|e| e.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    writeln!(output, "{:>id_width$}  {:<6}  TIMESTAMP", "ID", "ACTION").unwrap();
    for event in events {
        writeln!(
            output,
            "{:>id_width$}  {:<6}  {}",
            event.id.get(),
            event.action.as_str(),
            format_timestamp(event.timestamp, tz)
        )
        .unwrap();
    }

    output
}

pub fn run<W: Write, S: EventStore, Tz: TimeZone>(
    writer: &mut W,
    tracker: &Tracker<S>,
    task_name: &str,
    json: bool,
    tz: &Tz,
) -> Result<()> {
    let events = tracker.list_records(task_name)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
    } else {
        write!(writer, "{}", format_records(task_name.trim(), &events, tz))?;
    }
    Ok(())
}
