//! Add command for backfilling events at an explicit time.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tat_core::{Action, EventStore, Tracker, event_instant};

use super::util::{format_timestamp, parse_datetime, recover};

/// Records `action` for `task` at `when` (ISO 8601 or relative to `now`).
pub fn run<W: Write, S: EventStore, Tz: TimeZone>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    task: &str,
    action: Action,
    when: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let timestamp = parse_datetime(when, now)?;
    let Some(id) = recover(writer, tracker.record_event(timestamp, task, action))? else {
        return Ok(());
    };

    writeln!(
        writer,
        "Recorded {action} for '{}' at {} (event {id}).",
        task.trim(),
        format_timestamp(event_instant(timestamp), tz)
    )?;
    Ok(())
}
