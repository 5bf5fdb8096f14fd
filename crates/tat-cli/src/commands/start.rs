//! Start command.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tat_core::{EventStore, SessionState, Tracker};

use super::util::{format_timestamp, recover};

/// Starts timing `name` at `now`, printing the start time in `tz`.
pub fn run<W: Write, S: EventStore, Tz: TimeZone>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    name: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let Some(id) = recover(writer, tracker.start_task_at(name, now))? else {
        return Ok(());
    };

    if let SessionState::Running {
        task_name,
        started_at,
        ..
    } = tracker.state()
    {
        writeln!(
            writer,
            "Started '{task_name}' at {} (event {id}).",
            format_timestamp(*started_at, tz)
        )?;
    }
    Ok(())
}
