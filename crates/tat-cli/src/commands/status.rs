//! Status command for showing the running task.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tat_core::{EventStore, SessionState, Tracker};

use super::util::{format_duration, format_timestamp};

pub fn run<W: Write, S: EventStore, Tz: TimeZone>(
    writer: &mut W,
    tracker: &Tracker<S>,
    database_path: &Path,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()> {
    let reconciliation = tracker.reconcile()?;

    writeln!(writer, "Task time tracker status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(
        writer,
        "Events: {}, tasks with time: {}",
        reconciliation.records.len(),
        reconciliation.summaries.len()
    )?;

    match SessionState::from_reconciliation(&reconciliation) {
        SessionState::Running {
            task_name,
            started_at,
            ..
        } => {
            writeln!(
                writer,
                "Running: {task_name} since {} ({})",
                format_timestamp(started_at, tz),
                format_duration(now - started_at)
            )?;
        }
        SessionState::Idle => writeln!(writer, "No task running.")?,
    }

    let stale = reconciliation
        .open
        .len()
        .saturating_sub(usize::from(reconciliation.running().is_some()));
    if stale > 0 {
        writeln!(
            writer,
            "Open sessions never stopped: {stale} (see 'tat history')"
        )?;
    }

    Ok(())
}
