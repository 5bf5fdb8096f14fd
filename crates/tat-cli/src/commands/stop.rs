//! Stop command.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tat_core::{EventStore, Tracker};

use super::util::{format_duration, recover};

/// Stops the running task at `now` and prints the closed span and new total.
pub fn run<W: Write, S: EventStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(stopped) = recover(writer, tracker.stop_task_at(now))? else {
        return Ok(());
    };

    match (stopped.interval(), stopped.total()) {
        (Some(interval), Some(total)) => {
            let span = interval.duration().unwrap_or_else(Duration::zero);
            writeln!(
                writer,
                "Stopped '{}' after {}. Total: {}.",
                interval.task_name,
                format_duration(span),
                format_duration(total)
            )?;
        }
        _ => {
            // Another writer changed the log between start and stop.
            tracing::warn!(end_id = %stopped.end_id, "stop event did not close an interval");
            writeln!(writer, "Stopped (event {}).", stopped.end_id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;
    use tat_core::MemoryStore;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn stop_reports_span_and_total() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        tracker.start_task_at("work", at(8, 0)).unwrap();
        tracker.stop_task_at(at(8, 40)).unwrap();
        tracker.start_task_at("work", at(10, 0)).unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut tracker, at(10, 30)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Stopped 'work' after 00:30:00. Total: 01:10:00.");
    }

    #[test]
    fn stop_while_idle_is_a_notice() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        let mut output = Vec::new();
        run(&mut output, &mut tracker, at(10, 0)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Nothing to do: no task running.");
    }
}
