//! Watch command: a once-per-second elapsed-time ticker.
//!
//! The ticker only reads the log. It stops after `ticks` lines or on Ctrl-C.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tat_core::{EventStore, SessionState, Tracker};

use super::util::format_duration;

const TICK: Duration = Duration::from_secs(1);

/// Label for the current session, e.g. `work - 00:05:12` or `No task`.
pub fn session_label(state: &SessionState, now: DateTime<Utc>) -> String {
    match (state.task_name(), state.elapsed_at(now)) {
        (Some(task_name), Some(elapsed)) => format!("{task_name} - {}", format_duration(elapsed)),
        _ => "No task".to_string(),
    }
}

/// Writes `label()` once per tick until `ticks` are written or Ctrl-C.
pub async fn run_ticker<W, F>(writer: &mut W, mut label: F, ticks: Option<u64>) -> Result<()>
where
    W: Write,
    F: FnMut() -> Result<String>,
{
    let mut interval = tokio::time::interval(TICK);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut written = 0;
    loop {
        if ticks.is_some_and(|limit| written >= limit) {
            break;
        }
        tokio::select! {
            _ = interval.tick() => {
                writeln!(writer, "{}", label()?)?;
                writer.flush()?;
                written += 1;
            }
            result = &mut ctrl_c => {
                result?;
                tracing::debug!("ticker cancelled");
                break;
            }
        }
    }
    Ok(())
}

/// Runs the ticker against the log, re-reading the session each tick.
pub async fn run<W: Write, S: EventStore>(
    writer: &mut W,
    tracker: &Tracker<S>,
    ticks: Option<u64>,
) -> Result<()> {
    let label = || {
        let reconciliation = tracker.reconcile()?;
        let state = SessionState::from_reconciliation(&reconciliation);
        Ok(session_label(&state, Utc::now()))
    };
    run_ticker(writer, label, ticks).await
}
