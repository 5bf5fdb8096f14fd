//! Audit command: data-quality anomalies in the log.
//!
//! Anomalies never fail a command; this is the only place they are shown.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use tat_core::{Anomaly, EventStore, Tracker};

/// One-line description of an anomaly.
pub fn describe(anomaly: &Anomaly) -> String {
    match anomaly {
        Anomaly::OrphanEnd {
            task_name,
            event_id,
        } => format!("orphan end: event {event_id} ({task_name}) has no open start, ignored"),
        Anomaly::ReplacedStart {
            task_name,
            discarded_id,
            replaced_by,
        } => format!(
            "replaced start: event {discarded_id} ({task_name}) superseded by event {replaced_by}, span discarded"
        ),
        Anomaly::ClampedDuration {
            task_name,
            start_id,
            end_id,
        } => format!(
            "clamped duration: event {end_id} ({task_name}) ends before start {start_id}, counted as zero"
        ),
    }
}

pub fn format_anomalies(anomalies: &[Anomaly]) -> String {
    let mut output = String::new();
    if anomalies.is_empty() {
        writeln!(output, "No anomalies.").unwrap();
        return output;
    }
    for anomaly in anomalies {
        writeln!(output, "- {}", describe(anomaly)).unwrap();
    }
    output
}

pub fn run<W: Write, S: EventStore>(writer: &mut W, tracker: &Tracker<S>, json: bool) -> Result<()> {
    let reconciliation = tracker.reconcile()?;
    for anomaly in &reconciliation.anomalies {
        tracing::warn!(?anomaly, "log anomaly");
    }

    if json {
        writeln!(
            writer,
            "{}",
            serde_json::to_string_pretty(&reconciliation.anomalies)?
        )?;
    } else {
        write!(writer, "{}", format_anomalies(&reconciliation.anomalies))?;
    }
    Ok(())
}
