//! Summary command: total closed time per task.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tat_core::{EventStore, TaskSummary, Tracker};

use super::util::format_duration;

/// Summary row for display and JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub task_name: String,
    pub total_secs: i64,
}

impl From<&TaskSummary> for SummaryEntry {
    fn from(summary: &TaskSummary) -> Self {
        Self {
            task_name: summary.task_name.clone(),
            total_secs: summary.total.num_seconds(),
        }
    }
}

/// Format summaries for human-readable output.
pub fn format_summaries(summaries: &[TaskSummary]) -> String {
    let mut output = String::new();

    if summaries.is_empty() {
        writeln!(output, "No completed tasks yet.").unwrap();
        return output;
    }

    let width = summaries
        .iter()
        .map(|s| s.task_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("TASK".len());

    writeln!(output, "{:<width$}  {:>8}", "TASK", "TOTAL").unwrap();
    for summary in summaries {
        writeln!(
            output,
            "{:<width$}  {:>8}",
            summary.task_name,
            format_duration(summary.total)
        )
        .unwrap();
    }

    output
}

pub fn run<W: Write, S: EventStore>(writer: &mut W, tracker: &Tracker<S>, json: bool) -> Result<()> {
    let summaries = tracker.list_summaries()?;

    if json {
        let entries: Vec<SummaryEntry> = summaries.iter().map(SummaryEntry::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write!(writer, "{}", format_summaries(&summaries))?;
    }
    Ok(())
}
