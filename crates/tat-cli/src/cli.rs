//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tat_core::Action;

/// Task time tracker.
///
/// Start and stop named tasks; totals are rebuilt from the event log.
#[derive(Debug, Parser)]
#[command(name = "tat", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start timing a task.
    Start {
        /// Task name.
        name: String,
    },

    /// Stop the running task.
    Stop,

    /// Delete an event by id.
    Delete {
        /// Event id, as shown by `tat records`.
        id: i64,
    },

    /// Record a start or end at an explicit time.
    Add {
        /// Task name.
        task: String,

        /// Which transition to record.
        #[arg(value_enum)]
        action: ActionArg,

        /// When it happened: ISO 8601 (2025-01-15T10:30:00Z) or relative ("2 hours ago").
        #[arg(long, default_value = "now")]
        at: String,
    },

    /// Show total time per task.
    Summary {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the events of one task.
    Records {
        /// Task name.
        task: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show all intervals, most recent first.
    History {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the running task.
    Status,

    /// List data-quality anomalies in the log.
    Audit {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the running task's elapsed time every second.
    Watch {
        /// Stop after this many ticks.
        #[arg(long)]
        ticks: Option<u64>,
    },
}

/// Event action as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Start,
    End,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Start => Self::Start,
            ActionArg::End => Self::End,
        }
    }
}
