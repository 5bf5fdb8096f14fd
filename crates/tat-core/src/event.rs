//! Start/End events as written to the log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventId, TaskName, ValidationError};

/// The transition an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Start,
    End,
}

impl Action {
    /// String representation for storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            _ => Err(ValidationError::InvalidAction {
                value: s.to_string(),
            }),
        }
    }
}

/// A single immutable Start or End record for a named task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// When the transition happened, whole seconds.
    pub timestamp: DateTime<Utc>,
    /// The task this event belongs to.
    pub task_name: TaskName,
    /// Start or End.
    pub action: Action,
}

/// Truncates an instant to the second precision events are stored with.
pub fn event_instant(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(0)
}
