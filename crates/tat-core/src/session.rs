//! Live session state.

use chrono::{DateTime, Duration, Utc};

use crate::reconcile::Reconciliation;
use crate::types::{EventId, TaskName};

/// Whether a task is currently being timed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running {
        task_name: TaskName,
        started_at: DateTime<Utc>,
        /// Id of the Start event that opened the session.
        start_id: EventId,
    },
}

impl SessionState {
    /// Restores the state implied by a reconciled log.
    ///
    /// The in-memory session is not persisted; a dangling Start that is also
    /// the latest event in the log is taken as the running session.
    pub fn from_reconciliation(reconciliation: &Reconciliation) -> Self {
        reconciliation
            .running()
            .map_or(Self::Idle, |interval| Self::Running {
                task_name: interval.task_name.clone(),
                started_at: interval.start,
                start_id: interval.start_id,
            })
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Name of the running task.
    pub const fn task_name(&self) -> Option<&TaskName> {
        match self {
            Self::Idle => None,
            Self::Running { task_name, .. } => Some(task_name),
        }
    }

    /// Time since the running task started, never negative.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Self::Idle => None,
            Self::Running { started_at, .. } => Some((now - *started_at).max(Duration::zero())),
        }
    }
}
