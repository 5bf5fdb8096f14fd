//! The command surface shells call into.
//!
//! [`Tracker`] owns an [`EventStore`] and the live [`SessionState`]. Every
//! query reconciles the full log, so there is no derived state to keep in
//! sync with deletes.

use chrono::{DateTime, Duration, Utc};

use crate::error::TrackerError;
use crate::event::{Action, Event, event_instant};
use crate::reconcile::{Interval, Reconciliation, TaskSummary, reconcile};
use crate::session::SessionState;
use crate::store::EventStore;
use crate::types::{EventId, TaskName};

/// Result of stopping the running task.
#[derive(Debug, Clone)]
pub struct Stopped {
    /// Id of the End event that was written.
    pub end_id: EventId,
    /// The log reconciled after the write.
    pub reconciliation: Reconciliation,
}

impl Stopped {
    /// The interval closed by this stop.
    pub fn interval(&self) -> Option<&Interval> {
        self.reconciliation
            .intervals
            .iter()
            .find(|interval| interval.end_id == Some(self.end_id))
    }

    /// The stopped task's new total.
    pub fn total(&self) -> Option<Duration> {
        let interval = self.interval()?;
        self.reconciliation
            .summaries
            .get(interval.task_name.as_str())
            .copied()
    }
}

/// Start/stop state machine plus queries over an event store.
///
/// Single writer: one tracker per store.
#[derive(Debug)]
pub struct Tracker<S> {
    store: S,
    state: SessionState,
}

impl<S: EventStore> Tracker<S> {
    /// Opens a tracker over `store`, restoring a running session from the log.
    pub fn open(store: S) -> Result<Self, TrackerError> {
        let reconciliation = reconcile(store.scan_all()?);
        let state = SessionState::from_reconciliation(&reconciliation);
        if let SessionState::Running { task_name, .. } = &state {
            tracing::debug!(task = %task_name, "restored running session from log");
        }
        Ok(Self { store, state })
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Starts timing `name` now.
    pub fn start_task(&mut self, name: &str) -> Result<EventId, TrackerError> {
        self.start_task_at(name, Utc::now())
    }

    /// Starts timing `name` at `now`.
    pub fn start_task_at(&mut self, name: &str, now: DateTime<Utc>) -> Result<EventId, TrackerError> {
        let task_name =
            TaskName::new(name).map_err(|err| TrackerError::InvalidOperation(err.to_string()))?;
        if let SessionState::Running { task_name: running, .. } = &self.state {
            return Err(TrackerError::InvalidOperation(format!(
                "task '{running}' is already running"
            )));
        }

        let started_at = event_instant(now);
        let start_id = self.store.append(started_at, &task_name, Action::Start)?;
        tracing::info!(task = %task_name, id = %start_id, "task started");

        self.state = SessionState::Running {
            task_name,
            started_at,
            start_id,
        };
        Ok(start_id)
    }

    /// Stops the running task now.
    pub fn stop_task(&mut self) -> Result<Stopped, TrackerError> {
        self.stop_task_at(Utc::now())
    }

    /// Stops the running task at `now` and reconciles the log.
    pub fn stop_task_at(&mut self, now: DateTime<Utc>) -> Result<Stopped, TrackerError> {
        let SessionState::Running {
            task_name,
            started_at,
            ..
        } = &self.state
        else {
            return Err(TrackerError::InvalidOperation("no task running".to_string()));
        };

        // Never end before the start, or the End would sort ahead of it.
        let ended_at = event_instant(now).max(*started_at);
        let end_id = self.store.append(ended_at, task_name, Action::End)?;
        tracing::info!(task = %task_name, id = %end_id, "task stopped");
        self.state = SessionState::Idle;

        let reconciliation = self.reconcile()?;
        Ok(Stopped {
            end_id,
            reconciliation,
        })
    }

    /// Deletes one event from the log.
    ///
    /// Deleting the Start of the running session returns the tracker to idle.
    pub fn delete_record(&mut self, id: EventId) -> Result<(), TrackerError> {
        self.store.delete(id)?;
        tracing::info!(%id, "event deleted");

        if matches!(&self.state, SessionState::Running { start_id, .. } if *start_id == id) {
            tracing::debug!(%id, "running session's start deleted");
            self.state = SessionState::Idle;
        }
        Ok(())
    }

    /// Writes an event at an explicit instant without touching the session.
    pub fn record_event(
        &mut self,
        timestamp: DateTime<Utc>,
        name: &str,
        action: Action,
    ) -> Result<EventId, TrackerError> {
        let task_name =
            TaskName::new(name).map_err(|err| TrackerError::InvalidOperation(err.to_string()))?;
        let id = self
            .store
            .append(event_instant(timestamp), &task_name, action)?;
        tracing::info!(task = %task_name, %id, %action, "event recorded");
        Ok(id)
    }

    /// Reconciles the full log.
    pub fn reconcile(&self) -> Result<Reconciliation, TrackerError> {
        let events = self.store.scan_all()?;
        tracing::debug!(count = events.len(), "reconciling events");
        let reconciliation = reconcile(events);
        for anomaly in &reconciliation.anomalies {
            tracing::debug!(?anomaly, "log anomaly");
        }
        Ok(reconciliation)
    }

    /// Total closed time per task, ordered by task name.
    pub fn list_summaries(&self) -> Result<Vec<TaskSummary>, TrackerError> {
        Ok(self.reconcile()?.task_summaries())
    }

    /// Events for one task, ascending by timestamp then id.
    ///
    /// A name that can never be stored has no records.
    pub fn list_records(&self, task_name: &str) -> Result<Vec<Event>, TrackerError> {
        let Ok(task_name) = TaskName::new(task_name) else {
            return Ok(Vec::new());
        };
        Ok(self.store.scan_task(&task_name)?)
    }

    /// All intervals, most recent first.
    pub fn list_history(&self) -> Result<Vec<Interval>, TrackerError> {
        Ok(self.reconcile()?.history())
    }

    /// The running task and how long it has been running at `now`.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<(&TaskName, Duration)> {
        let task_name = self.state.task_name()?;
        let elapsed = self.state.elapsed_at(now)?;
        Some((task_name, elapsed))
    }
}
