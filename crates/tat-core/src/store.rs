//! The durable event log contract.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::event::{Action, Event};
use crate::types::{EventId, TaskName};

/// A durable, ordered log of Start/End events.
///
/// Implementations must commit `append` and `delete` before returning; the
/// tracker treats the store as ground truth and keeps no write buffer.
pub trait EventStore {
    /// Appends an event and returns its newly assigned id.
    ///
    /// Ids are monotonic and never reused.
    fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        task_name: &TaskName,
        action: Action,
    ) -> Result<EventId, StoreError>;

    /// Deletes the event with the given id.
    ///
    /// Returns [`StoreError::NotFound`] if no such event exists.
    fn delete(&mut self, id: EventId) -> Result<(), StoreError>;

    /// Returns every event ordered by timestamp, then id.
    fn scan_all(&self) -> Result<Vec<Event>, StoreError>;

    /// Returns the events of one task ordered by timestamp, then id.
    ///
    /// The default filters [`EventStore::scan_all`]; indexed stores override it.
    fn scan_task(&self, task_name: &TaskName) -> Result<Vec<Event>, StoreError> {
        let mut events = self.scan_all()?;
        events.retain(|event| event.task_name == *task_name);
        Ok(events)
    }
}

/// A non-durable [`EventStore`] kept in memory.
///
/// Useful for tests and for shells that persist elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    events: Vec<Event>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryStore {
    fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        task_name: &TaskName,
        action: Action,
    ) -> Result<EventId, StoreError> {
        self.last_id += 1;
        let id = EventId::new(self.last_id);
        self.events.push(Event {
            id,
            timestamp,
            task_name: task_name.clone(),
            action,
        });
        Ok(id)
    }

    fn delete(&mut self, id: EventId) -> Result<(), StoreError> {
        let Some(index) = self.events.iter().position(|event| event.id == id) else {
            return Err(StoreError::NotFound { id });
        };
        self.events.remove(index);
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<Event>, StoreError> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}
