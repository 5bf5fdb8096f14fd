//! Storage layer for the task time tracker.
//!
//! Provides a durable [`EventStore`] using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The tracker assumes a
//! single writer, so none is provided.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with second precision
//! (e.g., `2025-01-15T10:30:00Z`). This ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//!
//! ## Ids
//!
//! `id` is `INTEGER PRIMARY KEY AUTOINCREMENT`, so ids of deleted rows are
//! never handed out again.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use tat_core::{Action, Event, EventId, EventStore, StoreError, TaskName};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an event timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row has an invalid task name or action.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: i64, message: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::unavailable(err)
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An event row as stored, before validation.
#[derive(Debug)]
struct EventRow {
    id: i64,
    timestamp: String,
    task_name: String,
    action: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened event database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA synchronous = FULL;")?;
        self.conn.execute_batch(
            "
            -- Events table: the start/end log
            -- timestamp: RFC 3339 UTC, whole seconds (e.g. '2025-01-15T10:30:00Z')
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                task_name TEXT NOT NULL,
                action TEXT NOT NULL CHECK(action IN ('start', 'end'))
            );

            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp, id);
            CREATE INDEX IF NOT EXISTS idx_events_task ON events(task_name);
            ",
        )?;
        Ok(())
    }

    /// Inserts one event and returns its id.
    pub fn insert_event(
        &self,
        timestamp: DateTime<Utc>,
        task_name: &TaskName,
        action: Action,
    ) -> Result<EventId, DbError> {
        self.conn.execute(
            "INSERT INTO events (timestamp, task_name, action) VALUES (?, ?, ?)",
            params![
                format_timestamp(timestamp),
                task_name.as_str(),
                action.as_str()
            ],
        )?;
        let id = EventId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, task = %task_name, %action, "inserted event");
        Ok(id)
    }

    /// Deletes one event. Returns `false` if no row had this id.
    pub fn delete_event(&self, id: EventId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.get()])?;
        tracing::debug!(%id, deleted, "deleted event");
        Ok(deleted > 0)
    }

    /// Lists all events ordered by timestamp then ID.
    pub fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, task_name, action
            FROM events
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], read_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(parse_row(row?)?);
        }
        Ok(events)
    }

    /// Lists the events of one task ordered by timestamp then ID.
    pub fn list_events_for_task(&self, task_name: &TaskName) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, task_name, action
            FROM events
            WHERE task_name = ?
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([task_name.as_str()], read_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(parse_row(row?)?);
        }
        Ok(events)
    }
}

impl EventStore for Database {
    fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        task_name: &TaskName,
        action: Action,
    ) -> Result<EventId, StoreError> {
        Ok(self.insert_event(timestamp, task_name, action)?)
    }

    fn delete(&mut self, id: EventId) -> Result<(), StoreError> {
        if self.delete_event(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound { id })
        }
    }

    fn scan_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.list_events()?)
    }

    fn scan_task(&self, task_name: &TaskName) -> Result<Vec<Event>, StoreError> {
        Ok(self.list_events_for_task(task_name)?)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        task_name: row.get(2)?,
        action: row.get(3)?,
    })
}

fn parse_row(row: EventRow) -> Result<Event, DbError> {
    let timestamp = parse_timestamp(&row.timestamp, row.id)?;
    let task_name = TaskName::new(row.task_name).map_err(|err| DbError::InvalidEventData {
        event_id: row.id,
        message: err.to_string(),
    })?;
    let action = row
        .action
        .parse::<Action>()
        .map_err(|err| DbError::InvalidEventData {
            event_id: row.id,
            message: err.to_string(),
        })?;
    Ok(Event {
        id: EventId::new(row.id),
        timestamp,
        task_name,
        action,
    })
}

fn parse_timestamp(timestamp: &str, event_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
