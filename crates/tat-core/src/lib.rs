//! Core domain logic for the task time tracker.
//!
//! This crate contains:
//! - Events: immutable Start/End records for named tasks
//! - Reconciliation: deriving intervals and per-task totals from the log
//! - Session tracking: the start/stop state machine over an [`EventStore`]

mod error;
pub mod event;
pub mod reconcile;
pub mod session;
mod store;
mod tracker;
pub mod types;

pub use error::{StoreError, TrackerError};
pub use event::{Action, Event, event_instant};
pub use reconcile::{Anomaly, Interval, Reconciliation, TaskSummary, reconcile};
pub use session::SessionState;
pub use store::{EventStore, MemoryStore};
pub use tracker::{Stopped, Tracker};
pub use types::{EventId, TaskName, ValidationError};
