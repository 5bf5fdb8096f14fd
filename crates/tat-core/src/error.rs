//! Error taxonomy for tracker commands.

use thiserror::Error;

use crate::types::EventId;

/// Errors reported by an [`EventStore`](crate::EventStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No event with this id exists.
    #[error("event {id} not found")]
    NotFound { id: EventId },

    /// The backing store could not be opened, read or written.
    #[error("event store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a backend error as [`StoreError::Unavailable`].
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Box::new(err))
    }
}

/// Errors returned by tracker commands.
///
/// `InvalidOperation` and `NotFound` are recoverable and expected to be shown
/// as a notice. `StoreUnavailable` fails the command.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The command is not valid in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The referenced event does not exist.
    #[error("event {id} not found")]
    NotFound { id: EventId },

    /// The durable store failed.
    #[error("event store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl From<StoreError> for TrackerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            other @ StoreError::Unavailable(_) => Self::StoreUnavailable(other),
        }
    }
}
