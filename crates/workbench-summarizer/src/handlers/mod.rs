//! Event handlers
//!
//! Two decoupled stages: [`IngestHandler`] submits uploads to the processor and
//! returns, [`ResultHandler`] runs later when the processor's output file
//! lands in storage and fires its own event. Nothing is held open between
//! the two.

pub mod batch_results;
pub mod ingest;
pub mod persistence;
pub mod result;

pub use batch_results::{BatchOutput, BatchReport, BatchResultCollector};
pub use ingest::{IngestHandler, Submission};
pub use persistence::Persistence;
pub use result::{ResultHandler, StoredSummary};

use serde::Serialize;

use crate::types::StorageEvent;

/// What a handler did with an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandlerOutcome<T> {
    /// Event was not an object-finalized notification; nothing was done
    Skipped { event_type: String },
    /// Event was processed
    Completed(T),
}

impl<T> HandlerOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped { .. } => None,
        }
    }
}

/// Gate shared by both handlers
pub(crate) fn skip_unless_finalized<T>(event: &StorageEvent, handler: &str) -> Option<HandlerOutcome<T>> {
    if event.is_finalized() {
        return None;
    }

    tracing::warn!(handler, event_type = %event.event_type, "Unexpected event type, ignoring");
    Some(HandlerOutcome::Skipped {
        event_type: event.event_type.clone(),
    })
}
