//! Viewer sinks.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::record::EventRecord;

/// Why a record could not be handed to a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The viewer has gone away.
    #[error("viewer disconnected")]
    Closed,
    /// The viewer's outbound queue is full.
    #[error("viewer outbound queue is full")]
    Lagging,
}

/// Write side of one viewer's feed.
///
/// Delivery must never block: a sink that cannot accept a record right now
/// reports an error and gets dropped from the registry.
pub trait EventSink: Send {
    /// Hand a record to the viewer.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the viewer is gone or cannot keep up.
    fn try_deliver(&mut self, record: &Arc<EventRecord>) -> Result<(), DeliveryError>;

    /// Whether the viewer end has already gone away.
    fn is_closed(&self) -> bool;
}

impl EventSink for mpsc::Sender<Arc<EventRecord>> {
    fn try_deliver(&mut self, record: &Arc<EventRecord>) -> Result<(), DeliveryError> {
        self.try_send(Arc::clone(record)).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Lagging,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    fn is_closed(&self) -> bool {
        Self::is_closed(self)
    }
}
