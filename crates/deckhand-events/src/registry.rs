//! Registry of attached viewers.

use std::collections::HashMap;
use std::sync::Arc;

use deckhand_common::SessionId;

use crate::record::EventRecord;
use crate::sink::EventSink;

/// The set of live viewer sinks.
///
/// Not synchronized on its own; the publisher keeps it behind the same lock
/// as the history so registration and fan-out never interleave.
#[derive(Debug)]
pub struct BroadcastRegistry<S> {
    sessions: HashMap<SessionId, S>,
}

impl<S> Default for BroadcastRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl<S: EventSink> BroadcastRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a viewer sink and return the handle it is addressed by.
    pub fn register(&mut self, sink: S) -> SessionId {
        let mut id = SessionId::generate();
        while self.sessions.contains_key(&id) {
            id = SessionId::generate();
        }
        self.sessions.insert(id.clone(), sink);
        tracing::debug!(session = %id, viewers = self.sessions.len(), "Viewer registered");
        id
    }

    /// Remove a viewer. Returns whether it was still registered.
    pub fn unregister(&mut self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, viewers = self.sessions.len(), "Viewer unregistered");
        }
        removed
    }

    /// Deliver a record to every registered sink.
    ///
    /// Sinks that fail are dropped on the spot; the rest still receive the
    /// record. Returns the number of successful deliveries.
    pub fn publish(&mut self, record: &Arc<EventRecord>) -> usize {
        let mut delivered = 0;
        self.sessions.retain(|id, sink| match sink.try_deliver(record) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                tracing::info!(session = %id, seq = record.seq(), error = %e, "Dropping viewer");
                false
            }
        });
        delivered
    }

    /// Drop sinks whose viewer already went away.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, sink| !sink.is_closed());
        before - self.sessions.len()
    }

    /// Remove every session, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.sessions.len();
        self.sessions.clear();
        count
    }

    /// Whether a session is registered.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
