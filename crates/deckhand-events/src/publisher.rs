//! The single entry point for recording events.

use std::sync::Arc;

use deckhand_common::{DeckhandError, DeckhandResult, SessionId};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::EventsConfig;
use crate::history::HistoryBuffer;
use crate::record::{Attributes, EventRecord, Level};
use crate::registry::BroadcastRegistry;
use crate::session::ViewerSession;

type Outbound = mpsc::Sender<Arc<EventRecord>>;

/// History and viewers share one lock so that an append and its fan-out are
/// never observed half-done, and an attaching viewer's snapshot lines up
/// exactly with the start of its live feed.
#[derive(Debug)]
struct Hub {
    history: HistoryBuffer,
    registry: BroadcastRegistry<Outbound>,
    next_seq: u64,
}

/// Records events and distributes them to attached viewers.
///
/// Cheap to clone; all clones share the same history and viewers.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    hub: Arc<Mutex<Hub>>,
    config: Arc<EventsConfig>,
}

impl EventPublisher {
    /// Create a publisher.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: EventsConfig) -> DeckhandResult<Self> {
        config.validate()?;

        let hub = Hub {
            history: HistoryBuffer::new(config.history_capacity),
            registry: BroadcastRegistry::new(),
            next_seq: 1,
        };

        Ok(Self {
            hub: Arc::new(Mutex::new(hub)),
            config: Arc::new(config),
        })
    }

    /// The configuration this publisher was built with.
    #[must_use]
    pub fn config(&self) -> &EventsConfig {
        &self.config
    }

    /// Record an event: append it to history, then hand it to every viewer.
    ///
    /// Never waits on a viewer. Viewers that cannot take the record are
    /// dropped and will see the stream end.
    pub fn record(
        &self,
        level: Level,
        message: impl Into<String>,
        attributes: Attributes,
    ) -> Arc<EventRecord> {
        let mut hub = self.hub.lock();

        let seq = hub.next_seq;
        hub.next_seq += 1;
        let record = Arc::new(EventRecord::new(seq, level, message.into(), attributes));

        hub.history.append(Arc::clone(&record));
        let delivered = hub.registry.publish(&record);
        drop(hub);

        tracing::trace!(seq, kind = %level, text = record.message(), delivered, "Event recorded");
        record
    }

    /// The last `k` records in insertion order.
    ///
    /// `k` is clamped to `[0, history_capacity]`, so non-positive values yield
    /// nothing and oversized ones yield the whole history.
    #[must_use]
    pub fn recent(&self, k: i64) -> Vec<Arc<EventRecord>> {
        let hub = self.hub.lock();
        hub.history.snapshot(clamp_limit(k, hub.history.capacity()))
    }

    /// Attach a new viewer.
    ///
    /// The viewer is registered and its snapshot captured under one lock, so
    /// every event is seen exactly once: either inside the snapshot or on the
    /// live feed.
    ///
    /// # Errors
    ///
    /// Returns [`DeckhandError::SessionLimit`] when `max_sessions` is set and
    /// reached.
    pub fn subscribe(&self) -> DeckhandResult<ViewerSession> {
        let (tx, rx) = mpsc::channel(self.config.session_buffer);

        let (id, snapshot) = {
            let mut hub = self.hub.lock();

            if let Some(limit) = self.config.max_sessions {
                hub.registry.prune_closed();
                if hub.registry.len() >= limit {
                    tracing::warn!(limit, "Rejecting viewer, session limit reached");
                    return Err(DeckhandError::SessionLimit { limit });
                }
            }

            let id = hub.registry.register(tx);
            let snapshot = hub.history.snapshot(self.config.snapshot_len);
            (id, snapshot)
        };

        tracing::info!(session = %id, replay = snapshot.len(), "Viewer attached");
        Ok(ViewerSession::new(
            id,
            snapshot,
            rx,
            self.clone(),
            self.config.keepalive_interval,
        ))
    }

    /// Remove a viewer. Safe to call more than once.
    pub fn unregister(&self, id: &SessionId) -> bool {
        self.hub.lock().registry.unregister(id)
    }

    /// Drop every viewer. Their streams end after draining what is queued.
    pub fn disconnect_all(&self) -> usize {
        let count = self.hub.lock().registry.clear();
        tracing::info!(viewers = count, "Disconnected all viewers");
        count
    }

    /// Whether a viewer is still registered.
    #[must_use]
    pub fn is_registered(&self, id: &SessionId) -> bool {
        self.hub.lock().registry.contains(id)
    }

    /// Number of attached viewers.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.hub.lock().registry.len()
    }

    /// Number of records currently held in history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.hub.lock().history.len()
    }
}

/// Clamp a caller-supplied record count into `[0, max]`.
#[must_use]
pub fn clamp_limit(k: i64, max: usize) -> usize {
    usize::try_from(k).map_or(0, |k| k.min(max))
}
