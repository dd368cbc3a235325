//! Viewer session lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deckhand_common::SessionId;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::publisher::EventPublisher;
use crate::record::EventRecord;

/// One message on a viewer's feed.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// History replay, always the first frame.
    Snapshot(Vec<Arc<EventRecord>>),
    /// A live event.
    Event(Arc<EventRecord>),
    /// Transport keep-alive, carries no event.
    KeepAlive,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Registered, snapshot not yet handed out.
    Attaching,
    /// Receiving live events.
    Live,
    /// Detached for good.
    Closed,
}

/// One connected viewer, from attach to disconnect.
///
/// Created by [`EventPublisher::subscribe`]. Dropping the session (for example
/// when the HTTP layer fails to write to the client) unregisters it and stops
/// its keep-alive timer.
#[derive(Debug)]
pub struct ViewerSession {
    id: SessionId,
    connected_at: DateTime<Utc>,
    state: SessionState,
    snapshot: Option<Vec<Arc<EventRecord>>>,
    receiver: mpsc::Receiver<Arc<EventRecord>>,
    keepalive_period: Duration,
    keepalive: Option<Interval>,
    publisher: EventPublisher,
}

impl ViewerSession {
    pub(crate) fn new(
        id: SessionId,
        snapshot: Vec<Arc<EventRecord>>,
        receiver: mpsc::Receiver<Arc<EventRecord>>,
        publisher: EventPublisher,
        keepalive_period: Duration,
    ) -> Self {
        Self {
            id,
            connected_at: Utc::now(),
            state: SessionState::Attaching,
            snapshot: Some(snapshot),
            receiver,
            keepalive_period,
            keepalive: None,
            publisher,
        }
    }

    /// Registry handle of this session.
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// When the viewer attached.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Wait for the next frame.
    ///
    /// Yields the snapshot first, then live events and keep-alives. Returns
    /// `None` once the session is closed, which happens when the publisher
    /// dropped this viewer or [`close`](Self::close) was called.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        match self.state {
            SessionState::Closed => None,
            SessionState::Attaching => {
                self.state = SessionState::Live;
                Some(Frame::Snapshot(self.snapshot.take().unwrap_or_default()))
            }
            SessionState::Live => {
                let period = self.keepalive_period;
                let keepalive = self.keepalive.get_or_insert_with(|| {
                    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    interval
                });

                let next = tokio::select! {
                    biased;
                    record = self.receiver.recv() => record.map(Frame::Event),
                    _ = keepalive.tick() => Some(Frame::KeepAlive),
                };

                if next.is_none() {
                    tracing::debug!(session = %self.id, "Viewer feed ended");
                    self.close();
                }
                next
            }
        }
    }

    /// Detach from the publisher and stop the keep-alive timer.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        self.state = SessionState::Closed;
        self.keepalive = None;
        self.receiver.close();
        self.publisher.unregister(&self.id);

        let connected_for = Utc::now() - self.connected_at;
        tracing::info!(
            session = %self.id,
            connected_secs = connected_for.num_seconds(),
            "Viewer detached"
        );
    }

    /// Turn the session into a stream of frames that ends when it closes.
    pub fn into_stream(self) -> impl Stream<Item = Frame> + Send {
        futures::stream::unfold(self, |mut session| async move {
            session.next_frame().await.map(|frame| (frame, session))
        })
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventsConfig;
    use crate::record::{Attributes, Level};
    use futures::StreamExt;

    fn publisher(capacity: usize, keepalive: Duration) -> EventPublisher {
        EventPublisher::new(
            EventsConfig::default()
                .with_history_capacity(capacity)
                .with_keepalive_interval(keepalive),
        )
        .unwrap()
    }

    fn messages(records: &[Arc<EventRecord>]) -> Vec<String> {
        records.iter().map(|r| r.message().to_string()).collect()
    }

    async fn next_event(session: &mut ViewerSession) -> Arc<EventRecord> {
        loop {
            match session.next_frame().await {
                Some(Frame::Event(record)) => return record,
                Some(Frame::KeepAlive) => continue,
                other => panic!("expected an event, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn snapshot_then_live_events() {
        let publisher = publisher(3, Duration::from_secs(60));
        for message in ["a", "b", "c", "d"] {
            publisher.record(Level::Info, message, Attributes::new());
        }

        let mut session = publisher.subscribe().unwrap();
        assert_eq!(session.state(), SessionState::Attaching);

        match session.next_frame().await {
            Some(Frame::Snapshot(records)) => assert_eq!(messages(&records), ["b", "c", "d"]),
            other => panic!("expected snapshot, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Live);

        publisher.record(Level::Info, "e", Attributes::new());
        assert_eq!(next_event(&mut session).await.message(), "e");
    }

    #[tokio::test]
    async fn events_after_attach_are_not_in_snapshot() {
        let publisher = publisher(10, Duration::from_secs(60));
        publisher.record(Level::Info, "before", Attributes::new());

        let mut session = publisher.subscribe().unwrap();
        for message in ["a", "b", "c"] {
            publisher.record(Level::Info, message, Attributes::new());
        }

        match session.next_frame().await {
            Some(Frame::Snapshot(records)) => assert_eq!(messages(&records), ["before"]),
            other => panic!("expected snapshot, got {other:?}"),
        }
        for expected in ["a", "b", "c"] {
            assert_eq!(next_event(&mut session).await.message(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_emits_keepalives() {
        let publisher = publisher(10, Duration::from_secs(10));
        let mut session = publisher.subscribe().unwrap();

        assert!(matches!(session.next_frame().await, Some(Frame::Snapshot(_))));
        assert_eq!(session.next_frame().await, Some(Frame::KeepAlive));
        assert_eq!(session.next_frame().await, Some(Frame::KeepAlive));
    }

    #[tokio::test]
    async fn dropping_a_session_unregisters_it() {
        let publisher = publisher(10, Duration::from_secs(60));
        let session = publisher.subscribe().unwrap();
        let id = session.id().clone();
        assert!(publisher.is_registered(&id));

        drop(session);
        assert!(!publisher.is_registered(&id));
        assert_eq!(publisher.viewer_count(), 0);
    }

    #[tokio::test]
    async fn close_is_terminal() {
        let publisher = publisher(10, Duration::from_secs(60));
        let mut session = publisher.subscribe().unwrap();
        session.close();
        session.close();

        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.next_frame().await.is_none());

        publisher.record(Level::Info, "after", Attributes::new());
        assert!(session.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn lagging_viewer_is_dropped_and_its_stream_ends() {
        let publisher = EventPublisher::new(
            EventsConfig::default()
                .with_session_buffer(2)
                .with_keepalive_interval(Duration::from_secs(60)),
        )
        .unwrap();
        let mut session = publisher.subscribe().unwrap();
        let id = session.id().clone();

        for message in ["a", "b", "c"] {
            publisher.record(Level::Info, message, Attributes::new());
        }
        assert!(!publisher.is_registered(&id));

        let frames: Vec<Frame> = {
            let mut frames = Vec::new();
            while let Some(frame) = session.next_frame().await {
                frames.push(frame);
            }
            frames
        };
        assert_eq!(frames.len(), 3);
        assert!(matches!(&frames[1], Frame::Event(r) if r.message() == "a"));
        assert!(matches!(&frames[2], Frame::Event(r) if r.message() == "b"));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn disconnect_all_ends_every_stream() {
        let publisher = publisher(10, Duration::from_secs(60));
        let mut first = publisher.subscribe().unwrap();
        let mut second = publisher.subscribe().unwrap();

        assert_eq!(publisher.disconnect_all(), 2);
        for session in [&mut first, &mut second] {
            assert!(matches!(session.next_frame().await, Some(Frame::Snapshot(_))));
            assert!(session.next_frame().await.is_none());
            assert_eq!(session.state(), SessionState::Closed);
        }
    }

    #[tokio::test]
    async fn stream_yields_snapshot_first() {
        let publisher = publisher(10, Duration::from_secs(60));
        publisher.record(Level::Info, "boot", Attributes::new());

        let mut stream = Box::pin(publisher.subscribe().unwrap().into_stream());
        assert!(matches!(stream.next().await, Some(Frame::Snapshot(r)) if r.len() == 1));

        publisher.record(Level::Warn, "disk", Attributes::new());
        assert!(matches!(stream.next().await, Some(Frame::Event(r)) if r.message() == "disk"));

        drop(stream);
        assert_eq!(publisher.viewer_count(), 0);
    }
}
