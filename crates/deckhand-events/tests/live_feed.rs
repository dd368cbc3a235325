//! Integration tests for the live event feed.

use std::sync::Arc;
use std::time::Duration;

use deckhand_events::{Attributes, EventPublisher, EventRecord, EventsConfig, Frame, Level};

fn publisher(capacity: usize) -> EventPublisher {
    EventPublisher::new(
        EventsConfig::default()
            .with_history_capacity(capacity)
            .with_keepalive_interval(Duration::from_secs(60)),
    )
    .unwrap()
}

fn messages(records: &[Arc<EventRecord>]) -> Vec<String> {
    records.iter().map(|r| r.message().to_string()).collect()
}

async fn expect_snapshot(session: &mut deckhand_events::ViewerSession) -> Vec<String> {
    match session.next_frame().await {
        Some(Frame::Snapshot(records)) => messages(&records),
        other => panic!("expected snapshot, got {other:?}"),
    }
}

async fn expect_event(session: &mut deckhand_events::ViewerSession) -> Arc<EventRecord> {
    match session.next_frame().await {
        Some(Frame::Event(record)) => record,
        other => panic!("expected event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bounded_history_with_live_tail() {
    let publisher = publisher(3);
    for message in ["a", "b", "c", "d"] {
        publisher.record(Level::Info, message, Attributes::new());
    }

    assert_eq!(messages(&publisher.recent(10)), ["b", "c", "d"]);

    let mut session = publisher.subscribe().unwrap();
    assert_eq!(expect_snapshot(&mut session).await, ["b", "c", "d"]);

    publisher.record(Level::Info, "e", Attributes::new());
    assert_eq!(expect_event(&mut session).await.message(), "e");
}

#[tokio::test]
async fn test_two_viewers_each_see_one_event() {
    let publisher = publisher(10);
    let mut first = publisher.subscribe().unwrap();
    let mut second = publisher.subscribe().unwrap();
    assert!(expect_snapshot(&mut first).await.is_empty());
    assert!(expect_snapshot(&mut second).await.is_empty());

    publisher.record(Level::Info, "x", Attributes::new());

    assert_eq!(expect_event(&mut first).await.message(), "x");
    assert_eq!(expect_event(&mut second).await.message(), "x");

    // Nothing else is queued for either viewer.
    for session in [&mut first, &mut second] {
        let extra = tokio::time::timeout(Duration::from_millis(50), session.next_frame()).await;
        assert!(extra.is_err(), "unexpected extra frame: {extra:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_no_gaps_or_duplicates() {
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 50;

    let publisher = EventPublisher::new(
        EventsConfig::default()
            .with_history_capacity(1000)
            .with_session_buffer(1000)
            .with_keepalive_interval(Duration::from_secs(60)),
    )
    .unwrap();

    for n in 0..10 {
        publisher.record(Level::Info, format!("early {n}"), Attributes::new());
    }

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let publisher = publisher.clone();
            tokio::spawn(async move {
                for n in 0..PER_PRODUCER {
                    publisher.record(Level::Action, format!("p{p}-{n}"), Attributes::new());
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    // Attach while producers are running.
    tokio::task::yield_now().await;
    let mut session = publisher.subscribe().unwrap();

    for producer in producers {
        producer.await.unwrap();
    }
    let total = 10 + PRODUCERS * PER_PRODUCER;

    let snapshot: Vec<u64> = match session.next_frame().await {
        Some(Frame::Snapshot(records)) => records.iter().map(|r| r.seq()).collect(),
        other => panic!("expected snapshot, got {other:?}"),
    };
    let replayed_up_to = snapshot.last().copied().unwrap_or(0);
    assert!(snapshot.windows(2).all(|w| w[1] == w[0] + 1));

    let mut live = Vec::new();
    while live.last().copied().unwrap_or(replayed_up_to) < total {
        live.push(expect_event(&mut session).await.seq());
    }

    let expected: Vec<u64> = (replayed_up_to + 1..=total).collect();
    assert_eq!(live, expected);
}

#[tokio::test]
async fn test_session_limit() {
    let publisher = EventPublisher::new(EventsConfig::default().with_max_sessions(Some(1))).unwrap();

    let first = publisher.subscribe().unwrap();
    assert!(publisher.subscribe().is_err());

    drop(first);
    assert!(publisher.subscribe().is_ok());
}

#[tokio::test]
async fn test_resubscribe_gets_fresh_snapshot() {
    let publisher = publisher(5);
    publisher.record(Level::Info, "one", Attributes::new());

    let mut session = publisher.subscribe().unwrap();
    assert_eq!(expect_snapshot(&mut session).await, ["one"]);
    session.close();

    publisher.record(Level::Error, "two", Attributes::new());

    let mut again = publisher.subscribe().unwrap();
    assert_ne!(again.id(), session.id());
    assert_eq!(expect_snapshot(&mut again).await, ["one", "two"]);
}
