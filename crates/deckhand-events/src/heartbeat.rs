//! Periodic heartbeat events.

use std::sync::Arc;
use std::time::Duration;

use deckhand_common::ByteQuantity;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::publisher::EventPublisher;
use crate::record::{Attributes, EventRecord, Level, attributes};

/// A reading of process and host health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    /// Host name.
    pub hostname: String,
    /// Operating system and architecture, e.g. `linux/x86_64`.
    pub platform: String,
    /// Seconds since the process started.
    pub uptime_secs: u64,
    /// Resident memory of this process in bytes.
    pub memory_rss_bytes: u64,
    /// Total host memory in bytes.
    pub memory_total_bytes: u64,
    /// 1, 5 and 15 minute load averages.
    pub load: [f64; 3],
}

/// Source of [`ProcessMetrics`]. May be unavailable at any time.
pub trait MetricsProvider: Send + Sync {
    /// Take a reading, or `None` if metrics cannot be gathered right now.
    fn sample(&self) -> Option<ProcessMetrics>;
}

/// Heartbeat attributes for a reading; every field is `null` without one.
#[must_use]
pub fn heartbeat_attributes(metrics: Option<&ProcessMetrics>) -> Attributes {
    metrics.map_or_else(
        || {
            attributes([
                ("uptime", Value::Null),
                ("memory", Value::Null),
                ("load", Value::Null),
            ])
        },
        |m| {
            attributes([
                ("uptime", json!(m.uptime_secs)),
                (
                    "memory",
                    json!(ByteQuantity::from_bytes(m.memory_rss_bytes).to_string()),
                ),
                ("load", json!(m.load[0])),
            ])
        },
    )
}

/// Records an `info` "heartbeat" event at a fixed interval.
pub struct HeartbeatEmitter {
    publisher: EventPublisher,
    provider: Arc<dyn MetricsProvider>,
    interval: Duration,
}

impl HeartbeatEmitter {
    /// Create an emitter using the publisher's configured interval.
    #[must_use]
    pub fn new(publisher: EventPublisher, provider: Arc<dyn MetricsProvider>) -> Self {
        let interval = publisher.config().heartbeat_interval;
        Self {
            publisher,
            provider,
            interval,
        }
    }

    /// Override the interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Record a single heartbeat now, sampling on the calling thread.
    pub fn beat(&self) -> Arc<EventRecord> {
        self.record_beat(self.provider.sample())
    }

    fn record_beat(&self, metrics: Option<ProcessMetrics>) -> Arc<EventRecord> {
        if metrics.is_none() {
            tracing::debug!("Metrics unavailable, recording empty heartbeat");
        }
        self.publisher.record(
            Level::Info,
            "heartbeat",
            heartbeat_attributes(metrics.as_ref()),
        )
    }

    /// Run the heartbeat loop on the tokio runtime until the task is aborted.
    ///
    /// The first beat happens one interval after spawning; missed ticks are
    /// skipped rather than burst. Providers are sampled on the blocking pool.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(interval_secs = self.interval.as_secs(), "Heartbeat started");
            loop {
                ticker.tick().await;

                let provider = Arc::clone(&self.provider);
                let metrics = tokio::task::spawn_blocking(move || provider.sample())
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Metrics sampling task failed");
                        None
                    });
                self.record_beat(metrics);
            }
        })
    }
}
