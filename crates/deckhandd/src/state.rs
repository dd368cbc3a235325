//! Process-wide service state shared by every handler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use deckhand_events::{EventPublisher, Level, MetricsProvider, attributes};
use serde::Serialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::metadata::MetadataProvider;

/// Everything a handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    /// Server settings.
    pub config: Arc<ServerConfig>,
    /// Event history and live feed.
    pub publisher: EventPublisher,
    /// Process metrics source.
    pub metrics: Arc<dyn MetricsProvider>,
    /// Cloud metadata source.
    pub metadata: Arc<dyn MetadataProvider>,
    service: Arc<ServiceCounters>,
}

#[derive(Debug)]
struct ServiceCounters {
    replicas: AtomicU32,
    deploys: AtomicU64,
    secret_version: AtomicU64,
}

/// Externally visible demo service state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Service name.
    pub service: String,
    /// Deployed version label.
    pub version: String,
    /// Current replica count.
    pub replicas: u32,
    /// Number of deploys since startup.
    pub deploys: u64,
    /// Current credentials version.
    pub secret_version: u64,
    /// Attached live-feed viewers.
    pub viewers: usize,
}

impl AppState {
    /// Assemble the state.
    pub fn new(
        config: ServerConfig,
        publisher: EventPublisher,
        metrics: Arc<dyn MetricsProvider>,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        let service = ServiceCounters {
            replicas: AtomicU32::new(config.initial_replicas),
            deploys: AtomicU64::new(0),
            secret_version: AtomicU64::new(1),
        };

        Self {
            config: Arc::new(config),
            publisher,
            metrics,
            metadata,
            service: Arc::new(service),
        }
    }

    /// Current demo service state.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        let deploys = self.service.deploys.load(Ordering::SeqCst);
        ServiceStatus {
            service: self.config.service_name.clone(),
            version: version_label(deploys),
            replicas: self.service.replicas.load(Ordering::SeqCst),
            deploys,
            secret_version: self.service.secret_version.load(Ordering::SeqCst),
            viewers: self.publisher.viewer_count(),
        }
    }

    /// Roll out a new version.
    pub fn deploy(&self) -> ServiceStatus {
        let deploys = self.service.deploys.fetch_add(1, Ordering::SeqCst) + 1;
        let version = version_label(deploys);

        self.publisher.record(
            Level::Action,
            "deploy started",
            attributes([("version", json!(version))]),
        );
        self.publisher.record(
            Level::Info,
            "deploy complete",
            attributes([
                ("version", json!(version)),
                ("replicas", json!(self.service.replicas.load(Ordering::SeqCst))),
            ]),
        );

        tracing::info!(%version, "Deploy recorded");
        self.status()
    }

    /// Change the replica count, clamped into the allowed range.
    pub fn scale(&self, requested: i64) -> ServiceStatus {
        let to = u32::try_from(requested.clamp(
            i64::from(ServerConfig::MIN_REPLICAS),
            i64::from(ServerConfig::MAX_REPLICAS),
        ))
        .unwrap_or(ServerConfig::MIN_REPLICAS);

        if i64::from(to) != requested {
            self.publisher.record(
                Level::Warn,
                "replica request clamped",
                attributes([("requested", json!(requested)), ("applied", json!(to))]),
            );
        }

        let from = self.service.replicas.swap(to, Ordering::SeqCst);
        self.publisher.record(
            Level::Action,
            "scaled service",
            attributes([("from", json!(from)), ("to", json!(to))]),
        );

        tracing::info!(from, to, "Scale recorded");
        self.status()
    }

    /// Rotate the service credentials.
    pub fn rotate(&self) -> ServiceStatus {
        let secret_version = self.service.secret_version.fetch_add(1, Ordering::SeqCst) + 1;
        self.publisher.record(
            Level::Action,
            "credentials rotated",
            attributes([("secret_version", json!(secret_version))]),
        );
        self.status()
    }

    /// Record a simulated failure.
    pub fn fail(&self) -> ServiceStatus {
        self.publisher.record(
            Level::Error,
            "simulated failure",
            attributes([("source", json!("api"))]),
        );
        self.status()
    }
}

fn version_label(deploys: u64) -> String {
    format!("1.0.{deploys}")
}
