//! Daemon configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use deckhand_common::{DeckhandError, DeckhandResult};
use deckhand_events::EventsConfig;

/// Command-line arguments, each with an environment fallback.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// HTTP port to listen on
    #[arg(long, env = "PORT", default_value_t = 80)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "DECKHAND_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Service name shown on the dashboard
    #[arg(long, env = "DECKHAND_SERVICE_NAME", default_value = "deckhand")]
    pub service_name: String,

    /// Replica count reported at startup
    #[arg(long, env = "DECKHAND_REPLICAS", default_value_t = 2)]
    pub replicas: u32,

    /// Number of events kept in history
    #[arg(long, env = "DECKHAND_HISTORY_CAPACITY", default_value_t = 500)]
    pub history_capacity: usize,

    /// Number of events replayed to a new viewer
    #[arg(long, env = "DECKHAND_SNAPSHOT_LEN", default_value_t = 100)]
    pub snapshot_len: usize,

    /// Upper bound for `GET /api/logs?limit=`
    #[arg(long, env = "DECKHAND_RECENT_LIMIT", default_value_t = 200)]
    pub recent_limit: usize,

    /// Seconds between keep-alive frames on idle streams
    #[arg(long, env = "DECKHAND_KEEPALIVE_SECS", default_value_t = 10)]
    pub keepalive_secs: u64,

    /// Seconds between heartbeat events
    #[arg(long, env = "DECKHAND_HEARTBEAT_SECS", default_value_t = 15)]
    pub heartbeat_secs: u64,

    /// Outbound queue depth per viewer before it is dropped as lagging
    #[arg(long, env = "DECKHAND_SESSION_BUFFER", default_value_t = 256)]
    pub session_buffer: usize,

    /// Maximum concurrent viewers (unlimited if unset)
    #[arg(long, env = "DECKHAND_MAX_SESSIONS")]
    pub max_sessions: Option<usize>,

    /// Timeout for the cloud metadata endpoint, in milliseconds
    #[arg(long, env = "DECKHAND_METADATA_TIMEOUT_MS", default_value_t = 1500)]
    pub metadata_timeout_ms: u64,

    /// Emit logs as JSON
    #[arg(long, env = "DECKHAND_LOG_JSON")]
    pub log_json: bool,
}

impl Args {
    /// Event distribution settings.
    #[must_use]
    pub const fn events_config(&self) -> EventsConfig {
        EventsConfig {
            history_capacity: self.history_capacity,
            snapshot_len: self.snapshot_len,
            recent_limit: self.recent_limit,
            keepalive_interval: Duration::from_secs(self.keepalive_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_secs),
            session_buffer: self.session_buffer,
            max_sessions: self.max_sessions,
        }
    }

    /// HTTP server settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings do not validate.
    pub fn server_config(&self) -> DeckhandResult<ServerConfig> {
        let config = ServerConfig {
            addr: SocketAddr::new(self.bind, self.port),
            service_name: self.service_name.clone(),
            initial_replicas: self.replicas,
            metadata_timeout: Duration::from_millis(self.metadata_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub addr: SocketAddr,
    /// Service name shown on the dashboard.
    pub service_name: String,
    /// Replica count at startup.
    pub initial_replicas: u32,
    /// Timeout for the cloud metadata endpoint.
    pub metadata_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 80),
            service_name: "deckhand".to_string(),
            initial_replicas: 2,
            metadata_timeout: Duration::from_millis(1500),
        }
    }
}

impl ServerConfig {
    /// Lowest replica count the scale action accepts.
    pub const MIN_REPLICAS: u32 = 1;
    /// Highest replica count the scale action accepts.
    pub const MAX_REPLICAS: u32 = 10;

    /// Set the listen address.
    #[must_use]
    pub const fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty service name, an initial
    /// replica count outside the scale range, or a zero metadata timeout.
    pub fn validate(&self) -> DeckhandResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(DeckhandError::config("service name must not be empty"));
        }
        if !(Self::MIN_REPLICAS..=Self::MAX_REPLICAS).contains(&self.initial_replicas) {
            return Err(DeckhandError::config(format!(
                "replicas must be between {} and {}",
                Self::MIN_REPLICAS,
                Self::MAX_REPLICAS
            )));
        }
        if self.metadata_timeout.is_zero() {
            return Err(DeckhandError::config("metadata timeout must be non-zero"));
        }
        Ok(())
    }
}
