//! Event distribution configuration.

use std::time::Duration;

use deckhand_common::{DeckhandError, DeckhandResult};

/// Configuration for the event history and live feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsConfig {
    /// Maximum number of records kept in history.
    pub history_capacity: usize,
    /// Number of records replayed to a viewer on attach.
    pub snapshot_len: usize,
    /// Upper bound for pull-style `recent` queries over HTTP.
    pub recent_limit: usize,
    /// Interval between keep-alive frames on an idle viewer stream.
    pub keepalive_interval: Duration,
    /// Interval between heartbeat events.
    pub heartbeat_interval: Duration,
    /// Depth of each viewer's outbound queue.
    pub session_buffer: usize,
    /// Optional cap on concurrently attached viewers.
    pub max_sessions: Option<usize>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            history_capacity: 500,
            snapshot_len: 100,
            recent_limit: 200,
            keepalive_interval: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(15),
            session_buffer: 256,
            max_sessions: None,
        }
    }
}

impl EventsConfig {
    /// Set the history capacity.
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the number of records replayed on attach.
    #[must_use]
    pub const fn with_snapshot_len(mut self, len: usize) -> Self {
        self.snapshot_len = len;
        self
    }

    /// Set the bound for pull-style queries.
    #[must_use]
    pub const fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Set the keep-alive interval.
    #[must_use]
    pub const fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the per-viewer outbound queue depth.
    #[must_use]
    pub const fn with_session_buffer(mut self, depth: usize) -> Self {
        self.session_buffer = depth;
        self
    }

    /// Cap the number of concurrently attached viewers.
    #[must_use]
    pub const fn with_max_sessions(mut self, max: Option<usize>) -> Self {
        self.max_sessions = max;
        self
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero capacities or intervals.
    pub fn validate(&self) -> DeckhandResult<()> {
        if self.history_capacity == 0 {
            return Err(DeckhandError::config("history capacity must be at least 1"));
        }
        if self.session_buffer == 0 {
            return Err(DeckhandError::config("session buffer must be at least 1"));
        }
        if self.keepalive_interval.is_zero() {
            return Err(DeckhandError::config("keep-alive interval must be non-zero"));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(DeckhandError::config("heartbeat interval must be non-zero"));
        }
        if self.max_sessions == Some(0) {
            return Err(DeckhandError::config(
                "max sessions must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EventsConfig::default();
        assert_eq!(config.history_capacity, 500);
        assert_eq!(config.snapshot_len, 100);
        assert_eq!(config.recent_limit, 200);
        assert_eq!(config.keepalive_interval, Duration::from_secs(10));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
        assert!(config.max_sessions.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_pattern() {
        let config = EventsConfig::default()
            .with_history_capacity(3)
            .with_snapshot_len(2)
            .with_keepalive_interval(Duration::from_millis(50))
            .with_max_sessions(Some(4));

        assert_eq!(config.history_capacity, 3);
        assert_eq!(config.snapshot_len, 2);
        assert_eq!(config.keepalive_interval, Duration::from_millis(50));
        assert_eq!(config.max_sessions, Some(4));
    }

    #[test]
    fn rejects_degenerate_values() {
        assert!(
            EventsConfig::default()
                .with_history_capacity(0)
                .validate()
                .is_err()
        );
        assert!(
            EventsConfig::default()
                .with_session_buffer(0)
                .validate()
                .is_err()
        );
        assert!(
            EventsConfig::default()
                .with_heartbeat_interval(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            EventsConfig::default()
                .with_max_sessions(Some(0))
                .validate()
                .is_err()
        );
    }
}
