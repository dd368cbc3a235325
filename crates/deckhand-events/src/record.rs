//! Event record definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured extra fields attached to a record.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Build [`Attributes`] from key/value pairs.
#[must_use]
pub fn attributes<const N: usize>(pairs: [(&str, serde_json::Value); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Event severity or category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Routine information, including heartbeats.
    Info,
    /// A user-triggered operation.
    Action,
    /// Something worth attention.
    Warn,
    /// A failure.
    Error,
}

impl Level {
    /// Lowercase name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Action => "action",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "action" => Ok(Self::Action),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// One operational event.
///
/// Records are created by the publisher and shared behind `Arc`; there is no
/// way to change one after it has been recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    seq: u64,
    timestamp: DateTime<Utc>,
    level: Level,
    message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: Attributes,
}

impl EventRecord {
    pub(crate) fn new(seq: u64, level: Level, message: String, attributes: Attributes) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            level,
            message,
            attributes,
        }
    }

    /// Publish-order sequence number, starting at 1.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// When the record was created.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Severity or category.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured extra fields.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
