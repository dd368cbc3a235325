//! Best-effort container orchestration metadata.
//!
//! When running as an ECS task the agent exposes task metadata over HTTP at
//! the URI in `ECS_CONTAINER_METADATA_URI_V4`. Anywhere else the variable is
//! unset and no request is made.

use std::time::Duration;

use async_trait::async_trait;
use deckhand_common::{DeckhandError, DeckhandResult};
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "cloud metadata";

/// Task identity reported by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Cluster name or ARN.
    #[serde(rename(deserialize = "Cluster"), default)]
    pub cluster: Option<String>,
    /// Task ARN.
    #[serde(rename(deserialize = "TaskARN"), default)]
    pub task_arn: Option<String>,
    /// Task definition family.
    #[serde(rename(deserialize = "Family"), default)]
    pub family: Option<String>,
    /// Task definition revision.
    #[serde(rename(deserialize = "Revision"), default)]
    pub revision: Option<String>,
    /// Availability zone the task runs in.
    #[serde(rename(deserialize = "AvailabilityZone"), default)]
    pub availability_zone: Option<String>,
}

/// Source of [`TaskMetadata`]. Absence is a normal outcome.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch metadata, or `None` when not running under an orchestrator or the
    /// endpoint does not answer in time.
    async fn fetch(&self) -> Option<TaskMetadata>;
}

/// ECS task metadata (v4 endpoint) client.
#[derive(Debug, Clone)]
pub struct EcsMetadataProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
    timeout: Duration,
}

impl EcsMetadataProvider {
    /// Environment variable holding the metadata endpoint.
    pub const ENDPOINT_ENV: &'static str = "ECS_CONTAINER_METADATA_URI_V4";

    /// Create a provider for an explicit endpoint, or none at all.
    #[must_use]
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        // The agent endpoint is link-local; never route it through a proxy.
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// Create a provider from [`Self::ENDPOINT_ENV`].
    #[must_use]
    pub fn from_env(timeout: Duration) -> Self {
        let endpoint = std::env::var(Self::ENDPOINT_ENV)
            .ok()
            .filter(|uri| !uri.trim().is_empty());
        if endpoint.is_none() {
            tracing::debug!("No ECS metadata endpoint, cloud metadata disabled");
        }
        Self::new(endpoint, timeout)
    }

    async fn fetch_task(&self, endpoint: &str) -> DeckhandResult<TaskMetadata> {
        let url = format!("{}/task", endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DeckhandError::unavailable(PROVIDER, e))?;

        response
            .json::<TaskMetadata>()
            .await
            .map_err(|e| DeckhandError::unavailable(PROVIDER, e))
    }
}

#[async_trait]
impl MetadataProvider for EcsMetadataProvider {
    async fn fetch(&self) -> Option<TaskMetadata> {
        let endpoint = self.endpoint.as_deref()?;

        match tokio::time::timeout(self.timeout, self.fetch_task(endpoint)).await {
            Ok(Ok(metadata)) => Some(metadata),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Cloud metadata fetch failed");
                None
            }
            Err(_) => {
                tracing::debug!(
                    timeout_ms = self.timeout.as_millis(),
                    "Cloud metadata fetch timed out"
                );
                None
            }
        }
    }
}
