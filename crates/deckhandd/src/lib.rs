//! deckhandd - Deckhand demo service daemon.
//!
//! Serves a small dashboard, fake deploy/scale/rotate actions, and a live
//! feed of operational events over server-sent events.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod state;

pub use config::{Args, ServerConfig};
pub use metadata::{EcsMetadataProvider, MetadataProvider, TaskMetadata};
pub use metrics::SysinfoMetrics;
pub use state::{AppState, ServiceStatus};
