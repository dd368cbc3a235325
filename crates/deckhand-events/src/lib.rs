//! # deckhand-events
//!
//! Live operational-event distribution for Deckhand.
//!
//! A single [`EventPublisher`] owns a bounded history of recent
//! [`EventRecord`]s and a registry of connected viewers. Every recorded
//! event is appended to the history and then fanned out to each viewer's
//! outbound queue without ever waiting on a slow viewer.
//!
//! A [`ViewerSession`] is attached through [`EventPublisher::subscribe`]:
//! it first yields a [`Frame::Snapshot`] of recent history, then live
//! [`Frame::Event`]s interleaved with [`Frame::KeepAlive`] ticks, until the
//! viewer goes away.
//!
//! The [`HeartbeatEmitter`] periodically records an `info` event carrying
//! process health readings from a [`MetricsProvider`].

#![warn(missing_docs)]

mod config;
mod heartbeat;
mod history;
mod publisher;
mod record;
mod registry;
mod session;
mod sink;

pub use config::EventsConfig;
pub use heartbeat::{HeartbeatEmitter, MetricsProvider, ProcessMetrics, heartbeat_attributes};
pub use publisher::{EventPublisher, clamp_limit};
pub use record::{Attributes, EventRecord, Level, ParseLevelError, attributes};
pub use registry::BroadcastRegistry;
pub use session::{Frame, SessionState, ViewerSession};
pub use sink::{DeliveryError, EventSink};
