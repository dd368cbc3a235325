//! # deckhand-common
//!
//! Shared utilities and types for the Deckhand demo service.
//!
//! This crate provides common functionality used across all Deckhand crates:
//! - Viewer session ID generation
//! - Byte quantity formatting for metric attributes
//! - Common error types

#![warn(missing_docs)]

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DeckhandError, DeckhandResult};
pub use id::SessionId;
pub use quantity::ByteQuantity;
