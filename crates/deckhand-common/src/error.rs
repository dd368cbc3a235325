//! Common error types for Deckhand.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`DeckhandError`].
pub type DeckhandResult<T> = Result<T, DeckhandError>;

/// Common errors across Deckhand.
#[derive(Error, Diagnostic, Debug)]
pub enum DeckhandError {
    /// Too many viewers are attached to the live feed.
    #[error("Viewer limit reached: {limit} sessions already attached")]
    #[diagnostic(
        code(deckhand::session::limit),
        help("Raise --max-sessions or wait for an existing viewer to disconnect")
    )]
    SessionLimit {
        /// The configured session cap.
        limit: usize,
    },

    /// An external collaborator (metrics, cloud metadata) could not be reached.
    #[error("{provider} unavailable: {message}")]
    #[diagnostic(code(deckhand::provider::unavailable))]
    Unavailable {
        /// Which provider failed.
        provider: String,
        /// The error message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(deckhand::config))]
    Config {
        /// The error message.
        message: String,
    },
}

impl DeckhandError {
    /// Build a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build a provider-unavailable error.
    pub fn unavailable(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.to_string(),
        }
    }
}
