//! Viewer session ID generation.

use std::fmt;

/// A viewer session ID.
///
/// Session IDs are 12 lowercase hex characters derived from a UUID v4.
/// They only need to be unique among the sessions alive at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Length of a session ID in characters.
    pub const LENGTH: usize = 12;

    /// Generate a new random session ID.
    #[must_use]
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        Self(hex::encode(&uuid.as_bytes()[..Self::LENGTH / 2]))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
