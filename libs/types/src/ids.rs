//! Identifier types for feed entities
//!
//! Event identifiers come from the upstream feed verbatim. They are opaque
//! strings, stable across polls, and serve as the reconciliation key.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a sporting event
///
/// Taken verbatim from the first field of an event line. Never rewritten
/// once an event enters the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new EventId from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Lets `HashMap<EventId, _>` be queried with a plain `&str`.
impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
