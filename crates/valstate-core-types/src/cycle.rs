//! Identity types for reconciliation cycles and session actors
//!
//! A `CycleId` is the token captured when a reconciliation cycle starts and
//! compared again when its engine call completes. A `SessionId` tags every
//! log line emitted by one session actor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monotonically increasing reconciliation cycle token
///
/// `CycleId::default()` is the generation before any cycle has started.
/// Each started cycle takes `current.next()`, so a completed cycle is current
/// only while no newer cycle has been started.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CycleId(u64);

impl CycleId {
    /// Create a token from a raw generation number
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// The token following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw generation number
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cycle:{}", self.0)
    }
}

/// Unique identifier for a session actor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random SessionId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
