//! Coordinator configuration
//!
//! Loaded from TOML or built in code. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! lapse = "restorable"
//!
//! [rejection]
//! mode = "sentinel"
//! key = "base"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// What happens to a known error once its match breaks on an applied cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapsePolicy {
    /// Retired until the registry is set again
    #[default]
    Sticky,
    /// Returns whenever the captured value(s) match again
    Restorable,
}

/// How a rejected engine call is turned into an error map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// Treat the cycle as producing no computed errors
    #[default]
    Empty,
    /// Report the rejection message under `key`
    Sentinel { key: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub lapse: LapsePolicy,
    pub rejection: RejectionPolicy,
}

impl CoordinatorConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::InvalidConfig` when the document is not
    /// valid TOML or names an unknown policy.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    #[must_use]
    pub fn with_lapse(mut self, lapse: LapsePolicy) -> Self {
        self.lapse = lapse;
        self
    }

    #[must_use]
    pub fn with_rejection(mut self, rejection: RejectionPolicy) -> Self {
        self.rejection = rejection;
        self
    }
}
