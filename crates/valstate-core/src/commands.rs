//! Command inventory for every caller-facing mutation
//!
//! Commands are processed by [`crate::apply::apply`]. The session actor
//! receives them over a channel; direct users of `Coordinator` may call the
//! mutators instead.

use crate::model::{AttributeSnapshot, SchemaSelector, ValidationErrors};

#[derive(Debug, Clone)]
pub enum Command {
    /// Report the current attribute values
    SetAttributes { attributes: AttributeSnapshot },

    /// Replace the known-error registry
    SetKnownErrors { errors: ValidationErrors },

    /// Toggle the advisory display flag
    SetShowErrors { show: bool },

    /// Change the schema selector forwarded to the engine
    SetSchema { schema: Option<SchemaSelector> },

    /// Start over from new initial values
    Reset { attributes: AttributeSnapshot },
}

impl Command {
    /// Operation name used in logs
    pub fn op(&self) -> &'static str {
        match self {
            Command::SetAttributes { .. } => "set_attributes",
            Command::SetKnownErrors { .. } => "set_known_errors",
            Command::SetShowErrors { .. } => "set_show_errors",
            Command::SetSchema { .. } => "set_schema",
            Command::Reset { .. } => "reset",
        }
    }
}
