//! Command dispatch
//!
//! `apply()` routes a [`Command`] to the matching coordinator mutator and
//! returns the cycle it started, if any. The caller decides where the engine
//! call runs.
//!
//! ## Example
//!
//! ```
//! use valstate_core::{apply, AttributeSnapshot, Command, Coordinator, CoordinatorConfig};
//! use valstate_core::engine::RuleEngine;
//!
//! let mut coordinator = Coordinator::new(
//!     AttributeSnapshot::new().with("name", "omar"),
//!     RuleEngine::new(),
//!     CoordinatorConfig::default(),
//! );
//!
//! let pending = apply(&mut coordinator, Command::SetShowErrors { show: true });
//! assert!(pending.is_none());
//! assert!(coordinator.show_errors());
//! ```

use crate::commands::Command;
use crate::coordinator::{Coordinator, PendingCycle};

/// Apply a command to a coordinator
pub fn apply(coordinator: &mut Coordinator, cmd: Command) -> Option<PendingCycle> {
    match cmd {
        Command::SetAttributes { attributes } => coordinator.set_attributes(attributes),
        Command::SetKnownErrors { errors } => Some(coordinator.set_known_errors(errors)),
        Command::SetShowErrors { show } => {
            coordinator.set_show_errors(show);
            None
        }
        Command::SetSchema { schema } => coordinator.set_schema(schema),
        Command::Reset { attributes } => Some(coordinator.reset(attributes)),
    }
}
