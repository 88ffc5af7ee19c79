//! valstate core - reconciled validation state for changing attributes
//!
//! This crate keeps one consistent error map for a set of attributes that
//! change over time, merging:
//! - errors computed by an external, asynchronous validation engine
//! - "known" errors injected by the caller (e.g. returned by a server),
//!   which survive revalidation only while the values they were reported
//!   against are unchanged
//!
//! Alongside the map it derives validity flags and the set of attributes
//! changed since the last reset. Engine calls are tracked by cycle token and
//! only the most recently started cycle is ever merged.

pub mod apply;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod matching;
pub mod model;
pub mod reconcile;
pub mod session;

// Re-export commonly used types
pub use apply::apply;
pub use commands::Command;
pub use config::{CoordinatorConfig, LapsePolicy, RejectionPolicy};
pub use coordinator::{
    CompletedCycle, Coordinator, CycleOutcome, PendingCycle, ValidationState,
};
pub use engine::{ValidationEngine, ValidationRequest};
pub use errors::{CoordinatorError, ExError, ExErrorKind, Result};
pub use model::{AttributeSnapshot, AttributeValue, SchemaSelector, ValidationErrors};
pub use session::SessionHandle;
pub use valstate_core_types::CycleId;
