//! Core types shared across the valstate crates
//!
//! - **Cycle identity**: CycleId, the reconciliation cycle token
//! - **Correlation**: SessionId for session actor logs
//! - **Schema constants**: Canonical field keys and event names

pub mod cycle;
pub mod schema;

pub use cycle::{CycleId, SessionId};
