//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across coordinator, engine
//! adapter and session logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_SESSION_ID: &str = "session_id";

// Reconciliation identifiers
pub const FIELD_CYCLE: &str = "cycle";
pub const FIELD_CURRENT_CYCLE: &str = "current";
pub const FIELD_KEY: &str = "key";

// Collection sizes
pub const FIELD_ERRORS_LEN: &str = "errors";
pub const FIELD_KNOWN_LEN: &str = "known";
pub const FIELD_LAPSED_LEN: &str = "lapsed";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_DISCARDED: &str = "discarded";
