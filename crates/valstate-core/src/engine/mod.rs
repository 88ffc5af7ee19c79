//! Validation engine boundary
//!
//! The engine is an external collaborator: given a snapshot it produces a raw
//! error map, possibly slowly. `EngineAdapter` is the only caller the
//! coordinator uses; it turns a rejected call into a best-effort map so the
//! reconciler only ever sees data.

pub mod rules;

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use valstate_core_types::CycleId;

use crate::config::RejectionPolicy;
use crate::errors::{CoordinatorError, Result};
use crate::log_op_error;
use crate::model::{AttributeSnapshot, SchemaSelector, ValidationErrors};

pub use rules::{Rule, RuleEngine, DEFAULT_MESSAGE_TEMPLATE};

/// Everything the engine receives for one cycle
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    /// The attribute values to validate
    pub attributes: AttributeSnapshot,
    /// The baseline the coordinator was created or last reset with
    pub initial: AttributeSnapshot,
    /// Forwarded unchanged from the caller
    pub schema: Option<SchemaSelector>,
}

/// External validation engine
///
/// Implementations must be idempotent and free of side effects on
/// coordinator state. Returning `Err` is allowed; the adapter translates it
/// according to the configured `RejectionPolicy`.
#[async_trait]
pub trait ValidationEngine: Send + Sync {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationErrors>;
}

type EngineFn = dyn Fn(ValidationRequest) -> BoxFuture<'static, Result<ValidationErrors>> + Send + Sync;

/// Engine backed by a closure returning a boxed future
///
/// ```
/// use futures::FutureExt;
/// use valstate_core::engine::FnEngine;
/// use valstate_core::ValidationErrors;
///
/// let engine = FnEngine::new(|_request| async { Ok(ValidationErrors::new()) }.boxed());
/// # let _ = engine;
/// ```
pub struct FnEngine {
    f: Box<EngineFn>,
}

impl FnEngine {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ValidationRequest) -> BoxFuture<'static, Result<ValidationErrors>>
            + Send
            + Sync
            + 'static,
    {
        Self { f: Box::new(f) }
    }
}

#[async_trait]
impl ValidationEngine for FnEngine {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationErrors> {
        (self.f)(request).await
    }
}

/// Wraps an engine so that every call resolves with an error map
#[derive(Clone)]
pub struct EngineAdapter {
    engine: Arc<dyn ValidationEngine>,
    rejection: RejectionPolicy,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn ValidationEngine>, rejection: RejectionPolicy) -> Self {
        Self { engine, rejection }
    }

    /// Run the engine for `cycle`, translating a rejection into a fallback map
    pub async fn validate(&self, request: ValidationRequest, cycle: CycleId) -> ValidationErrors {
        let started = Instant::now();
        match self.engine.validate(request).await {
            Ok(errors) => errors,
            Err(err) => {
                let fallback = self.fallback(&err);
                log_op_error!(
                    "validate",
                    err,
                    duration_ms = started.elapsed().as_millis() as u64,
                    cycle = cycle.get()
                );
                fallback
            }
        }
    }

    fn fallback(&self, err: &CoordinatorError) -> ValidationErrors {
        match &self.rejection {
            RejectionPolicy::Empty => ValidationErrors::new(),
            RejectionPolicy::Sentinel { key } => {
                let mut errors = ValidationErrors::new();
                errors.push(key.clone(), err.to_string());
                errors
            }
        }
    }
}

impl std::fmt::Debug for EngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("rejection", &self.rejection)
            .finish_non_exhaustive()
    }
}
