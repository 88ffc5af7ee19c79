//! Validation state coordinator
//!
//! Owns the attribute snapshot, baseline, known-error registry, match
//! snapshots and the exposed error map. Every change that needs revalidation
//! returns a [`PendingCycle`]: the caller drives the engine call (awaiting it
//! inline, or on another task) and hands the [`CompletedCycle`] back through
//! [`Coordinator::complete_cycle`].
//!
//! ## Most-recent-wins
//!
//! Each started cycle takes a fresh [`CycleId`]. A completed cycle is merged
//! only if its id is still the coordinator's current generation; anything
//! older is discarded without touching state. Reset bumps the generation too,
//! so nothing started before a reset can land after it.
//!
//! ## Example
//!
//! ```
//! use valstate_core::engine::{Rule, RuleEngine};
//! use valstate_core::{AttributeSnapshot, Coordinator, CoordinatorConfig};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = RuleEngine::new()
//!     .with_rule(Rule::new("name", "nameIsDavid", |name, _| name.as_str() == Some("David")))
//!     .unwrap();
//! let mut coordinator = Coordinator::new(
//!     AttributeSnapshot::new().with("name", "David"),
//!     engine,
//!     CoordinatorConfig::default(),
//! );
//!
//! let pending = coordinator.set_attributes(AttributeSnapshot::new().with("name", "robert"));
//! coordinator.run(pending.unwrap()).await;
//! assert!(coordinator.is_invalid());
//! # });
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use valstate_core_types::schema::EVENT_DISCARDED;
use valstate_core_types::CycleId;

use crate::config::{CoordinatorConfig, LapsePolicy};
use crate::engine::{EngineAdapter, ValidationEngine, ValidationRequest};
use crate::matching::MatchStore;
use crate::model::{AttributeSnapshot, SchemaSelector, ValidationErrors};
use crate::reconcile::{reconcile, Reconciliation};
use crate::{log_op_end, log_op_start};

/// Read-only view of everything the coordinator exposes
#[derive(Debug, Clone, Serialize)]
pub struct ValidationState {
    pub errors: ValidationErrors,
    pub is_valid: bool,
    pub is_invalid: bool,
    pub changed_attributes: AttributeSnapshot,
    pub there_are_changes: bool,
    pub show_errors: bool,
    /// Latest started cycle
    pub cycle: CycleId,
    /// Whether the latest started cycle has been applied
    pub settled: bool,
}

/// A started cycle whose engine call has not run yet
///
/// Holds copies of everything the merge will need, so it can be resolved on
/// another task while the coordinator keeps accepting changes.
#[must_use = "a pending cycle does nothing until resolved and completed"]
#[derive(Debug)]
pub struct PendingCycle {
    cycle: CycleId,
    request: ValidationRequest,
    known: ValidationErrors,
    matches: MatchStore,
    engine: EngineAdapter,
}

impl PendingCycle {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn request(&self) -> &ValidationRequest {
        &self.request
    }

    /// Run the engine call
    pub async fn resolve(self) -> CompletedCycle {
        let computed = self
            .engine
            .validate(self.request.clone(), self.cycle)
            .await;
        CompletedCycle {
            cycle: self.cycle,
            attributes: self.request.attributes,
            known: self.known,
            matches: self.matches,
            computed,
        }
    }
}

/// A cycle whose engine call has resolved, ready to be merged
#[derive(Debug)]
pub struct CompletedCycle {
    cycle: CycleId,
    attributes: AttributeSnapshot,
    known: ValidationErrors,
    matches: MatchStore,
    computed: ValidationErrors,
}

impl CompletedCycle {
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// The engine's output before known errors are merged
    pub fn computed(&self) -> &ValidationErrors {
        &self.computed
    }
}

/// What `complete_cycle` did with a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Merged and exposed; `lapsed` lists known-error keys whose match broke
    Applied { cycle: CycleId, lapsed: Vec<String> },
    /// Superseded by `current`; nothing changed
    Discarded { cycle: CycleId, current: CycleId },
}

impl CycleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CycleOutcome::Applied { .. })
    }
}

#[derive(Debug)]
pub struct Coordinator {
    engine: EngineAdapter,
    config: CoordinatorConfig,
    baseline: AttributeSnapshot,
    attributes: AttributeSnapshot,
    schema: Option<SchemaSelector>,
    known: ValidationErrors,
    matches: MatchStore,
    errors: ValidationErrors,
    show_errors: bool,
    generation: CycleId,
    applied: CycleId,
}

impl Coordinator {
    /// Create a coordinator whose baseline is `initial`
    ///
    /// No cycle is started; call [`Coordinator::revalidate`] for the first
    /// validation.
    pub fn new(
        initial: AttributeSnapshot,
        engine: impl ValidationEngine + 'static,
        config: CoordinatorConfig,
    ) -> Self {
        Self::with_engine(initial, Arc::new(engine), config)
    }

    /// Like [`Coordinator::new`] for an engine that is already shared
    pub fn with_engine(
        initial: AttributeSnapshot,
        engine: Arc<dyn ValidationEngine>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            engine: EngineAdapter::new(engine, config.rejection.clone()),
            config,
            baseline: initial.clone(),
            attributes: initial,
            schema: None,
            known: ValidationErrors::new(),
            matches: MatchStore::new(),
            errors: ValidationErrors::new(),
            show_errors: false,
            generation: CycleId::default(),
            applied: CycleId::default(),
        }
    }

    /// Builder-style initial schema selector
    #[must_use]
    pub fn with_schema(mut self, schema: Option<SchemaSelector>) -> Self {
        self.schema = schema;
        self
    }

    // ========== Mutators ==========

    /// Report the current attribute values
    ///
    /// Returns `None` when the submission carries the same keys with
    /// identical values as the current snapshot.
    pub fn set_attributes(&mut self, attributes: AttributeSnapshot) -> Option<PendingCycle> {
        if attributes.is_identical(&self.attributes) {
            return None;
        }
        self.attributes = attributes;
        Some(self.start_cycle())
    }

    /// Replace the known-error registry wholesale
    ///
    /// Match snapshots are recomputed against the current attributes right
    /// away, before the new cycle is started.
    pub fn set_known_errors(&mut self, known: ValidationErrors) -> PendingCycle {
        self.matches = MatchStore::capture(&known, &self.attributes);
        self.known = known;
        tracing::debug!(
            component = module_path!(),
            op = "set_known_errors",
            known = self.known.len(),
            extra = self
                .known
                .keys()
                .filter(|key| !self.attributes.contains(key))
                .count(),
        );
        self.start_cycle()
    }

    /// Change the schema selector forwarded to the engine
    pub fn set_schema(&mut self, schema: Option<SchemaSelector>) -> Option<PendingCycle> {
        if schema == self.schema {
            return None;
        }
        self.schema = schema;
        Some(self.start_cycle())
    }

    pub fn set_show_errors(&mut self, show: bool) {
        self.show_errors = show;
    }

    /// Start over from `initial`
    ///
    /// Replaces baseline and attributes, clears errors, known errors, match
    /// snapshots and `show_errors`, and starts a fresh cycle. Cycles started
    /// before the reset are discarded when they complete.
    pub fn reset(&mut self, initial: AttributeSnapshot) -> PendingCycle {
        self.baseline = initial.clone();
        self.attributes = initial;
        self.errors = ValidationErrors::new();
        self.known = ValidationErrors::new();
        self.matches.clear();
        self.show_errors = false;
        tracing::debug!(
            component = module_path!(),
            op = "reset",
            superseded = self.generation.get(),
        );
        self.start_cycle()
    }

    /// Start a cycle for the current inputs without any change
    pub fn revalidate(&mut self) -> PendingCycle {
        self.start_cycle()
    }

    fn start_cycle(&mut self) -> PendingCycle {
        self.generation = self.generation.next();
        PendingCycle {
            cycle: self.generation,
            request: ValidationRequest {
                attributes: self.attributes.clone(),
                initial: self.baseline.clone(),
                schema: self.schema.clone(),
            },
            known: self.known.clone(),
            matches: self.matches.clone(),
            engine: self.engine.clone(),
        }
    }

    // ========== Cycle completion ==========

    /// Merge a completed cycle if it is still the current one
    pub fn complete_cycle(&mut self, completed: CompletedCycle) -> CycleOutcome {
        if completed.cycle != self.generation {
            tracing::warn!(
                component = module_path!(),
                op = "reconcile",
                event = EVENT_DISCARDED,
                cycle = completed.cycle.get(),
                current = self.generation.get(),
            );
            return CycleOutcome::Discarded {
                cycle: completed.cycle,
                current: self.generation,
            };
        }

        let started = Instant::now();
        log_op_start!(
            "reconcile",
            cycle = completed.cycle.get(),
            known = completed.known.len()
        );

        let Reconciliation { errors, lapsed } = reconcile(
            completed.computed,
            &completed.known,
            &completed.matches,
            &completed.attributes,
        );
        if self.config.lapse == LapsePolicy::Sticky {
            self.matches.lapse(lapsed.iter().map(String::as_str));
        }
        self.errors = errors;
        self.applied = completed.cycle;

        log_op_end!(
            "reconcile",
            duration_ms = started.elapsed().as_millis() as u64,
            cycle = completed.cycle.get(),
            errors = self.errors.len(),
            lapsed = lapsed.len()
        );

        CycleOutcome::Applied {
            cycle: completed.cycle,
            lapsed,
        }
    }

    /// Resolve `pending` inline and complete it
    pub async fn run(&mut self, pending: PendingCycle) -> CycleOutcome {
        let completed = pending.resolve().await;
        self.complete_cycle(completed)
    }

    // ========== Read-only surface ==========

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn changed_attributes(&self) -> AttributeSnapshot {
        self.attributes.changed_from(&self.baseline)
    }

    pub fn there_are_changes(&self) -> bool {
        !self.changed_attributes().is_empty()
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    pub fn attributes(&self) -> &AttributeSnapshot {
        &self.attributes
    }

    pub fn baseline(&self) -> &AttributeSnapshot {
        &self.baseline
    }

    pub fn schema(&self) -> Option<&SchemaSelector> {
        self.schema.as_ref()
    }

    pub fn known_errors(&self) -> &ValidationErrors {
        &self.known
    }

    pub fn match_snapshots(&self) -> &MatchStore {
        &self.matches
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Latest started cycle
    pub fn current_cycle(&self) -> CycleId {
        self.generation
    }

    /// Whether the latest started cycle has been applied
    pub fn is_settled(&self) -> bool {
        self.applied == self.generation
    }

    pub fn state(&self) -> ValidationState {
        let changed_attributes = self.changed_attributes();
        ValidationState {
            errors: self.errors.clone(),
            is_valid: self.is_valid(),
            is_invalid: self.is_invalid(),
            there_are_changes: !changed_attributes.is_empty(),
            changed_attributes,
            show_errors: self.show_errors,
            cycle: self.generation,
            settled: self.is_settled(),
        }
    }
}
