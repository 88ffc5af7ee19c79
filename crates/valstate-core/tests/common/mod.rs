use valstate_core::engine::{Rule, RuleEngine};
use valstate_core::{
    AttributeSnapshot, Coordinator, CoordinatorConfig, CycleOutcome, PendingCycle,
    ValidationErrors,
};

#[allow(dead_code)]
pub const NAME_IS_DAVID: &str = "name failed nameIsDavid validation";
#[allow(dead_code)]
pub const NAME_IS_ADMIN: &str = "name failed nameIsAdmin validation";

/// Engine with the two name rules used throughout the tests
///
/// - `nameIsDavid`: passes when the name equals its initial value or "David"
/// - `nameIsAdmin` (schema "admin"): passes only for "Admin"
#[allow(dead_code)]
pub fn name_engine() -> RuleEngine {
    let mut engine = RuleEngine::new();
    engine
        .register(Rule::new("name", "nameIsDavid", |name, initial| {
            initial.is_some_and(|i| i.is_identical(name)) || name.as_str() == Some("David")
        }))
        .unwrap();
    engine
        .register(
            Rule::new("name", "nameIsAdmin", |name, _| name.as_str() == Some("Admin"))
                .in_schema("admin"),
        )
        .unwrap();
    engine
}

#[allow(dead_code)]
pub fn named(name: &str) -> AttributeSnapshot {
    AttributeSnapshot::new().with("name", name)
}

/// Coordinator with baseline `{name: "omar"}` and the name engine
#[allow(dead_code)]
pub fn coordinator() -> Coordinator {
    coordinator_with(CoordinatorConfig::default())
}

#[allow(dead_code)]
pub fn coordinator_with(config: CoordinatorConfig) -> Coordinator {
    Coordinator::new(named("omar"), name_engine(), config)
}

/// Coordinator whose engine never reports anything
#[allow(dead_code)]
pub fn silent_coordinator(initial: AttributeSnapshot, config: CoordinatorConfig) -> Coordinator {
    Coordinator::new(initial, RuleEngine::new(), config)
}

/// Resolve and complete a cycle inline, if one was started
#[allow(dead_code)]
pub async fn settle(
    coordinator: &mut Coordinator,
    pending: Option<PendingCycle>,
) -> Option<CycleOutcome> {
    match pending {
        Some(pending) => Some(coordinator.run(pending).await),
        None => None,
    }
}

/// Shorthand for a one-key error map
#[allow(dead_code)]
pub fn errors_for(key: &str, messages: &[&str]) -> ValidationErrors {
    ValidationErrors::new().with(key, messages.iter().copied())
}
