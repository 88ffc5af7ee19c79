//! Form Validation Demo
//!
//! Replays a small sign-up form against the coordinator, first driving
//! cycles inline and then through a session actor.
//!
//! Key concepts illustrated:
//! 1. Computed errors from a rule engine
//! 2. Known errors surviving while their values are unchanged
//! 3. Changed attributes relative to the baseline
//! 4. Most-recent-wins across overlapping cycles
//! 5. Reset

use valstate_core::engine::{Rule, RuleEngine};
use valstate_core::logging_facility::{init, Profile};
use valstate_core::{
    apply, AttributeSnapshot, Command, Coordinator, CoordinatorConfig, SessionHandle,
    ValidationErrors,
};

fn engine() -> Result<RuleEngine, Box<dyn std::error::Error>> {
    Ok(RuleEngine::new()
        .with_rule(Rule::new("name", "nameIsDavid", |name, initial| {
            initial.is_some_and(|i| i.is_identical(name)) || name.as_str() == Some("David")
        }))?
        .with_rule(
            Rule::new("name", "nameIsAdmin", |name, _| name.as_str() == Some("Admin"))
                .in_schema("admin"),
        )?)
}

fn named(name: &str) -> AttributeSnapshot {
    AttributeSnapshot::new().with("name", name)
}

fn show(label: &str, coordinator: &Coordinator) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{:<28} errors={} changed={} valid={}",
        label,
        serde_json::to_string(coordinator.errors())?,
        serde_json::to_string(&coordinator.changed_attributes())?,
        coordinator.is_valid()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== Validation State Demo ===\n");

    // ===== Part 1: Inline cycles =====
    println!("## Part 1: Inline cycles\n");

    let mut coordinator = Coordinator::new(named("omar"), engine()?, CoordinatorConfig::default());
    let initial = coordinator.revalidate();
    coordinator.run(initial).await;
    show("initial", &coordinator)?;

    if let Some(pending) = apply(&mut coordinator, Command::SetAttributes { attributes: named("David") }) {
        coordinator.run(pending).await;
    }
    show("name = David", &coordinator)?;

    if let Some(pending) = coordinator.set_attributes(named("robert")) {
        coordinator.run(pending).await;
    }
    show("name = robert", &coordinator)?;

    let server_errors = ValidationErrors::from_json_str(r#"{"other": ["Extra errors"]}"#)?;
    let pending = coordinator.set_known_errors(server_errors);
    coordinator.run(pending).await;
    show("server reported 'other'", &coordinator)?;

    if let Some(pending) = coordinator.set_attributes(named("David")) {
        coordinator.run(pending).await;
    }
    show("name = David again", &coordinator)?;

    let pending = coordinator.reset(named("omar"));
    coordinator.run(pending).await;
    show("reset", &coordinator)?;

    // ===== Part 2: Overlapping cycles =====
    println!("\n## Part 2: Overlapping cycles\n");

    let first = coordinator.set_attributes(named("robert"));
    let second = coordinator.set_attributes(named("David"));
    if let (Some(first), Some(second)) = (first, second) {
        let second_done = second.resolve().await;
        let first_done = first.resolve().await;
        println!("second: {:?}", coordinator.complete_cycle(second_done));
        println!("first:  {:?}", coordinator.complete_cycle(first_done));
    }
    show("after both resolved", &coordinator)?;

    // ===== Part 3: Session actor =====
    println!("\n## Part 3: Session actor\n");

    let session = SessionHandle::spawn(
        Coordinator::new(named("omar"), engine()?, CoordinatorConfig::default())
            .with_schema(Some("admin".into())),
    );
    println!("session {}", session.session_id());

    session.set_attributes(named("David"))?;
    let state = session.settled().await?;
    println!("admin, David  -> {}", serde_json::to_string(&state.errors)?);

    session.set_attributes(named("Admin"))?;
    let state = session.settled().await?;
    println!("admin, Admin  -> {}", serde_json::to_string(&state.errors)?);

    session.shutdown().await;
    println!("\n=== Demo Complete ===");
    Ok(())
}
