//! Changed Attributes Tests
//!
//! This test suite verifies the changed-attribute set against the baseline,
//! including identity semantics for sequences and structures, and reset.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{coordinator, errors_for, named, settle, silent_coordinator};
use serde_json::json;
use valstate_core::{AttributeSnapshot, AttributeValue, CoordinatorConfig, SchemaSelector};

fn profile() -> AttributeSnapshot {
    AttributeSnapshot::new()
        .with("name", "omar")
        .with("email", "omar@example.com")
        .with(
            "tags",
            AttributeValue::sequence(vec![AttributeValue::from("a"), AttributeValue::from("b")]),
        )
}

#[tokio::test]
async fn only_differing_attributes_are_reported() {
    let base = profile();
    let mut c = silent_coordinator(base.clone(), CoordinatorConfig::default());

    let pending = c.set_attributes(base.with("email", "new@example.com"));
    settle(&mut c, pending).await;

    assert_eq!(
        serde_json::to_value(c.changed_attributes()).unwrap(),
        json!({"email": "new@example.com"})
    );
    assert!(c.there_are_changes());
}

#[tokio::test]
async fn attribute_missing_from_baseline_counts_as_changed() {
    let mut c = silent_coordinator(named("omar"), CoordinatorConfig::default());

    let pending = c.set_attributes(named("omar").with("age", 30i64));
    settle(&mut c, pending).await;

    assert_eq!(
        serde_json::to_value(c.changed_attributes()).unwrap(),
        json!({"age": 30.0})
    );
}

#[tokio::test]
async fn carried_forward_sequence_is_unchanged() {
    let base = profile();
    let mut c = silent_coordinator(base.clone(), CoordinatorConfig::default());

    let pending = c.set_attributes(base.with("name", "someone"));
    settle(&mut c, pending).await;

    let changed = c.changed_attributes();
    assert!(changed.contains("name"));
    assert!(!changed.contains("tags"));
}

#[tokio::test]
async fn rebuilt_sequence_with_same_content_is_changed() {
    let base = profile();
    let mut c = silent_coordinator(base.clone(), CoordinatorConfig::default());

    let rebuilt = base.with(
        "tags",
        AttributeValue::sequence(vec![AttributeValue::from("a"), AttributeValue::from("b")]),
    );
    let pending = c.set_attributes(rebuilt);
    assert!(pending.is_some(), "a fresh allocation is a new value");
    settle(&mut c, pending).await;

    let changed = c.changed_attributes();
    assert_eq!(changed.names().collect::<Vec<_>>(), vec!["tags"]);
}

#[tokio::test]
async fn reordered_sequence_is_changed() {
    let mut c = silent_coordinator(profile(), CoordinatorConfig::default());

    let pending = c.set_attributes(
        profile().with(
            "tags",
            AttributeValue::sequence(vec![AttributeValue::from("b"), AttributeValue::from("a")]),
        ),
    );
    settle(&mut c, pending).await;

    assert!(c.changed_attributes().contains("tags"));
}

#[tokio::test]
async fn carried_forward_structure_is_unchanged() {
    let address = AttributeValue::from(json!({"city": "Lima", "zip": "15001"}));
    let initial = named("omar").with("address", address.clone());
    let mut c = silent_coordinator(initial, CoordinatorConfig::default());

    let pending = c.set_attributes(named("other").with("address", address));
    settle(&mut c, pending).await;

    assert!(!c.changed_attributes().contains("address"));
    assert!(c.changed_attributes().contains("name"));
}

#[tokio::test]
async fn rebuilt_structure_with_same_content_is_changed() {
    let initial = named("omar").with("address", json!({"city": "Lima", "zip": "15001"}));
    let mut c = silent_coordinator(initial, CoordinatorConfig::default());

    let pending = c.set_attributes(
        named("omar").with("address", json!({"city": "Lima", "zip": "15001"})),
    );
    settle(&mut c, pending).await;

    assert!(c.changed_attributes().contains("address"));
    assert!(!c.changed_attributes().contains("name"));
}

#[tokio::test]
async fn identical_submission_keeps_current_state() {
    let mut c = coordinator();
    let pending = c.set_attributes(named("robert"));
    settle(&mut c, pending).await;
    let cycle = c.current_cycle();

    assert!(c.set_attributes(named("robert")).is_none());
    assert_eq!(c.current_cycle(), cycle);
    assert!(c.is_settled());
}

#[tokio::test]
async fn reset_replaces_baseline_and_clears_registry() {
    let mut c = coordinator();
    let pending = c.set_attributes(named("robert"));
    settle(&mut c, pending).await;
    let pending = c.set_known_errors(errors_for("name", &["taken"]));
    settle(&mut c, Some(pending)).await;
    c.set_show_errors(true);

    let pending = c.reset(named("robert"));

    assert!(c.errors().is_empty());
    assert!(c.known_errors().is_empty());
    assert!(c.match_snapshots().is_empty());
    assert!(!c.show_errors());
    assert!(c.baseline().is_same_as(&named("robert")));

    settle(&mut c, Some(pending)).await;

    // robert is now the initial value, so nameIsDavid passes
    assert!(c.is_valid());
    assert!(!c.there_are_changes());
}

#[tokio::test]
async fn reset_keeps_schema_selection() {
    let mut c = coordinator().with_schema(Some("admin".into()));

    let pending = c.reset(named("omar"));

    let admin = SchemaSelector::from("admin");
    assert_eq!(pending.request().schema.as_ref(), Some(&admin));
    assert_eq!(c.schema(), Some(&admin));
}

#[tokio::test]
async fn show_errors_is_independent_of_validity() {
    let mut c = coordinator();
    c.set_show_errors(true);
    assert!(c.show_errors());
    assert!(c.is_valid());

    let pending = c.set_attributes(named("robert"));
    settle(&mut c, pending).await;
    c.set_show_errors(false);

    assert!(!c.show_errors());
    assert!(c.is_invalid());
}
