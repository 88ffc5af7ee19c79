//! Staleness Tests
//!
//! Overlapping cycles resolved out of order; only the latest started cycle
//! may change state.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{coordinator, errors_for, named, NAME_IS_DAVID};
use valstate_core::{CycleOutcome, ValidationErrors};

#[tokio::test]
async fn out_of_order_completion_keeps_latest_cycle() {
    let mut c = coordinator();
    let first = c.set_attributes(named("robert")).unwrap();
    let second = c.set_attributes(named("David")).unwrap();
    let first_cycle = first.cycle();

    let second_done = second.resolve().await;
    let first_done = first.resolve().await;

    let applied = c.complete_cycle(second_done);
    assert!(applied.is_applied());
    assert!(c.errors().is_empty());

    let discarded = c.complete_cycle(first_done);
    assert_eq!(
        discarded,
        CycleOutcome::Discarded {
            cycle: first_cycle,
            current: c.current_cycle(),
        }
    );
    assert!(c.errors().is_empty());
    assert!(c.is_settled());
}

#[tokio::test]
async fn earlier_cycle_finishing_first_is_discarded() {
    let mut c = coordinator();
    let first = c.set_attributes(named("David")).unwrap();
    let second = c.set_attributes(named("robert")).unwrap();

    let outcome = c.run(first).await;
    assert!(!outcome.is_applied());
    assert!(!c.is_settled());
    assert!(c.errors().is_empty());

    c.run(second).await;
    assert_eq!(c.errors(), &errors_for("name", &[NAME_IS_DAVID]));
    assert!(c.is_settled());
}

#[tokio::test]
async fn reset_discards_cycle_started_before_it() {
    let mut c = coordinator();
    let before = c.set_attributes(named("robert")).unwrap();
    let after = c.reset(named("omar"));

    let outcome = c.run(before).await;
    assert!(!outcome.is_applied());
    assert!(c.errors().is_empty());

    c.run(after).await;
    assert!(c.errors().is_empty());
    assert!(c.is_settled());
}

#[tokio::test]
async fn known_error_change_supersedes_running_cycle() {
    let mut c = coordinator();
    let running = c.set_attributes(named("robert")).unwrap();
    let latest = c.set_known_errors(errors_for("other", &["Extra errors"]));

    let stale = c.run(running).await;
    assert!(!stale.is_applied());
    assert!(c.errors().is_empty());

    c.run(latest).await;
    assert_eq!(
        c.errors(),
        &ValidationErrors::new()
            .with("name", [NAME_IS_DAVID])
            .with("other", ["Extra errors"])
    );
}

#[tokio::test]
async fn stale_cycle_does_not_lapse_known_errors() {
    let mut c = coordinator();
    let pending = c.set_known_errors(errors_for("name", &["taken"]));
    c.run(pending).await;

    let stale = c.set_attributes(named("robert")).unwrap();
    let latest = c.set_attributes(named("omar")).unwrap();

    c.run(stale).await;
    assert!(!c.match_snapshots().get("name").unwrap().is_lapsed());

    c.run(latest).await;
    assert_eq!(c.errors(), &errors_for("name", &["taken"]));
}

#[tokio::test]
async fn cycle_tokens_increase_monotonically() {
    let mut c = coordinator();
    let a = c.revalidate();
    let b = c.set_attributes(named("x")).unwrap();
    let d = c.set_known_errors(ValidationErrors::new());
    let e = c.reset(named("omar"));

    assert!(a.cycle() < b.cycle());
    assert!(b.cycle() < d.cycle());
    assert!(d.cycle() < e.cycle());
    assert_eq!(c.current_cycle(), e.cycle());
}
