//! Session Tests
//!
//! This test suite drives a coordinator through `SessionHandle`, where engine
//! calls run on spawned tasks and completions may arrive late.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{coordinator, errors_for, named, NAME_IS_DAVID};
use futures::FutureExt;
use serde_json::json;
use tokio::sync::Notify;
use valstate_core::engine::FnEngine;
use valstate_core::{Coordinator, CoordinatorConfig, SessionHandle, ValidationErrors};

#[tokio::test]
async fn session_replays_form_scenarios() {
    let session = SessionHandle::spawn(coordinator());

    session.set_attributes(named("David")).unwrap();
    let state = session.settled().await.unwrap();
    assert!(state.is_valid);
    assert_eq!(
        serde_json::to_value(&state.changed_attributes).unwrap(),
        json!({"name": "David"})
    );

    session.set_attributes(named("robert")).unwrap();
    let state = session.settled().await.unwrap();
    assert_eq!(state.errors, errors_for("name", &[NAME_IS_DAVID]));

    session
        .set_known_errors(errors_for("other", &["Extra errors"]))
        .unwrap();
    let state = session.settled().await.unwrap();
    assert_eq!(
        state.errors,
        ValidationErrors::new()
            .with("name", [NAME_IS_DAVID])
            .with("other", ["Extra errors"])
    );

    session.set_attributes(named("David")).unwrap();
    let state = session.settled().await.unwrap();
    assert!(state.errors.is_empty());

    session.set_show_errors(true).unwrap();
    session.reset(named("omar")).unwrap();
    let state = session.settled().await.unwrap();
    assert!(state.is_valid);
    assert!(!state.show_errors);
    assert!(!state.there_are_changes);

    session.shutdown().await;
}

#[tokio::test]
async fn slow_stale_result_is_never_published() {
    let gate = Arc::new(Notify::new());
    let engine = {
        let gate = gate.clone();
        FnEngine::new(move |request| {
            let gate = gate.clone();
            async move {
                let name = request.attributes.get("name").and_then(|v| v.as_str());
                let mut errors = ValidationErrors::new();
                if name == Some("slow") {
                    gate.notified().await;
                    errors.push("name", "slow result");
                }
                Ok(errors)
            }
            .boxed()
        })
    };
    let session = SessionHandle::spawn(Coordinator::new(
        named("omar"),
        engine,
        CoordinatorConfig::default(),
    ));
    let mut updates = session.subscribe();

    session.set_attributes(named("slow")).unwrap();
    session.set_attributes(named("fast")).unwrap();
    let state = session.settled().await.unwrap();
    assert!(state.errors.is_empty());

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(session.state().errors.is_empty());
    while updates.has_changed().unwrap_or(false) {
        assert!(updates.borrow_and_update().errors.is_empty());
    }

    session.shutdown().await;
}

#[tokio::test]
async fn subscribers_see_settled_state() {
    let session = SessionHandle::spawn(coordinator());
    let mut updates = session.subscribe();

    session.set_attributes(named("robert")).unwrap();

    let state = updates
        .wait_for(|state| state.settled && state.is_invalid)
        .await
        .unwrap()
        .clone();
    assert_eq!(state.errors, errors_for("name", &[NAME_IS_DAVID]));

    session.shutdown().await;
}

#[tokio::test]
async fn sessions_get_distinct_ids() {
    let a = SessionHandle::spawn(coordinator());
    let b = SessionHandle::spawn(coordinator());

    assert_ne!(a.session_id(), b.session_id());

    a.shutdown().await;
    b.shutdown().await;
}
