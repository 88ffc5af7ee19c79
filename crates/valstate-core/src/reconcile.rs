//! Merge step of a reconciliation cycle
//!
//! Pure function of its inputs: the engine's computed errors, the known-error
//! registry, the match snapshots captured for the cycle and the attributes the
//! cycle validated. No engine, clock or coordinator state is involved, so the
//! same inputs always produce the same map.

use crate::matching::MatchStore;
use crate::model::{AttributeSnapshot, ValidationErrors};

/// Outcome of merging known errors into one cycle's computed errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The map to expose
    pub errors: ValidationErrors,
    /// Live registry keys whose match broke in this cycle
    pub lapsed: Vec<String>,
}

/// Merge still-applicable known errors into `computed`
///
/// For each registry key with a live match snapshot: if the captured value(s)
/// still match `attributes`, the known messages are appended after the
/// computed ones (duplicates dropped); otherwise the key is reported as lapsed
/// and `computed` keeps exactly what the engine produced. Keys whose snapshot
/// already lapsed contribute nothing.
pub fn reconcile(
    mut computed: ValidationErrors,
    registry: &ValidationErrors,
    matches: &MatchStore,
    attributes: &AttributeSnapshot,
) -> Reconciliation {
    let mut lapsed = Vec::new();

    for (key, known) in registry.iter() {
        let Some(snapshot) = matches.get(key) else {
            continue;
        };
        if snapshot.is_lapsed() {
            continue;
        }

        if snapshot.captured().still_holds(key, attributes) {
            computed.extend(key, known.iter().cloned());
        } else {
            lapsed.push(key.to_string());
        }
    }

    Reconciliation {
        errors: computed,
        lapsed,
    }
}
