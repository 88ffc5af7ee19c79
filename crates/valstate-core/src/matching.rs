//! Match snapshot store
//!
//! For every known-error key, remembers what the relevant attribute value(s)
//! looked like when the registry was last set. A known error only survives a
//! merge while the current attributes still match what was captured.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{AttributeSnapshot, AttributeValue, ValidationErrors};

/// What was captured for one known-error key
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "captured", rename_all = "snake_case")]
pub enum Captured {
    /// The key names a present attribute; its value at capture time
    Attribute(AttributeValue),
    /// The key names no attribute; the whole snapshot at capture time
    Extra(AttributeSnapshot),
}

impl Captured {
    /// Capture the relevant value(s) for `key` from `attributes`
    pub fn capture(key: &str, attributes: &AttributeSnapshot) -> Self {
        match attributes.get(key) {
            Some(value) => Captured::Attribute(value.clone()),
            None => Captured::Extra(attributes.clone()),
        }
    }

    /// Whether the current attributes still match the capture
    pub fn still_holds(&self, key: &str, attributes: &AttributeSnapshot) -> bool {
        match self {
            Captured::Attribute(captured) => attributes
                .get(key)
                .is_some_and(|current| current.is_same_as(captured)),
            Captured::Extra(captured) => attributes.is_same_as(captured),
        }
    }

    pub fn is_extra(&self) -> bool {
        matches!(self, Captured::Extra(_))
    }
}

/// Capture for one key plus whether it has lapsed
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    #[serde(flatten)]
    captured: Captured,
    lapsed: bool,
}

impl MatchSnapshot {
    pub fn captured(&self) -> &Captured {
        &self.captured
    }

    /// A lapsed key no longer contributes its known errors
    pub fn is_lapsed(&self) -> bool {
        self.lapsed
    }
}

/// One `MatchSnapshot` per key of the current known-error registry
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MatchStore {
    entries: BTreeMap<String, MatchSnapshot>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute captures for every key of `registry`
    ///
    /// Keys not in `registry` are dropped and every capture starts live.
    pub fn capture(registry: &ValidationErrors, attributes: &AttributeSnapshot) -> Self {
        Self {
            entries: registry
                .keys()
                .map(|key| {
                    (
                        key.to_string(),
                        MatchSnapshot {
                            captured: Captured::capture(key, attributes),
                            lapsed: false,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MatchSnapshot> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Mark keys as lapsed; unknown keys are ignored
    pub fn lapse<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.lapsed = true;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
