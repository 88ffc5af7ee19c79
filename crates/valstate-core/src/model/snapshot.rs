//! Attribute snapshots: the current values and the reset baseline

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::{same_serialization, AttributeValue};
use crate::errors::Result;

/// Attribute name to current value
///
/// Keys are kept sorted, so the serialized form of a snapshot is canonical
/// and whole-snapshot comparisons do not depend on insertion order.
///
/// Change detection uses identity for sequences and structures: to keep a
/// composite unchanged, submit a clone of the previous `AttributeValue`
/// rather than rebuilding it. A rebuilt composite is a new value, even with
/// the same content, and also starts a new cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSnapshot {
    values: BTreeMap<String, AttributeValue>,
}

impl AttributeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from a JSON object
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Serialization` when `source` is not valid
    /// JSON or not an object.
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Same key set and every value identical
    ///
    /// Used to skip cycles for submissions that carry nothing new.
    pub fn is_identical(&self, other: &AttributeSnapshot) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().all(|(name, value)| {
                other
                    .values
                    .get(name)
                    .is_some_and(|theirs| value.is_identical(theirs))
            })
    }

    /// Whole-snapshot deep equality (serialized text comparison)
    pub fn is_same_as(&self, other: &AttributeSnapshot) -> bool {
        same_serialization(self, other)
    }

    /// Entries whose value is not identical to the baseline value at the same key
    ///
    /// Keys missing from the baseline count as changed.
    pub fn changed_from(&self, baseline: &AttributeSnapshot) -> AttributeSnapshot {
        self.values
            .iter()
            .filter(|(name, value)| {
                baseline
                    .values
                    .get(name.as_str())
                    .map_or(true, |initial| !value.is_identical(initial))
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeSnapshot {
    fn from(values: BTreeMap<String, AttributeValue>) -> Self {
        Self { values }
    }
}
