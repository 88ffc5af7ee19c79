//! Validation error maps
//!
//! One type serves both the engine's computed errors and the caller's known
//! errors. Every sequence is kept duplicate-free in first-seen order and keys
//! with no messages are never stored, so "has a key" always means "has at
//! least one error".

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::Result;

/// Key (usually an attribute name) to ordered, duplicate-free messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>")]
#[serde(into = "BTreeMap<String, Vec<String>>")]
pub struct ValidationErrors {
    entries: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of string arrays, such as errors returned by a
    /// server, normalising it on the way in
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::Serialization` when `source` is not valid
    /// JSON or does not have that shape.
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Builder-style `extend`
    #[must_use]
    pub fn with<I, M>(mut self, key: impl Into<String>, messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.extend(key, messages);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Append one message unless the key already carries it
    pub fn push(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let entry = self.entries.entry(key.into()).or_default();
        if !entry.contains(&message) {
            entry.push(message);
        }
    }

    /// Append messages after the existing ones, skipping repeats
    ///
    /// An empty `messages` leaves the map untouched.
    pub fn extend<I, M>(&mut self, key: impl Into<String>, messages: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let key = key.into();
        for message in messages {
            self.push(key.clone(), message);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }
}

impl From<BTreeMap<String, Vec<String>>> for ValidationErrors {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<ValidationErrors> for BTreeMap<String, Vec<String>> {
    fn from(errors: ValidationErrors) -> Self {
        errors.entries
    }
}

impl<K, I, M> FromIterator<(K, I)> for ValidationErrors
where
    K: Into<String>,
    I: IntoIterator<Item = M>,
    M: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut errors = ValidationErrors::new();
        for (key, messages) in iter {
            errors.extend(key, messages);
        }
        errors
    }
}
