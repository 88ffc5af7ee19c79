//! Schema selector passed through to the validation engine

use serde::{Deserialize, Serialize};

/// Names which rule subset the engine should apply
///
/// Opaque to the coordinator: it is forwarded to the engine unchanged and only
/// compared to decide whether a new cycle is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaSelector {
    One(String),
    Many(Vec<String>),
}

impl SchemaSelector {
    /// Schema names in selector order
    pub fn names(&self) -> Vec<&str> {
        match self {
            SchemaSelector::One(name) => vec![name.as_str()],
            SchemaSelector::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn includes(&self, schema: &str) -> bool {
        match self {
            SchemaSelector::One(name) => name == schema,
            SchemaSelector::Many(names) => names.iter().any(|name| name == schema),
        }
    }
}

impl From<&str> for SchemaSelector {
    fn from(name: &str) -> Self {
        SchemaSelector::One(name.to_string())
    }
}

impl From<String> for SchemaSelector {
    fn from(name: String) -> Self {
        SchemaSelector::One(name)
    }
}

impl From<Vec<String>> for SchemaSelector {
    fn from(names: Vec<String>) -> Self {
        SchemaSelector::Many(names)
    }
}
