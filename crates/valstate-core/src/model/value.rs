//! Attribute values and the two equality notions the coordinator relies on
//!
//! Composite values are reference-counted. Cloning a value shares the
//! allocation, so a value carried unchanged from one snapshot to the next
//! stays *identical*, while an equal-looking value built afresh does not.
//!
//! - [`AttributeValue::is_identical`] is primitive/identity equality, used for
//!   the changed-attribute set and for sequence elements.
//! - [`AttributeValue::is_same_as`] is the deep equality used to decide whether
//!   a known error still applies.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Scalar attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

/// A single attribute value: primitive, ordered sequence or keyed structure
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum AttributeValue {
    Primitive(Primitive),
    Sequence(Arc<Vec<AttributeValue>>),
    Structure(Arc<BTreeMap<String, AttributeValue>>),
}

impl AttributeValue {
    pub fn null() -> Self {
        AttributeValue::Primitive(Primitive::Null)
    }

    pub fn text(value: impl Into<String>) -> Self {
        AttributeValue::Primitive(Primitive::Text(value.into()))
    }

    pub fn sequence(items: impl IntoIterator<Item = AttributeValue>) -> Self {
        AttributeValue::Sequence(Arc::new(items.into_iter().collect()))
    }

    pub fn structure<K: Into<String>>(
        fields: impl IntoIterator<Item = (K, AttributeValue)>,
    ) -> Self {
        AttributeValue::Structure(Arc::new(
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Primitive(Primitive::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Primitive(Primitive::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Primitive(Primitive::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Primitive/identity equality
    ///
    /// Primitives compare by value (`NaN` is never identical to itself).
    /// Sequences and structures are identical only when they share the same
    /// allocation.
    pub fn is_identical(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (AttributeValue::Primitive(a), AttributeValue::Primitive(b)) => a == b,
            (AttributeValue::Sequence(a), AttributeValue::Sequence(b)) => Arc::ptr_eq(a, b),
            (AttributeValue::Structure(a), AttributeValue::Structure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Deep equality used for known-error matching
    ///
    /// - two sequences: same length and element-wise identical (no recursion
    ///   into element structure)
    /// - two structures: identical serialized text. Structure keys are held
    ///   in a `BTreeMap`, so serialization always lists them sorted and two
    ///   structures never differ by key order alone
    /// - otherwise: primitive identity; a sequence never equals a structure
    pub fn is_same_as(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (AttributeValue::Sequence(a), AttributeValue::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_identical(y))
            }
            (AttributeValue::Structure(_), AttributeValue::Structure(_)) => {
                same_serialization(self, other)
            }
            _ => self.is_identical(other),
        }
    }
}

/// Compare two values by their canonical JSON text
///
/// Serialization of these types cannot fail except for pathological
/// serializer states; a failure on either side compares unequal.
pub(crate) fn same_serialization<A: Serialize, B: Serialize>(a: &A, b: &B) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttributeValue::Primitive(Primitive::Null) => serializer.serialize_unit(),
            AttributeValue::Primitive(Primitive::Bool(b)) => serializer.serialize_bool(*b),
            AttributeValue::Primitive(Primitive::Number(n)) => serializer.serialize_f64(*n),
            AttributeValue::Primitive(Primitive::Text(s)) => serializer.serialize_str(s),
            AttributeValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AttributeValue::Structure(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => AttributeValue::null(),
            Value::Bool(b) => b.into(),
            Value::Number(n) => AttributeValue::Primitive(Primitive::Number(
                n.as_f64().unwrap_or(f64::NAN),
            )),
            Value::String(s) => s.into(),
            Value::Array(items) => AttributeValue::sequence(items.into_iter().map(Into::into)),
            Value::Object(fields) => {
                AttributeValue::structure(fields.into_iter().map(|(k, v)| (k, v.into())))
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::text(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Primitive(Primitive::Bool(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Primitive(Primitive::Number(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Primitive(Primitive::Number(value as f64))
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(items: Vec<AttributeValue>) -> Self {
        AttributeValue::Sequence(Arc::new(items))
    }
}

impl From<BTreeMap<String, AttributeValue>> for AttributeValue {
    fn from(fields: BTreeMap<String, AttributeValue>) -> Self {
        AttributeValue::Structure(Arc::new(fields))
    }
}
