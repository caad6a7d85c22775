//! Tagged attribute values for open metadata mappings.
//!
//! Principal attributes, action parameters, and context metadata are open
//! mappings whose values vary by protocol and auth scheme. [`AttrValue`]
//! keeps those mappings checkable instead of an untyped blob: a value is a
//! string, a number, a boolean, or a nested mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value in an open string-keyed mapping.
///
/// Serializes untagged, so the wire shape at the decision-engine boundary
/// is plain JSON (`"x"`, `42`, `true`, `{...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value (JSON number semantics).
    Number(f64),
    /// Text value.
    String(String),
    /// Nested string-keyed mapping.
    Map(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Borrow the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Read the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the value as a nested mapping, if it is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Convert a JSON value into an attribute value.
    ///
    /// Nulls and arrays have no attribute representation and yield `None`;
    /// callers decide whether to drop or stringify those.
    pub fn from_json(value: &serde_json::Value) -> Option<AttrValue> {
        match value {
            serde_json::Value::Bool(b) => Some(AttrValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(AttrValue::Number),
            serde_json::Value::String(s) => Some(AttrValue::String(s.clone())),
            serde_json::Value::Object(map) => Some(AttrValue::Map(map_from_json_object(map))),
            serde_json::Value::Null | serde_json::Value::Array(_) => None,
        }
    }
}

/// Convert a JSON object into an attribute mapping, dropping entries with
/// no attribute representation.
pub(crate) fn map_from_json_object(
    map: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, AttrValue> {
    map.iter()
        .filter_map(|(k, v)| AttrValue::from_json(v).map(|av| (k.clone(), av)))
        .collect()
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n as f64)
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        AttrValue::Number(n as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}
