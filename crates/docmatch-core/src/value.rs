//! The output value type a match produces: an ordered JSON-ish tree.
//!
//! Grounded in the teacher VM's `Value` type, trimmed to what a document
//! match can actually produce — there is no `Node`/`Tagged` variant here,
//! because the simulator never needs to serialize a piece of the pattern
//! tree itself, only the strings it captured. Object key order is
//! insertion order (the order properties were bound), not alphabetical, so
//! `Serialize` is hand-rolled rather than derived.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A bound match result: every leaf is a `String` (per spec, bindings are
/// never coerced to numbers or booleans), every branch is an `Object` (for
/// `Group`/`PatternRoot`) or `Array` (for `Repeat`).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Object(Vec<(Box<str>, Value)>),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(Box<str>, Value)]> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a field of an `Object` by name, `None` for any other variant.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(&**key, value)?;
                }
                map.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}
