//! Attribute values and their occurrences

use indexmap::IndexMap;
use serde_derive::Serialize;

use super::token::{Pos, Token};

/// A parsed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Scalar(Token),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Token> {
        match self {
            Value::Scalar(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Add `value` under `key`, turning an existing entry into a list of
    /// entries. Used for repeated nested blocks.
    pub(crate) fn push_entry(map: &mut IndexMap<String, Value>, key: String, value: Value) {
        match map.get_mut(&key) {
            None => {
                map.insert(key, value);
            }
            Some(Value::List(items)) if items.iter().all(|item| matches!(item, Value::Map(_))) => {
                items.push(value);
            }
            Some(existing) => {
                let previous = std::mem::replace(existing, Value::List(Vec::new()));
                *existing = Value::List(vec![previous, value]);
            }
        }
    }
}

/// One place an attribute was assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub pos: Pos,
    pub value: Value,
}

/// All occurrences of one attribute name within a resource, in source order.
///
/// Never empty: an attribute without occurrences is simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    occurrences: Vec<Occurrence>,
}

impl Attribute {
    pub fn new(pos: Pos, value: Value) -> Self {
        Self { occurrences: vec![Occurrence { pos, value }] }
    }

    pub(crate) fn push(&mut self, pos: Pos, value: Value) {
        self.occurrences.push(Occurrence { pos, value });
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn first(&self) -> &Occurrence {
        &self.occurrences[0]
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}
