//! Query bindings and the numeric coercion rule.
//!
//! A [`QueryBinding`] is one solution of a logic query: the value bound to
//! each free variable.  Numeric cells come back either as integers or as
//! floats depending on how the fact was asserted, so every consumer goes
//! through [`decode`], which widens integers and rejects everything else.

use std::collections::HashMap;

use knowledge_types::KnowledgeError;
use serde::{Deserialize, Serialize};

/// A typed scalar bound to a query variable.
///
/// Deserialises untagged: JSON integers become [`QueryValue::Int`], other
/// numbers [`QueryValue::Float`], strings [`QueryValue::Atom`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Int(i64),
    Float(f64),
    Atom(String),
}

impl QueryValue {
    /// Short type name used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            QueryValue::Int(_) => "an integer",
            QueryValue::Float(_) => "a float",
            QueryValue::Atom(_) => "an atom",
        }
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Atom(v.to_string())
    }
}

/// One solution: variable name → bound value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryBinding {
    values: HashMap<String, QueryValue>,
}

impl QueryBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn insert(&mut self, variable: impl Into<String>, value: impl Into<QueryValue>) {
        self.values.insert(variable.into(), value.into());
    }

    pub fn get(&self, variable: &str) -> Option<&QueryValue> {
        self.values.get(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only the listed variables.  Variables absent from `self` stay
    /// absent.
    pub fn project<'a>(&self, variables: impl IntoIterator<Item = &'a str>) -> Self {
        variables
            .into_iter()
            .filter_map(|v| self.values.get(v).map(|value| (v.to_string(), value.clone())))
            .collect()
    }
}

impl FromIterator<(String, QueryValue)> for QueryBinding {
    fn from_iter<I: IntoIterator<Item = (String, QueryValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Read `variable` from `binding` as an `f64`.
///
/// Floats are returned as-is and integers are widened.  A missing variable
/// or an atom is a [`KnowledgeError::DecodeTypeMismatch`].
pub fn decode(binding: &QueryBinding, variable: &str) -> Result<f64, KnowledgeError> {
    match binding.get(variable) {
        Some(QueryValue::Float(v)) => Ok(*v),
        Some(QueryValue::Int(n)) => Ok(*n as f64),
        Some(other) => Err(mismatch(variable, other.type_name())),
        None => Err(mismatch(variable, "missing")),
    }
}

/// Read `variable` from `binding` as a label.  Only atoms qualify.
pub fn decode_label(binding: &QueryBinding, variable: &str) -> Result<String, KnowledgeError> {
    match binding.get(variable) {
        Some(QueryValue::Atom(label)) => Ok(label.clone()),
        Some(other) => Err(mismatch(variable, other.type_name())),
        None => Err(mismatch(variable, "missing")),
    }
}

fn mismatch(variable: &str, found: &str) -> KnowledgeError {
    KnowledgeError::DecodeTypeMismatch {
        variable: variable.to_string(),
        found: found.to_string(),
    }
}
