//! Logic queries.
//!
//! The knowledge base is reached through the [`LogicEngine`] capability: a
//! query string goes in, zero or more [`QueryBinding`]s come out.  Queries are
//! single predicate invocations whose arguments are all free variables, built
//! and parsed by [`PredicateQuery`].
//!
//! # Example
//!
//! ```rust
//! use knowledge_reasoning::query::PredicateQuery;
//!
//! let q = PredicateQuery::fixed_kitchen_objects();
//! assert_eq!(q.arity(), 20);
//! assert!(q.to_string().starts_with("getFixedKitchenObjects(Object,M00,M01,"));
//!
//! let parsed: PredicateQuery = q.to_string().parse().unwrap();
//! assert_eq!(parsed, q);
//! ```

use std::fmt;
use std::str::FromStr;

use knowledge_types::KnowledgeError;

use crate::binding::QueryBinding;
use crate::pose::DIMENSION_VARIABLES;

/// Predicate the knowledge base exposes for fixed kitchen furniture.
pub const FIXED_OBJECTS_PREDICATE: &str = "getFixedKitchenObjects";

/// Variable bound to the object label.
pub const OBJECT_VARIABLE: &str = "Object";

/// Solutions of one query, in the order the engine produced them.
pub type Solutions = Box<dyn Iterator<Item = QueryBinding> + Send>;

/// An external logic-reasoning engine.
pub trait LogicEngine: Send + Sync {
    /// Execute `query` once and return every solution.
    ///
    /// An empty iterator is a valid answer.  Failing to execute the query at
    /// all (unknown predicate, engine unreachable) is an
    /// [`KnowledgeError::Engine`] error.
    fn query(&self, query: &str) -> Result<Solutions, KnowledgeError>;
}

/// A predicate invocation with only free-variable arguments, e.g.
/// `foo(A,B,C)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateQuery {
    predicate: String,
    variables: Vec<String>,
}

impl PredicateQuery {
    pub fn new(predicate: impl Into<String>, variables: Vec<String>) -> Self {
        Self {
            predicate: predicate.into(),
            variables,
        }
    }

    /// `getFixedKitchenObjects(Object, M00..M33, Width, Height, Depth)`.
    ///
    /// All sixteen matrix cells are requested to match the predicate's
    /// arity, even though the pose only uses twelve of them.
    pub fn fixed_kitchen_objects() -> Self {
        let mut variables = Vec::with_capacity(20);
        variables.push(OBJECT_VARIABLE.to_string());
        for i in 0..4 {
            for j in 0..4 {
                variables.push(format!("M{i}{j}"));
            }
        }
        variables.extend(DIMENSION_VARIABLES.iter().map(|v| v.to_string()));
        Self::new(FIXED_OBJECTS_PREDICATE, variables)
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn arity(&self) -> usize {
        self.variables.len()
    }
}

impl fmt::Display for PredicateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.predicate, self.variables.join(","))
    }
}

impl FromStr for PredicateQuery {
    type Err = KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |why: &str| KnowledgeError::Engine(format!("malformed query '{s}': {why}"));

        let text = s.trim().trim_end_matches('.').trim_end();
        let (predicate, rest) = text.split_once('(').ok_or_else(|| malformed("missing '('"))?;
        let args = rest.strip_suffix(')').ok_or_else(|| malformed("missing ')'"))?;

        let predicate = predicate.trim();
        if !is_atom(predicate) {
            return Err(malformed("predicate name must be a lowercase atom"));
        }

        let variables: Vec<String> = if args.trim().is_empty() {
            Vec::new()
        } else {
            args.split(',').map(|a| a.trim().to_string()).collect()
        };
        if let Some(bad) = variables.iter().find(|v| !is_variable(v)) {
            return Err(malformed(&format!("argument '{bad}' is not a free variable")));
        }

        Ok(Self::new(predicate, variables))
    }
}

fn is_atom(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_variable(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
