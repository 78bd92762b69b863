//! [`FactTable`] – in-process logic engine for one predicate.
//!
//! Stores the solutions of a single predicate and answers queries against it
//! the way the knowledge base would: the query must name the stored
//! predicate with the stored arity, and each solution is projected onto the
//! variables the query asked for.
//!
//! Used to seed fixture data (e.g. a kitchen model exported to JSON) when no
//! live knowledge base is reachable, and as the engine in tests.
//!
//! # File format
//!
//! A JSON array of solutions, one object per row:
//!
//! ```json
//! [
//!   { "Object": "IAIFridge", "M00": 1, "M01": 0, "M02": 0, "M03": 1.2,
//!     "M10": 0, "M11": 1, "M12": 0, "M13": -0.4,
//!     "M20": 0, "M21": 0, "M22": 1, "M23": 0.0,
//!     "M30": 0, "M31": 0, "M32": 0, "M33": 1,
//!     "Width": 0.6, "Height": 1.8, "Depth": 0.65 }
//! ]
//! ```

use std::fs;
use std::path::Path;

use knowledge_types::KnowledgeError;
use tracing::debug;

use crate::binding::QueryBinding;
use crate::query::{LogicEngine, PredicateQuery, Solutions};

/// Stored solutions of one predicate.
#[derive(Debug, Clone)]
pub struct FactTable {
    predicate: String,
    arity: usize,
    rows: Vec<QueryBinding>,
}

impl FactTable {
    pub fn new(predicate: impl Into<String>, arity: usize, rows: Vec<QueryBinding>) -> Self {
        Self {
            predicate: predicate.into(),
            arity,
            rows,
        }
    }

    /// A table answering `getFixedKitchenObjects/20`.
    pub fn kitchen_model(rows: Vec<QueryBinding>) -> Self {
        let shape = PredicateQuery::fixed_kitchen_objects();
        Self::new(shape.predicate(), shape.arity(), rows)
    }

    /// Parse a kitchen model from its JSON text.
    pub fn kitchen_model_from_json(json: &str) -> Result<Self, KnowledgeError> {
        let rows: Vec<QueryBinding> = serde_json::from_str(json)
            .map_err(|e| KnowledgeError::Serialization(format!("invalid kitchen model: {e}")))?;
        Ok(Self::kitchen_model(rows))
    }

    /// Load a kitchen model from a JSON file.
    pub fn kitchen_model_from_path(path: &Path) -> Result<Self, KnowledgeError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            KnowledgeError::Config(format!("Failed to read kitchen model at {}: {}", path.display(), e))
        })?;
        Self::kitchen_model_from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LogicEngine for FactTable {
    fn query(&self, query: &str) -> Result<Solutions, KnowledgeError> {
        let parsed: PredicateQuery = query.parse()?;
        if parsed.predicate() != self.predicate || parsed.arity() != self.arity {
            return Err(KnowledgeError::Engine(format!(
                "unknown procedure {}/{}",
                parsed.predicate(),
                parsed.arity()
            )));
        }

        let variables = parsed.variables();
        let solutions: Vec<QueryBinding> = self
            .rows
            .iter()
            .map(|row| row.project(variables.iter().map(String::as_str)))
            .collect();
        debug!(query = %query, solutions = solutions.len(), "fact table answered");
        Ok(Box::new(solutions.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::QueryValue;
    use std::io::Write;

    const MODEL: &str = r#"[
        { "Object": "IAIFridge",
          "M00": 1, "M01": 0, "M02": 0, "M03": 1.2,
          "M10": 0, "M11": 1, "M12": 0, "M13": -0.4,
          "M20": 0, "M21": 0, "M22": 1, "M23": 0.0,
          "M30": 0, "M31": 0, "M32": 0, "M33": 1,
          "Width": 0.6, "Height": 1.8, "Depth": 0.65 }
    ]"#;

    fn query_text() -> String {
        PredicateQuery::fixed_kitchen_objects().to_string()
    }

    #[test]
    fn answers_its_own_predicate() {
        let table = FactTable::kitchen_model_from_json(MODEL).unwrap();
        let solutions: Vec<_> = table.query(&query_text()).unwrap().collect();
        assert_eq!(solutions.len(), 1);
        assert_eq!(
            solutions[0].get("Object"),
            Some(&QueryValue::Atom("IAIFridge".to_string()))
        );
        assert_eq!(solutions[0].len(), 20);
    }

    #[test]
    fn empty_table_yields_no_solutions() {
        let table = FactTable::kitchen_model(Vec::new());
        assert_eq!(table.query(&query_text()).unwrap().count(), 0);
    }

    #[test]
    fn other_predicates_are_unknown() {
        let table = FactTable::kitchen_model(Vec::new());
        assert!(matches!(
            table.query("getMovableObjects(Object)"),
            Err(KnowledgeError::Engine(_))
        ));
    }

    #[test]
    fn arity_mismatch_is_unknown() {
        let table = FactTable::kitchen_model(Vec::new());
        assert!(table.query("getFixedKitchenObjects(Object,Width)").is_err());
    }

    #[test]
    fn renamed_variables_only_return_what_was_asked() {
        let table = FactTable::new(
            "counter",
            2,
            vec![QueryBinding::new().with("Object", "IAICounter").with("Width", 2.0)],
        );
        let solutions: Vec<_> = table.query("counter(Object,Length)").unwrap().collect();
        assert!(solutions[0].get("Object").is_some());
        assert!(solutions[0].get("Width").is_none());
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        assert!(matches!(
            FactTable::kitchen_model_from_json("{not json"),
            Err(KnowledgeError::Serialization(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MODEL.as_bytes()).expect("write model");
        let table = FactTable::kitchen_model_from_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("absent.json");
        assert!(matches!(
            FactTable::kitchen_model_from_path(&path),
            Err(KnowledgeError::Config(_))
        ));
    }
}
