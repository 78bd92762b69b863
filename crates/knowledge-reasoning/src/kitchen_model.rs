//! [`FixedObjectQueryService`] – where the fixed kitchen objects are.
//!
//! Each call sends one `getFixedKitchenObjects/20` query to the
//! [`LogicEngine`] and turns every solution into a
//! [`FixedObjectResult`].  The whole answer is tagged with a single frame
//! (`/map` by default).  Per-solution frames are not consulted.
//!
//! Two outcomes are failures and produce no partial list:
//!
//! * zero solutions → [`KnowledgeError::NoResults`];
//! * any solution that does not decode → [`KnowledgeError::DecodeTypeMismatch`].
//!
//! # Example
//!
//! ```rust
//! use knowledge_reasoning::{FactTable, FixedObjectQueryService, QueryBinding};
//!
//! let mut row = QueryBinding::new().with("Object", "IAIFridge");
//! for (name, value) in [("M00", 1.0), ("M11", 1.0), ("M22", 1.0)] {
//!     row.insert(name, value);
//! }
//! for name in ["M01", "M02", "M03", "M10", "M12", "M13", "M20", "M21", "M23"] {
//!     row.insert(name, 0.0);
//! }
//! for name in ["Width", "Height", "Depth"] {
//!     row.insert(name, 0.5);
//! }
//!
//! let service = FixedObjectQueryService::new(Box::new(FactTable::kitchen_model(vec![row])));
//! let response = service.get_fixed_kitchen_objects().unwrap();
//! assert_eq!(response.frame_id, "/map");
//! assert_eq!(response.names, vec!["IAIFridge"]);
//! ```

use knowledge_types::{FixedObjectResult, FixedObjectsResponse, KnowledgeError};
use tracing::{debug, info, instrument, warn};

use crate::binding::{QueryBinding, decode_label};
use crate::pose::{assemble_bounding_box, assemble_pose};
use crate::query::{LogicEngine, OBJECT_VARIABLE, PredicateQuery};

/// Frame every fixed-object pose is reported in.
pub const DEFAULT_MAP_FRAME: &str = "/map";

/// Answers "which fixed objects exist, where, and how big?".
///
/// Holds no state between calls.
pub struct FixedObjectQueryService {
    engine: Box<dyn LogicEngine>,
    frame_id: String,
}

impl FixedObjectQueryService {
    /// Service reporting poses in [`DEFAULT_MAP_FRAME`].
    pub fn new(engine: Box<dyn LogicEngine>) -> Self {
        Self::with_frame_id(engine, DEFAULT_MAP_FRAME)
    }

    /// Service reporting poses in `frame_id`.
    pub fn with_frame_id(engine: Box<dyn LogicEngine>, frame_id: impl Into<String>) -> Self {
        Self {
            engine,
            frame_id: frame_id.into(),
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Query the knowledge base once and assemble every solution.
    #[instrument(skip(self), fields(frame_id = %self.frame_id))]
    pub fn get_fixed_kitchen_objects(&self) -> Result<FixedObjectsResponse, KnowledgeError> {
        let query = PredicateQuery::fixed_kitchen_objects();
        let text = query.to_string();
        debug!(query = %text, "querying knowledge base");

        let results = self
            .engine
            .query(&text)?
            .map(|solution| to_result(&solution))
            .collect::<Result<Vec<_>, _>>()?;

        let response = FixedObjectsResponse::from_results(self.frame_id.clone(), results);
        if response.is_empty() {
            warn!(predicate = query.predicate(), "knowledge base returned no fixed objects");
            return Err(KnowledgeError::NoResults {
                predicate: query.predicate().to_string(),
            });
        }

        info!(objects = response.len(), "fixed kitchen objects assembled");
        Ok(response)
    }
}

fn to_result(solution: &QueryBinding) -> Result<FixedObjectResult, KnowledgeError> {
    Ok(FixedObjectResult {
        name: decode_label(solution, OBJECT_VARIABLE)?,
        pose: assemble_pose(solution)?,
        bounding_box: assemble_bounding_box(solution)?,
    })
}
