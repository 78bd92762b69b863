//! `knowledge-reasoning` – fixed kitchen objects from the knowledge base.
//!
//! Turns the solutions of a fixed-arity logic query into labelled poses and
//! bounding boxes.
//!
//! # Modules
//!
//! - [`binding`] – [`QueryBinding`][binding::QueryBinding] and the numeric
//!   coercion rule ([`decode`][binding::decode]).
//! - [`pose`] – assembles a [`Pose`][knowledge_types::Pose] from the
//!   homogeneous-transform cells of a binding, and a
//!   [`BoundingBox`][knowledge_types::BoundingBox] from its dimensions.
//! - [`query`] – the [`LogicEngine`][query::LogicEngine] capability and the
//!   [`PredicateQuery`][query::PredicateQuery] builder/parser.
//! - [`fact_table`] – [`FactTable`][fact_table::FactTable]: an in-process
//!   logic engine answering one predicate from stored solutions.
//! - [`kitchen_model`] – [`FixedObjectQueryService`][kitchen_model::FixedObjectQueryService].

pub mod binding;
pub mod fact_table;
pub mod kitchen_model;
pub mod pose;
pub mod query;

pub use binding::{QueryBinding, QueryValue, decode, decode_label};
pub use fact_table::FactTable;
pub use kitchen_model::FixedObjectQueryService;
pub use pose::{assemble_bounding_box, assemble_pose};
pub use query::{LogicEngine, PredicateQuery, Solutions};
