//! Core contracts for zodgen.
//!
//! This crate defines the immutable data-model description (entities, fields,
//! relations, enumerations) consumed by the compiler, plus consistency checks
//! and a relation dependency report shared by the CLI.

pub mod constraints;
pub mod error;
pub mod graph;
pub mod schema;
pub mod types;
pub mod validation;

pub use constraints::RelationInfo;
pub use error::{Error, Result};
pub use graph::{build_relation_graph_report, RelationGraphReport, RelationGraphSummary};
pub use schema::{DataModel, Entity, Field};
pub use types::{Enumeration, FieldKind, ScalarType};
pub use validation::validate_model;

/// Current contract version for data-model description artifacts.
pub const MODEL_VERSION: &str = "0.1";
