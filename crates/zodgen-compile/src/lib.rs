//! Compilation pipeline for zodgen.
//!
//! Turns a validated data model plus a resolved generator configuration into
//! per-variant schema definitions, groups them into output units and renders
//! those units as `zod` TypeScript modules.

pub mod classify;
pub mod compiler;
pub mod engine;
pub mod errors;
pub mod model;
pub mod naming;
pub mod output;
pub mod planner;

pub use classify::{ClassificationError, RelationPolicy, Treatment, classify};
pub use compiler::{ModelCompiler, compile_enums};
pub use engine::CompileEngine;
pub use errors::CompileError;
pub use model::{
    CompileIssue, CompileReport, EnumDefinition, FieldRepr, ForeignKeyColumn, SchemaDefinition,
    SchemaField, SchemaRef,
};
pub use naming::{NameTable, ResolvedName, resolve_name};
pub use output::{RenderedFile, fingerprint, render_plan, render_unit};
pub use planner::{CrossReference, EmissionPlan, Import, OutputUnit, UnitItem, plan};
