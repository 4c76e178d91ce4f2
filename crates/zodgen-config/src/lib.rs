//! Generator configuration for zodgen.
//!
//! Defines the configuration contract, the layered override chain used to
//! merge global, variant, entity and entity-variant settings, and the
//! resolver the compiler consults for every (entity, variant, field).

pub mod errors;
pub mod layered;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use layered::{ConfigLevel, Layered};
pub use loader::{load_config, parse_config};
pub use model::{
    CaseConvention, GeneratorConfig, GlobalExclusions, LayoutMode, Mode, ModelOverride,
    PolicySettings, Variant, VariantMap, VariantSettings, VariantSettingsMap,
};
pub use resolver::{ConfigResolver, EntitySettings, ExclusionReason, FieldDecision, ResolvedVariant};
pub use schema::config_json_schema;
pub use validate::{KNOWN_OPERATIONS, validate_config_against_model, validate_config_json};
