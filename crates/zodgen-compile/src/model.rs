use std::fmt;

use serde::Serialize;
use zodgen_config::Variant;

/// Name-only pointer at another (entity, variant) output.
///
/// Produced while compiling; the emission planner turns it into a concrete
/// identifier once every name is known, so no compile order is needed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SchemaRef {
    pub entity: String,
    pub variant: Variant,
}

impl SchemaRef {
    pub fn new(entity: impl Into<String>, variant: Variant) -> Self {
        Self {
            entity: entity.into(),
            variant,
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.variant)
    }
}

/// Foreign-key scalar standing in for a relation in the input variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyColumn {
    pub name: String,
    pub type_name: String,
    pub is_required: bool,
    /// Emit the column at the relation's position. False when the column is
    /// already retained as a field of its own, or was excluded on purpose.
    pub inline: bool,
}

/// Final representation of a retained field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRepr {
    Scalar { type_name: String },
    Enum { name: String, identifier: String },
    ForeignKey { columns: Vec<ForeignKeyColumn> },
    Reference { target: SchemaRef },
}

/// A retained field in a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name: String,
    pub repr: FieldRepr,
    pub is_required: bool,
    pub is_list: bool,
    pub has_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Compiled, ordered field list for one (entity, variant) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDefinition {
    pub entity: String,
    pub variant: Variant,
    pub identifier: String,
    pub file_base: String,
    /// Declared field order with excluded fields removed.
    pub fields: Vec<SchemaField>,
}

impl SchemaDefinition {
    pub fn schema_ref(&self) -> SchemaRef {
        SchemaRef::new(self.entity.clone(), self.variant)
    }

    /// Deferred references in field order.
    pub fn references(&self) -> impl Iterator<Item = (&SchemaField, &SchemaRef)> {
        self.fields.iter().filter_map(|field| match &field.repr {
            FieldRepr::Reference { target } => Some((field, target)),
            _ => None,
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}

/// Compiled enumeration ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    pub identifier: String,
    pub values: Vec<String>,
}

/// Structured compile issue identifying the offending entity/field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileIssue {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl CompileIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            entity: None,
            variant: None,
            field: None,
        }
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for CompileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code)?;
        match (&self.entity, &self.field) {
            (Some(entity), Some(field)) => write!(f, " {entity}.{field}")?,
            (Some(entity), None) => write!(f, " {entity}")?,
            _ => {}
        }
        if let Some(variant) = self.variant {
            write!(f, " ({variant})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Every fatal issue found in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    pub issues: Vec<CompileIssue>,
}

impl CompileReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = CompileIssue>) {
        self.issues.extend(issues);
    }

    pub fn codes(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.code.as_str()).collect()
    }
}
