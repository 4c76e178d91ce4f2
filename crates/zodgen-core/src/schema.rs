use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::RelationInfo;
use crate::types::{Enumeration, FieldKind};

/// Top-level data-model description for one generator run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    /// Entities in declaration order.
    pub entities: Vec<Entity>,
    /// Enumerations in declaration order.
    #[serde(default)]
    pub enums: Vec<Enumeration>,
}

impl DataModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enumeration> {
        self.enums.iter().find(|item| item.name == name)
    }
}

/// A named record type of the data model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    /// Fields in declaration order; emitted output follows this order.
    pub fields: Vec<Field>,
    /// Fields forming a compound identifier.
    #[serde(default)]
    pub id_fields: Vec<String>,
    /// Groups of fields that are unique together.
    #[serde(default)]
    pub unique_groups: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// True when the field is part of the entity identifier.
    pub fn is_identifier(&self, field: &Field) -> bool {
        field.is_id || self.id_fields.iter().any(|name| name == &field.name)
    }

    /// Identifier fields in declaration order.
    pub fn identifier_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| self.is_identifier(field))
    }

    /// Relation fields in declaration order.
    pub fn relation_fields(&self) -> impl Iterator<Item = (&Field, &RelationInfo)> {
        self.fields
            .iter()
            .filter_map(|field| field.relation().map(|relation| (field, relation)))
    }
}

/// A named attribute of an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    /// Declared type name: scalar name, enum name or related entity name.
    pub type_name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub is_updated_at: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Field {
    pub fn relation(&self) -> Option<&RelationInfo> {
        match self.kind {
            FieldKind::Relation => self.relation.as_ref(),
            _ => None,
        }
    }

    pub fn is_relation(&self) -> bool {
        self.kind == FieldKind::Relation
    }
}
