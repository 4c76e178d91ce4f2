use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Relation metadata attached to a relation-kind field.
///
/// Both sides of a bidirectional relation share the same `name`. Only the
/// owning side lists local foreign-key `fields`; the other side leaves them
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationInfo {
    /// Logical relation name used to pair the two sides.
    pub name: String,
    /// Entity on the other side of the relation.
    pub related_entity: String,
    /// Local scalar fields carrying the foreign key (owning side only).
    #[serde(default)]
    pub fields: Vec<String>,
    /// Referenced fields on the related entity, positionally matching `fields`.
    #[serde(default)]
    pub references: Vec<String>,
}

impl RelationInfo {
    /// Returns true when this side carries the foreign-key scalars.
    pub fn is_owning(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Pairs each local foreign-key field with the field it references.
    pub fn key_pairs(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.as_str(), self.references.get(idx).map(String::as_str)))
    }
}
