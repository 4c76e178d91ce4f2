use thiserror::Error;
use zodgen_config::{ConfigResolver, Variant};
use zodgen_core::{DataModel, Entity, Field, RelationInfo};

use crate::model::SchemaRef;

/// Relation switches taken from the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationPolicy {
    /// Keep relation fields in the pure and result variants.
    pub relation_model: bool,
    /// Reference the related input schema instead of foreign-key scalars.
    pub nested_input: bool,
}

impl RelationPolicy {
    pub fn from_resolver(resolver: &ConfigResolver) -> Self {
        Self {
            relation_model: resolver.relation_model(),
            nested_input: resolver.policies().nested_relation_input,
        }
    }
}

impl Default for RelationPolicy {
    fn default() -> Self {
        Self {
            relation_model: true,
            nested_input: false,
        }
    }
}

/// How a field is represented in one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Treatment {
    /// Scalar and enum fields pass through unchanged.
    Direct,
    /// Owning-side relation replaced by its local foreign-key fields.
    ForeignKeySubstitute { columns: Vec<String> },
    /// Reference to another (entity, variant), named later.
    DeferredReference(SchemaRef),
    /// Not represented in this variant.
    Dropped,
}

/// Relation metadata that cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("relation '{relation}' points at unknown entity '{related}'")]
    UnknownRelatedEntity { relation: String, related: String },
    #[error("relation '{relation}' has no mirrored field on '{related}'")]
    UnmirroredRelation { relation: String, related: String },
}

impl ClassificationError {
    pub fn code(&self) -> &'static str {
        match self {
            ClassificationError::UnknownRelatedEntity { .. } => "unknown_related_entity",
            ClassificationError::UnmirroredRelation { .. } => "unmirrored_relation",
        }
    }
}

/// Decide how `field` of `entity` is represented in `variant`.
///
/// Relation fields are checked for a mirrored field on the related entity
/// before any treatment is chosen, so an unpaired relation always fails.
pub fn classify(
    field: &Field,
    entity: &Entity,
    model: &DataModel,
    variant: Variant,
    policy: RelationPolicy,
) -> Result<Treatment, ClassificationError> {
    let Some(relation) = field.relation() else {
        return Ok(Treatment::Direct);
    };

    let related = model.entity(&relation.related_entity).ok_or_else(|| {
        ClassificationError::UnknownRelatedEntity {
            relation: relation.name.clone(),
            related: relation.related_entity.clone(),
        }
    })?;

    if find_mirror(field, entity, relation, related).is_none() {
        return Err(ClassificationError::UnmirroredRelation {
            relation: relation.name.clone(),
            related: related.name.clone(),
        });
    }

    let treatment = match variant {
        Variant::Input if !relation.is_owning() => Treatment::Dropped,
        Variant::Input if policy.nested_input => {
            Treatment::DeferredReference(SchemaRef::new(related.name.clone(), Variant::Input))
        }
        Variant::Input => Treatment::ForeignKeySubstitute {
            columns: relation.fields.clone(),
        },
        Variant::Pure | Variant::Result if policy.relation_model => {
            Treatment::DeferredReference(SchemaRef::new(related.name.clone(), variant))
        }
        Variant::Pure | Variant::Result => Treatment::Dropped,
    };

    Ok(treatment)
}

/// Field on `related` declaring the same relation back to `entity`.
///
/// For self-relations the mirror must be a different field.
pub fn find_mirror<'a>(
    field: &Field,
    entity: &Entity,
    relation: &RelationInfo,
    related: &'a Entity,
) -> Option<&'a Field> {
    related.relation_fields().find_map(|(candidate, other)| {
        let same_field = related.name == entity.name && candidate.name == field.name;
        (other.name == relation.name && other.related_entity == entity.name && !same_field)
            .then_some(candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zodgen_core::FieldKind;

    fn scalar(name: &str) -> Field {
        Field {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            type_name: "Int".to_string(),
            is_required: true,
            is_list: false,
            is_unique: false,
            is_id: name == "id",
            is_read_only: false,
            has_default: false,
            is_generated: false,
            is_updated_at: false,
            relation: None,
            documentation: None,
        }
    }

    fn relation(name: &str, target: &str, relation_name: &str, fk: &[&str]) -> Field {
        Field {
            kind: FieldKind::Relation,
            type_name: target.to_string(),
            relation: Some(RelationInfo {
                name: relation_name.to_string(),
                related_entity: target.to_string(),
                fields: fk.iter().map(|item| item.to_string()).collect(),
                references: fk.iter().map(|_| "id".to_string()).collect(),
            }),
            ..scalar(name)
        }
    }

    fn entity(name: &str, fields: Vec<Field>) -> Entity {
        Entity {
            name: name.to_string(),
            fields,
            id_fields: Vec::new(),
            unique_groups: Vec::new(),
            documentation: None,
        }
    }

    fn blog() -> DataModel {
        DataModel {
            entities: vec![
                entity(
                    "User",
                    vec![scalar("id"), relation("posts", "Post", "PostToUser", &[])],
                ),
                entity(
                    "Post",
                    vec![
                        scalar("id"),
                        scalar("authorId"),
                        relation("author", "User", "PostToUser", &["authorId"]),
                    ],
                ),
            ],
            enums: Vec::new(),
        }
    }

    fn classify_in(
        model: &DataModel,
        entity: &str,
        field: &str,
        variant: Variant,
        policy: RelationPolicy,
    ) -> Result<Treatment, ClassificationError> {
        let entity = model.entity(entity).unwrap();
        classify(entity.field(field).unwrap(), entity, model, variant, policy)
    }

    #[test]
    fn scalars_are_direct_in_every_variant() {
        let model = blog();
        for variant in Variant::ALL {
            assert_eq!(
                classify_in(&model, "Post", "authorId", variant, RelationPolicy::default()),
                Ok(Treatment::Direct)
            );
        }
    }

    #[test]
    fn owning_side_uses_foreign_keys_in_input() {
        let model = blog();
        assert_eq!(
            classify_in(&model, "Post", "author", Variant::Input, RelationPolicy::default()),
            Ok(Treatment::ForeignKeySubstitute {
                columns: vec!["authorId".to_string()]
            })
        );
        assert_eq!(
            classify_in(&model, "Post", "author", Variant::Result, RelationPolicy::default()),
            Ok(Treatment::DeferredReference(SchemaRef::new("User", Variant::Result)))
        );
    }

    #[test]
    fn nested_input_references_related_input() {
        let model = blog();
        let policy = RelationPolicy {
            nested_input: true,
            ..RelationPolicy::default()
        };
        assert_eq!(
            classify_in(&model, "Post", "author", Variant::Input, policy),
            Ok(Treatment::DeferredReference(SchemaRef::new("User", Variant::Input)))
        );
    }

    #[test]
    fn non_owning_side_is_dropped_from_input() {
        let model = blog();
        assert_eq!(
            classify_in(&model, "User", "posts", Variant::Input, RelationPolicy::default()),
            Ok(Treatment::Dropped)
        );
        assert_eq!(
            classify_in(&model, "User", "posts", Variant::Pure, RelationPolicy::default()),
            Ok(Treatment::DeferredReference(SchemaRef::new("Post", Variant::Pure)))
        );
    }

    #[test]
    fn relation_model_off_drops_references() {
        let model = blog();
        let policy = RelationPolicy {
            relation_model: false,
            ..RelationPolicy::default()
        };
        assert_eq!(
            classify_in(&model, "User", "posts", Variant::Pure, policy),
            Ok(Treatment::Dropped)
        );
    }

    #[test]
    fn unmirrored_relation_fails() {
        let mut model = blog();
        model.entities[0].fields.pop();

        let err = classify_in(&model, "Post", "author", Variant::Pure, RelationPolicy::default())
            .unwrap_err();
        assert_eq!(err.code(), "unmirrored_relation");
    }

    #[test]
    fn unknown_related_entity_fails() {
        let model = DataModel {
            entities: vec![entity(
                "Post",
                vec![scalar("id"), relation("tags", "Tag", "PostToTag", &[])],
            )],
            enums: Vec::new(),
        };

        let err = classify_in(&model, "Post", "tags", Variant::Pure, RelationPolicy::default())
            .unwrap_err();
        assert_eq!(err.code(), "unknown_related_entity");
    }

    #[test]
    fn self_relation_needs_a_second_field() {
        let lonely = DataModel {
            entities: vec![entity(
                "Employee",
                vec![
                    scalar("id"),
                    scalar("managerId"),
                    relation("manager", "Employee", "Management", &["managerId"]),
                ],
            )],
            enums: Vec::new(),
        };
        assert!(
            classify_in(&lonely, "Employee", "manager", Variant::Pure, RelationPolicy::default())
                .is_err()
        );

        let mut paired = lonely.clone();
        paired.entities[0]
            .fields
            .push(relation("reports", "Employee", "Management", &[]));
        assert_eq!(
            classify_in(&paired, "Employee", "manager", Variant::Pure, RelationPolicy::default()),
            Ok(Treatment::DeferredReference(SchemaRef::new("Employee", Variant::Pure)))
        );
    }
}
