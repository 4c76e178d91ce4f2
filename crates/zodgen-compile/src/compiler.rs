use zodgen_config::{ConfigResolver, ExclusionReason, FieldDecision, Variant};
use zodgen_core::{DataModel, Entity, FieldKind};

use crate::classify::{RelationPolicy, Treatment, classify};
use crate::model::{
    CompileIssue, EnumDefinition, FieldRepr, ForeignKeyColumn, SchemaDefinition, SchemaField,
    SchemaRef,
};
use crate::naming::NameTable;

/// Turns one entity into the schema definition of one variant.
#[derive(Debug, Clone, Copy)]
pub struct ModelCompiler<'a> {
    model: &'a DataModel,
    resolver: &'a ConfigResolver,
    names: &'a NameTable,
    policy: RelationPolicy,
}

impl<'a> ModelCompiler<'a> {
    pub fn new(model: &'a DataModel, resolver: &'a ConfigResolver, names: &'a NameTable) -> Self {
        Self {
            model,
            resolver,
            names,
            policy: RelationPolicy::from_resolver(resolver),
        }
    }

    /// Compile `entity` for `variant`.
    ///
    /// Fields keep their declared order. Every field that fails
    /// classification is reported and the definition is not produced. An
    /// empty field list is a valid result.
    pub fn compile(
        &self,
        entity: &Entity,
        variant: Variant,
    ) -> Result<SchemaDefinition, Vec<CompileIssue>> {
        let target = SchemaRef::new(entity.name.clone(), variant);
        let name = self.names.schema(&target).ok_or_else(|| {
            vec![
                CompileIssue::new("unnamed_schema", "no identifier was assigned")
                    .entity(&entity.name)
                    .variant(variant),
            ]
        })?;

        let mut fields = Vec::with_capacity(entity.fields.len());
        let mut issues = Vec::new();

        for field in &entity.fields {
            if !self.resolver.resolve(entity, variant, field).is_included() {
                continue;
            }

            let treatment = match classify(field, entity, self.model, variant, self.policy) {
                Ok(treatment) => treatment,
                Err(err) => {
                    issues.push(
                        CompileIssue::new(err.code(), err.to_string())
                            .entity(&entity.name)
                            .variant(variant)
                            .field(&field.name),
                    );
                    continue;
                }
            };

            let repr = match treatment {
                Treatment::Direct if field.kind == FieldKind::Enum => FieldRepr::Enum {
                    name: field.type_name.clone(),
                    identifier: self
                        .names
                        .enum_identifier(&field.type_name)
                        .unwrap_or(field.type_name.as_str())
                        .to_string(),
                },
                Treatment::Direct => FieldRepr::Scalar {
                    type_name: field.type_name.clone(),
                },
                Treatment::ForeignKeySubstitute { columns } => FieldRepr::ForeignKey {
                    columns: self.foreign_key_columns(entity, variant, &columns),
                },
                Treatment::DeferredReference(target) => FieldRepr::Reference { target },
                Treatment::Dropped => continue,
            };

            fields.push(SchemaField {
                name: field.name.clone(),
                repr,
                is_required: field.is_required,
                is_list: field.is_list,
                has_default: field.has_default,
                documentation: field.documentation.clone(),
            });
        }

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(SchemaDefinition {
            entity: entity.name.clone(),
            variant,
            identifier: name.identifier.clone(),
            file_base: name.file_base.clone(),
            fields,
        })
    }

    /// Columns are inlined only when a policy, not the user, removed them
    /// from the variant, e.g. foreign keys that are also identifiers.
    fn foreign_key_columns(
        &self,
        entity: &Entity,
        variant: Variant,
        columns: &[String],
    ) -> Vec<ForeignKeyColumn> {
        columns
            .iter()
            .filter_map(|column| entity.field(column))
            .map(|field| {
                let inline = matches!(
                    self.resolver.resolve(entity, variant, field),
                    FieldDecision::Excluded(
                        ExclusionReason::IdentifierPolicy | ExclusionReason::ReadOnlyPolicy
                    )
                );
                ForeignKeyColumn {
                    name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    is_required: field.is_required,
                    inline,
                }
            })
            .collect()
    }
}

/// Enumerations in declaration order with their emitted identifiers.
pub fn compile_enums(model: &DataModel, names: &NameTable) -> Vec<EnumDefinition> {
    model
        .enums
        .iter()
        .map(|enumeration| EnumDefinition {
            name: enumeration.name.clone(),
            identifier: names
                .enum_identifier(&enumeration.name)
                .unwrap_or(enumeration.name.as_str())
                .to_string(),
            values: enumeration.values.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zodgen_config::{GeneratorConfig, ModelOverride};
    use zodgen_core::{Enumeration, Field, RelationInfo};

    fn field(name: &str, kind: FieldKind, type_name: &str, required: bool) -> Field {
        Field {
            name: name.to_string(),
            kind,
            type_name: type_name.to_string(),
            is_required: required,
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

    fn relation(name: &str, target: &str, relation_name: &str, fk: &[&str], list: bool) -> Field {
        Field {
            is_list: list,
            relation: Some(RelationInfo {
                name: relation_name.to_string(),
                related_entity: target.to_string(),
                fields: fk.iter().map(|item| item.to_string()).collect(),
                references: fk.iter().map(|_| "id".to_string()).collect(),
            }),
            ..field(name, FieldKind::Relation, target, !list)
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
                    vec![
                        field("id", FieldKind::Scalar, "Int", true),
                        field("email", FieldKind::Scalar, "String", true),
                        field("role", FieldKind::Enum, "Role", true),
                        relation("posts", "Post", "PostToUser", &[], true),
                    ],
                ),
                entity(
                    "Post",
                    vec![
                        field("id", FieldKind::Scalar, "Int", true),
                        relation("author", "User", "PostToUser", &["authorId"], false),
                        field("authorId", FieldKind::Scalar, "Int", true),
                    ],
                ),
            ],
            enums: vec![Enumeration {
                name: "Role".to_string(),
                values: vec!["ADMIN".to_string()],
            }],
        }
    }

    fn compile(
        model: &DataModel,
        config: &GeneratorConfig,
        entity: &str,
        variant: Variant,
    ) -> Result<SchemaDefinition, Vec<CompileIssue>> {
        let resolver = ConfigResolver::new(config, model);
        let names = NameTable::build(model, &resolver).expect("names");
        let compiler = ModelCompiler::new(model, &resolver, &names);
        compiler.compile(model.entity(entity).unwrap(), variant)
    }

    #[test]
    fn pure_variant_keeps_declared_order() {
        let model = blog();
        let definition = compile(&model, &GeneratorConfig::default(), "User", Variant::Pure).unwrap();

        assert_eq!(definition.identifier, "UserModel");
        assert_eq!(definition.field_names(), vec!["id", "email", "role", "posts"]);
        assert_eq!(
            definition.fields[2].repr,
            FieldRepr::Enum {
                name: "Role".to_string(),
                identifier: "RoleSchema".to_string()
            }
        );
        assert_eq!(
            definition.fields[3].repr,
            FieldRepr::Reference {
                target: SchemaRef::new("Post", Variant::Pure)
            }
        );
    }

    #[test]
    fn input_substitutes_foreign_keys_without_duplicating() {
        let model = blog();
        let definition = compile(&model, &GeneratorConfig::default(), "Post", Variant::Input).unwrap();

        assert_eq!(definition.field_names(), vec!["author", "authorId"]);
        let FieldRepr::ForeignKey { columns } = &definition.fields[0].repr else {
            panic!("expected foreign key substitute");
        };
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "authorId");
        assert!(!columns[0].inline);
    }

    #[test]
    fn identifier_foreign_keys_are_inlined() {
        let mut model = blog();
        model.entities[1].id_fields = vec!["authorId".to_string()];

        let definition = compile(&model, &GeneratorConfig::default(), "Post", Variant::Input).unwrap();
        assert_eq!(definition.field_names(), vec!["author"]);
        let FieldRepr::ForeignKey { columns } = &definition.fields[0].repr else {
            panic!("expected foreign key substitute");
        };
        assert!(columns[0].inline);
    }

    #[test]
    fn fully_excluded_variant_is_empty_not_an_error() {
        let model = blog();
        let mut config = GeneratorConfig::default();
        let mut post = ModelOverride::default();
        post.variants.result.exclude_fields =
            Some(vec!["id".to_string(), "author".to_string(), "authorId".to_string()]);
        config.models.insert("Post".to_string(), post);

        let definition = compile(&model, &config, "Post", Variant::Result).unwrap();
        assert!(definition.fields.is_empty());
        assert_eq!(definition.identifier, "PostResult");
    }

    #[test]
    fn every_unmirrored_field_is_reported() {
        let mut model = blog();
        model.entities[0].fields.push(relation("drafts", "Post", "Drafts", &[], true));
        model.entities[0].fields.push(relation("likes", "Post", "Likes", &[], true));

        let issues = compile(&model, &GeneratorConfig::default(), "User", Variant::Pure).unwrap_err();
        let fields: Vec<_> = issues.iter().filter_map(|issue| issue.field.as_deref()).collect();
        assert_eq!(fields, vec!["drafts", "likes"]);
        assert!(issues.iter().all(|issue| issue.code == "unmirrored_relation"));
    }

    #[test]
    fn excluded_relations_are_not_classified() {
        let mut model = blog();
        model.entities[0].fields.push(relation("drafts", "Post", "Drafts", &[], true));
        let mut config = GeneratorConfig::default();
        let mut user = ModelOverride::default();
        user.exclude_fields = Some(vec!["drafts".to_string()]);
        config.models.insert("User".to_string(), user);

        assert!(compile(&model, &config, "User", Variant::Pure).is_ok());
    }
}
