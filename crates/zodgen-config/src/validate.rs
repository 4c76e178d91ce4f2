use jsonschema::JSONSchema;
use serde_json::Value;
use zodgen_core::{DataModel, Entity};

use crate::errors::{ConfigError, Result, ValidationIssue, ValidationReport};
use crate::model::{GeneratorConfig, Variant};
use crate::schema::config_json_schema;

/// Operation names understood by the downstream operation filter.
pub const KNOWN_OPERATIONS: &[&str] = &[
    "findUnique",
    "findUniqueOrThrow",
    "findFirst",
    "findFirstOrThrow",
    "findMany",
    "create",
    "createMany",
    "update",
    "updateMany",
    "upsert",
    "delete",
    "deleteMany",
    "aggregate",
    "groupBy",
    "count",
];

/// Validate a configuration document against the configuration JSON Schema.
pub fn validate_config_json(config_json: &Value) -> Result<ValidationReport> {
    let schema = serde_json::to_value(config_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Cross-check a parsed configuration against the data model.
///
/// Everything reported here is a warning: unknown names are ignored by the
/// resolver, and identifier exclusions for the pure variant are not honored.
pub fn validate_config_against_model(
    config: &GeneratorConfig,
    model: &DataModel,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_global_lists(config, model, &mut report);

    for (name, overrides) in &config.models {
        let base_path = format!("/models/{name}");
        let Some(entity) = model.entity(name) else {
            report.push(
                ValidationIssue::warning(
                    "unknown_model_override",
                    base_path,
                    format!("model '{name}' is not declared in the data model"),
                )
                .hint("remove the override or fix the model name"),
            );
            continue;
        };

        if let Some(fields) = &overrides.exclude_fields {
            let path = format!("{base_path}/excludeFields");
            check_entity_list(entity, fields, &path, true, &mut report);
        }

        for variant in Variant::ALL {
            if let Some(fields) = &overrides.variants.get(variant).exclude_fields {
                let path = format!("{base_path}/variants/{variant}/excludeFields");
                check_entity_list(entity, fields, &path, variant == Variant::Pure, &mut report);
            }
        }

        if let Some(operations) = &overrides.operations {
            for (idx, operation) in operations.iter().enumerate() {
                if !KNOWN_OPERATIONS.contains(&operation.as_str()) {
                    report.push(ValidationIssue::warning(
                        "unknown_operation",
                        format!("{base_path}/operations/{idx}"),
                        format!("operation '{operation}' is not recognized"),
                    ));
                }
            }
        }
    }

    report
}

fn validate_global_lists(
    config: &GeneratorConfig,
    model: &DataModel,
    report: &mut ValidationReport,
) {
    for variant in Variant::ALL {
        let lists = [
            (
                format!("/variants/{variant}/excludeFields"),
                config.variants.get(variant).exclude_fields.as_ref(),
            ),
            (
                format!("/globalExclusions/{variant}"),
                config.global_exclusions.get(variant),
            ),
        ];

        for (path, fields) in lists {
            let Some(fields) = fields else {
                continue;
            };

            for (idx, name) in fields.iter().enumerate() {
                let declaring: Vec<&Entity> = model
                    .entities
                    .iter()
                    .filter(|entity| entity.has_field(name))
                    .collect();

                if declaring.is_empty() {
                    report.push(ValidationIssue::warning(
                        "unknown_excluded_field",
                        format!("{path}/{idx}"),
                        format!("no model declares a field named '{name}'"),
                    ));
                    continue;
                }

                if variant == Variant::Pure {
                    for entity in declaring {
                        if entity.field(name).is_some_and(|field| entity.is_identifier(field)) {
                            report.push(identifier_ignored(
                                &entity.name,
                                name,
                                format!("{path}/{idx}"),
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn check_entity_list(
    entity: &Entity,
    fields: &[String],
    path: &str,
    applies_to_pure: bool,
    report: &mut ValidationReport,
) {
    for (idx, name) in fields.iter().enumerate() {
        match entity.field(name) {
            None => report.push(ValidationIssue::warning(
                "unknown_excluded_field",
                format!("{path}/{idx}"),
                format!("model '{}' has no field named '{name}'", entity.name),
            )),
            Some(field) if applies_to_pure && entity.is_identifier(field) => {
                report.push(identifier_ignored(&entity.name, name, format!("{path}/{idx}")));
            }
            Some(_) => {}
        }
    }
}

fn identifier_ignored(entity: &str, field: &str, path: String) -> ValidationIssue {
    ValidationIssue::warning(
        "identifier_exclusion_ignored",
        path,
        format!("identifier field '{entity}.{field}' is always kept in the pure variant"),
    )
    .hint("exclude the field from the input or result variant instead")
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelOverride;
    use serde_json::json;
    use zodgen_core::{Field, FieldKind};

    fn model() -> DataModel {
        let field = |name: &str| Field {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            type_name: "String".to_string(),
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
        };
        DataModel {
            entities: vec![Entity {
                name: "User".to_string(),
                fields: vec![field("id"), field("email"), field("password")],
                id_fields: Vec::new(),
                unique_groups: Vec::new(),
                documentation: None,
            }],
            enums: Vec::new(),
        }
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|issue| issue.code.as_str()).collect()
    }

    #[test]
    fn structural_validation_flags_wrong_types() {
        let report = validate_config_json(&json!({ "mode": "everything" })).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.errors[0].code, "schema_violation");
        assert_eq!(report.errors[0].path, "/mode");
    }

    #[test]
    fn structural_validation_accepts_full_document() {
        let document = json!({
            "mode": "minimal",
            "useMultipleFiles": true,
            "modelCase": "camelCase",
            "variants": { "input": { "enabled": true, "suffix": "Create", "excludeFields": ["id"] } },
            "globalExclusions": { "input": ["password"] },
            "models": { "User": { "enabled": true, "operations": ["findMany"] } }
        });
        let report = validate_config_json(&document).unwrap();
        assert!(report.is_ok(), "{report:?}");
    }

    #[test]
    fn unknown_names_are_warnings() {
        let mut config = GeneratorConfig::default();
        config.global_exclusions.input = Some(vec!["secret".to_string()]);
        config.models.insert("Ghost".to_string(), ModelOverride::default());
        let mut user = ModelOverride::default();
        user.variants.result.exclude_fields = Some(vec!["nickname".to_string()]);
        user.operations = Some(vec!["findMany".to_string(), "explode".to_string()]);
        config.models.insert("User".to_string(), user);

        let report = validate_config_against_model(&config, &model());
        assert!(report.is_ok());
        assert_eq!(
            codes(&report.warnings),
            vec![
                "unknown_excluded_field",
                "unknown_model_override",
                "unknown_excluded_field",
                "unknown_operation"
            ]
        );
        assert_eq!(report.warnings[3].path, "/models/User/operations/1");
    }

    #[test]
    fn identifier_exclusion_from_pure_is_reported() {
        let mut config = GeneratorConfig::default();
        config.global_exclusions.pure = Some(vec!["id".to_string()]);
        config.global_exclusions.result = Some(vec!["id".to_string()]);

        let report = validate_config_against_model(&config, &model());
        assert_eq!(codes(&report.warnings), vec!["identifier_exclusion_ignored"]);
        assert_eq!(report.warnings[0].path, "/globalExclusions/pure/0");
    }
}
