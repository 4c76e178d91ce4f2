use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::schema::DataModel;
use crate::types::FieldKind;

/// Validate internal consistency of a data-model description.
///
/// This checks:
/// - duplicate entities/enums/fields
/// - identifier and unique-group fields exist
/// - relation metadata is present exactly on relation fields
/// - enum-typed fields reference a declared enum
/// - foreign-key fields and referenced fields exist
///
/// Relation pairing (mirrored sides) is checked by the relation classifier.
pub fn validate_model(model: &DataModel) -> Result<()> {
    let mut catalog: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entity in &model.entities {
        if catalog.contains_key(entity.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate entity name: {}",
                entity.name
            )));
        }

        let mut fields = BTreeSet::new();
        for field in &entity.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate field name: {}.{}",
                    entity.name, field.name
                )));
            }
        }

        catalog.insert(entity.name.as_str(), fields);
    }

    let mut enums = BTreeSet::new();
    for enumeration in &model.enums {
        if !enums.insert(enumeration.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate enum name: {}",
                enumeration.name
            )));
        }
    }

    for entity in &model.entities {
        let fields = catalog.get(entity.name.as_str()).ok_or_else(|| {
            Error::InvalidModel(format!("missing entity in catalog: {}", entity.name))
        })?;

        for id_field in &entity.id_fields {
            if !fields.contains(id_field.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "identifier field not found: {}.{}",
                    entity.name, id_field
                )));
            }
        }

        for group in &entity.unique_groups {
            for member in group {
                if !fields.contains(member.as_str()) {
                    return Err(Error::InvalidModel(format!(
                        "unique field not found: {}.{}",
                        entity.name, member
                    )));
                }
            }
        }

        for field in &entity.fields {
            match (field.kind, field.relation.as_ref()) {
                (FieldKind::Relation, None) => {
                    return Err(Error::InvalidModel(format!(
                        "relation field without relation metadata: {}.{}",
                        entity.name, field.name
                    )));
                }
                (FieldKind::Scalar | FieldKind::Enum, Some(_)) => {
                    return Err(Error::InvalidModel(format!(
                        "relation metadata on non-relation field: {}.{}",
                        entity.name, field.name
                    )));
                }
                (FieldKind::Enum, None) => {
                    if !enums.contains(field.type_name.as_str()) {
                        return Err(Error::InvalidModel(format!(
                            "enum type not found: {}.{} ({})",
                            entity.name, field.name, field.type_name
                        )));
                    }
                }
                (FieldKind::Relation, Some(relation)) => {
                    for column in &relation.fields {
                        if !fields.contains(column.as_str()) {
                            return Err(Error::InvalidModel(format!(
                                "foreign key field not found: {}.{}",
                                entity.name, column
                            )));
                        }
                    }

                    if relation.references.len() != relation.fields.len() {
                        return Err(Error::InvalidModel(format!(
                            "foreign key arity mismatch: {}.{}",
                            entity.name, field.name
                        )));
                    }

                    // Missing related entities are a classification failure, reported later.
                    if let Some(related) = catalog.get(relation.related_entity.as_str()) {
                        for reference in &relation.references {
                            if !related.contains(reference.as_str()) {
                                return Err(Error::InvalidModel(format!(
                                    "referenced field not found: {}.{}",
                                    relation.related_entity, reference
                                )));
                            }
                        }
                    }
                }
                (FieldKind::Scalar, None) => {}
            }
        }
    }

    Ok(())
}
