use std::collections::BTreeMap;

use convert_case::{Case, Casing};
use zodgen_config::{CaseConvention, ConfigResolver, LayoutMode, Variant};
use zodgen_core::DataModel;

use crate::model::{CompileIssue, SchemaRef};

/// Suffix appended to enumeration identifiers.
pub const ENUM_SUFFIX: &str = "Schema";

/// Emitted identifier and file base name for one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub identifier: String,
    /// Cased entity name plus base suffix; the variant is encoded in the
    /// directory, not the file name.
    pub file_base: String,
}

/// Build the identifier for an entity name.
pub fn resolve_name(
    entity: &str,
    case: CaseConvention,
    base_suffix: &str,
    variant_suffix: &str,
) -> ResolvedName {
    let base = apply_case(entity, case);
    ResolvedName {
        identifier: format!("{base}{base_suffix}{variant_suffix}"),
        file_base: format!("{base}{base_suffix}"),
    }
}

/// Unit path of one (entity, variant) in the multi-file layout.
pub fn multi_file_path(variant: Variant, file_base: &str) -> String {
    format!("{variant}/{file_base}.ts")
}

pub fn apply_case(name: &str, case: CaseConvention) -> String {
    match case {
        CaseConvention::Pascal => name.to_case(Case::Pascal),
        CaseConvention::Camel => name.to_case(Case::Camel),
        CaseConvention::Snake => name.to_case(Case::Snake),
        CaseConvention::Preserve => name.to_string(),
    }
}

/// Every name decided for a run, written once before planning.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    schemas: BTreeMap<SchemaRef, ResolvedName>,
    enums: BTreeMap<String, String>,
}

impl NameTable {
    /// Name every enumeration and every enabled (entity, variant) pair.
    ///
    /// Identifiers must be unique across the run; every collision is reported.
    pub fn build(model: &DataModel, resolver: &ConfigResolver) -> Result<Self, Vec<CompileIssue>> {
        let (table, issues) = Self::collect(model, resolver);
        if issues.is_empty() {
            Ok(table)
        } else {
            Err(issues)
        }
    }

    /// Like [`NameTable::build`], but keeps the table alongside the collisions
    /// so later phases can still report their own issues.
    ///
    /// In the multi-file layout two outputs must not share a unit path either,
    /// even when their identifiers differ.
    pub fn collect(model: &DataModel, resolver: &ConfigResolver) -> (Self, Vec<CompileIssue>) {
        let mut table = NameTable::default();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        let mut path_owners: BTreeMap<String, String> = BTreeMap::new();
        let multi_file = resolver.layout() == LayoutMode::MultiFile;
        let mut issues = Vec::new();

        for enumeration in &model.enums {
            let name = resolve_name(&enumeration.name, resolver.case(), "", ENUM_SUFFIX);
            let owner = format!("enum {}", enumeration.name);
            if let Some(existing) = owners.insert(name.identifier.clone(), owner.clone()) {
                issues.push(
                    collision(&name.identifier, &existing, &owner).entity(&enumeration.name),
                );
            }
            table.enums.insert(enumeration.name.clone(), name.identifier);
        }

        for entity in &model.entities {
            for variant in Variant::ALL {
                if !resolver.is_variant_enabled(&entity.name, variant) {
                    continue;
                }

                let name = resolve_name(
                    &entity.name,
                    resolver.case(),
                    resolver.base_suffix(),
                    resolver.effective_suffix(&entity.name, variant),
                );
                let owner = format!("{}.{variant}", entity.name);
                if let Some(existing) = owners.insert(name.identifier.clone(), owner.clone()) {
                    issues.push(
                        collision(&name.identifier, &existing, &owner)
                            .entity(&entity.name)
                            .variant(variant),
                    );
                }
                if multi_file {
                    let path = multi_file_path(variant, &name.file_base);
                    if let Some(existing) = path_owners.insert(path.clone(), owner.clone()) {
                        issues.push(
                            path_collision(&path, &existing, &owner)
                                .entity(&entity.name)
                                .variant(variant),
                        );
                    }
                }
                table
                    .schemas
                    .insert(SchemaRef::new(entity.name.clone(), variant), name);
            }
        }

        (table, issues)
    }

    pub fn schema(&self, target: &SchemaRef) -> Option<&ResolvedName> {
        self.schemas.get(target)
    }

    pub fn enum_identifier(&self, name: &str) -> Option<&str> {
        self.enums.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collision(identifier: &str, existing: &str, owner: &str) -> CompileIssue {
    CompileIssue::new(
        "naming_collision",
        format!("identifier '{identifier}' for {owner} is already used by {existing}"),
    )
}

fn path_collision(path: &str, existing: &str, owner: &str) -> CompileIssue {
    CompileIssue::new(
        "naming_collision",
        format!("unit path '{path}' for {owner} is already used by {existing}"),
    )
}
