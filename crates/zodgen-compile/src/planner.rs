use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;
use zodgen_config::{ConfigResolver, LayoutMode};

use crate::model::{CompileIssue, EnumDefinition, FieldRepr, SchemaDefinition, SchemaRef};
use crate::naming::{NameTable, multi_file_path};

/// Unit name and path used by the single-file layout.
pub const SINGLE_UNIT_NAME: &str = "index";
/// Path of the shared enumeration unit in the multi-file layout.
pub const ENUM_UNIT_PATH: &str = "enums.ts";

/// Resolved deferred reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    /// Definition holding the reference.
    pub source: SchemaRef,
    pub field: String,
    pub target: SchemaRef,
    /// Emitted identifier of the target.
    pub identifier: String,
    /// Path of the unit defining the target.
    pub unit_path: String,
    /// Target lives in the same unit as the source.
    pub local: bool,
    /// Target is not yet defined where the reference is emitted, or the two
    /// units reference each other; emit it as a forward declaration.
    pub lazy: bool,
}

/// Named import of another unit's identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// Module specifier relative to the importing unit, without extension.
    pub module: String,
    pub identifiers: Vec<String>,
}

/// Item emitted into a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "definition", rename_all = "snake_case")]
pub enum UnitItem {
    Enum(EnumDefinition),
    Schema(SchemaDefinition),
}

/// One emitted file's worth of definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputUnit {
    pub name: String,
    /// Path relative to the output directory.
    pub path: String,
    /// Items in emit order.
    pub items: Vec<UnitItem>,
    pub references: Vec<CrossReference>,
    /// Sorted by module, identifiers sorted and deduplicated.
    pub imports: Vec<Import>,
}

impl OutputUnit {
    fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            items: Vec::new(),
            references: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.items.iter().filter_map(|item| match item {
            UnitItem::Schema(definition) => Some(definition),
            UnitItem::Enum(_) => None,
        })
    }

    pub fn reference(&self, source: &SchemaRef, field: &str) -> Option<&CrossReference> {
        self.references
            .iter()
            .find(|reference| &reference.source == source && reference.field == field)
    }
}

/// Complete, ordered set of units for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmissionPlan {
    pub layout: LayoutMode,
    pub units: Vec<OutputUnit>,
}

impl EmissionPlan {
    pub fn unit(&self, path: &str) -> Option<&OutputUnit> {
        self.units.iter().find(|unit| unit.path == path)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.units.iter().flat_map(OutputUnit::schemas)
    }
}

/// Group definitions into units and resolve every deferred reference.
///
/// `definitions` must be in entity-declaration order, variants in
/// pure/input/result order. References to a disabled entity or variant are
/// configuration errors; all of them are reported.
pub fn plan(
    definitions: Vec<SchemaDefinition>,
    enums: Vec<EnumDefinition>,
    names: &NameTable,
    resolver: &ConfigResolver,
) -> Result<EmissionPlan, Vec<CompileIssue>> {
    let layout = resolver.layout();
    let paths: BTreeMap<SchemaRef, String> = definitions
        .iter()
        .map(|definition| (definition.schema_ref(), unit_path(layout, definition)))
        .collect();

    let mut issues = Vec::new();
    let mut resolved: Vec<Vec<CrossReference>> = Vec::with_capacity(definitions.len());

    for definition in &definitions {
        let source = definition.schema_ref();
        let source_path = unit_path(layout, definition);
        let mut references = Vec::new();

        for (field, target) in definition.references() {
            let Some(name) = names.schema(target) else {
                issues.push(disabled_reference(resolver, &source, &field.name, target));
                continue;
            };
            let target_path = paths
                .get(target)
                .cloned()
                .unwrap_or_else(|| unit_path_for(layout, target, &name.file_base));

            references.push(CrossReference {
                source: source.clone(),
                field: field.name.clone(),
                target: target.clone(),
                identifier: name.identifier.clone(),
                local: target_path == source_path,
                unit_path: target_path,
                lazy: false,
            });
        }

        resolved.push(references);
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    mark_lazy(layout, &definitions, &mut resolved);

    let units = match layout {
        LayoutMode::SingleFile => single_unit(definitions, enums, resolved),
        LayoutMode::MultiFile => multi_units(definitions, enums, resolved),
    };

    Ok(EmissionPlan { layout, units })
}

fn unit_path(layout: LayoutMode, definition: &SchemaDefinition) -> String {
    unit_path_for(layout, &definition.schema_ref(), &definition.file_base)
}

fn unit_path_for(layout: LayoutMode, target: &SchemaRef, file_base: &str) -> String {
    match layout {
        LayoutMode::SingleFile => format!("{SINGLE_UNIT_NAME}.ts"),
        LayoutMode::MultiFile => multi_file_path(target.variant, file_base),
    }
}

fn disabled_reference(
    resolver: &ConfigResolver,
    source: &SchemaRef,
    field: &str,
    target: &SchemaRef,
) -> CompileIssue {
    let issue = if resolver.is_entity_enabled(&target.entity) {
        CompileIssue::new(
            "reference_to_disabled_variant",
            format!("references {target}, which is disabled"),
        )
    } else {
        CompileIssue::new(
            "reference_to_disabled_entity",
            format!("references entity '{}', which is disabled", target.entity),
        )
    };
    issue
        .entity(&source.entity)
        .variant(source.variant)
        .field(field)
}

fn mark_lazy(
    layout: LayoutMode,
    definitions: &[SchemaDefinition],
    resolved: &mut [Vec<CrossReference>],
) {
    match layout {
        LayoutMode::SingleFile => {
            let positions: BTreeMap<SchemaRef, usize> = definitions
                .iter()
                .enumerate()
                .map(|(idx, definition)| (definition.schema_ref(), idx))
                .collect();

            for (idx, references) in resolved.iter_mut().enumerate() {
                for reference in references {
                    reference.lazy = positions
                        .get(&reference.target)
                        .is_none_or(|target| *target >= idx);
                }
            }
        }
        LayoutMode::MultiFile => {
            let cyclic: Vec<Vec<bool>> = {
                let mut graph: BTreeMap<&SchemaRef, BTreeSet<&SchemaRef>> = BTreeMap::new();
                for reference in resolved.iter().flatten() {
                    graph
                        .entry(&reference.source)
                        .or_default()
                        .insert(&reference.target);
                }

                resolved
                    .iter()
                    .map(|references| {
                        references
                            .iter()
                            .map(|reference| {
                                reaches(&graph, &reference.target, &reference.source)
                            })
                            .collect()
                    })
                    .collect()
            };

            for (references, flags) in resolved.iter_mut().zip(cyclic) {
                for (reference, lazy) in references.iter_mut().zip(flags) {
                    reference.lazy = lazy;
                }
            }
        }
    }
}

fn reaches(
    graph: &BTreeMap<&SchemaRef, BTreeSet<&SchemaRef>>,
    from: &SchemaRef,
    to: &SchemaRef,
) -> bool {
    let mut seen: BTreeSet<&SchemaRef> = BTreeSet::new();
    let mut queue: VecDeque<&SchemaRef> = VecDeque::from([from]);

    while let Some(node) = queue.pop_front() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(targets) = graph.get(node) {
            queue.extend(targets.iter().copied());
        }
    }

    false
}

fn single_unit(
    definitions: Vec<SchemaDefinition>,
    enums: Vec<EnumDefinition>,
    resolved: Vec<Vec<CrossReference>>,
) -> Vec<OutputUnit> {
    let mut unit = OutputUnit::new(SINGLE_UNIT_NAME, format!("{SINGLE_UNIT_NAME}.ts"));
    unit.items.extend(enums.into_iter().map(UnitItem::Enum));
    unit.items.extend(definitions.into_iter().map(UnitItem::Schema));
    unit.references = resolved.into_iter().flatten().collect();
    vec![unit]
}

fn multi_units(
    definitions: Vec<SchemaDefinition>,
    enums: Vec<EnumDefinition>,
    resolved: Vec<Vec<CrossReference>>,
) -> Vec<OutputUnit> {
    let mut units = Vec::with_capacity(definitions.len() + 1);

    if !enums.is_empty() {
        let mut unit = OutputUnit::new("enums", ENUM_UNIT_PATH);
        unit.items.extend(enums.into_iter().map(UnitItem::Enum));
        units.push(unit);
    }

    for (definition, references) in definitions.into_iter().zip(resolved) {
        let path = unit_path(LayoutMode::MultiFile, &definition);
        let mut modules: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for reference in references.iter().filter(|reference| !reference.local) {
            modules
                .entry(relative_module(&path, &reference.unit_path))
                .or_default()
                .insert(reference.identifier.clone());
        }

        for field in &definition.fields {
            if let FieldRepr::Enum { identifier, .. } = &field.repr {
                modules
                    .entry(relative_module(&path, ENUM_UNIT_PATH))
                    .or_default()
                    .insert(identifier.clone());
            }
        }

        let mut unit = OutputUnit::new(definition.identifier.clone(), path);
        unit.imports = modules
            .into_iter()
            .map(|(module, identifiers)| Import {
                module,
                identifiers: identifiers.into_iter().collect(),
            })
            .collect();
        unit.references = references;
        unit.items.push(UnitItem::Schema(definition));
        units.push(unit);
    }

    units
}

/// Module specifier for `to` as seen from the unit at `from`.
pub fn relative_module(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = from.split('/').collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let to_parts: Vec<&str> = to.split('/').collect();
    let (to_dirs, to_file) = to_parts.split_at(to_parts.len().saturating_sub(1));

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(left, right)| left == right)
        .count();

    let mut module = if from_dirs.len() == common {
        "./".to_string()
    } else {
        "../".repeat(from_dirs.len() - common)
    };
    for dir in &to_dirs[common..] {
        module.push_str(dir);
        module.push('/');
    }
    let file = to_file.first().copied().unwrap_or_default();
    module.push_str(file.strip_suffix(".ts").unwrap_or(file));
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_modules_walk_up_and_down() {
        assert_eq!(relative_module("pure/User.ts", "pure/Post.ts"), "./Post");
        assert_eq!(relative_module("input/Post.ts", "pure/User.ts"), "../pure/User");
        assert_eq!(relative_module("result/Tag.ts", ENUM_UNIT_PATH), "../enums");
        assert_eq!(relative_module("index.ts", "pure/User.ts"), "./pure/User");
    }
}
