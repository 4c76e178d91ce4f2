use std::collections::BTreeSet;

use zodgen_config::{LayoutMode, Variant};
use zodgen_core::ScalarType;

use crate::model::{EnumDefinition, FieldRepr, SchemaDefinition, SchemaField};
use crate::output::RenderedFile;
use crate::planner::{EmissionPlan, OutputUnit, UnitItem, relative_module};

pub const HEADER: &str = "// Generated by zodgen. Do not edit.";

/// Render every unit of the plan, in plan order.
///
/// The multi-file layout also gets an `index.ts` re-exporting every unit.
pub fn render_plan(plan: &EmissionPlan) -> Vec<RenderedFile> {
    let mut files: Vec<RenderedFile> = plan
        .units
        .iter()
        .map(|unit| RenderedFile {
            path: unit.path.clone(),
            contents: render_unit(unit),
        })
        .collect();

    if plan.layout == LayoutMode::MultiFile {
        files.push(RenderedFile {
            path: "index.ts".to_string(),
            contents: render_barrel(&plan.units),
        });
    }

    files
}

/// Render one unit as a TypeScript module.
pub fn render_unit(unit: &OutputUnit) -> String {
    let mut lines = vec![HEADER.to_string(), "import { z } from 'zod';".to_string()];
    lines.extend(unit.imports.iter().map(|import| {
        format!(
            "import {{ {} }} from '{}';",
            import.identifiers.join(", "),
            import.module
        )
    }));

    for item in &unit.items {
        lines.push(String::new());
        match item {
            UnitItem::Enum(definition) => lines.push(render_enum(definition)),
            UnitItem::Schema(definition) => lines.extend(render_schema(unit, definition)),
        }
    }

    join_lines(lines)
}

fn render_barrel(units: &[OutputUnit]) -> String {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(
        units
            .iter()
            .map(|unit| format!("export * from '{}';", relative_module("index.ts", &unit.path))),
    );
    join_lines(lines)
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_enum(definition: &EnumDefinition) -> String {
    let values: Vec<String> = definition
        .values
        .iter()
        .map(|value| quote(value))
        .collect();
    format!(
        "export const {} = z.enum([{}]);",
        definition.identifier,
        values.join(", ")
    )
}

fn render_schema(unit: &OutputUnit, definition: &SchemaDefinition) -> Vec<String> {
    let source = definition.schema_ref();
    let input = definition.variant == Variant::Input;
    let mut keys: BTreeSet<&str> = BTreeSet::new();
    let mut body = Vec::new();

    for field in &definition.fields {
        match &field.repr {
            FieldRepr::ForeignKey { columns } => {
                for column in columns.iter().filter(|column| column.inline) {
                    if !keys.insert(column.name.as_str()) {
                        continue;
                    }
                    let mut expr = scalar_expr(&column.type_name);
                    if !column.is_required {
                        expr.push_str(".nullable()");
                        if input {
                            expr.push_str(".optional()");
                        }
                    }
                    body.push(format!("  {}: {expr},", property_key(&column.name)));
                }
            }
            repr => {
                if !keys.insert(field.name.as_str()) {
                    continue;
                }
                let base = match repr {
                    FieldRepr::Scalar { type_name } => scalar_expr(type_name),
                    FieldRepr::Enum { identifier, .. } => identifier.clone(),
                    FieldRepr::Reference { .. } => match unit.reference(&source, &field.name) {
                        Some(reference) if reference.lazy => {
                            format!("z.lazy(() => {})", reference.identifier)
                        }
                        Some(reference) => reference.identifier.clone(),
                        None => "z.unknown()".to_string(),
                    },
                    FieldRepr::ForeignKey { .. } => continue,
                };
                body.extend(render_field(field, base, input));
            }
        }
    }

    if body.is_empty() {
        return vec![format!("export const {} = z.object({{}});", definition.identifier)];
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("export const {} = z.object({{", definition.identifier));
    lines.extend(body);
    lines.push("});".to_string());
    lines
}

fn render_field(field: &SchemaField, base: String, input: bool) -> Vec<String> {
    let mut expr = if field.is_list {
        format!("z.array({base})")
    } else {
        base
    };
    if !field.is_required && !field.is_list {
        expr.push_str(".nullable()");
    }
    if input && (!field.is_required || field.has_default || field.is_list) {
        expr.push_str(".optional()");
    }

    let mut lines = Vec::with_capacity(2);
    if let Some(doc) = field.documentation.as_deref() {
        let doc = doc.trim().replace("*/", "* /");
        if !doc.is_empty() {
            lines.push(format!("  /** {} */", doc.replace('\n', " ")));
        }
    }
    lines.push(format!("  {}: {expr},", property_key(&field.name)));
    lines
}

pub fn scalar_expr(type_name: &str) -> String {
    match ScalarType::from_type_name(type_name) {
        ScalarType::String => "z.string()",
        ScalarType::Int => "z.number().int()",
        ScalarType::BigInt => "z.bigint()",
        ScalarType::Float | ScalarType::Decimal => "z.number()",
        ScalarType::Boolean => "z.boolean()",
        ScalarType::DateTime => "z.coerce.date()",
        ScalarType::Json => "z.unknown()",
        ScalarType::Bytes => "z.instanceof(Uint8Array)",
        ScalarType::Other(_) => "z.unknown()",
    }
    .to_string()
}

fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$');
    if valid { name.to_string() } else { quote(name) }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ForeignKeyColumn, SchemaRef};
    use crate::planner::CrossReference;

    fn field(name: &str, repr: FieldRepr, required: bool) -> SchemaField {
        SchemaField {
            name: name.to_string(),
            repr,
            is_required: required,
            is_list: false,
            has_default: false,
            documentation: None,
        }
    }

    fn scalar(type_name: &str) -> FieldRepr {
        FieldRepr::Scalar {
            type_name: type_name.to_string(),
        }
    }

    fn unit(definition: SchemaDefinition, references: Vec<CrossReference>) -> OutputUnit {
        OutputUnit {
            name: "index".to_string(),
            path: "index.ts".to_string(),
            items: vec![UnitItem::Schema(definition)],
            references,
            imports: Vec::new(),
        }
    }

    #[test]
    fn renders_optional_and_list_fields() {
        let mut tags = field("tags", scalar("String"), true);
        tags.is_list = true;
        let definition = SchemaDefinition {
            entity: "Post".to_string(),
            variant: Variant::Input,
            identifier: "PostInput".to_string(),
            file_base: "Post".to_string(),
            fields: vec![
                field("title", scalar("String"), true),
                field("body", scalar("String"), false),
                tags,
                field("my-key", scalar("Int"), true),
            ],
        };

        let rendered = render_unit(&unit(definition, Vec::new()));
        let expected = "\
// Generated by zodgen. Do not edit.
import { z } from 'zod';

export const PostInput = z.object({
  title: z.string(),
  body: z.string().nullable().optional(),
  tags: z.array(z.string()).optional(),
  'my-key': z.number().int(),
});
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn inlines_foreign_key_columns_once() {
        let columns = vec![ForeignKeyColumn {
            name: "authorId".to_string(),
            type_name: "Int".to_string(),
            is_required: true,
            inline: true,
        }];
        let definition = SchemaDefinition {
            entity: "Post".to_string(),
            variant: Variant::Input,
            identifier: "PostInput".to_string(),
            file_base: "Post".to_string(),
            fields: vec![
                field("author", FieldRepr::ForeignKey { columns: columns.clone() }, true),
                field("editor", FieldRepr::ForeignKey { columns }, true),
            ],
        };

        let rendered = render_unit(&unit(definition, Vec::new()));
        assert_eq!(rendered.matches("authorId: z.number().int(),").count(), 1);
        assert!(!rendered.contains("author:"));
    }

    #[test]
    fn wraps_lazy_references() {
        let target = SchemaRef::new("User", Variant::Pure);
        let definition = SchemaDefinition {
            entity: "User".to_string(),
            variant: Variant::Pure,
            identifier: "UserModel".to_string(),
            file_base: "User".to_string(),
            fields: vec![field(
                "manager",
                FieldRepr::Reference {
                    target: target.clone(),
                },
                false,
            )],
        };
        let reference = CrossReference {
            source: target.clone(),
            field: "manager".to_string(),
            target,
            identifier: "UserModel".to_string(),
            unit_path: "index.ts".to_string(),
            local: true,
            lazy: true,
        };

        let rendered = render_unit(&unit(definition, vec![reference]));
        assert!(rendered.contains("  manager: z.lazy(() => UserModel).nullable(),\n"));
    }

    #[test]
    fn renders_enums_and_empty_objects() {
        let line = render_enum(&EnumDefinition {
            name: "Role".to_string(),
            identifier: "RoleSchema".to_string(),
            values: vec!["ADMIN".to_string(), "it's".to_string()],
        });
        assert_eq!(line, "export const RoleSchema = z.enum(['ADMIN', 'it\\'s']);");

        let definition = SchemaDefinition {
            entity: "Audit".to_string(),
            variant: Variant::Input,
            identifier: "AuditInput".to_string(),
            file_base: "Audit".to_string(),
            fields: Vec::new(),
        };
        let rendered = render_unit(&unit(definition, Vec::new()));
        assert!(rendered.ends_with("export const AuditInput = z.object({});\n"));
    }
}
