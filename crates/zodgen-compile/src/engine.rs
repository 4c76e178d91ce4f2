use std::time::Instant;

use tracing::{debug, info, warn};

use zodgen_config::{ConfigResolver, GeneratorConfig, Variant};
use zodgen_core::{DataModel, validate_model};

use crate::compiler::{ModelCompiler, compile_enums};
use crate::errors::CompileError;
use crate::model::CompileReport;
use crate::naming::NameTable;
use crate::planner::{EmissionPlan, plan};

/// Entry point for compiling a data model into an emission plan.
#[derive(Debug, Clone, Default)]
pub struct CompileEngine {
    config: GeneratorConfig,
}

impl CompileEngine {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run every phase and return the plan, or every fatal issue found.
    ///
    /// A run with any issue produces no plan at all.
    pub fn run(&self, model: &DataModel) -> Result<EmissionPlan, CompileError> {
        let start = Instant::now();
        validate_model(model)?;

        let resolver = ConfigResolver::new(&self.config, model);
        info!(
            event = "compile_started",
            entities = model.entities.len(),
            enums = model.enums.len(),
            layout = ?resolver.layout(),
            mode = ?resolver.mode(),
            "compilation started"
        );

        let mut report = CompileReport::default();
        let (names, collisions) = NameTable::collect(model, &resolver);
        report.extend(collisions);
        info!(event = "names_resolved", identifiers = names.len(), "names resolved");

        let compiler = ModelCompiler::new(model, &resolver, &names);
        let mut definitions = Vec::new();
        for entity in &model.entities {
            if !resolver.is_entity_enabled(&entity.name) {
                debug!(entity = %entity.name, "entity disabled");
                continue;
            }

            for variant in Variant::ALL {
                if !resolver.is_variant_enabled(&entity.name, variant) {
                    continue;
                }

                match compiler.compile(entity, variant) {
                    Ok(definition) => {
                        if definition.fields.is_empty() {
                            warn!(
                                event = "empty_definition",
                                entity = %entity.name,
                                variant = %variant,
                                "every field was filtered out"
                            );
                        }
                        debug!(
                            entity = %entity.name,
                            variant = %variant,
                            identifier = %definition.identifier,
                            fields = definition.fields.len(),
                            "definition compiled"
                        );
                        definitions.push(definition);
                    }
                    Err(issues) => report.extend(issues),
                }
            }
        }

        // Reference issues join the compile issues in one report.
        let enums = compile_enums(model, &names);
        let emission = match plan(definitions, enums, &names, &resolver) {
            Ok(emission) if report.is_ok() => emission,
            Ok(_) => return Err(self.fail(report)),
            Err(issues) => {
                report.extend(issues);
                return Err(self.fail(report));
            }
        };

        info!(
            event = "compile_finished",
            units = emission.units.len(),
            definitions = emission.definitions().count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "compilation finished"
        );
        Ok(emission)
    }

    fn fail(&self, report: CompileReport) -> CompileError {
        for issue in &report.issues {
            warn!(event = "compile_issue", code = %issue.code, "{issue}");
        }
        CompileError::Failed(report)
    }
}
