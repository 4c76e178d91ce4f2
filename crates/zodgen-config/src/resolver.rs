use std::collections::{BTreeMap, BTreeSet};

use zodgen_core::{DataModel, Entity, Field, FieldKind};

use crate::layered::{ConfigLevel, Layered};
use crate::model::{
    CaseConvention, GeneratorConfig, LayoutMode, Mode, ModelOverride, PolicySettings, Variant,
    VariantMap, VariantSettings,
};

/// Why a field was left out of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Removed by the `minimal` mode pre-filter.
    MinimalMode,
    /// Identifier field dropped from input by policy.
    IdentifierPolicy,
    /// Read-only field dropped from input by policy.
    ReadOnlyPolicy,
    /// Listed in an exclusion list at the given level.
    Configured(ConfigLevel),
}

/// Final per-(entity, variant, field) decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDecision {
    Included,
    Excluded(ExclusionReason),
}

impl FieldDecision {
    pub fn is_included(self) -> bool {
        matches!(self, FieldDecision::Included)
    }
}

/// Variant settings after every level has been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub enabled: bool,
    pub suffix: String,
    /// Exclusion lists in precedence order, most specific first.
    pub exclusions: Vec<(ConfigLevel, BTreeSet<String>)>,
}

impl ResolvedVariant {
    /// Most specific level whose list names the field.
    pub fn excluded_at(&self, field: &str) -> Option<ConfigLevel> {
        self.exclusions
            .iter()
            .find(|(_, fields)| fields.contains(field))
            .map(|(level, _)| *level)
    }
}

/// Entity settings after every level has been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySettings {
    pub enabled: bool,
    pub variants: VariantMap<ResolvedVariant>,
}

/// Configuration resolved once, before compilation starts.
///
/// Entities without a `models.<Entity>` override inherit the global settings.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    mode: Mode,
    relation_model: bool,
    case: CaseConvention,
    base_suffix: String,
    layout: LayoutMode,
    policies: PolicySettings,
    entities: BTreeMap<String, EntitySettings>,
    inherited: EntitySettings,
}

impl ConfigResolver {
    pub fn new(config: &GeneratorConfig, model: &DataModel) -> Self {
        let entities = model
            .entities
            .iter()
            .map(|entity| {
                let settings = resolve_entity(config, config.models.get(&entity.name));
                (entity.name.clone(), settings)
            })
            .collect();

        Self {
            mode: config.mode,
            relation_model: config.relation_model,
            case: config.model_case,
            base_suffix: config.model_suffix.clone(),
            layout: config.layout(),
            policies: config.policies.clone(),
            entities,
            inherited: resolve_entity(config, None),
        }
    }

    pub fn entity_settings(&self, entity: &str) -> &EntitySettings {
        self.entities.get(entity).unwrap_or(&self.inherited)
    }

    /// False when the entity is disabled wholesale.
    pub fn is_entity_enabled(&self, entity: &str) -> bool {
        self.entity_settings(entity).enabled
    }

    pub fn is_variant_enabled(&self, entity: &str, variant: Variant) -> bool {
        let settings = self.entity_settings(entity);
        settings.enabled && settings.variants.get(variant).enabled
    }

    pub fn effective_suffix(&self, entity: &str, variant: Variant) -> &str {
        &self.entity_settings(entity).variants.get(variant).suffix
    }

    /// Decide whether `field` of `entity` is part of `variant`.
    ///
    /// Exclusion is monotonic: a field listed at any level stays excluded, and
    /// an explicitly empty list behaves like an absent one. Identifier fields
    /// are never dropped from the pure variant by exclusion lists.
    pub fn resolve(&self, entity: &Entity, variant: Variant, field: &Field) -> FieldDecision {
        let is_identifier = entity.is_identifier(field);

        if self.mode == Mode::Minimal
            && !is_identifier
            && !(field.is_required && field.kind == FieldKind::Scalar)
        {
            return FieldDecision::Excluded(ExclusionReason::MinimalMode);
        }

        if variant == Variant::Input {
            if is_identifier && self.policies.exclude_id_from_input {
                return FieldDecision::Excluded(ExclusionReason::IdentifierPolicy);
            }
            if field.is_read_only && self.policies.exclude_read_only_from_input {
                return FieldDecision::Excluded(ExclusionReason::ReadOnlyPolicy);
            }
        }

        if variant == Variant::Pure && is_identifier {
            return FieldDecision::Included;
        }

        self.resolve_name(&entity.name, variant, &field.name)
    }

    /// Exclusion-list decision for a field name, without field metadata.
    pub fn resolve_name(&self, entity: &str, variant: Variant, field: &str) -> FieldDecision {
        match self
            .entity_settings(entity)
            .variants
            .get(variant)
            .excluded_at(field)
        {
            Some(level) => FieldDecision::Excluded(ExclusionReason::Configured(level)),
            None => FieldDecision::Included,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn relation_model(&self) -> bool {
        self.relation_model
    }

    pub fn case(&self) -> CaseConvention {
        self.case
    }

    pub fn base_suffix(&self) -> &str {
        &self.base_suffix
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn policies(&self) -> &PolicySettings {
        &self.policies
    }
}

fn resolve_entity(config: &GeneratorConfig, model: Option<&ModelOverride>) -> EntitySettings {
    let enabled = model.and_then(|model| model.enabled).unwrap_or(true);
    let variants = VariantMap::from_fn(|variant| resolve_variant(config, model, variant));
    EntitySettings { enabled, variants }
}

fn resolve_variant(
    config: &GeneratorConfig,
    model: Option<&ModelOverride>,
    variant: Variant,
) -> ResolvedVariant {
    let global: &VariantSettings = config.variants.get(variant);
    let local: Option<&VariantSettings> = model.map(|model| model.variants.get(variant));

    // Global disablement is absolute; no per-entity setting can re-enable it.
    let enabled = if global.enabled == Some(false) {
        false
    } else {
        *Layered::new()
            .layer(
                ConfigLevel::EntityVariant,
                local.and_then(|local| local.enabled.as_ref()),
            )
            .layer(ConfigLevel::VariantDefault, global.enabled.as_ref())
            .value_or(&true)
    };

    let suffix = Layered::new()
        .layer(
            ConfigLevel::EntityVariant,
            local.and_then(|local| local.suffix.as_deref()),
        )
        .layer(ConfigLevel::VariantDefault, global.suffix.as_deref())
        .value_or(variant.default_suffix())
        .to_string();

    let exclusions = Layered::new()
        .layer(
            ConfigLevel::EntityVariant,
            local.and_then(|local| local.exclude_fields.as_ref()),
        )
        .layer(
            ConfigLevel::Entity,
            model.and_then(|model| model.exclude_fields.as_ref()),
        )
        .layer(ConfigLevel::VariantDefault, global.exclude_fields.as_ref())
        .layer(ConfigLevel::Global, config.global_exclusions.get(variant))
        .defined()
        .map(|(level, fields)| (level, fields.iter().cloned().collect()))
        .collect();

    ResolvedVariant {
        enabled,
        suffix,
        exclusions,
    }
}
