use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output shape emitted per entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain model representation.
    Pure,
    /// Creation/update input representation.
    Input,
    /// Query-result representation.
    Result,
}

impl Variant {
    /// All variants in emission order.
    pub const ALL: [Variant; 3] = [Variant::Pure, Variant::Input, Variant::Result];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Pure => "pure",
            Variant::Input => "input",
            Variant::Result => "result",
        }
    }

    /// Suffix used when no configuration level defines one.
    pub fn default_suffix(self) -> &'static str {
        match self {
            Variant::Pure => "Model",
            Variant::Input => "Input",
            Variant::Result => "Result",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantMap<T> {
    pub pure: T,
    pub input: T,
    pub result: T,
}

impl<T> VariantMap<T> {
    pub fn get(&self, variant: Variant) -> &T {
        match variant {
            Variant::Pure => &self.pure,
            Variant::Input => &self.input,
            Variant::Result => &self.result,
        }
    }

    pub fn get_mut(&mut self, variant: Variant) -> &mut T {
        match variant {
            Variant::Pure => &mut self.pure,
            Variant::Input => &mut self.input,
            Variant::Result => &mut self.result,
        }
    }

    /// Build a map by evaluating `f` for every variant.
    pub fn from_fn(mut f: impl FnMut(Variant) -> T) -> Self {
        Self {
            pure: f(Variant::Pure),
            input: f(Variant::Input),
            result: f(Variant::Result),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &T)> {
        Variant::ALL.into_iter().map(move |variant| (variant, self.get(variant)))
    }
}

/// Field-set mode applied beneath every configuration level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Full,
    /// Keep only identifier fields and required non-relation fields.
    Minimal,
}

/// Case convention applied to entity names when building identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CaseConvention {
    #[default]
    #[serde(rename = "PascalCase")]
    Pascal,
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "snake_case")]
    Snake,
    /// Keep the entity name as declared.
    #[serde(rename = "preserve")]
    Preserve,
}

/// How emitted schemas are grouped into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    SingleFile,
    MultiFile,
}

/// Settings for one variant, at the global or per-entity level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_fields: Option<Vec<String>>,
}

/// Variant settings keyed by variant name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VariantSettingsMap {
    pub pure: VariantSettings,
    pub input: VariantSettings,
    pub result: VariantSettings,
}

impl VariantSettingsMap {
    pub fn get(&self, variant: Variant) -> &VariantSettings {
        match variant {
            Variant::Pure => &self.pure,
            Variant::Input => &self.input,
            Variant::Result => &self.result,
        }
    }
}

/// Global exclusion lists keyed by variant name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GlobalExclusions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pure: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<String>>,
}

impl GlobalExclusions {
    pub fn get(&self, variant: Variant) -> Option<&Vec<String>> {
        match variant {
            Variant::Pure => self.pure.as_ref(),
            Variant::Input => self.input.as_ref(),
            Variant::Result => self.result.as_ref(),
        }
    }
}

/// Per-entity override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelOverride {
    /// `false` disables every variant of the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Exclusions applied to every variant of the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_fields: Option<Vec<String>>,
    #[serde(default)]
    pub variants: VariantSettingsMap,
    /// Operation allow-list for downstream operation filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<String>>,
}

/// Policy switches for fields that are conventionally not writable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicySettings {
    /// Drop identifier fields from the input variant.
    pub exclude_id_from_input: bool,
    /// Drop read-only fields from the input variant.
    pub exclude_read_only_from_input: bool,
    /// Represent owning-side relations in input as nested input objects
    /// instead of their foreign-key scalars.
    pub nested_relation_input: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            exclude_id_from_input: true,
            exclude_read_only_from_input: true,
            nested_relation_input: false,
        }
    }
}

/// Canonical generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub mode: Mode,
    /// Output directory, consumed by the host wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Emit relation fields in the pure and result variants.
    pub relation_model: bool,
    pub model_case: CaseConvention,
    /// Suffix appended to every entity name before the variant suffix.
    pub model_suffix: String,
    pub use_multiple_files: bool,
    pub variants: VariantSettingsMap,
    pub global_exclusions: GlobalExclusions,
    pub models: BTreeMap<String, ModelOverride>,
    pub policies: PolicySettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Full,
            output: None,
            relation_model: true,
            model_case: CaseConvention::Pascal,
            model_suffix: String::new(),
            use_multiple_files: false,
            variants: VariantSettingsMap::default(),
            global_exclusions: GlobalExclusions::default(),
            models: BTreeMap::new(),
            policies: PolicySettings::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn layout(&self) -> LayoutMode {
        if self.use_multiple_files {
            LayoutMode::MultiFile
        } else {
            LayoutMode::SingleFile
        }
    }
}
