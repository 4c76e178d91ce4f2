use std::fmt;

use serde::{Deserialize, Serialize};

/// Configuration level, ordered from most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigLevel {
    /// `models.<Entity>.variants.<variant>`
    EntityVariant,
    /// `models.<Entity>`
    Entity,
    /// `variants.<variant>`
    VariantDefault,
    /// `globalExclusions.<variant>`
    Global,
}

impl ConfigLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigLevel::EntityVariant => "entity_variant",
            ConfigLevel::Entity => "entity",
            ConfigLevel::VariantDefault => "variant_default",
            ConfigLevel::Global => "global",
        }
    }
}

impl fmt::Display for ConfigLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered chain of optional values, most specific first.
///
/// Every configurable attribute (enabled flag, suffix, exclusion list) is
/// resolved through the same chain: absent levels fall through to the next
/// less specific one.
#[derive(Debug, Clone)]
pub struct Layered<'a, T: ?Sized> {
    layers: Vec<(ConfigLevel, Option<&'a T>)>,
}

impl<'a, T: ?Sized> Default for Layered<'a, T> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<'a, T: ?Sized> Layered<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a less specific level to the chain.
    pub fn layer(mut self, level: ConfigLevel, value: Option<&'a T>) -> Self {
        self.layers.push((level, value));
        self
    }

    /// First level that defines a value.
    pub fn first_defined(&self) -> Option<(ConfigLevel, &'a T)> {
        self.layers
            .iter()
            .find_map(|(level, value)| value.map(|value| (*level, value)))
    }

    /// First defined value, or `fallback` when no level defines one.
    pub fn value_or(&self, fallback: &'a T) -> &'a T {
        self.first_defined()
            .map(|(_, value)| value)
            .unwrap_or(fallback)
    }

    /// Defined levels in precedence order.
    pub fn defined(&self) -> impl Iterator<Item = (ConfigLevel, &'a T)> + '_ {
        self.layers
            .iter()
            .filter_map(|(level, value)| value.map(|value| (*level, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_specific_defined_value_wins() {
        let entity = false;
        let global = true;
        let chain = Layered::new()
            .layer(ConfigLevel::EntityVariant, None)
            .layer(ConfigLevel::Entity, Some(&entity))
            .layer(ConfigLevel::VariantDefault, Some(&global));

        assert_eq!(chain.first_defined(), Some((ConfigLevel::Entity, &false)));
    }

    #[test]
    fn falls_back_when_no_level_defines_a_value() {
        let chain: Layered<'_, str> = Layered::new()
            .layer(ConfigLevel::EntityVariant, None)
            .layer(ConfigLevel::VariantDefault, None);

        assert_eq!(chain.value_or("Input"), "Input");
        assert_eq!(chain.defined().count(), 0);
    }
}
