use std::path::Path;

use serde_json::Value;

use crate::errors::{ConfigError, Result};
use crate::model::GeneratorConfig;
use crate::validate::validate_config_json;

/// Load a generator configuration from a `.json` or `.toml` file.
///
/// Both formats go through the same structural validation before they are
/// parsed into [`GeneratorConfig`].
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let contents = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let document: Value = if is_toml {
        toml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };

    tracing::debug!(event = "config_loaded", path = %path.display(), toml = is_toml);
    parse_config(document)
}

/// Validate and parse an in-memory configuration document.
pub fn parse_config(document: Value) -> Result<GeneratorConfig> {
    let report = validate_config_json(&document)?;
    if !report.is_ok() {
        return Err(ConfigError::Invalid(report));
    }

    Ok(serde_json::from_value(document)?)
}
