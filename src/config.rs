/// Configuration loading module
///
/// This module handles:
/// - Reading the static account mapping (YAML)
/// - Reading optional report theme overrides (TOML)
///
/// Both are loaded once, up front, and handed to the rest of the program as
/// immutable values.
use crate::error::ToolError;
use crate::report::Theme;
use crate::types::AccountMapping;
use log::debug;
use std::fs;
use std::path::Path;

/// Load the `environment -> category -> account` table from a YAML file.
pub fn load_account_mapping(path: &Path) -> Result<AccountMapping, ToolError> {
    debug!("Mappings file path: {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| {
        ToolError::Config(format!("Mappings file not found or unreadable at {}: {}", path.display(), e))
    })?;

    parse_account_mapping(&content)
        .map_err(|e| ToolError::Config(format!("Invalid YAML in {}: {}", path.display(), e)))
}

/// Parse a mapping document. An empty document is an empty mapping.
pub fn parse_account_mapping(content: &str) -> Result<AccountMapping, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(AccountMapping::default());
    }
    serde_yaml::from_str(content)
}

/// Load the report theme: built-in defaults, optionally overridden by a TOML file.
pub fn load_theme(path: Option<&Path>) -> Result<Theme, ToolError> {
    let Some(path) = path else {
        return Ok(Theme::default());
    };

    debug!("Loading theme overrides from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    parse_theme(&content).map_err(|e| ToolError::Config(format!("Invalid theme file {}: {}", path.display(), e)))
}

/// Parse theme overrides; fields not present keep their defaults.
pub fn parse_theme(content: &str) -> Result<Theme, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
