use crate::core::{Result, UuidError};
use super::patch::{SettingsPatch, UuidSettings};
use super::registry::EntityDescriptor;
use super::resolver::layered_settings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_primary_key_settings() -> SettingsPatch {
    SettingsPatch::new().generate_on_insert(true)
}

/// Binary UUID configuration
///
/// Holds the global defaults, the layer forced onto primary-key columns,
/// and the entity table. Can be assembled in code or read from JSON:
///
/// ```
/// use binary_uuid::UuidConfig;
///
/// let config = UuidConfig::from_json_str(r#"{
///     "defaults": { "optimize": true },
///     "entities": [
///         { "name": "User", "table": "users",
///           "uuid_settings": { "columns": { "team_id": {} } } }
///     ]
/// }"#).unwrap();
///
/// assert!(config.defaults.optimize);
/// assert!(config.defaults.detect_columns);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UuidConfig {
    /// Applied to every column of every entity
    #[serde(default)]
    pub defaults: UuidSettings,

    /// Merged onto primary-key columns before column settings
    #[serde(default = "default_primary_key_settings")]
    pub primary_key_defaults: SettingsPatch,

    /// Known entities
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
}

impl UuidConfig {
    pub fn new() -> Self {
        Self {
            defaults: UuidSettings::default(),
            primary_key_defaults: default_primary_key_settings(),
            entities: Vec::new(),
        }
    }

    /// Set the global defaults
    pub fn defaults(mut self, defaults: UuidSettings) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set the primary-key layer
    pub fn primary_key_defaults(mut self, settings: SettingsPatch) -> Self {
        self.primary_key_defaults = settings;
        self
    }

    /// Register an entity
    pub fn entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();

        for entity in &self.entities {
            if !names.insert(entity.name.as_str()) {
                return Err(UuidError::ConfigError(format!(
                    "entity '{}' is declared twice",
                    entity.name
                )));
            }

            if let Some(uuid_settings) = &entity.uuid_settings {
                if uuid_settings.columns.keys().any(|c| c.is_empty()) {
                    return Err(UuidError::ConfigError(format!(
                        "entity '{}' declares settings for an unnamed column",
                        entity.name
                    )));
                }
            }

            self.validate_generated_versions(entity)?;
        }

        check_generated_version(self.defaults.as_patch(), "defaults")
    }

    /// Every column that generates keys on insert must use a version
    /// the generator can mint
    fn validate_generated_versions(&self, entity: &EntityDescriptor) -> Result<()> {
        let defaults = self.defaults.as_patch();
        let declared_columns = entity
            .uuid_settings
            .iter()
            .flat_map(|declared| declared.columns.keys().map(String::as_str));

        for field in std::iter::once(entity.primary_key.as_str()).chain(declared_columns) {
            let layer = layered_settings(defaults, &self.primary_key_defaults, entity, field);
            check_generated_version(layer, &format!("{}.{}", entity.table, field))?;
        }

        Ok(())
    }
}

fn check_generated_version(layer: SettingsPatch, scope: &str) -> Result<()> {
    let version = layer.version.unwrap_or_default();
    if layer.generate_on_insert == Some(true) && !version.can_generate() {
        return Err(UuidError::ConfigError(format!(
            "{} generates keys on insert with {}, which cannot be generated",
            scope, version
        )));
    }
    Ok(())
}

impl Default for UuidConfig {
    fn default() -> Self {
        Self::new()
    }
}
