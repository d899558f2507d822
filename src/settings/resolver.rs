use crate::codec;
use crate::core::{Result, Value};
use super::config::UuidConfig;
use super::patch::{SettingsPatch, UuidSettings};
use super::registry::{DEFAULT_PRIMARY_KEY, EntityDescriptor, EntityRegistry, TableEntityCache};
use log::warn;
use std::sync::Arc;

/// Computes effective UUID settings per column
///
/// Layers, lowest first:
///
/// 1. global defaults
/// 2. entity-wide settings
/// 3. primary-key layer (only for the entity's primary key)
/// 4. column settings - declaring any settings for a column marks it as a
///    UUID column and switches shape detection off for it, unless the
///    column layer says otherwise
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    defaults: UuidSettings,
    primary_key_defaults: SettingsPatch,
    registry: Arc<EntityRegistry>,
    cache: Arc<TableEntityCache>,
    current: Option<Arc<EntityDescriptor>>,
}

impl SettingsResolver {
    pub fn new(config: &UuidConfig, registry: Arc<EntityRegistry>, cache: Arc<TableEntityCache>) -> Self {
        Self {
            defaults: config.defaults,
            primary_key_defaults: config.primary_key_defaults,
            registry,
            cache,
            current: None,
        }
    }

    /// Builds the registry from `config` with a fresh cache
    pub fn from_config(config: &UuidConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(EntityRegistry::from_config(config)?);
        Ok(Self::new(config, registry, Arc::new(TableEntityCache::new())))
    }

    /// Resolver bound to an entity: unqualified columns belong to its table
    pub fn with_current_entity(mut self, entity: Arc<EntityDescriptor>) -> Self {
        self.current = Some(entity);
        self
    }

    pub fn cache(&self) -> &Arc<TableEntityCache> {
        &self.cache
    }

    /// `"table.column"` -> `("table", "column")`; unqualified names use the
    /// current entity's table, or an empty table without one
    pub fn split_column<'a>(&'a self, column: &'a str) -> (&'a str, &'a str) {
        match column.rsplit_once('.') {
            Some((table, field)) => (table, field),
            None => match &self.current {
                Some(entity) => (entity.table.as_str(), column),
                None => ("", column),
            },
        }
    }

    /// Entity owning `table`, if any
    pub fn entity_for_table(&self, table: &str) -> Option<Arc<EntityDescriptor>> {
        if table.is_empty() {
            return None;
        }

        if let Some(current) = &self.current {
            if current.table == table {
                return Some(Arc::clone(current));
            }
        }

        match self.cache.lookup(table, &self.registry) {
            Ok(entity) => entity,
            Err(e) => {
                warn!("Entity lookup for table '{}' failed: {}", table, e);
                None
            }
        }
    }

    /// Primary key of the entity owning `table`, `id` when unknown
    pub fn primary_key_for_table(&self, table: &str) -> String {
        self.entity_for_table(table)
            .map(|entity| entity.primary_key.clone())
            .unwrap_or_else(|| DEFAULT_PRIMARY_KEY.to_string())
    }

    pub fn resolve_column_settings(&self, column: &str) -> UuidSettings {
        let (table, field) = self.split_column(column);

        match self.entity_for_table(table) {
            Some(entity) => UuidSettings::from(layered_settings(
                self.defaults.as_patch(),
                &self.primary_key_defaults,
                &entity,
                field,
            )),
            None => self.defaults,
        }
    }

    /// Whether values of `column` are stored as binary UUIDs
    ///
    /// `value` is only consulted when the column relies on shape detection.
    pub fn is_uuid_column(&self, column: &str, value: Option<&Value>) -> bool {
        let settings = self.resolve_column_settings(column);

        if settings.is_uuid_column == Some(true) || settings.generate_on_insert {
            return true;
        }

        settings.detect_columns
            && matches!(value, Some(Value::Text(text)) if codec::is_uuid_text(text))
    }
}

/// Stacks the layers of one column of `entity` on top of `defaults`
pub(crate) fn layered_settings(
    defaults: SettingsPatch,
    primary_key_defaults: &SettingsPatch,
    entity: &EntityDescriptor,
    field: &str,
) -> SettingsPatch {
    let declared = entity.uuid_settings.as_ref();
    let mut layer = match declared {
        Some(declared) => defaults.merge(&declared.settings),
        None => defaults,
    };

    if entity.is_primary_key(field) {
        layer = layer.merge(primary_key_defaults);
    }

    if let Some(field_patch) = declared.and_then(|d| d.column_settings(field)) {
        layer = layer
            .without_detect_columns()
            .is_uuid_column(true)
            .merge(field_patch);
    }

    layer
}
