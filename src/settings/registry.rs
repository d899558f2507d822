use crate::core::{Result, UuidError};
use super::config::UuidConfig;
use super::patch::SettingsPatch;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

pub const DEFAULT_PRIMARY_KEY: &str = "id";

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Model,
    /// Join table of a many-to-many relation; never owns a table in lookups
    Pivot,
}

/// UUID settings declared by an entity: one entity-wide layer plus
/// optional per-column layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityUuidSettings {
    #[serde(default)]
    pub settings: SettingsPatch,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub columns: HashMap<String, SettingsPatch>,
}

impl EntityUuidSettings {
    pub fn new(settings: SettingsPatch) -> Self {
        Self {
            settings,
            columns: HashMap::new(),
        }
    }

    pub fn column(mut self, name: &str, settings: SettingsPatch) -> Self {
        self.columns.insert(name.to_string(), settings);
        self
    }

    pub fn column_settings(&self, name: &str) -> Option<&SettingsPatch> {
        self.columns.get(name)
    }
}

/// Metadata of one application record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDescriptor {
    pub name: String,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_settings: Option<EntityUuidSettings>,
}

impl EntityDescriptor {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            primary_key: default_primary_key(),
            kind: EntityKind::Model,
            uuid_settings: None,
        }
    }

    pub fn primary_key(mut self, key: &str) -> Self {
        self.primary_key = key.to_string();
        self
    }

    pub fn pivot(mut self) -> Self {
        self.kind = EntityKind::Pivot;
        self
    }

    pub fn uuid_settings(mut self, settings: EntityUuidSettings) -> Self {
        self.uuid_settings = Some(settings);
        self
    }

    pub fn is_pivot(&self) -> bool {
        self.kind == EntityKind::Pivot
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key == column
    }
}

/// All known entities, fixed at startup
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Arc<EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new(entities: Vec<EntityDescriptor>) -> Result<Self> {
        let mut tables = HashSet::new();

        for entity in &entities {
            if entity.name.is_empty() {
                return Err(UuidError::ConfigError("entity name cannot be empty".into()));
            }
            if entity.table.is_empty() {
                return Err(UuidError::ConfigError(format!(
                    "entity '{}' has no table",
                    entity.name
                )));
            }
            if entity.primary_key.is_empty() {
                return Err(UuidError::ConfigError(format!(
                    "entity '{}' has an empty primary key",
                    entity.name
                )));
            }
            if !entity.is_pivot() && !tables.insert(entity.table.as_str()) {
                return Err(UuidError::ConfigError(format!(
                    "table '{}' is mapped by more than one entity",
                    entity.table
                )));
            }
        }

        Ok(Self {
            entities: entities.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_config(config: &UuidConfig) -> Result<Self> {
        Self::new(config.entities.clone())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Linear scan, pivots excluded
    pub fn scan(&self, table: &str) -> Option<Arc<EntityDescriptor>> {
        self.entities
            .iter()
            .find(|entity| !entity.is_pivot() && entity.table == table)
            .cloned()
    }
}

/// Memoized table -> entity lookups
///
/// Append-only: entries are never evicted since the registry cannot
/// change after startup. Misses are remembered too. A table not yet cached
/// is re-checked under the write lock before scanning, so every distinct
/// table is scanned once.
#[derive(Debug, Default)]
pub struct TableEntityCache {
    tables: RwLock<HashMap<String, Option<Arc<EntityDescriptor>>>>,
    scans: AtomicUsize,
}

impl TableEntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, table: &str, registry: &EntityRegistry) -> Result<Option<Arc<EntityDescriptor>>> {
        if let Some(cached) = self.tables.read()?.get(table) {
            return Ok(cached.clone());
        }

        let mut tables = self.tables.write()?;
        if let Some(cached) = tables.get(table) {
            return Ok(cached.clone());
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let found = registry.scan(table);
        match &found {
            Some(entity) => debug!("Table '{}' resolved to entity '{}'", table, entity.name),
            None => debug!("No entity registered for table '{}'", table),
        }
        tables.insert(table.to_string(), found.clone());

        Ok(found)
    }

    /// Number of registry scans performed so far
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    /// Cached tables, misses included
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
