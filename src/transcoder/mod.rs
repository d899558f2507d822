//! Value transcoding at the query boundary
//!
//! [`ValueTranscoder`] sits between a query builder and the storage engine
//! for one table. Values going in (insert payloads, filter values, key
//! lookups) have UUID text replaced by 16-byte binary; rows coming back have
//! binary UUIDs replaced by canonical text.

mod generator;

pub use generator::{DefaultUuidGenerator, UuidGenerator};

use crate::codec;
use crate::core::{Record, Result, UuidError, Value};
use crate::settings::SettingsResolver;
use log::{debug, warn};
use std::sync::Arc;

pub struct ValueTranscoder {
    resolver: SettingsResolver,
    table: String,
    generator: Arc<dyn UuidGenerator>,
}

impl ValueTranscoder {
    pub fn new(resolver: SettingsResolver, table: &str) -> Self {
        Self {
            resolver,
            table: table.to_string(),
            generator: Arc::new(DefaultUuidGenerator),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn UuidGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    /// Prefixes unqualified column names with this transcoder's table
    pub fn qualify(&self, column: &str) -> String {
        if column.is_empty() || column.contains('.') || self.table.is_empty() {
            column.to_string()
        } else {
            format!("{}.{}", self.table, column)
        }
    }

    /// Rewrites UUID text inside `value` to its stored binary form
    ///
    /// Records switch the column to each key, lists keep the current column.
    pub fn to_storage_format(&self, value: Value, column: &str) -> Result<Value> {
        match value {
            Value::Record(record) => {
                let mut out = Record::new();
                for (key, item) in record {
                    let item = self.to_storage_format(item, &key)?;
                    out.insert(key, item);
                }
                Ok(Value::Record(out))
            }
            Value::List(items) => items
                .into_iter()
                .map(|item| self.to_storage_format(item, column))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Value::Text(text) => self.encode_text(text, column),
            other => Ok(other),
        }
    }

    fn encode_text(&self, text: String, column: &str) -> Result<Value> {
        let column = self.qualify(column);
        let value = Value::Text(text);

        if !self.resolver.is_uuid_column(&column, Some(&value)) {
            return Ok(value);
        }

        let settings = self.resolver.resolve_column_settings(&column);
        let encoded = codec::text_to_binary(value.as_str().unwrap_or_default(), settings.optimize)?;

        match encoded {
            Some(bytes) => {
                debug!("Encoded '{}' for column '{}' ({:?})", value, column, settings.layout());
                Ok(Value::from(bytes))
            }
            None => {
                warn!("Column '{}' holds UUIDs but '{}' is not one; left as text", column, value);
                Ok(value)
            }
        }
    }

    /// Replaces binary UUIDs in returned rows with canonical text
    ///
    /// Each field is decoded with the layout configured for
    /// `<table>.<field>`, so sort-optimized columns read back correctly.
    /// Columns declared as non-UUID keep their bytes.
    pub fn from_storage_format(&self, records: Vec<Record>) -> Result<Vec<Record>> {
        records
            .into_iter()
            .map(|record| self.decode_record(record))
            .collect()
    }

    pub fn decode_record(&self, record: Record) -> Result<Record> {
        let mut out = Record::new();
        for (field, value) in record {
            let value = match value {
                Value::Bytes(bytes) => {
                    let settings = self.resolver.resolve_column_settings(&self.qualify(&field));
                    if settings.is_uuid_column != Some(false)
                        && codec::is_binary_uuid(&bytes, settings.optimize)
                    {
                        Value::Text(codec::binary_to_text(&bytes, settings.optimize)?)
                    } else {
                        Value::Bytes(bytes)
                    }
                }
                other => other,
            };
            out.insert(field, value);
        }
        Ok(out)
    }

    /// Fills in the primary key of a pending insert
    ///
    /// Only when the key column is a UUID column that generates on insert and
    /// the payload carries no value (or NULL) for it.
    pub fn generate_primary_key(&self, mut pending: Record) -> Result<Record> {
        let key = self.resolver.primary_key_for_table(&self.table);
        let column = self.qualify(&key);

        if !self.resolver.is_uuid_column(&column, None) {
            return Ok(pending);
        }

        let settings = self.resolver.resolve_column_settings(&column);
        let missing = pending.get(&key).is_none_or(Value::is_null);

        if settings.generate_on_insert && missing {
            let id = self.generator.generate(settings.version)?;
            if !codec::is_uuid_text(&id) {
                return Err(UuidError::GenerationError(format!(
                    "generator returned '{}' for {}",
                    id, settings.version
                )));
            }
            debug!("Generated {} key for '{}'", settings.version, column);
            pending.insert(key, Value::Text(id));
        }

        Ok(pending)
    }

    /// Insert payload: one record or a list of records
    pub fn prepare_insert(&self, values: Value) -> Result<Value> {
        match values {
            Value::Record(record) => {
                let record = self.generate_primary_key(record)?;
                self.to_storage_format(Value::Record(record), "")
            }
            Value::List(rows) => rows
                .into_iter()
                .map(|row| self.prepare_insert(row))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(UuidError::FormatError(format!(
                "insert payload must be a record or a list of records, got {}",
                other.type_name()
            ))),
        }
    }

    /// `WHERE column = value`
    pub fn filter_value(&self, column: &str, value: Value) -> Result<Value> {
        self.to_storage_format(value, column)
    }

    /// `WHERE column IN (values)`
    pub fn filter_values(&self, column: &str, values: Vec<Value>) -> Result<Vec<Value>> {
        values
            .into_iter()
            .map(|value| self.to_storage_format(value, column))
            .collect()
    }

    /// Lookup by primary key
    pub fn find_key(&self, id: Value) -> Result<Value> {
        let key = self.resolver.primary_key_for_table(&self.table);
        self.to_storage_format(id, &key)
    }
}
