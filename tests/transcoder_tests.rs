/// Transcoder integration tests
///
/// Insert -> store -> read cycles against an in-test row store
/// Run with: cargo test --test transcoder_tests

use binary_uuid::{
    EntityDescriptor, EntityUuidSettings, Record, Result, SettingsPatch, SettingsResolver,
    UuidConfig, UuidGenerator, UuidVersion, Value, ValueTranscoder,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

const GENERATED: &str = "f47ac10b-58cc-4372-a567-0e02b2c3d479";

/// Hands out a fixed id and remembers the requested versions
#[derive(Default)]
struct RecordingGenerator {
    versions: Mutex<Vec<UuidVersion>>,
}

impl UuidGenerator for RecordingGenerator {
    fn generate(&self, version: UuidVersion) -> Result<String> {
        self.versions.lock()?.push(version);
        Ok(GENERATED.to_string())
    }
}

fn config() -> UuidConfig {
    UuidConfig::new()
        .entity(
            EntityDescriptor::new("Person", "people").uuid_settings(
                EntityUuidSettings::new(SettingsPatch::new()).column(
                    "id",
                    SettingsPatch::new().generate_on_insert(true).version(UuidVersion::V4),
                ),
            ),
        )
        .entity(
            EntityDescriptor::new("Reading", "readings").uuid_settings(
                EntityUuidSettings::new(SettingsPatch::new().optimize(true))
                    .column("sensor_id", SettingsPatch::new()),
            ),
        )
}

fn transcoder(table: &str, generator: Arc<RecordingGenerator>) -> ValueTranscoder {
    let resolver = SettingsResolver::from_config(&config()).unwrap();
    ValueTranscoder::new(resolver, table).with_generator(generator)
}

fn record(value: serde_json::Value) -> Value {
    Value::from(value)
}

#[test]
fn test_insert_then_read_back() {
    let generator = Arc::new(RecordingGenerator::default());
    let people = transcoder("people", generator.clone());

    let stored = people
        .prepare_insert(record(json!({"id": null, "name": "Alice"})))
        .unwrap();
    let row = stored.as_record().unwrap().clone();

    let id = row["id"].as_bytes().unwrap();
    assert_eq!(id.len(), 16);
    assert_eq!(id, uuid::Uuid::parse_str(GENERATED).unwrap().as_bytes());
    assert_eq!(row["name"], Value::from("Alice"));
    assert_eq!(*generator.versions.lock().unwrap(), vec![UuidVersion::V4]);

    let read = people.from_storage_format(vec![row]).unwrap();
    assert_eq!(read[0]["id"], Value::from(GENERATED));
    assert_eq!(read[0]["name"], Value::from("Alice"));
}

#[test]
fn test_batch_insert_generates_per_row() {
    let generator = Arc::new(RecordingGenerator::default());
    let people = transcoder("people", generator.clone());

    let stored = people
        .prepare_insert(record(json!([{"name": "Alice"}, {"name": "Bob"}])))
        .unwrap();

    let rows = match stored {
        Value::List(rows) => rows,
        other => panic!("Expected list, got {:?}", other),
    };
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.as_record().unwrap()["id"].as_bytes().map(<[u8]>::len), Some(16));
    }
    assert_eq!(generator.versions.lock().unwrap().len(), 2);
}

#[test]
fn test_where_and_where_in_and_find() {
    let people = transcoder("people", Arc::new(RecordingGenerator::default()));
    let other = "0e4ac6b1-7b3d-4c2a-9e1f-5a6b7c8d9e0f";

    let filter = people.filter_value("id", GENERATED.into()).unwrap();
    assert_eq!(filter.as_bytes().map(<[u8]>::len), Some(16));

    let listed = people
        .filter_values("people.id", vec![GENERATED.into(), other.into()])
        .unwrap();
    assert!(listed.iter().all(|v| v.as_bytes().is_some()));

    assert_eq!(people.find_key(GENERATED.into()).unwrap(), filter);
}

#[test]
fn test_optimized_column_reads_back_with_its_layout() {
    let readings = transcoder("readings", Arc::new(RecordingGenerator::default()));

    let stored = readings
        .prepare_insert(record(json!({"sensor_id": GENERATED, "celsius": 21.5})))
        .unwrap();
    let row = stored.as_record().unwrap().clone();

    let optimized = binary_uuid::codec::text_to_binary(GENERATED, true).unwrap().unwrap();
    assert_eq!(row["sensor_id"], Value::from(optimized));
    assert_eq!(row["celsius"], Value::Float(21.5));

    let read = readings.from_storage_format(vec![row]).unwrap();
    assert_eq!(read[0]["sensor_id"], Value::from(GENERATED));
}

#[test]
fn test_decode_without_column_settings_assumes_raw_layout() {
    let unknown = transcoder("archive", Arc::new(RecordingGenerator::default()));
    let raw = binary_uuid::codec::text_to_binary(GENERATED, false).unwrap().unwrap();
    let optimized = binary_uuid::codec::text_to_binary(GENERATED, true).unwrap().unwrap();

    let mut row = Record::new();
    row.insert("ref".into(), Value::from(raw));
    row.insert("sorted_ref".into(), Value::from(optimized));

    let read = unknown.decode_record(row).unwrap();
    assert_eq!(read["ref"], Value::from(GENERATED));
    // under the raw layout the version nibble of these bytes is 0xc
    assert_eq!(read["sorted_ref"], Value::from(optimized));
}

#[test]
fn test_unknown_table_detects_uuid_text() {
    let unknown = transcoder("archive", Arc::new(RecordingGenerator::default()));

    let stored = unknown
        .to_storage_format(record(json!({"ref": GENERATED, "label": "x"})), "")
        .unwrap();
    let row = stored.as_record().unwrap();
    assert!(row["ref"].as_bytes().is_some());
    assert_eq!(row["label"], Value::from("x"));
}
