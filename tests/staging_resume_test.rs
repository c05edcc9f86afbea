//! Filesystem-level tests for resumption state
//!
//! These tests exercise the scan → plan path and batch numbering directly
//! against a temporary staging directory, with no FHIR source involved.

use fhirstage::core::ingest::missing_ids;
use fhirstage::core::staging::{BatchWriter, SkipListStore, StagingScanner};
use fhirstage::domain::ResourceType;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn seed_batch(staging: &Path, dir: &str, file: &str, records: Value) {
    let dir = staging.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), records.to_string()).unwrap();
}

fn condition_record(id: &str, patient_id: &str) -> Value {
    json!({
        "resourceType": "Condition",
        "id": id,
        "subject": {"reference": format!("Patient/{patient_id}")}
    })
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_plan_from_seeded_staging_directory() {
    let staging = TempDir::new().unwrap();

    // Universe of four patients across two root batches
    seed_batch(
        staging.path(),
        "patient",
        "patient_batch_1.json",
        json!([{"id": "p1"}, {"id": "p2"}]),
    );
    seed_batch(
        staging.path(),
        "patient",
        "patient_batch_2.json",
        json!([{"id": "p3"}, {"id": "p4"}]),
    );
    // p2 already has staged conditions, p4 is confirmed empty
    seed_batch(
        staging.path(),
        "condition",
        "condition_batch_1.json",
        json!([condition_record("c1", "p2")]),
    );
    seed_batch(staging.path(), "condition", "no_data.json", json!(["p4"]));

    let scanner = StagingScanner::new(staging.path());
    let skip_store = SkipListStore::new(staging.path());

    let universe = scanner.root_ids();
    assert_eq!(universe, set(&["p1", "p2", "p3", "p4"]));

    let fetched = scanner.fetched_parent_ids(ResourceType::Condition);
    let skipped = skip_store.load(ResourceType::Condition).unwrap();
    let missing = missing_ids(&universe, &fetched, &skipped);

    assert_eq!(missing, vec!["p1".to_string(), "p3".to_string()]);
}

#[test]
fn test_plan_is_empty_when_everything_is_covered() {
    let staging = TempDir::new().unwrap();
    seed_batch(
        staging.path(),
        "patient",
        "patient_batch_1.json",
        json!([{"id": "p1"}, {"id": "p2"}]),
    );
    seed_batch(
        staging.path(),
        "encounter",
        "encounter_batch_1.json",
        json!([{"id": "e1", "subject": {"reference": "Patient/p1"}}]),
    );
    seed_batch(staging.path(), "encounter", "no_data.json", json!(["p2"]));

    let scanner = StagingScanner::new(staging.path());
    let skip_store = SkipListStore::new(staging.path());

    let missing = missing_ids(
        &scanner.root_ids(),
        &scanner.fetched_parent_ids(ResourceType::Encounter),
        &skip_store.load(ResourceType::Encounter).unwrap(),
    );
    assert!(missing.is_empty());
}

#[test]
fn test_batch_numbering_continues_across_writers() {
    let staging = TempDir::new().unwrap();

    let mut writer = BatchWriter::open(staging.path(), ResourceType::Condition, 2).unwrap();
    writer
        .push(vec![
            condition_record("c1", "p1"),
            condition_record("c2", "p1"),
        ])
        .unwrap();
    writer.push(vec![condition_record("c3", "p2")]).unwrap();
    let stats = writer.finish().unwrap();
    assert_eq!(stats.records, 3);
    assert_eq!(stats.batches, 2);

    // A later run picks up numbering where the first left off
    let mut writer = BatchWriter::open(staging.path(), ResourceType::Condition, 2).unwrap();
    writer.push(vec![condition_record("c4", "p3")]).unwrap();
    let stats = writer.finish().unwrap();
    assert_eq!(stats.batches, 1);

    let dir = staging.path().join("condition");
    assert!(dir.join("condition_batch_1.json").exists());
    assert!(dir.join("condition_batch_2.json").exists());
    assert!(dir.join("condition_batch_3.json").exists());
    assert!(!dir.join("condition_batch_4.json").exists());
}

#[test]
fn test_writer_output_is_scannable() {
    let staging = TempDir::new().unwrap();

    let mut writer = BatchWriter::open(staging.path(), ResourceType::Observation, 100).unwrap();
    writer
        .push(vec![
            json!({"id": "o1", "subject": {"reference": "Patient/p1"}}),
            json!({"id": "o2", "patient": {"reference": "Patient/p2"}}),
        ])
        .unwrap();
    writer.finish().unwrap();

    let scanner = StagingScanner::new(staging.path());
    assert_eq!(
        scanner.fetched_parent_ids(ResourceType::Observation),
        set(&["p1", "p2"])
    );
}

#[test]
fn test_skip_list_grows_across_runs() {
    let staging = TempDir::new().unwrap();
    let store = SkipListStore::new(staging.path());

    store
        .save(ResourceType::Device, &set(&["p1", "p2"]))
        .unwrap();
    store.save(ResourceType::Device, &set(&["p3"])).unwrap();

    let loaded = store.load(ResourceType::Device).unwrap();
    assert_eq!(loaded, set(&["p1", "p2", "p3"]));

    // Skip lists are per type
    assert!(store.load(ResourceType::Condition).unwrap().is_empty());
}

#[test]
fn test_malformed_skip_list_recovers_empty() {
    let staging = TempDir::new().unwrap();
    seed_batch(staging.path(), "device", "wrapper.json", json!([]));
    fs::write(staging.path().join("device/no_data.json"), "{broken").unwrap();

    let store = SkipListStore::new(staging.path());
    assert!(store.load(ResourceType::Device).unwrap().is_empty());

    // Saving over the malformed file repairs it
    store.save(ResourceType::Device, &set(&["p1"])).unwrap();
    assert_eq!(store.load(ResourceType::Device).unwrap(), set(&["p1"]));
}
