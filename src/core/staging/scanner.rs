//! Staging-area scanning
//!
//! The staging directory is the single source of resumption truth: instead
//! of keeping a manifest, each run reconstructs what has already been fetched
//! by reading the batch files back. The scanner is a pure function of the
//! on-disk state and never mutates it. Malformed or unreadable files are
//! logged and skipped; a missing directory simply yields an empty set.

use crate::domain::{parent_patient_id, resource_id, ResourceType};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view over the staging directory
pub struct StagingScanner {
    root: PathBuf,
}

impl StagingScanner {
    /// Create a scanner over the staging root
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: staging_dir.into(),
        }
    }

    /// True when at least one root batch file exists on disk
    pub fn has_root_batches(&self) -> bool {
        !batch_files(&self.root.join(ResourceType::Patient.dir_name())).is_empty()
    }

    /// Number of batch files on disk for a resource type
    pub fn batch_file_count(&self, resource: ResourceType) -> usize {
        batch_files(&self.root.join(resource.dir_name())).len()
    }

    /// Modification time of the newest batch file for a resource type
    pub fn last_staged_at(&self, resource: ResourceType) -> Option<std::time::SystemTime> {
        batch_files(&self.root.join(resource.dir_name()))
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .filter_map(|meta| meta.modified().ok())
            .max()
    }

    /// IDs of all patients found in persisted root batches
    pub fn root_ids(&self) -> HashSet<String> {
        self.scan(ResourceType::Patient, |record| {
            resource_id(record).map(str::to_string)
        })
    }

    /// Patient IDs already represented in persisted batches of a linked type
    ///
    /// Accepts references under either the `subject` or `patient` key,
    /// regardless of which parameter the type is queried with.
    pub fn fetched_parent_ids(&self, resource: ResourceType) -> HashSet<String> {
        self.scan(resource, |record| {
            parent_patient_id(record).map(str::to_string)
        })
    }

    fn scan<F>(&self, resource: ResourceType, extract: F) -> HashSet<String>
    where
        F: Fn(&Value) -> Option<String>,
    {
        let dir = self.root.join(resource.dir_name());
        let mut ids = HashSet::new();

        for path in batch_files(&dir) {
            let records = match read_batch(&path) {
                Some(records) => records,
                None => continue,
            };
            for record in &records {
                if let Some(id) = extract(record) {
                    ids.insert(id);
                }
            }
        }

        tracing::debug!(
            resource = %resource,
            ids = ids.len(),
            "Scanned staging directory"
        );
        ids
    }
}

/// Batch files in a type directory, sorted by name
///
/// Skips the skip-list file and anything that is not `.json`. A missing or
/// unreadable directory yields an empty list.
fn batch_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().map_or(false, |ext| ext == "json")
                && path.file_name().map_or(false, |name| name != "no_data.json")
        })
        .collect();
    files.sort();
    files
}

/// Read one batch file as a JSON array of records
///
/// Malformed content is logged and treated as contributing nothing.
fn read_batch(path: &Path) -> Option<Vec<Value>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read batch file");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(records) => Some(records),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping malformed batch file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_batch(staging: &Path, dir: &str, file: &str, records: Value) {
        let dir = staging.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), serde_json::to_vec(&records).unwrap()).unwrap();
    }

    #[test]
    fn test_missing_directory_yields_empty_sets() {
        let staging = TempDir::new().unwrap();
        let scanner = StagingScanner::new(staging.path());
        assert!(!scanner.has_root_batches());
        assert!(scanner.root_ids().is_empty());
        assert!(scanner
            .fetched_parent_ids(ResourceType::Condition)
            .is_empty());
    }

    #[test]
    fn test_root_ids_across_batches() {
        let staging = TempDir::new().unwrap();
        write_batch(
            staging.path(),
            "patient",
            "patient_batch_1.json",
            json!([{"id": "p1"}, {"id": "p2"}]),
        );
        write_batch(
            staging.path(),
            "patient",
            "patient_batch_2.json",
            json!([{"id": "p2"}, {"id": "p3"}, {"no_id": true}]),
        );

        let scanner = StagingScanner::new(staging.path());
        assert!(scanner.has_root_batches());
        let ids = scanner.root_ids();
        assert_eq!(
            ids,
            ["p1", "p2", "p3"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn test_fetched_parent_ids_both_reference_keys() {
        let staging = TempDir::new().unwrap();
        write_batch(
            staging.path(),
            "immunization",
            "immunization_batch_1.json",
            json!([
                {"id": "i1", "patient": {"reference": "Patient/p1"}},
                {"id": "i2", "subject": {"reference": "Patient/p2"}},
                {"id": "i3", "subject": {"reference": "Group/g1"}}
            ]),
        );

        let scanner = StagingScanner::new(staging.path());
        let ids = scanner.fetched_parent_ids(ResourceType::Immunization);
        assert_eq!(ids, ["p1", "p2"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let staging = TempDir::new().unwrap();
        write_batch(
            staging.path(),
            "condition",
            "condition_batch_1.json",
            json!([{"id": "c1", "subject": {"reference": "Patient/p1"}}]),
        );
        let dir = staging.path().join("condition");
        fs::write(dir.join("condition_batch_2.json"), "{not json").unwrap();
        fs::write(dir.join("condition_batch_3.json"), "{\"id\": \"not-a-list\"}").unwrap();

        let scanner = StagingScanner::new(staging.path());
        let ids = scanner.fetched_parent_ids(ResourceType::Condition);
        assert_eq!(ids, ["p1"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_skip_list_file_is_not_scanned() {
        let staging = TempDir::new().unwrap();
        write_batch(
            staging.path(),
            "device",
            "no_data.json",
            json!(["p1", "p2"]),
        );

        let scanner = StagingScanner::new(staging.path());
        assert!(scanner.fetched_parent_ids(ResourceType::Device).is_empty());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let staging = TempDir::new().unwrap();
        write_batch(
            staging.path(),
            "patient",
            "patient_batch_1.json",
            json!([{"id": "p1"}]),
        );
        let scanner = StagingScanner::new(staging.path());
        assert_eq!(scanner.root_ids(), scanner.root_ids());
    }
}
