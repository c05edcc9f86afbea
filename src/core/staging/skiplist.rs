//! Persisted skip lists
//!
//! For each linked resource type, `no_data.json` records the patient IDs
//! that were queried and confirmed to have zero linked records, so they are
//! never queried again. Every save computes the union of the persisted set
//! and the new IDs before overwriting, so skip discoveries from earlier runs
//! are never lost. The set grows monotonically and never shrinks.

use crate::domain::{ResourceType, Result, StageError};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Store for per-type skip lists under the staging root
pub struct SkipListStore {
    root: PathBuf,
}

impl SkipListStore {
    /// Create a store over the staging root
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: staging_dir.into(),
        }
    }

    fn path(&self, resource: ResourceType) -> PathBuf {
        self.root.join(resource.dir_name()).join("no_data.json")
    }

    /// Load the persisted skip set for a resource type
    ///
    /// A missing file yields an empty set; a malformed file is logged and
    /// treated as empty.
    pub fn load(&self, resource: ResourceType) -> Result<HashSet<String>> {
        let path = self.path(resource);
        if !path.exists() {
            return Ok(HashSet::new());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            StageError::Staging(format!("Failed to read {}: {e}", path.display()))
        })?;
        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Skip list is malformed, treating as empty"
                );
                Ok(HashSet::new())
            }
        }
    }

    /// Merge `new_ids` into the persisted skip set
    ///
    /// Loads the existing set, unions in the new IDs and atomically
    /// overwrites the file with the result. Returns the size of the merged
    /// set.
    pub fn save(&self, resource: ResourceType, new_ids: &HashSet<String>) -> Result<usize> {
        let mut merged = self.load(resource)?;
        merged.extend(new_ids.iter().cloned());

        let path = self.path(resource);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                StageError::Staging(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }

        // Sorted for stable diffs and reproducible tests
        let mut ids: Vec<&String> = merged.iter().collect();
        ids.sort();
        let contents = serde_json::to_vec_pretty(&ids)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| StageError::Staging(format!("Failed to write {}: {e}", path.display())))?;

        tracing::info!(
            resource = %resource,
            added = new_ids.len(),
            total = merged.len(),
            "Persisted skip list"
        );
        Ok(merged.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let staging = TempDir::new().unwrap();
        let store = SkipListStore::new(staging.path());
        assert!(store.load(ResourceType::Condition).unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let staging = TempDir::new().unwrap();
        let store = SkipListStore::new(staging.path());
        store.save(ResourceType::Condition, &ids(&["p1", "p2"])).unwrap();
        assert_eq!(store.load(ResourceType::Condition).unwrap(), ids(&["p1", "p2"]));
    }

    #[test]
    fn test_save_unions_with_existing() {
        let staging = TempDir::new().unwrap();
        let store = SkipListStore::new(staging.path());

        let total = store.save(ResourceType::Device, &ids(&["p1", "p2"])).unwrap();
        assert_eq!(total, 2);
        let total = store.save(ResourceType::Device, &ids(&["p2", "p3"])).unwrap();
        assert_eq!(total, 3);

        assert_eq!(
            store.load(ResourceType::Device).unwrap(),
            ids(&["p1", "p2", "p3"])
        );
    }

    #[test]
    fn test_disjoint_saves_never_shrink() {
        let staging = TempDir::new().unwrap();
        let store = SkipListStore::new(staging.path());

        let mut expected = HashSet::new();
        for chunk in [&["a", "b"][..], &["c"][..], &["d", "e"][..]] {
            let chunk_ids = ids(chunk);
            expected.extend(chunk_ids.iter().cloned());
            store.save(ResourceType::Observation, &chunk_ids).unwrap();
            assert_eq!(store.load(ResourceType::Observation).unwrap(), expected);
        }
    }

    #[test]
    fn test_malformed_skip_list_treated_as_empty() {
        let staging = TempDir::new().unwrap();
        let dir = staging.path().join("encounter");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("no_data.json"), "{broken").unwrap();

        let store = SkipListStore::new(staging.path());
        assert!(store.load(ResourceType::Encounter).unwrap().is_empty());

        // A save after the malformed read still produces a valid file
        store.save(ResourceType::Encounter, &ids(&["p1"])).unwrap();
        assert_eq!(store.load(ResourceType::Encounter).unwrap(), ids(&["p1"]));
    }

    #[test]
    fn test_stores_per_type_are_independent() {
        let staging = TempDir::new().unwrap();
        let store = SkipListStore::new(staging.path());
        store.save(ResourceType::Condition, &ids(&["p1"])).unwrap();
        assert!(store.load(ResourceType::Observation).unwrap().is_empty());
    }
}
