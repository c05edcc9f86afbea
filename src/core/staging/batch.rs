//! Numbered batch files
//!
//! A [`BatchWriter`] buffers fetched records for one resource type and
//! flushes them to `<type>_batch_<N>.json` files under the type's staging
//! directory. Numbering starts at one greater than the highest batch number
//! already on disk when the writer is opened, and is not recomputed per
//! flush. Batch files are immutable once written; every flush writes the
//! complete batch to a temporary sibling and renames it into place, so the
//! scanner and the downstream loader never observe a partial file.

use crate::domain::{ResourceType, Result, StageError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Counters returned when a writer is finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Records written across all flushed batches
    pub records: usize,
    /// Batch files written
    pub batches: usize,
}

/// Buffered writer of numbered batch files for one resource type
pub struct BatchWriter {
    dir: PathBuf,
    resource: ResourceType,
    batch_size: usize,
    next_batch_num: u64,
    pending: Vec<Value>,
    stats: BatchStats,
}

impl BatchWriter {
    /// Open a writer for `resource` under the staging root
    ///
    /// Creates the type directory if needed and determines the next batch
    /// number from the highest one already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or listed.
    pub fn open(staging_dir: &Path, resource: ResourceType, batch_size: usize) -> Result<Self> {
        let dir = staging_dir.join(resource.dir_name());
        fs::create_dir_all(&dir).map_err(|e| {
            StageError::Staging(format!("Failed to create {}: {e}", dir.display()))
        })?;

        let next_batch_num = highest_batch_number(&dir, resource)? + 1;
        Ok(Self {
            dir,
            resource,
            batch_size,
            next_batch_num,
            pending: Vec::new(),
            stats: BatchStats::default(),
        })
    }

    /// Buffer records, flushing a batch once the threshold is reached
    pub fn push(&mut self, records: Vec<Value>) -> Result<()> {
        self.pending.extend(records);
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Records currently buffered and not yet flushed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Batch number the next flush will use
    pub fn next_batch_num(&self) -> u64 {
        self.next_batch_num
    }

    /// Flush any remainder and return the run's counters
    pub fn finish(mut self) -> Result<BatchStats> {
        if !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(self.stats)
    }

    /// Write the entire pending buffer as one batch file
    fn flush(&mut self) -> Result<()> {
        let file_name = format!(
            "{}_batch_{}.json",
            self.resource.dir_name(),
            self.next_batch_num
        );
        let path = self.dir.join(&file_name);
        let tmp = self.dir.join(format!(".{file_name}.tmp"));

        let contents = serde_json::to_vec_pretty(&self.pending)?;
        fs::write(&tmp, contents)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| StageError::Staging(format!("Failed to write {}: {e}", path.display())))?;

        tracing::info!(
            resource = %self.resource,
            batch = self.next_batch_num,
            records = self.pending.len(),
            path = %path.display(),
            "Wrote batch file"
        );

        self.stats.records += self.pending.len();
        self.stats.batches += 1;
        self.pending.clear();
        self.next_batch_num += 1;
        Ok(())
    }
}

/// Parse the batch number out of a `<type>_batch_<N>.json` file name
pub fn batch_number(file_name: &str, resource: ResourceType) -> Option<u64> {
    let prefix = format!("{}_batch_", resource.dir_name());
    file_name
        .strip_prefix(&prefix)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Highest batch number present in a type directory, 0 when none exist
fn highest_batch_number(dir: &Path, resource: ResourceType) -> Result<u64> {
    let entries = fs::read_dir(dir)
        .map_err(|e| StageError::Staging(format!("Failed to list {}: {e}", dir.display())))?;

    let mut highest = 0;
    for entry in entries.flatten() {
        if let Some(name) = entry.file_name().to_str() {
            if let Some(num) = batch_number(name, resource) {
                highest = highest.max(num);
            }
        }
    }
    Ok(highest)
}
