//! Ingestion summary and reporting
//!
//! This module defines structures for tracking and reporting run results.

use crate::domain::ResourceType;
use std::time::Duration;

/// Per-resource-type counters for one run
#[derive(Debug, Clone)]
pub struct ResourceStats {
    /// Resource type these counters belong to
    pub resource: ResourceType,

    /// Patient IDs planned for fetching this run
    pub planned: usize,

    /// Patient IDs actually processed (may be fewer when interrupted)
    pub processed: usize,

    /// Records written to batch files
    pub records_written: usize,

    /// Batch files written
    pub batches_written: usize,

    /// Patients confirmed to have no linked records this run
    pub confirmed_empty: usize,

    /// Patients whose fetch exhausted all retries (left for the next run)
    pub exhausted: usize,
}

impl ResourceStats {
    /// Create empty counters for a resource type
    pub fn new(resource: ResourceType) -> Self {
        Self {
            resource,
            planned: 0,
            processed: 0,
            records_written: 0,
            batches_written: 0,
            confirmed_empty: 0,
            exhausted: 0,
        }
    }
}

/// Summary of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Root records fetched this run (0 when the root fetch was skipped)
    pub root_fetched: usize,

    /// Size of the patient ID universe derived from disk
    pub universe_size: usize,

    /// Per-resource counters, in processing order
    pub resources: Vec<ResourceStats>,

    /// True when a shutdown signal cut the run short
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,
}

impl IngestSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self {
            root_fetched: 0,
            universe_size: 0,
            resources: Vec::new(),
            interrupted: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add counters for a processed resource type
    pub fn add_resource(&mut self, stats: ResourceStats) {
        self.resources.push(stats);
    }

    /// Total records written across all types, root included
    pub fn total_records(&self) -> usize {
        self.root_fetched
            + self
                .resources
                .iter()
                .map(|stats| stats.records_written)
                .sum::<usize>()
    }

    /// Total patients left unresolved because retries were exhausted
    pub fn total_exhausted(&self) -> usize {
        self.resources.iter().map(|stats| stats.exhausted).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            root_fetched = self.root_fetched,
            universe = self.universe_size,
            resources = self.resources.len(),
            total_records = self.total_records(),
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Ingestion completed"
        );

        for stats in &self.resources {
            tracing::info!(
                resource = %stats.resource,
                planned = stats.planned,
                processed = stats.processed,
                records = stats.records_written,
                batches = stats.batches_written,
                confirmed_empty = stats.confirmed_empty,
                exhausted = stats.exhausted,
                "Resource completed"
            );
        }

        if self.total_exhausted() > 0 {
            tracing::warn!(
                exhausted = self.total_exhausted(),
                "Some patients could not be fetched; they will be retried on the next run"
            );
        }
    }
}

impl Default for IngestSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_creation() {
        let summary = IngestSummary::new();
        assert_eq!(summary.root_fetched, 0);
        assert_eq!(summary.universe_size, 0);
        assert!(summary.resources.is_empty());
        assert!(!summary.interrupted);
        assert_eq!(summary.total_records(), 0);
    }

    #[test]
    fn test_summary_with_duration() {
        let summary = IngestSummary::new().with_duration(Duration::from_secs(90));
        assert_eq!(summary.duration, Duration::from_secs(90));
    }

    #[test]
    fn test_total_records_includes_root() {
        let mut summary = IngestSummary::new();
        summary.root_fetched = 100;

        let mut stats = ResourceStats::new(ResourceType::Condition);
        stats.records_written = 40;
        summary.add_resource(stats);

        let mut stats = ResourceStats::new(ResourceType::Observation);
        stats.records_written = 60;
        summary.add_resource(stats);

        assert_eq!(summary.total_records(), 200);
    }

    #[test]
    fn test_total_exhausted() {
        let mut summary = IngestSummary::new();
        let mut stats = ResourceStats::new(ResourceType::Device);
        stats.exhausted = 3;
        summary.add_resource(stats);
        assert_eq!(summary.total_exhausted(), 3);
    }
}
