//! Ingest coordinator - main orchestrator for the ingestion process
//!
//! Drives one run end to end: fetch the root Patient listing once (skipped
//! when root batches already exist), derive the patient ID universe from
//! disk, then for each configured linked resource type run
//! scan → plan → fetch loop → flush → persist skips.
//!
//! There is no partial or rollback state. A crash mid-loop leaves some
//! batches flushed and some patients unprocessed; the next run recomputes
//! the remaining work from the staging directory and carries on.

use crate::adapters::fhir::{FetchOutcome, FhirClient};
use crate::config::StageConfig;
use crate::core::ingest::planner::missing_ids;
use crate::core::ingest::summary::{IngestSummary, ResourceStats};
use crate::core::staging::{BatchWriter, SkipListStore, StagingScanner};
use crate::domain::{ResourceType, Result, StageError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::watch;

/// Ingest coordinator
pub struct IngestCoordinator {
    config: StageConfig,
    client: FhirClient,
    scanner: StagingScanner,
    skip_store: SkipListStore,
    staging_dir: PathBuf,
    shutdown: watch::Receiver<bool>,
}

impl IngestCoordinator {
    /// Create a new coordinator from configuration
    pub fn new(config: StageConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let client = FhirClient::new(&config.fhir)?;
        let staging_dir = PathBuf::from(&config.ingest.staging_dir);

        Ok(Self {
            client,
            scanner: StagingScanner::new(&staging_dir),
            skip_store: SkipListStore::new(&staging_dir),
            staging_dir,
            shutdown,
            config,
        })
    }

    /// Execute one ingestion run
    ///
    /// Returns the run summary. Only fatal errors (root fetch failure,
    /// staging I/O failure) propagate; per-patient fetch failures degrade
    /// into `exhausted` counts and are retried on the next run.
    pub async fn execute(&self) -> Result<IngestSummary> {
        let start_time = Instant::now();
        let mut summary = IngestSummary::new();

        tracing::info!(
            base_url = self.client.base_url(),
            staging_dir = %self.staging_dir.display(),
            "Starting ingestion run"
        );

        // Root is fetched at most once; existing batches win
        if self.scanner.has_root_batches() {
            tracing::info!("Found existing patient batches, skipping root fetch");
        } else {
            self.fetch_root(&mut summary).await?;
        }

        let universe = self.scanner.root_ids();
        summary.universe_size = universe.len();
        tracing::info!(patients = universe.len(), "Extracted patient ID universe");

        if universe.is_empty() {
            tracing::warn!("No patient IDs on disk, nothing to ingest");
            return Ok(summary.with_duration(start_time.elapsed()));
        }

        let resources = self
            .config
            .ingest
            .resource_types()
            .map_err(StageError::Configuration)?;
        for resource in resources {
            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, stopping before next resource");
                summary.interrupted = true;
                break;
            }
            let stats = self.ingest_resource(resource, &universe, &mut summary).await?;
            summary.add_resource(stats);
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Fetch the root Patient listing up to the configured record cap
    async fn fetch_root(&self, summary: &mut IngestSummary) -> Result<()> {
        let record_limit = self.config.ingest.record_limit;
        tracing::info!(
            record_limit = record_limit,
            "No existing patient data, fetching root listing"
        );

        let mut writer =
            BatchWriter::open(&self.staging_dir, ResourceType::Patient, self.config.ingest.batch_size)?;
        let mut walker = self.client.walk(ResourceType::Patient, self.config.fhir.page_size);
        let mut total = 0;

        while let Some(mut page) = walker.next_page().await? {
            let remaining = record_limit - total;
            page.truncate(remaining);
            total += page.len();
            writer.push(page)?;

            if total >= record_limit {
                break;
            }
            if self.shutdown_requested() {
                tracing::info!("Shutdown requested, stopping root fetch");
                summary.interrupted = true;
                break;
            }
        }

        let stats = writer.finish()?;
        summary.root_fetched = stats.records;
        tracing::info!(
            records = stats.records,
            batches = stats.batches,
            pages = walker.pages_read(),
            "Finished root fetch"
        );
        Ok(())
    }

    /// Run scan → plan → fetch loop → flush → persist skips for one type
    async fn ingest_resource(
        &self,
        resource: ResourceType,
        universe: &HashSet<String>,
        summary: &mut IngestSummary,
    ) -> Result<ResourceStats> {
        let mut stats = ResourceStats::new(resource);

        let fetched = self.scanner.fetched_parent_ids(resource);
        let skipped = self.skip_store.load(resource)?;
        let missing = missing_ids(universe, &fetched, &skipped);
        stats.planned = missing.len();

        tracing::info!(
            resource = %resource,
            fetched = fetched.len(),
            skipped = skipped.len(),
            missing = missing.len(),
            "Planned resource ingestion"
        );

        if missing.is_empty() {
            tracing::info!(resource = %resource, "All patients covered, skipping");
            return Ok(stats);
        }

        let mut writer =
            BatchWriter::open(&self.staging_dir, resource, self.config.ingest.batch_size)?;
        let mut no_data: HashSet<String> = HashSet::new();

        for patient_id in &missing {
            if self.shutdown_requested() {
                tracing::info!(
                    resource = %resource,
                    processed = stats.processed,
                    "Shutdown requested, stopping fetch loop"
                );
                summary.interrupted = true;
                break;
            }

            match self.client.fetch_for_patient(resource, patient_id).await? {
                FetchOutcome::Records(records) => writer.push(records)?,
                FetchOutcome::Empty => {
                    tracing::debug!(
                        resource = %resource,
                        patient_id = %patient_id,
                        "No records for patient"
                    );
                    no_data.insert(patient_id.clone());
                }
                FetchOutcome::Exhausted => stats.exhausted += 1,
            }

            stats.processed += 1;
            if stats.processed % 100 == 0 {
                tracing::info!(
                    resource = %resource,
                    processed = stats.processed,
                    total = missing.len(),
                    "Fetch loop progress"
                );
            }
        }

        let batch_stats = writer.finish()?;
        stats.records_written = batch_stats.records;
        stats.batches_written = batch_stats.batches;
        stats.confirmed_empty = no_data.len();

        if !no_data.is_empty() {
            self.skip_store.save(resource, &no_data)?;
        }

        tracing::info!(
            resource = %resource,
            records = stats.records_written,
            batches = stats.batches_written,
            confirmed_empty = stats.confirmed_empty,
            exhausted = stats.exhausted,
            "Completed resource"
        );
        Ok(stats)
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}
