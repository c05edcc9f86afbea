//! Ingest command implementation
//!
//! This module implements the `ingest` command, the main entry point for
//! staging FHIR resources to disk.

use crate::config::load_config;
use crate::core::ingest::{missing_ids, IngestCoordinator};
use crate::core::staging::{SkipListStore, StagingScanner};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Override the staging directory
    #[arg(long)]
    pub staging_dir: Option<String>,

    /// Override linked resource type(s) to ingest (comma-separated)
    #[arg(long)]
    pub resource: Option<String>,

    /// Override the root record cap
    #[arg(long)]
    pub record_limit: Option<usize>,

    /// Plan only: report what would be fetched without touching the source
    #[arg(long)]
    pub dry_run: bool,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting ingest command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(ref staging_dir) = self.staging_dir {
            tracing::info!(staging_dir = %staging_dir, "Overriding staging directory from CLI");
            config.ingest.staging_dir = staging_dir.clone();
        }

        if let Some(ref resources) = self.resource {
            let names: Vec<String> = resources.split(',').map(|s| s.trim().to_string()).collect();
            tracing::info!(resources = ?names, "Overriding resource types from CLI");
            config.ingest.resources = names;
        }

        if let Some(limit) = self.record_limit {
            tracing::info!(record_limit = limit, "Overriding record limit from CLI");
            config.ingest.record_limit = limit;
        }

        // Re-validate after overrides
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        // Dry run: plan from disk state only
        if self.dry_run {
            return Self::plan_only(&config);
        }

        let coordinator = match IngestCoordinator::new(config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create ingest coordinator");
                eprintln!("Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        match coordinator.execute().await {
            Ok(summary) => {
                println!();
                println!("Ingestion finished in {:.1}s", summary.duration.as_secs_f64());
                println!("  Root records fetched: {}", summary.root_fetched);
                println!("  Patient universe:     {}", summary.universe_size);
                for stats in &summary.resources {
                    println!(
                        "  {:<20} {} records in {} batch(es), {} empty, {} unresolved",
                        stats.resource.to_string() + ":",
                        stats.records_written,
                        stats.batches_written,
                        stats.confirmed_empty,
                        stats.exhausted
                    );
                }
                if summary.interrupted {
                    println!();
                    println!("Run was interrupted; progress is persisted. Re-run to resume.");
                }
                if summary.total_exhausted() > 0 {
                    println!();
                    println!(
                        "{} patient(s) could not be fetched and will be retried next run.",
                        summary.total_exhausted()
                    );
                }
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Ingestion failed");
                eprintln!("Ingestion failed: {e}");
                Ok(5)
            }
        }
    }

    /// Report the plan without issuing any fetches
    fn plan_only(config: &crate::config::StageConfig) -> anyhow::Result<i32> {
        let scanner = StagingScanner::new(&config.ingest.staging_dir);
        let skip_store = SkipListStore::new(&config.ingest.staging_dir);

        println!("Dry run - planning from {}", config.ingest.staging_dir);
        println!();

        if !scanner.has_root_batches() {
            println!(
                "No patient batches on disk; a real run would fetch up to {} patients first.",
                config.ingest.record_limit
            );
            return Ok(0);
        }

        let universe = scanner.root_ids();
        println!("Patient universe: {}", universe.len());

        let resources = match config.ingest.resource_types() {
            Ok(resources) => resources,
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                return Ok(2);
            }
        };
        for resource in resources {
            let fetched = scanner.fetched_parent_ids(resource);
            let skipped = match skip_store.load(resource) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Failed to read skip list for {resource}: {e}");
                    return Ok(5);
                }
            };
            let missing = missing_ids(&universe, &fetched, &skipped);
            println!(
                "  {:<20} {} fetched, {} skipped, {} missing",
                resource.to_string() + ":",
                fetched.len(),
                skipped.len(),
                missing.len()
            );
        }
        Ok(0)
    }
}
