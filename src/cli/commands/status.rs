//! Status command implementation
//!
//! This module implements the `status` command for displaying the state of
//! the staging area. Read-only: it scans the directory exactly the way the
//! ingestion planner does.

use crate::config::load_config;
use crate::core::staging::{SkipListStore, StagingScanner};
use crate::domain::ResourceType;
use chrono::{DateTime, Local};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Filter by resource type (canonical FHIR name)
    #[arg(long)]
    pub resource: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking staging status");

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let scanner = StagingScanner::new(&config.ingest.staging_dir);
        let skip_store = SkipListStore::new(&config.ingest.staging_dir);

        println!("Staging status for {}", config.ingest.staging_dir);
        println!();

        let universe = scanner.root_ids();
        println!(
            "Patient: {} batch file(s), {} patient ID(s)",
            scanner.batch_file_count(ResourceType::Patient),
            universe.len()
        );
        if let Some(time) = scanner.last_staged_at(ResourceType::Patient) {
            let time: DateTime<Local> = time.into();
            println!("Last staged: {}", time.format("%Y-%m-%d %H:%M:%S"));
        }
        if universe.is_empty() {
            println!();
            println!("No patient data staged yet. Run 'fhirstage ingest' to start.");
            return Ok(0);
        }

        let configured = match config.ingest.resource_types() {
            Ok(resources) => resources,
            Err(e) => {
                println!("Configuration is invalid: {e}");
                return Ok(2); // Configuration error exit code
            }
        };
        let resources: Vec<ResourceType> = configured
            .into_iter()
            .filter(|r| match &self.resource {
                Some(name) => r.as_str() == name,
                None => true,
            })
            .collect();

        if resources.is_empty() {
            println!();
            println!("No configured resource types match the filter.");
            return Ok(0);
        }

        println!();
        println!(
            "{:<22} {:>8} {:>10} {:>10} {:>10}",
            "Resource", "Batches", "Covered", "Skipped", "Missing"
        );
        println!("{}", "-".repeat(64));

        for resource in resources {
            let fetched = scanner.fetched_parent_ids(resource);
            let skipped = match skip_store.load(resource) {
                Ok(s) => s,
                Err(e) => {
                    println!("Failed to read skip list for {resource}: {e}");
                    return Ok(5); // Fatal error exit code
                }
            };
            let missing = universe
                .iter()
                .filter(|id| !fetched.contains(*id) && !skipped.contains(*id))
                .count();

            println!(
                "{:<22} {:>8} {:>10} {:>10} {:>10}",
                resource.as_str(),
                scanner.batch_file_count(resource),
                fetched.len(),
                skipped.len(),
                missing
            );
        }

        Ok(0)
    }
}
