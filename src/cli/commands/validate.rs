//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the fhirstage configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  FHIR Server: {}", config.fhir.base_url);
        println!("  Page Size: {}", config.fhir.page_size);
        println!("  Max Retries: {}", config.fhir.retry.max_retries);
        println!("  Staging Directory: {}", config.ingest.staging_dir);
        println!("  Batch Size: {}", config.ingest.batch_size);
        println!("  Record Limit: {}", config.ingest.record_limit);
        println!("  Resources: {:?}", config.ingest.resources);
        println!();
        Ok(0)
    }
}
