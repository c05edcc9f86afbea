//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "fhirstage.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your FHIR server URL", self.output);
                println!("  2. Validate configuration: fhirstage validate-config");
                println!("  3. Run ingestion: fhirstage ingest");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Sample configuration content
    fn sample_config() -> &'static str {
        r#"# fhirstage configuration file
# Resumable FHIR ingestion to a local staging area

[application]
log_level = "info"

[fhir]
base_url = "https://hapi.fhir.org/baseR4"
# Page size (_count) for the root Patient listing (1-1000)
page_size = 100
timeout_seconds = 10
# Pause between root page requests, in milliseconds
page_delay_ms = 100

[fhir.retry]
max_retries = 3
# Fixed wait after a transport failure, in seconds
retry_delay_secs = 2
# Wait on a 429 without a Retry-After header, in seconds
rate_limit_wait_secs = 5

[ingest]
staging_dir = "data/raw_json"
# Records per batch file
batch_size = 1000
# Cap on the number of root Patient records fetched
record_limit = 10000
# Linked resource types to ingest
resources = [
    "Condition",
    "Observation",
    "Encounter",
    "MedicationRequest",
    "Procedure",
    "AllergyIntolerance",
    "Device",
    "Immunization",
]

[logging]
file_enabled = false
file_path = "logs"
rotation = "daily"
"#
    }
}
