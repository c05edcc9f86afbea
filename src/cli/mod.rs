//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for fhirstage using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// fhirstage - FHIR staging ingestion tool
#[derive(Parser, Debug)]
#[command(name = "fhirstage")]
#[command(version, about, long_about = None)]
#[command(author = "Fhirstage Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "fhirstage.toml", env = "FHIRSTAGE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FHIRSTAGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest FHIR resources into the staging area
    Ingest(commands::ingest::IngestArgs),

    /// Show staging-area status per resource type
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["fhirstage", "ingest"]);
        assert_eq!(cli.config, "fhirstage.toml");
        assert!(matches!(cli.command, Commands::Ingest(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["fhirstage", "--config", "custom.toml", "ingest"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["fhirstage", "--log-level", "debug", "ingest"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_ingest_overrides() {
        let cli = Cli::parse_from([
            "fhirstage",
            "ingest",
            "--resource",
            "Condition,Observation",
            "--record-limit",
            "500",
            "--dry-run",
        ]);
        if let Commands::Ingest(args) = cli.command {
            assert_eq!(args.resource.as_deref(), Some("Condition,Observation"));
            assert_eq!(args.record_limit, Some(500));
            assert!(args.dry_run);
        } else {
            panic!("Expected Ingest command");
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["fhirstage", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["fhirstage", "status"]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["fhirstage", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
