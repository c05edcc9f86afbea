//! Configuration schema types
//!
//! This module defines the configuration structure for fhirstage.

use crate::domain::ResourceType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main fhirstage configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// FHIR source configuration
    pub fhir: FhirConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StageConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fhir.validate()?;
        self.ingest.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration for per-patient fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per patient query
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Fixed delay after a transport failure, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Wait applied on a 429 response without a Retry-After header, in seconds
    #[serde(default = "default_rate_limit_wait_secs")]
    pub rate_limit_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            rate_limit_wait_secs: default_rate_limit_wait_secs(),
        }
    }
}

/// FHIR source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base URL of the FHIR server (e.g. <https://hapi.fhir.org/baseR4>)
    pub base_url: String,

    /// Page size (`_count`) for the root Patient listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Pause between page requests on the root listing, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Retry behaviour for per-patient fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("fhir.base_url must not be empty".to_string());
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("fhir.base_url is not a valid URL: {}", self.base_url));
        }
        if self.page_size == 0 || self.page_size > 1000 {
            return Err(format!(
                "fhir.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }
        if self.timeout_seconds == 0 {
            return Err("fhir.timeout_seconds must be greater than 0".to_string());
        }
        if self.retry.max_retries == 0 {
            return Err("fhir.retry.max_retries must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Root directory of the staging area
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,

    /// Records per batch file
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cap on the number of root Patient records fetched
    #[serde(default = "default_record_limit")]
    pub record_limit: usize,

    /// Linked resource types to ingest (canonical FHIR names)
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            batch_size: default_batch_size(),
            record_limit: default_record_limit(),
            resources: default_resources(),
        }
    }
}

impl IngestConfig {
    fn validate(&self) -> Result<(), String> {
        if self.staging_dir.is_empty() {
            return Err("ingest.staging_dir must not be empty".to_string());
        }
        if self.batch_size == 0 {
            return Err("ingest.batch_size must be greater than 0".to_string());
        }
        if self.record_limit == 0 {
            return Err("ingest.record_limit must be greater than 0".to_string());
        }
        if self.resources.is_empty() {
            return Err("ingest.resources must name at least one resource type".to_string());
        }
        self.resource_types()?;
        Ok(())
    }

    /// The configured linked resource types, parsed
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown name or for `Patient` (the root type
    /// is always fetched and cannot be listed as linked).
    pub fn resource_types(&self) -> Result<Vec<ResourceType>, String> {
        self.resources
            .iter()
            .map(|name| {
                let resource = ResourceType::from_str(name)?;
                if resource.is_root() {
                    return Err(
                        "ingest.resources must not include Patient (the root type is always fetched)"
                            .to_string(),
                    );
                }
                Ok(resource)
            })
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Log rotation (daily or hourly)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            file_path: default_log_path(),
            rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file_enabled && self.file_path.is_empty() {
            return Err("logging.file_path must not be empty when file logging is enabled".to_string());
        }
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.rotation.as_str()) {
            return Err(format!(
                "Invalid logging.rotation '{}'. Must be one of: {}",
                self.rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_rate_limit_wait_secs() -> u64 {
    5
}

fn default_page_size() -> usize {
    100
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_page_delay_ms() -> u64 {
    100
}

fn default_staging_dir() -> String {
    "data/raw_json".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_record_limit() -> usize {
    10_000
}

fn default_resources() -> Vec<String> {
    ResourceType::all_linked()
        .iter()
        .map(|r| r.as_str().to_string())
        .collect()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> StageConfig {
        StageConfig {
            application: ApplicationConfig::default(),
            fhir: FhirConfig {
                base_url: "https://hapi.fhir.org/baseR4".to_string(),
                page_size: default_page_size(),
                timeout_seconds: default_timeout_seconds(),
                page_delay_ms: default_page_delay_ms(),
                retry: RetryConfig::default(),
            },
            ingest: IngestConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = valid_config();
        assert_eq!(config.fhir.retry.max_retries, 3);
        assert_eq!(config.fhir.retry.retry_delay_secs, 2);
        assert_eq!(config.fhir.retry.rate_limit_wait_secs, 5);
        assert_eq!(config.ingest.batch_size, 1000);
        assert_eq!(config.ingest.record_limit, 10_000);
        assert_eq!(config.ingest.resources.len(), 8);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut config = valid_config();
        config.fhir.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid_config();
        config.fhir.page_size = 0;
        assert!(config.validate().is_err());
        config.fhir.page_size = 1001;
        assert!(config.validate().is_err());
        config.fhir.page_size = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_resource_rejected() {
        let mut config = valid_config();
        config.ingest.resources = vec!["Practitioner".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_root_resource_rejected_in_linked_list() {
        let mut config = valid_config();
        config.ingest.resources = vec!["Patient".to_string()];
        assert!(config.validate().unwrap_err().contains("root type"));
    }

    #[test]
    fn test_resource_types_parse() {
        let config = valid_config();
        let types = config.ingest.resource_types().unwrap();
        assert_eq!(types.len(), 8);
        assert!(types.contains(&crate::domain::ResourceType::Observation));
    }

    #[test]
    fn test_resource_types_error_on_unknown_name() {
        let mut config = valid_config();
        config.ingest.resources = vec!["Condition".to_string(), "Bogus".to_string()];
        assert!(config
            .ingest
            .resource_types()
            .unwrap_err()
            .contains("Bogus"));
    }

    #[test]
    fn test_minimal_toml_parses_with_defaults() {
        let toml = r#"
            [fhir]
            base_url = "https://hapi.fhir.org/baseR4"
        "#;
        let config: StageConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ingest.staging_dir, "data/raw_json");
        assert_eq!(config.fhir.page_size, 100);
    }
}
