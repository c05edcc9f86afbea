//! Configuration management for fhirstage.
//!
//! Configuration is loaded from a TOML file (`fhirstage.toml` by default)
//! with `${VAR}` environment variable substitution and `FHIRSTAGE_*`
//! environment overrides.
//!
//! # Example
//!
//! ```no_run
//! use fhirstage::config::load_config;
//!
//! let config = load_config("fhirstage.toml").expect("Failed to load config");
//! println!("Staging to {}", config.ingest.staging_dir);
//! ```

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, FhirConfig, IngestConfig, LoggingConfig, RetryConfig, StageConfig,
};
