//! Configuration loading
//!
//! Pipeline: read the TOML file, substitute `${VAR}` placeholders from the
//! environment (comment lines exempt), parse, apply `FHIRSTAGE_*` overrides,
//! validate. The result is the immutable [`StageConfig`] handed to the rest
//! of the program.

use super::schema::StageConfig;
use crate::domain::errors::StageError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Load and validate the configuration file at `path`
///
/// # Errors
///
/// Returns `StageError::Configuration` when the file is missing or
/// unreadable, a referenced `${VAR}` is unset, the TOML does not parse, or
/// validation rejects a value.
pub fn load_config(path: impl AsRef<Path>) -> Result<StageConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StageError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StageError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;
    let contents = substitute_env_vars(&contents)?;

    let mut config: StageConfig = toml::from_str(&contents)
        .map_err(|e| StageError::Configuration(format!("Failed to parse TOML: {e}")))?;
    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| StageError::Configuration(format!("Configuration validation failed: {e}")))?;
    Ok(config)
}

/// Replace `${VAR_NAME}` placeholders with environment values
///
/// Comment lines pass through untouched. Every placeholder on a non-comment
/// line must resolve; unset variables are collected and reported together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut missing: Vec<String> = Vec::new();
    let mut output = String::with_capacity(input.len());

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            let substituted = re.replace_all(line, |caps: &regex::Captures| {
                match std::env::var(&caps[1]) {
                    Ok(value) => value,
                    Err(_) => {
                        let name = caps[1].to_string();
                        if !missing.contains(&name) {
                            missing.push(name);
                        }
                        // Left in place; the run fails below anyway
                        caps[0].to_string()
                    }
                }
            });
            output.push_str(&substituted);
        }
        output.push('\n');
    }

    if missing.is_empty() {
        Ok(output)
    } else {
        Err(StageError::Configuration(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )))
    }
}

/// Apply `FHIRSTAGE_<SECTION>_<KEY>` environment overrides
///
/// Unparseable numeric values are ignored rather than erroring; validation
/// still runs on the final result.
fn apply_env_overrides(config: &mut StageConfig) {
    let string_overrides: [(&str, &mut String); 4] = [
        ("FHIRSTAGE_APPLICATION_LOG_LEVEL", &mut config.application.log_level),
        ("FHIRSTAGE_FHIR_BASE_URL", &mut config.fhir.base_url),
        ("FHIRSTAGE_INGEST_STAGING_DIR", &mut config.ingest.staging_dir),
        ("FHIRSTAGE_LOGGING_FILE_PATH", &mut config.logging.file_path),
    ];
    for (var, target) in string_overrides {
        if let Ok(val) = std::env::var(var) {
            *target = val;
        }
    }

    if let Ok(val) = std::env::var("FHIRSTAGE_FHIR_PAGE_SIZE") {
        if let Ok(size) = val.parse() {
            config.fhir.page_size = size;
        }
    }
    if let Ok(val) = std::env::var("FHIRSTAGE_FHIR_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.fhir.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("FHIRSTAGE_FHIR_RETRY_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.fhir.retry.max_retries = retries;
        }
    }
    if let Ok(val) = std::env::var("FHIRSTAGE_INGEST_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.ingest.batch_size = size;
        }
    }
    if let Ok(val) = std::env::var("FHIRSTAGE_INGEST_RECORD_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.ingest.record_limit = limit;
        }
    }
    if let Ok(val) = std::env::var("FHIRSTAGE_LOGGING_FILE_ENABLED") {
        config.logging.file_enabled = val.parse().unwrap_or(false);
    }
}
