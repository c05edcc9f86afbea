// fhirstage - FHIR staging ingestion tool
// Copyright (c) 2026 Fhirstage Contributors
// Licensed under the MIT License

//! # fhirstage - resumable FHIR ingestion
//!
//! fhirstage incrementally ingests a hierarchical set of clinical FHIR
//! records from a paginated REST source into a local, file-based staging
//! area, ready for a downstream loader to batch-load into a warehouse.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Walking** the paginated root Patient listing via cursor links
//! - **Fetching** linked resources per patient with retry, backoff and
//!   rate-limit handling
//! - **Staging** records as numbered, immutable JSON batch files
//! - **Resuming** interrupted runs by reconstructing state from disk
//!
//! ## Architecture
//!
//! fhirstage follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (orchestration, planning, staging)
//! - [`adapters`] - External integrations (FHIR REST source)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fhirstage::config::load_config;
//! use fhirstage::core::ingest::IngestCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("fhirstage.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = IngestCoordinator::new(config, shutdown_rx)?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Staged {} records", summary.total_records());
//!     Ok(())
//! }
//! ```
//!
//! ## Resumability
//!
//! The staging directory is the single source of resumption truth. Each run
//! scans the persisted batches to determine which patients are already
//! covered, loads the per-type skip lists of patients confirmed to have no
//! data, and fetches only the difference. Interrupting a run at any point
//! loses nothing: the next run recomputes the remaining work from disk.
//!
//! ## Error Handling
//!
//! fhirstage uses the [`domain::StageError`] type for all errors:
//!
//! ```rust,no_run
//! use fhirstage::domain::StageError;
//!
//! fn example() -> Result<(), StageError> {
//!     let config = fhirstage::config::load_config("fhirstage.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! fhirstage uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting ingestion");
//! warn!(resource = "Observation", patient_id = "p-17", "No records for patient");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
