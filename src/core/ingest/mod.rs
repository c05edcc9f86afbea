//! Ingestion orchestration.
//!
//! - [`coordinator`] - drives one run: root fetch, universe extraction, and
//!   the per-resource scan → plan → fetch → flush → persist cycle
//! - [`planner`] - set reconciliation of remaining work
//! - [`summary`] - per-run counters and reporting
//!
//! # Resumability
//!
//! Running the full ingestion twice in a row with an unchanged source
//! performs zero per-patient fetches the second time: everything the first
//! run staged is rediscovered by scanning, and the plan comes out empty.
//!
//! # Example
//!
//! ```rust,no_run
//! use fhirstage::config::load_config;
//! use fhirstage::core::ingest::IngestCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("fhirstage.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = IngestCoordinator::new(config, shutdown_rx)?;
//! let summary = coordinator.execute().await?;
//!
//! println!("Staged {} records", summary.total_records());
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod planner;
pub mod summary;

pub use coordinator::IngestCoordinator;
pub use planner::missing_ids;
pub use summary::{IngestSummary, ResourceStats};
