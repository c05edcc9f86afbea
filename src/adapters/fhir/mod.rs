//! FHIR server integration.
//!
//! - [`client`] - HTTP client, root-listing pagination and per-patient
//!   fetching with retry and rate-limit handling
//! - [`models`] - serde models for the search Bundle wire format

pub mod client;
pub mod models;

pub use client::{FetchOutcome, FhirClient, PageWalker};
pub use models::{Bundle, BundleEntry, BundleLink};
