//! Domain models and types for fhirstage.
//!
//! This module contains the core domain types and business rules:
//!
//! - **Resource model** ([`ResourceType`], [`LinkParam`], reference parsing)
//! - **Error types** ([`StageError`], [`FhirError`])
//! - **Result type alias** ([`Result`])
//!
//! Raw FHIR records are treated as opaque `serde_json::Value` documents with
//! a required `id` field; linked resources additionally reference their
//! parent patient as `{"reference": "Patient/<id>"}` under a `subject` or
//! `patient` key. The helpers in [`resource`] extract both.
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, StageError>`]:
//!
//! ```rust
//! use fhirstage::domain::{Result, StageError};
//!
//! fn example() -> Result<()> {
//!     Err(StageError::Validation("Invalid input".to_string()))
//! }
//! ```

pub mod errors;
pub mod resource;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FhirError, StageError};
pub use resource::{parent_patient_id, resource_id, LinkParam, ResourceType};
pub use result::Result;
