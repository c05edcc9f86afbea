//! External system integrations for fhirstage.
//!
//! The only external collaborator the core talks to directly is the FHIR
//! source; the downstream warehouse loader consumes the staging directory on
//! its own and is not integrated here.
//!
//! - [`fhir`] - FHIR REST server adapter (pagination, per-patient queries)

pub mod fhir;
