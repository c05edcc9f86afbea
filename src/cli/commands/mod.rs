//! Command implementations for the fhirstage CLI

pub mod ingest;
pub mod init;
pub mod status;
pub mod validate;
