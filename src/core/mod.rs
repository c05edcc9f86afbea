//! Core business logic for fhirstage.
//!
//! - [`ingest`] - run orchestration, planning and reporting
//! - [`staging`] - the file-based staging area (batches, scanning, skip lists)
//!
//! # Run Workflow
//!
//! 1. **Root check**: skip the root fetch when patient batches exist on disk
//! 2. **Root fetch** (first run only): walk the paginated Patient listing up
//!    to the record cap, writing numbered batches
//! 3. **Universe extraction**: scan the root batches for patient IDs
//! 4. Per linked resource type: **scan** existing batches and the skip list,
//!    **plan** the missing patient set, **fetch** per patient with retries,
//!    **flush** the final batch, **persist** newly confirmed-empty patients
//!
//! Every step derives its inputs from the staging directory, so an
//! interrupted run resumes correctly with no bookkeeping beyond the files
//! themselves.

pub mod ingest;
pub mod staging;
