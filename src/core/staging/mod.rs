//! The file-based staging area.
//!
//! Layout: one subdirectory per resource type (lower-cased type name), each
//! holding numbered `<type>_batch_<N>.json` files and, for linked types, a
//! `no_data.json` skip list. Batch files are immutable once written; the
//! downstream loader archives them, the core never deletes anything.
//!
//! - [`batch`] - buffered, numbered, atomically-written batch files
//! - [`scanner`] - reconstructing fetched state from disk
//! - [`skiplist`] - persisted confirmed-empty patient sets

pub mod batch;
pub mod scanner;
pub mod skiplist;

pub use batch::{BatchStats, BatchWriter};
pub use scanner::StagingScanner;
pub use skiplist::SkipListStore;
