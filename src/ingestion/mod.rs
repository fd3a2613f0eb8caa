//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`open_records`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - expands glob patterns into several files read in sequence
//! - yields [`crate::types::RawRecord`]s lazily, skipping structurally invalid rows
//! - optionally reports per-file success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use unified::{
    expand_input, open_file, open_records, FileRecords, IngestionFormat, IngestionOptions, RecordStream,
};
