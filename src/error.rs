use thiserror::Error;

/// Convenience result type used across ingestion and aggregation.
pub type StatsResult<T> = Result<T, StatsError>;

/// Error type returned by ingestion and aggregation functions.
///
/// Noisy input is not an error: structurally invalid rows, unknown currencies and postings without
/// any salary bound are dropped silently and only show up in counters. The one data error that
/// aborts a run is [`StatsError::DateParse`].
#[derive(Debug, Error)]
pub enum StatsError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON input or rate-table parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid glob pattern for a multi-file source.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A path matched by a glob pattern could not be read.
    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// The input does not have the expected shape (missing required columns, unknown format, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The publish date of a record could not be turned into a year.
    #[error("failed to parse year at row {row}: {message} (raw='{raw}')")]
    DateParse {
        row: usize,
        raw: String,
        message: String,
    },

    /// The supplied currency rate table contains an unusable multiplier.
    #[error("invalid rate table: {message}")]
    InvalidRateTable { message: String },
}
