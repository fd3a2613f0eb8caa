//! Unified ingestion entrypoint.
//!
//! Most callers should use [`open_records`], which turns a file path or glob pattern into one
//! lazy stream of [`crate::types::RawRecord`]s.
//!
//! - If [`IngestionOptions::format`] is `None`, each file's format is inferred from its extension.
//! - A pattern such as `by_year/*.csv` expands to every matching file, in sorted path order; the
//!   files are read one after another, each with its own header.
//! - If an [`super::observability::IngestionObserver`] is provided, per-file success/failure and
//!   alerts are reported to it.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{StatsError, StatsResult};
use crate::types::{PostingColumns, RawRecord};

use super::csv::{csv_records_from_path, CsvRecords};
use super::json::{json_records_from_path, JsonRecords};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Records from a single file of either format.
pub enum FileRecords {
    Csv(CsvRecords<File>),
    Json(JsonRecords),
}

impl FileRecords {
    /// Rows read and skipped so far.
    pub fn stats(&self) -> IngestionStats {
        match self {
            FileRecords::Csv(r) => r.stats(),
            FileRecords::Json(r) => r.stats(),
        }
    }
}

impl Iterator for FileRecords {
    type Item = StatsResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FileRecords::Csv(r) => r.next(),
            FileRecords::Json(r) => r.next(),
        }
    }
}

/// Open one file, picking the reader by format.
pub fn open_file(
    path: impl AsRef<Path>,
    columns: &PostingColumns,
    format: Option<IngestionFormat>,
) -> StatsResult<FileRecords> {
    let path = path.as_ref();
    let fmt = match format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    Ok(match fmt {
        IngestionFormat::Csv => FileRecords::Csv(csv_records_from_path(path, columns)?),
        IngestionFormat::Json => FileRecords::Json(json_records_from_path(path, columns)?),
    })
}

/// A lazy, sequential stream of records over one or more files.
///
/// Files are opened only when the previous one is exhausted, and each is closed as soon as it is
/// done. After the first error the stream is fused and yields nothing more.
pub struct RecordStream {
    pending: VecDeque<PathBuf>,
    current: Option<(IngestionContext, FileRecords)>,
    columns: PostingColumns,
    options: IngestionOptions,
    totals: IngestionStats,
    failed: bool,
}

impl RecordStream {
    /// Rows read and skipped across every file finished so far.
    pub fn stats(&self) -> IngestionStats {
        self.totals
    }

    /// Files not yet opened.
    pub fn remaining_files(&self) -> usize {
        self.pending.len()
    }

    fn open_next(&mut self) -> Option<StatsResult<()>> {
        let path = self.pending.pop_front()?;
        let format = match self.options.format {
            Some(f) => Ok(f),
            None => infer_format_from_path(&path),
        };
        let opened = format.and_then(|fmt| {
            let ctx = IngestionContext {
                path: path.clone(),
                format: fmt,
            };
            open_file(&path, &self.columns, Some(fmt)).map(|records| (ctx, records))
        });
        Some(match opened {
            Ok(current) => {
                self.current = Some(current);
                Ok(())
            }
            Err(e) => {
                let ctx = IngestionContext {
                    path,
                    format: self.options.format.unwrap_or(IngestionFormat::Csv),
                };
                self.report_failure(&ctx, &e);
                Err(e)
            }
        })
    }

    fn finish_current(&mut self) {
        if let Some((ctx, records)) = self.current.take() {
            let stats = records.stats();
            self.totals.rows_read += stats.rows_read;
            self.totals.rows_skipped += stats.rows_skipped;
            if let Some(obs) = self.options.observer.as_ref() {
                obs.on_success(&ctx, stats);
            }
        }
    }

    fn report_failure(&self, ctx: &IngestionContext, e: &StatsError) {
        if let Some(obs) = self.options.observer.as_ref() {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

impl Iterator for RecordStream {
    type Item = StatsResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if self.current.is_none() {
                match self.open_next()? {
                    Ok(()) => {}
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
            }
            let (ctx, records) = self.current.as_mut()?;
            match records.next() {
                Some(Ok(record)) => return Some(Ok(record)),
                Some(Err(e)) => {
                    let ctx = ctx.clone();
                    self.current = None;
                    self.failed = true;
                    self.report_failure(&ctx, &e);
                    return Some(Err(e));
                }
                None => self.finish_current(),
            }
        }
    }
}

/// Open a file path or glob pattern as one lazy record stream.
///
/// # Examples
///
/// ```no_run
/// use vacancy_stats::engine::{AggregationEngine, AggregationOptions};
/// use vacancy_stats::ingestion::{open_records, IngestionOptions};
/// use vacancy_stats::rates::RateTable;
/// use vacancy_stats::types::PostingColumns;
///
/// # fn main() -> Result<(), vacancy_stats::StatsError> {
/// let records = open_records("vacancies.csv", &PostingColumns::default(), &IngestionOptions::default())?;
/// let engine = AggregationEngine::new(AggregationOptions::for_title("Программист"));
/// let stats = engine.run(records, &RateTable::default())?;
/// println!("{stats}");
/// # Ok(())
/// # }
/// ```
pub fn open_records(
    input: impl AsRef<Path>,
    columns: &PostingColumns,
    options: &IngestionOptions,
) -> StatsResult<RecordStream> {
    let paths = expand_input(input.as_ref())?;
    Ok(RecordStream {
        pending: paths.into(),
        current: None,
        columns: columns.clone(),
        options: options.clone(),
        totals: IngestionStats::default(),
        failed: false,
    })
}

/// Expand a glob pattern into sorted matching paths. A plain path is returned as-is.
pub fn expand_input(input: &Path) -> StatsResult<Vec<PathBuf>> {
    let text = input.to_string_lossy();
    if !text.contains(['*', '?', '[']) {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in glob::glob(&text)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(StatsError::SchemaMismatch {
            message: format!("no input files match pattern '{text}'"),
        });
    }
    paths.sort();
    Ok(paths)
}

fn severity_for_error(e: &StatsError) -> IngestionSeverity {
    match e {
        StatsError::Io(_) | StatsError::Glob(_) => IngestionSeverity::Critical,
        StatsError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        StatsError::Json(_)
        | StatsError::Pattern(_)
        | StatsError::SchemaMismatch { .. }
        | StatsError::DateParse { .. }
        | StatsError::InvalidRateTable { .. } => IngestionSeverity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> StatsResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StatsError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| StatsError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
