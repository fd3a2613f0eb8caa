use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StatsError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the run failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about one input file.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path being read.
    pub path: PathBuf,
    /// Format used for reading.
    pub format: IngestionFormat,
}

/// Row counters for one input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Data rows read (header excluded), including skipped ones.
    pub rows_read: usize,
    /// Rows dropped by the structural validity gate.
    pub rows_skipped: usize,
}

impl IngestionStats {
    /// Rows handed on to aggregation.
    pub fn rows_accepted(&self) -> usize {
        self.rows_read - self.rows_skipped
    }
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file has been read to the end.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when opening or reading a file fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &StatsError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// One observer callback, rendered the same way by every text sink.
enum Outcome<'a> {
    Read(IngestionStats),
    Failed(IngestionSeverity, &'a StatsError),
    Alert(IngestionSeverity, &'a StatsError),
}

impl Outcome<'_> {
    fn render(&self, ctx: &IngestionContext) -> String {
        let (tag, detail) = match self {
            Outcome::Read(stats) => (
                "ok".to_string(),
                format!("rows={} skipped={}", stats.rows_read, stats.rows_skipped),
            ),
            Outcome::Failed(severity, error) => (format!("{severity:?}"), format!("err={error}")),
            Outcome::Alert(severity, error) => (format!("ALERT {severity:?}"), format!("err={error}")),
        };
        format!(
            "[{tag}] format={:?} path={} {detail}",
            ctx.format,
            ctx.path.display()
        )
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[ingest]{}", Outcome::Read(stats).render(ctx));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        eprintln!("[ingest]{}", Outcome::Failed(severity, error).render(ctx));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        eprintln!("[ingest]{}", Outcome::Alert(severity, error).render(ctx));
    }
}

/// Appends ingestion events, prefixed with a unix timestamp, to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, ctx: &IngestionContext, outcome: Outcome<'_>) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {}", unix_ts(), outcome.render(ctx));
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(ctx, Outcome::Read(stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        self.append(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &StatsError) {
        self.append(ctx, Outcome::Alert(severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
