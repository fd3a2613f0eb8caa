use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::processing::DropReason;

/// Events emitted by the aggregation engine.
#[derive(Debug, Clone)]
pub enum AggregationEvent {
    RunStarted { title_filter: String },
    RecordDropped { row: usize, reason: DropReason },
    RunAborted { row: usize },
    RunFinished {
        elapsed: Duration,
        metrics: AggregationMetricsSnapshot,
    },
}

/// Observer hook for aggregation events.
pub trait AggregationObserver: Send + Sync {
    fn on_event(&self, event: &AggregationEvent);
}

/// A simple stderr logger for aggregation events.
///
/// Per-record drops are noisy on real dumps, so they are only printed when `verbose` is set.
#[derive(Debug, Default)]
pub struct StdErrAggregationObserver {
    pub verbose: bool,
}

impl AggregationObserver for StdErrAggregationObserver {
    fn on_event(&self, event: &AggregationEvent) {
        match event {
            AggregationEvent::RecordDropped { .. } if !self.verbose => {}
            AggregationEvent::RunFinished { elapsed, metrics } => {
                eprintln!("[aggregate][done] elapsed={elapsed:?} {metrics}");
            }
            other => eprintln!("[aggregate] {other:?}"),
        }
    }
}

/// Counters for the current (or last) aggregation run.
///
/// The engine updates these during a pass; callers can snapshot them at any time.
pub struct AggregationMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    records_seen: AtomicU64,
    postings: AtomicU64,
    currency_drops: AtomicU64,
    salary_drops: AtomicU64,
    title_matches: AtomicU64,
}

impl AggregationMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            records_seen: AtomicU64::new(0),
            postings: AtomicU64::new(0),
            currency_drops: AtomicU64::new(0),
            salary_drops: AtomicU64::new(0),
            title_matches: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.records_seen.store(0, Ordering::SeqCst);
        self.postings.store(0, Ordering::SeqCst);
        self.currency_drops.store(0, Ordering::SeqCst);
        self.salary_drops.store(0, Ordering::SeqCst);
        self.title_matches.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_record(&self) {
        let _ = self.records_seen.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_posting(&self, title_matched: bool) {
        let _ = self.postings.fetch_add(1, Ordering::SeqCst);
        if title_matched {
            let _ = self.title_matches.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn on_drop(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::UnknownCurrency => &self.currency_drops,
            DropReason::MissingSalary => &self.salary_drops,
        };
        let _ = counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> AggregationMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        AggregationMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            records_seen: self.records_seen.load(Ordering::SeqCst),
            postings: self.postings.load(Ordering::SeqCst),
            currency_drops: self.currency_drops.load(Ordering::SeqCst),
            salary_drops: self.salary_drops.load(Ordering::SeqCst),
            title_matches: self.title_matches.load(Ordering::SeqCst),
        }
    }
}

impl Default for AggregationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`AggregationMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub records_seen: u64,
    pub postings: u64,
    pub currency_drops: u64,
    pub salary_drops: u64,
    pub title_matches: u64,
}

impl fmt::Display for AggregationMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, records={}, postings={}, title_matches={}, currency_drops={}, salary_drops={}, elapsed={:?}",
            self.run_id,
            self.records_seen,
            self.postings,
            self.title_matches,
            self.currency_drops,
            self.salary_drops,
            self.elapsed
        )
    }
}
