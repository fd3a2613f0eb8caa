//! Aggregation engine: one sequential pass over a record stream.
//!
//! The engine consumes records lazily, one at a time, and chains the stages from
//! [`crate::processing`]:
//!
//! normalize → accumulate → average → filter + rank → assemble
//!
//! A malformed publish date aborts the run with [`StatsError::DateParse`]; nothing partial is
//! returned. Unknown currencies and salary-less postings are dropped and only counted.

mod accumulator;
mod observer;

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;

use crate::error::{StatsError, StatsResult};
use crate::processing::{normalize, rank_locations, Normalization, RankingOptions};
use crate::rates::RateLookup;
use crate::statistics::StatisticsResult;
use crate::types::{PostingColumns, RawRecord};

pub use accumulator::{LocationTotals, PostingAccumulator};
pub use observer::{
    AggregationEvent, AggregationMetrics, AggregationMetricsSnapshot, AggregationObserver,
    StdErrAggregationObserver,
};

/// Configuration for an [`AggregationEngine`] run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregationOptions {
    /// Case-sensitive substring a title must contain to enter the filtered series.
    pub title_filter: String,
    /// Locations below this share of all postings are discarded.
    pub min_share: f64,
    /// Number of locations kept in each ranked mapping.
    pub top_n: usize,
    /// Decimal places shares are rounded to.
    pub share_precision: u32,
    /// Where each posting field is read from.
    pub columns: PostingColumns,
}

impl AggregationOptions {
    /// Default thresholds with the given title filter.
    pub fn for_title(title_filter: impl Into<String>) -> Self {
        Self {
            title_filter: title_filter.into(),
            ..Default::default()
        }
    }

    fn ranking(&self) -> RankingOptions {
        RankingOptions {
            min_share: self.min_share,
            top_n: self.top_n,
            share_precision: self.share_precision,
        }
    }
}

impl Default for AggregationOptions {
    fn default() -> Self {
        let ranking = RankingOptions::default();
        Self {
            title_filter: String::new(),
            min_share: ranking.min_share,
            top_n: ranking.top_n,
            share_precision: ranking.share_precision,
            columns: PostingColumns::default(),
        }
    }
}

/// Drives the single aggregation pass.
pub struct AggregationEngine {
    opts: AggregationOptions,
    observer: Option<Arc<dyn AggregationObserver>>,
    metrics: Arc<AggregationMetrics>,
}

impl AggregationEngine {
    /// Create a new engine with the given options.
    pub fn new(opts: AggregationOptions) -> Self {
        Self {
            opts,
            observer: None,
            metrics: Arc::new(AggregationMetrics::new()),
        }
    }

    /// Attach an observer for aggregation events.
    pub fn with_observer(mut self, observer: Arc<dyn AggregationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to the run metrics.
    pub fn metrics(&self) -> Arc<AggregationMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Aggregate a stream of records produced by an ingester.
    ///
    /// The first `Err` item (e.g. an I/O failure while reading) aborts the run, as does a
    /// malformed publish date. The iterator is dropped, and its source released, before this
    /// returns.
    pub fn run<I, L>(&self, records: I, rates: &L) -> StatsResult<StatisticsResult>
    where
        I: IntoIterator<Item = StatsResult<RawRecord>>,
        L: RateLookup + ?Sized,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(AggregationEvent::RunStarted {
            title_filter: self.opts.title_filter.clone(),
        });

        let mut acc = PostingAccumulator::new(self.opts.title_filter.as_str());
        for record in records {
            let record = record?;
            self.metrics.on_record();
            match normalize(&record, &self.opts.columns, rates) {
                Ok(Normalization::Posting(posting)) => {
                    let matched = acc.observe(&posting);
                    self.metrics.on_posting(matched);
                }
                Ok(Normalization::Dropped(reason)) => {
                    self.metrics.on_drop(reason);
                    self.emit(AggregationEvent::RecordDropped {
                        row: record.row,
                        reason,
                    });
                }
                Err(e) => {
                    if let StatsError::DateParse { row, .. } = &e {
                        self.emit(AggregationEvent::RunAborted { row: *row });
                    }
                    return Err(e);
                }
            }
        }

        let (years, locations) = acc.finish();
        let ranking = rank_locations(
            locations.salary,
            &locations.occurrences,
            locations.total,
            &self.opts.ranking(),
        );
        let out = StatisticsResult::assemble(years, ranking);

        self.metrics.end_run(start.elapsed());
        self.emit(AggregationEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
        Ok(out)
    }

    /// Aggregate already-materialized records.
    pub fn run_records<I, L>(&self, records: I, rates: &L) -> StatsResult<StatisticsResult>
    where
        I: IntoIterator<Item = RawRecord>,
        L: RateLookup + ?Sized,
    {
        self.run(records.into_iter().map(Ok), rates)
    }

    fn emit(&self, event: AggregationEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregationEngine, AggregationEvent, AggregationObserver, AggregationOptions};
    use std::sync::{Arc, Mutex};

    use crate::error::StatsError;
    use crate::processing::DropReason;
    use crate::rates::RateTable;
    use crate::types::RawRecord;

    fn vacancy(name: &str, from: &str, to: &str, currency: &str, area: &str, date: &str) -> RawRecord {
        RawRecord::new(
            0,
            [
                ("name", name),
                ("salary_from", from),
                ("salary_to", to),
                ("salary_currency", currency),
                ("area_name", area),
                ("published_at", date),
            ],
        )
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<AggregationEvent>>,
    }

    impl AggregationObserver for RecordingObserver {
        fn on_event(&self, event: &AggregationEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn single_matching_posting() {
        let engine = AggregationEngine::new(AggregationOptions::for_title("Разработчик"));
        let stats = engine
            .run_records(
                [vacancy("Разработчик", "50000", "100000", "RUR", "Москва", "2007-12-03T17:34:36+0300")],
                &RateTable::default(),
            )
            .unwrap();

        assert_eq!(stats.salary_by_year()[&2007], 75_000);
        assert_eq!(stats.count_by_year()[&2007], 1);
        assert_eq!(stats.salary_by_year_filtered()[&2007], 75_000);
        assert_eq!(stats.count_by_year_filtered()[&2007], 1);
        assert_eq!(stats.salary_by_location()["Москва"], 75_000);
        assert_eq!(stats.share_by_location()["Москва"], 1.0);
    }

    #[test]
    fn unknown_currency_contributes_nothing() {
        let engine = AggregationEngine::new(AggregationOptions::for_title("Dev"));
        let metrics = engine.metrics();
        let stats = engine
            .run_records(
                [
                    vacancy("Dev", "10", "20", "XYZ", "Nowhere", "2001-01-01"),
                    vacancy("Dev", "10", "20", "RUR", "Москва", "2002-01-01"),
                ],
                &RateTable::default(),
            )
            .unwrap();

        assert_eq!(stats.count_by_year().len(), 1);
        assert!(!stats.count_by_year().contains_key(&2001));
        assert!(!stats.share_by_location().contains_key("Nowhere"));
        assert!(!stats.salary_by_location().contains_key("Nowhere"));

        let snap = metrics.snapshot();
        assert_eq!(snap.records_seen, 2);
        assert_eq!(snap.postings, 1);
        assert_eq!(snap.currency_drops, 1);
        assert_eq!(snap.title_matches, 1);
        assert_eq!(snap.run_id, 1);
    }

    #[test]
    fn empty_date_aborts_the_run() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = AggregationEngine::new(AggregationOptions::default()).with_observer(observer.clone());
        let mut bad = vacancy("Dev", "10", "20", "RUR", "Москва", "");
        bad.row = 7;

        let err = engine
            .run_records(
                [vacancy("Dev", "10", "20", "RUR", "Москва", "2002-01-01"), bad],
                &RateTable::default(),
            )
            .unwrap_err();
        assert!(matches!(err, StatsError::DateParse { row: 7, .. }));

        let events = observer.events.lock().unwrap();
        assert!(matches!(events.last(), Some(AggregationEvent::RunAborted { row: 7 })));
        assert!(!events.iter().any(|e| matches!(e, AggregationEvent::RunFinished { .. })));
    }

    #[test]
    fn read_errors_propagate() {
        let engine = AggregationEngine::new(AggregationOptions::default());
        let records = vec![Err(StatsError::SchemaMismatch {
            message: "boom".to_string(),
        })];
        let err = engine.run(records, &RateTable::default()).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn no_title_match_zero_fills_every_year() {
        let engine = AggregationEngine::new(AggregationOptions::for_title("Аналитик"));
        let stats = engine
            .run_records(
                [
                    vacancy("Программист", "100", "200", "RUR", "Москва", "2010-01-01"),
                    vacancy("Программист", "300", "", "RUR", "Омск", "2011-01-01"),
                ],
                &RateTable::default(),
            )
            .unwrap();

        for year in stats.count_by_year().keys() {
            assert_eq!(stats.count_by_year_filtered()[year], 0);
            assert_eq!(stats.salary_by_year_filtered()[year], 0);
        }
        assert_eq!(stats.count_by_year_filtered().len(), 2);
    }

    #[test]
    fn drops_are_reported_to_observer() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = AggregationEngine::new(AggregationOptions::default()).with_observer(observer.clone());
        engine
            .run_records(
                [
                    vacancy("Dev", "", "", "RUR", "Москва", "2002-01-01"),
                    vacancy("Dev", "1", "2", "???", "Москва", "2002-01-01"),
                ],
                &RateTable::default(),
            )
            .unwrap();

        let events = observer.events.lock().unwrap();
        let reasons: Vec<DropReason> = events
            .iter()
            .filter_map(|e| match e {
                AggregationEvent::RecordDropped { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons, vec![DropReason::MissingSalary, DropReason::UnknownCurrency]);
        assert!(matches!(events.first(), Some(AggregationEvent::RunStarted { .. })));
        assert!(matches!(events.last(), Some(AggregationEvent::RunFinished { .. })));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let rows: Vec<RawRecord> = (0..50)
            .map(|i| {
                vacancy(
                    if i % 3 == 0 { "Senior Dev" } else { "QA" },
                    &format!("{}", 1000 + i * 37),
                    &format!("{}", 2000 + i * 11),
                    if i % 4 == 0 { "USD" } else { "RUR" },
                    &format!("City{}", i % 7),
                    &format!("{}-05-01", 2015 + i % 5),
                )
            })
            .collect();
        let engine = AggregationEngine::new(AggregationOptions::for_title("Dev"));
        let first = engine.run_records(rows.clone(), &RateTable::default()).unwrap();
        let second = engine.run_records(rows, &RateTable::default()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.share_by_location().iter().collect::<Vec<_>>(),
            second.share_by_location().iter().collect::<Vec<_>>()
        );
        assert_eq!(first.to_string(), second.to_string());
    }
}
