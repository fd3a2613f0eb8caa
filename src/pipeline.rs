//! End-to-end request: input path or glob pattern + title → [`StatisticsResult`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::{AggregationEngine, AggregationObserver, AggregationOptions};
use crate::error::StatsResult;
use crate::ingestion::{open_records, IngestionOptions};
use crate::rates::RateTable;
use crate::statistics::StatisticsResult;

/// A fully described statistics run.
#[derive(Clone)]
pub struct StatisticsRequest {
    /// Input file or glob pattern.
    pub input: PathBuf,
    /// Title filter, thresholds and column names.
    pub aggregation: AggregationOptions,
    /// Format override and ingestion observers.
    pub ingestion: IngestionOptions,
    /// Currency conversion table.
    pub rates: RateTable,
    /// Optional observer for engine events.
    pub aggregation_observer: Option<Arc<dyn AggregationObserver>>,
}

impl fmt::Debug for StatisticsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatisticsRequest")
            .field("input", &self.input)
            .field("aggregation", &self.aggregation)
            .field("ingestion", &self.ingestion)
            .field("rates_len", &self.rates.len())
            .field("aggregation_observer_set", &self.aggregation_observer.is_some())
            .finish()
    }
}

impl StatisticsRequest {
    /// A request with default options, rates and no observers.
    pub fn new(input: impl AsRef<Path>, title_filter: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            aggregation: AggregationOptions::for_title(title_filter),
            ingestion: IngestionOptions::default(),
            rates: RateTable::default(),
            aggregation_observer: None,
        }
    }

    /// Read the input and aggregate it in one pass.
    pub fn run(&self) -> StatsResult<StatisticsResult> {
        let records = open_records(&self.input, &self.aggregation.columns, &self.ingestion)?;
        let mut engine = AggregationEngine::new(self.aggregation.clone());
        if let Some(obs) = &self.aggregation_observer {
            engine = engine.with_observer(Arc::clone(obs));
        }
        engine.run(records, &self.rates)
    }
}

/// Shorthand for [`StatisticsRequest::new`] followed by [`StatisticsRequest::run`].
///
/// ```no_run
/// # fn main() -> Result<(), vacancy_stats::StatsError> {
/// let stats = vacancy_stats::pipeline::statistics_from_path("vacancies.csv", "Аналитик")?;
/// for (year, salary) in stats.salary_by_year() {
///     println!("{year}: {salary}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn statistics_from_path(
    input: impl AsRef<Path>,
    title_filter: impl Into<String>,
) -> StatsResult<StatisticsResult> {
    StatisticsRequest::new(input, title_filter).run()
}
