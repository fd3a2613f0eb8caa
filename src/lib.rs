//! `vacancy-stats` turns large, noisy job-posting dumps into salary and posting-share statistics.
//!
//! One pass over the records produces six mappings, packaged in a
//! [`statistics::StatisticsResult`]:
//!
//! - mean salary and posting count by year, over all postings
//! - the same two series restricted to postings whose title contains a given substring
//! - mean salary by location and share of postings by location, both thresholded, ranked
//!   descending and cut to the top N
//!
//! The primary entrypoint is [`pipeline::StatisticsRequest`] (or [`pipeline::statistics_from_path`]),
//! which reads a CSV/JSON file or a glob pattern of files and aggregates it.
//!
//! ## What you can ingest
//!
//! - **CSV**: `.csv`, header in the first row (a UTF-8 BOM is tolerated)
//! - **JSON**: `.json` (array-of-objects) and `.ndjson` (newline-delimited objects)
//!
//! Rows with the wrong number of fields or any empty field are skipped silently before
//! aggregation. Postings in a currency missing from the [`rates::RateTable`], or without any salary
//! bound, are dropped and counted. A publish date whose first four characters are not a year aborts
//! the whole run with [`StatsError::DateParse`].
//!
//! ## Quick example: aggregate a file
//!
//! ```no_run
//! use vacancy_stats::pipeline::StatisticsRequest;
//!
//! # fn main() -> Result<(), vacancy_stats::StatsError> {
//! let mut req = StatisticsRequest::new("by_year/*.csv", "Программист");
//! req.aggregation.top_n = 5;
//! let stats = req.run()?;
//! println!("{stats}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the engine directly
//!
//! The engine accepts any iterator of records, so tests and embedders can skip file ingestion:
//!
//! ```rust
//! use vacancy_stats::engine::{AggregationEngine, AggregationOptions};
//! use vacancy_stats::rates::RateTable;
//! use vacancy_stats::types::RawRecord;
//!
//! let rec = RawRecord::new(
//!     2,
//!     [
//!         ("name", "Data Engineer"),
//!         ("salary_from", "1000"),
//!         ("salary_to", "3000"),
//!         ("salary_currency", "USD"),
//!         ("area_name", "Алматы"),
//!         ("published_at", "2019-04-01T10:00:00+0300"),
//!     ],
//! );
//! let engine = AggregationEngine::new(AggregationOptions::for_title("Engineer"));
//! let stats = engine.run_records([rec], &RateTable::default()).unwrap();
//!
//! assert_eq!(stats.salary_by_year()[&2019], 121_320);
//! assert_eq!(stats.share_by_location()["Алматы"], 1.0);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV/JSON readers, the structural validity gate, glob inputs, observers
//! - [`processing`]: normalize, accumulate/average and rank stages
//! - [`engine`]: the single-pass aggregation driver, its events and metrics
//! - [`statistics`]: the result type and its text rendering
//! - [`rates`]: currency conversion tables
//! - [`types`]: raw records, column names and normalized postings
//! - [`pipeline`]: file-to-result requests
//! - [`error`]: error types used across the crate

pub mod engine;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod rates;
pub mod statistics;
pub mod types;

pub use error::{StatsError, StatsResult};
