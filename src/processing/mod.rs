//! The separately testable stages of a statistics run.
//!
//! [`crate::engine::AggregationEngine`] chains them in one pass:
//!
//! - [`normalize()`]: raw record → posting (or a silent drop, or a fatal date error)
//! - [`increment()`] / [`average()`]: grouped accumulation and truncated means
//! - [`rank_locations()`]: share threshold, stable descending sort, top-N cut
//!
//! ## Example: normalize → accumulate → average
//!
//! ```rust
//! use indexmap::IndexMap;
//! use vacancy_stats::processing::{average, increment, normalize, Normalization};
//! use vacancy_stats::rates::RateTable;
//! use vacancy_stats::types::{PostingColumns, RawRecord};
//!
//! let rec = RawRecord::new(
//!     2,
//!     [
//!         ("name", "Разработчик"),
//!         ("salary_from", "50000"),
//!         ("salary_to", "100000"),
//!         ("salary_currency", "RUR"),
//!         ("area_name", "Москва"),
//!         ("published_at", "2007-12-03T17:34:36+0300"),
//!     ],
//! );
//!
//! let mut salary: IndexMap<i32, Vec<f64>> = IndexMap::new();
//! if let Normalization::Posting(p) =
//!     normalize(&rec, &PostingColumns::default(), &RateTable::default()).unwrap()
//! {
//!     increment(&mut salary, p.year, vec![p.average_salary]);
//! }
//! assert_eq!(average(&salary)[&2007], 75_000);
//! ```

pub mod accumulate;
pub mod normalize;
pub mod rank;

pub use accumulate::{average, increment, Bucket};
pub use normalize::{normalize, parse_year, DropReason, Normalization};
pub use rank::{rank_locations, LocationRanking, RankingOptions};
