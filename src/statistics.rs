//! The terminal artifact of a run: [`StatisticsResult`].

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::processing::LocationRanking;

/// Year-keyed mean salaries and counts, all postings and title-matching ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YearSeries {
    /// Year → truncated mean salary.
    pub salary_by_year: IndexMap<i32, i64>,
    /// Year → number of postings.
    pub count_by_year: IndexMap<i32, usize>,
    /// Year → truncated mean salary of title-matching postings.
    pub salary_by_year_filtered: IndexMap<i32, i64>,
    /// Year → number of title-matching postings.
    pub count_by_year_filtered: IndexMap<i32, usize>,
}

/// Six statistics mappings, built once per run and never mutated afterwards.
///
/// Every mapping iterates in a meaningful order: year mappings in first-encounter order, location
/// mappings ranked descending by their own value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsResult {
    salary_by_year: IndexMap<i32, i64>,
    count_by_year: IndexMap<i32, usize>,
    salary_by_year_filtered: IndexMap<i32, i64>,
    count_by_year_filtered: IndexMap<i32, usize>,
    salary_by_location: IndexMap<String, i64>,
    share_by_location: IndexMap<String, f64>,
}

impl StatisticsResult {
    /// Package the year series and the location ranking. No computation happens here.
    pub fn assemble(years: YearSeries, locations: LocationRanking) -> Self {
        Self {
            salary_by_year: years.salary_by_year,
            count_by_year: years.count_by_year,
            salary_by_year_filtered: years.salary_by_year_filtered,
            count_by_year_filtered: years.count_by_year_filtered,
            salary_by_location: locations.salary_by_location,
            share_by_location: locations.share_by_location,
        }
    }

    pub fn salary_by_year(&self) -> &IndexMap<i32, i64> {
        &self.salary_by_year
    }

    pub fn count_by_year(&self) -> &IndexMap<i32, usize> {
        &self.count_by_year
    }

    pub fn salary_by_year_filtered(&self) -> &IndexMap<i32, i64> {
        &self.salary_by_year_filtered
    }

    pub fn count_by_year_filtered(&self) -> &IndexMap<i32, usize> {
        &self.count_by_year_filtered
    }

    pub fn salary_by_location(&self) -> &IndexMap<String, i64> {
        &self.salary_by_location
    }

    pub fn share_by_location(&self) -> &IndexMap<String, f64> {
        &self.share_by_location
    }
}

impl fmt::Display for StatisticsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Salary by year: {}", Braced(&self.salary_by_year))?;
        writeln!(f, "Postings by year: {}", Braced(&self.count_by_year))?;
        writeln!(
            f,
            "Salary by year for selected title: {}",
            Braced(&self.salary_by_year_filtered)
        )?;
        writeln!(
            f,
            "Postings by year for selected title: {}",
            Braced(&self.count_by_year_filtered)
        )?;
        writeln!(
            f,
            "Salary by location (descending): {}",
            Braced(&self.salary_by_location)
        )?;
        write!(
            f,
            "Share of postings by location (descending): {}",
            Braced(&self.share_by_location)
        )
    }
}

/// `{k: v, ...}` rendering with string keys quoted.
struct Braced<'a, K, V>(&'a IndexMap<K, V>);

impl<K: fmt::Debug, V: fmt::Display> fmt::Display for Braced<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k:?}: {v}")?;
        }
        f.write_str("}")
    }
}
