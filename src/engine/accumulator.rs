use indexmap::IndexMap;

use crate::processing::{average, increment};
use crate::statistics::YearSeries;
use crate::types::NormalizedPosting;

/// Location groupings handed to the ranking stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationTotals {
    /// Location → truncated mean salary.
    pub salary: IndexMap<String, i64>,
    /// Location → number of postings.
    pub occurrences: IndexMap<String, usize>,
    /// Number of postings across all locations.
    pub total: usize,
}

/// Running groupings for one pass. Buckets only grow.
#[derive(Debug, Clone, Default)]
pub struct PostingAccumulator {
    title_filter: String,
    salary: IndexMap<i32, Vec<f64>>,
    count: IndexMap<i32, usize>,
    salary_filtered: IndexMap<i32, Vec<f64>>,
    count_filtered: IndexMap<i32, usize>,
    salary_by_location: IndexMap<String, Vec<f64>>,
    occurrences_by_location: IndexMap<String, usize>,
    total: usize,
}

impl PostingAccumulator {
    /// Create an accumulator whose filtered series keeps titles containing `title_filter`.
    pub fn new(title_filter: impl Into<String>) -> Self {
        Self {
            title_filter: title_filter.into(),
            ..Default::default()
        }
    }

    /// Add one posting to every grouping it belongs to. Returns `true` if its title matched.
    pub fn observe(&mut self, posting: &NormalizedPosting) -> bool {
        increment(&mut self.salary, posting.year, vec![posting.average_salary]);
        increment(&mut self.count, posting.year, 1);

        let matched = posting.title.contains(self.title_filter.as_str());
        if matched {
            increment(&mut self.salary_filtered, posting.year, vec![posting.average_salary]);
            increment(&mut self.count_filtered, posting.year, 1);
        }

        increment(
            &mut self.salary_by_location,
            posting.location.clone(),
            vec![posting.average_salary],
        );
        increment(&mut self.occurrences_by_location, posting.location.clone(), 1);
        self.total += 1;
        matched
    }

    /// Number of postings observed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Average the year groupings.
    ///
    /// The filtered series gets exactly the years of the unfiltered one, in the same order; a year
    /// without a title match is filled with a zero salary and a zero count.
    pub fn finish(mut self) -> (YearSeries, LocationTotals) {
        if self.salary_filtered.is_empty() {
            self.salary_filtered = self.salary.keys().map(|year| (*year, vec![0.0])).collect();
            self.count_filtered = self.count.keys().map(|year| (*year, 0)).collect();
        } else {
            let mut salary_filtered = std::mem::take(&mut self.salary_filtered);
            let mut count_filtered = std::mem::take(&mut self.count_filtered);
            for year in self.salary.keys() {
                let salaries = salary_filtered.swap_remove(year).unwrap_or_else(|| vec![0.0]);
                let count = count_filtered.swap_remove(year).unwrap_or(0);
                self.salary_filtered.insert(*year, salaries);
                self.count_filtered.insert(*year, count);
            }
        }

        let years = YearSeries {
            salary_by_year: average(&self.salary),
            count_by_year: self.count,
            salary_by_year_filtered: average(&self.salary_filtered),
            count_by_year_filtered: self.count_filtered,
        };
        let locations = LocationTotals {
            salary: average(&self.salary_by_location),
            occurrences: self.occurrences_by_location,
            total: self.total,
        };
        (years, locations)
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationTotals, PostingAccumulator};
    use crate::types::NormalizedPosting;

    fn posting(title: &str, salary: f64, location: &str, year: i32) -> NormalizedPosting {
        NormalizedPosting {
            title: title.to_string(),
            salary_low: Some(salary),
            salary_high: Some(salary),
            currency: "RUR".to_string(),
            average_salary: salary,
            location: location.to_string(),
            year,
        }
    }

    #[test]
    fn observe_feeds_all_groupings() {
        let mut acc = PostingAccumulator::new("Аналитик");
        assert!(acc.observe(&posting("Аналитик данных", 100.0, "Москва", 2020)));
        assert!(!acc.observe(&posting("Программист", 51.0, "Москва", 2020)));
        assert!(!acc.observe(&posting("Тестировщик", 10.0, "Омск", 2021)));
        assert_eq!(acc.total(), 3);

        let (years, locations) = acc.finish();
        assert_eq!(locations.total, 3);
        assert_eq!(years.salary_by_year[&2020], 75);
        assert_eq!(years.count_by_year[&2021], 1);
        assert_eq!(years.salary_by_year_filtered[&2020], 100);
        assert_eq!(years.count_by_year_filtered[&2020], 1);
        assert_eq!(years.count_by_year_filtered[&2021], 0);
        assert_eq!(years.salary_by_year_filtered[&2021], 0);
        assert_eq!(locations.salary["Москва"], 75);
        assert_eq!(locations.occurrences["Москва"], 2);
    }

    #[test]
    fn title_match_is_case_sensitive_substring() {
        let mut acc = PostingAccumulator::new("dev");
        assert!(acc.observe(&posting("Senior developer", 1.0, "X", 2020)));
        assert!(!acc.observe(&posting("Developer", 1.0, "X", 2020)));
    }

    #[test]
    fn empty_filtered_series_is_zero_filled_for_every_year() {
        let mut acc = PostingAccumulator::new("Нет такой");
        acc.observe(&posting("Программист", 10.0, "Москва", 2019));
        acc.observe(&posting("Программист", 20.0, "Москва", 2018));

        let (years, _) = acc.finish();
        assert_eq!(
            years.salary_by_year_filtered.into_iter().collect::<Vec<_>>(),
            vec![(2019, 0), (2018, 0)]
        );
        assert_eq!(
            years.count_by_year_filtered.into_iter().collect::<Vec<_>>(),
            vec![(2019, 0), (2018, 0)]
        );
    }

    #[test]
    fn years_without_a_match_are_zero_filled_in_year_order() {
        let mut acc = PostingAccumulator::new("Dev");
        acc.observe(&posting("QA", 40.0, "Омск", 2009));
        acc.observe(&posting("QA", 50.0, "Омск", 2010));
        acc.observe(&posting("Dev", 10.0, "Омск", 2010));
        acc.observe(&posting("Dev", 20.0, "Омск", 2010));
        acc.observe(&posting("QA", 30.0, "Омск", 2011));

        let (years, _) = acc.finish();
        assert_eq!(
            years.salary_by_year_filtered.into_iter().collect::<Vec<_>>(),
            vec![(2009, 0), (2010, 15), (2011, 0)]
        );
        assert_eq!(
            years.count_by_year_filtered.into_iter().collect::<Vec<_>>(),
            vec![(2009, 0), (2010, 2), (2011, 0)]
        );
    }

    #[test]
    fn nothing_observed_yields_empty_series() {
        let (years, locations) = PostingAccumulator::new("x").finish();
        assert!(years.salary_by_year.is_empty());
        assert!(years.salary_by_year_filtered.is_empty());
        assert_eq!(locations, LocationTotals::default());
    }
}
