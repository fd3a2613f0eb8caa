//! Share computation, threshold filtering and top-N ranking for location groupings.

use std::cmp::Ordering;
use std::hash::Hash;

use indexmap::IndexMap;

/// Thresholds for the ranking stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingOptions {
    /// Locations with a smaller share are discarded.
    pub min_share: f64,
    /// Number of entries kept after sorting.
    pub top_n: usize,
    /// Decimal places shares are rounded to.
    pub share_precision: u32,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            min_share: 0.01,
            top_n: 10,
            share_precision: 4,
        }
    }
}

/// The two ranked location mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRanking {
    /// Location → mean salary, best paid first.
    pub salary_by_location: IndexMap<String, i64>,
    /// Location → share of all postings, largest first.
    pub share_by_location: IndexMap<String, f64>,
}

/// Round to `precision` decimal places, ties to even.
///
/// Rounding is decided on the exact binary value of `value`: `1.0 / 32.0` (exactly `0.03125`)
/// rounds to `0.0312`, while a value that only looks like a tie after scaling rounds toward the
/// side it actually lies on.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    let scaled = value * factor;
    // exact error of the scaling product
    let residual = value.mul_add(factor, -scaled);
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 && residual != 0.0 {
        if residual > 0.0 { scaled.ceil() } else { scaled.floor() }
    } else {
        scaled.round_ties_even()
    };
    rounded / factor
}

/// Each key's fraction of `total`, rounded to `precision` decimals.
///
/// A zero `total` yields an empty map instead of dividing by zero.
pub fn shares<K>(occurrences: &IndexMap<K, usize>, total: usize, precision: u32) -> IndexMap<K, f64>
where
    K: Hash + Eq + Clone,
{
    if total == 0 {
        return IndexMap::new();
    }
    occurrences
        .iter()
        .map(|(key, count)| (key.clone(), round_to(*count as f64 / total as f64, precision)))
        .collect()
}

/// Keep entries whose value is at least `min`.
pub fn retain_at_least<K, V>(mut groups: IndexMap<K, V>, min: V) -> IndexMap<K, V>
where
    V: PartialOrd,
{
    groups.retain(|_, v| *v >= min);
    groups
}

/// Sort by value, largest first, and keep the first `top_n` entries.
///
/// The sort is stable: equal values keep their encounter order.
pub fn top_n_descending<K, V>(mut groups: IndexMap<K, V>, top_n: usize) -> IndexMap<K, V>
where
    V: PartialOrd,
{
    groups.sort_by(|_, a, _, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    groups.truncate(top_n);
    groups
}

/// Keep only entries whose key also appears in `allowed`.
pub fn restrict_to<K, V, W>(mut groups: IndexMap<K, V>, allowed: &IndexMap<K, W>) -> IndexMap<K, V>
where
    K: Hash + Eq,
{
    groups.retain(|k, _| allowed.contains_key(k));
    groups
}

/// Rank locations by share and by salary.
///
/// Shares below `min_share` are dropped, the rest sorted and cut to `top_n`. Salaries are
/// restricted to every location that passed the threshold (before the cut), then ranked by their
/// own value and cut independently, so the two lists may name different locations.
pub fn rank_locations(
    salary_by_location: IndexMap<String, i64>,
    occurrences: &IndexMap<String, usize>,
    total: usize,
    options: &RankingOptions,
) -> LocationRanking {
    let surviving = retain_at_least(
        shares(occurrences, total, options.share_precision),
        options.min_share,
    );

    let salary = top_n_descending(restrict_to(salary_by_location, &surviving), options.top_n);
    let share = top_n_descending(surviving, options.top_n);

    LocationRanking {
        salary_by_location: salary,
        share_by_location: share,
    }
}
