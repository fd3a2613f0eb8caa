//! Grouped accumulation: key → bucket maps that only ever grow.

use std::hash::Hash;

use indexmap::map::Entry;
use indexmap::IndexMap;

/// A per-key running value that can absorb another value of the same shape.
///
/// Lists concatenate; counters add. [`increment`] is written once against this trait and works for
/// both shapes.
pub trait Bucket {
    /// Merge `other` into `self`.
    fn absorb(&mut self, other: Self);
}

impl<T> Bucket for Vec<T> {
    fn absorb(&mut self, mut other: Self) {
        self.append(&mut other);
    }
}

macro_rules! numeric_bucket {
    ($($t:ty),*) => {
        $(
            impl Bucket for $t {
                fn absorb(&mut self, other: Self) {
                    *self += other;
                }
            }
        )*
    };
}

numeric_bucket!(usize, u32, u64, i64, f64);

/// Add `value` to the bucket under `key`, inserting it as the bucket if `key` is new.
///
/// New keys are appended, so iteration follows first-encounter order.
pub fn increment<K, B>(groups: &mut IndexMap<K, B>, key: K, value: B)
where
    K: Hash + Eq,
    B: Bucket,
{
    match groups.entry(key) {
        Entry::Occupied(mut e) => e.get_mut().absorb(value),
        Entry::Vacant(e) => {
            e.insert(value);
        }
    }
}

/// Replace every list with the truncated (not rounded) integer mean of its values.
///
/// Empty lists average to `0`.
pub fn average<K>(groups: &IndexMap<K, Vec<f64>>) -> IndexMap<K, i64>
where
    K: Hash + Eq + Clone,
{
    groups
        .iter()
        .map(|(key, values)| (key.clone(), truncated_mean(values)))
        .collect()
}

fn truncated_mean(values: &[f64]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: f64 = values.iter().sum();
    (sum / values.len() as f64).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::{average, increment};
    use indexmap::IndexMap;

    #[test]
    fn increment_adds_to_existing_and_inserts_new() {
        let mut groups: IndexMap<i32, usize> = IndexMap::from([(1, 2), (2, 3)]);
        increment(&mut groups, 2, 3);
        increment(&mut groups, 100, 3);
        assert_eq!(groups[&2], 6);
        assert_eq!(groups[&100], 3);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, 2, 100]);
    }

    #[test]
    fn increment_concatenates_lists() {
        let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
        increment(&mut groups, "Москва".to_string(), vec![1.0]);
        increment(&mut groups, "Москва".to_string(), vec![2.0, 3.0]);
        assert_eq!(groups["Москва"], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn increment_order_does_not_change_totals() {
        let values = [5_u64, 7, 11, 13];

        let mut forward: IndexMap<&str, u64> = IndexMap::new();
        for v in values {
            increment(&mut forward, "k", v);
        }
        let mut backward: IndexMap<&str, u64> = IndexMap::new();
        for v in values.iter().rev() {
            increment(&mut backward, "k", *v);
        }
        let mut once: IndexMap<&str, u64> = IndexMap::new();
        increment(&mut once, "k", values.iter().sum());

        assert_eq!(forward, once);
        assert_eq!(backward, once);

        let mut lists_a: IndexMap<&str, Vec<f64>> = IndexMap::new();
        increment(&mut lists_a, "k", vec![1.0]);
        increment(&mut lists_a, "k", vec![2.0]);
        let mut lists_b: IndexMap<&str, Vec<f64>> = IndexMap::new();
        increment(&mut lists_b, "k", vec![2.0]);
        increment(&mut lists_b, "k", vec![1.0]);
        let mut a = lists_a["k"].clone();
        let mut b = lists_b["k"].clone();
        a.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        assert_eq!(a, b);
    }

    #[test]
    fn average_truncates_toward_zero() {
        let groups: IndexMap<i32, Vec<f64>> =
            IndexMap::from([(1, vec![2.0, 5.0]), (2, vec![3.0, 6.0]), (3, vec![0.9])]);
        let avg = average(&groups);
        assert_eq!(avg, IndexMap::from([(1, 3), (2, 4), (3, 0)]));
    }

    #[test]
    fn average_of_zero_fill_is_zero() {
        let groups: IndexMap<i32, Vec<f64>> = IndexMap::from([(2007, vec![0.0])]);
        assert_eq!(average(&groups)[&2007], 0);
    }
}
