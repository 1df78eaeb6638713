//! Grouped reductions over filtered records.
//!
//! A rollup groups records by a key extractor and reduces each group with a
//! typed [`Reducer`]. Groups keep the order in which their key was first
//! seen; ranking sorts them by value, descending and stable, so ties keep
//! that order.

use std::collections::BTreeMap;

use dataset::EventRecord;
use foundation::math::descending_cmp_f64;
use layers::symbology::ScaleDomain;
use serde::Serialize;

use super::statistics::Statistics;

/// Value a rollup can be ranked by.
pub trait Rank {
    fn rank(&self) -> f64;
}

impl Rank for usize {
    fn rank(&self) -> f64 {
        *self as f64
    }
}

impl Rank for f64 {
    fn rank(&self) -> f64 {
        *self
    }
}

impl Rank for Option<f64> {
    fn rank(&self) -> f64 {
        self.unwrap_or(f64::NAN)
    }
}

pub trait Reducer {
    type Output: Rank;
    fn reduce(&self, group: &[&EventRecord]) -> Self::Output;
}

/// Number of records in the group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl Reducer for Count {
    type Output = usize;

    fn reduce(&self, group: &[&EventRecord]) -> usize {
        group.len()
    }
}

/// Sum of a measure; missing values contribute nothing.
#[derive(Debug, Clone, Copy)]
pub struct Sum<F> {
    measure: F,
}

impl<F: Fn(&EventRecord) -> f64> Sum<F> {
    pub fn of(measure: F) -> Self {
        Self { measure }
    }
}

impl<F: Fn(&EventRecord) -> f64> Reducer for Sum<F> {
    type Output = f64;

    fn reduce(&self, group: &[&EventRecord]) -> f64 {
        Statistics::sum(group.iter().map(|r| (self.measure)(r)))
    }
}

/// Mean of a measure; `None` when no member has a value.
#[derive(Debug, Clone, Copy)]
pub struct Mean<F> {
    measure: F,
}

impl<F: Fn(&EventRecord) -> f64> Mean<F> {
    pub fn of(measure: F) -> Self {
        Self { measure }
    }
}

impl<F: Fn(&EventRecord) -> f64> Reducer for Mean<F> {
    type Output = Option<f64>;

    fn reduce(&self, group: &[&EventRecord]) -> Option<f64> {
        Statistics::mean(group.iter().map(|r| (self.measure)(r)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// Ranked rollup, or the explicit empty state when there was nothing to group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Rollup<K, V> {
    NoData,
    Ranked(Vec<RollupEntry<K, V>>),
}

impl<K, V: Rank> Rollup<K, V> {
    pub fn entries(&self) -> &[RollupEntry<K, V>] {
        match self {
            Rollup::NoData => &[],
            Rollup::Ranked(entries) => entries,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Rollup::NoData)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn max_value(&self) -> Option<f64> {
        Statistics::max(self.entries().iter().map(|e| e.value.rank()))
    }

    /// Bar domain `[0, max]`; all-zero or empty rollups get `[0, 1]`.
    pub fn domain(&self) -> ScaleDomain {
        ScaleDomain::up_to(0.0, self.max_value())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries().iter().map(|e| &e.key)
    }
}

/// Group `records` by `key` and reduce each group, in first-seen key order.
pub fn group_by<K, R>(
    records: &[&EventRecord],
    key: impl Fn(&EventRecord) -> K,
    reducer: &R,
) -> Vec<RollupEntry<K, R::Output>>
where
    K: Ord + Clone,
    R: Reducer,
{
    let mut index: BTreeMap<K, usize> = BTreeMap::new();
    let mut groups: Vec<(K, Vec<&EventRecord>)> = Vec::new();
    for &record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| RollupEntry {
            value: reducer.reduce(&members),
            key,
        })
        .collect()
}

/// Sort entries by value, descending; missing values sort last.
pub fn rank<K, V: Rank>(entries: &mut [RollupEntry<K, V>]) {
    entries.sort_by(|a, b| descending_cmp_f64(a.value.rank(), b.value.rank()));
}

/// Group, reduce, rank and keep the first `top_n` entries (`None` keeps all).
pub fn rollup<K, R>(
    records: &[&EventRecord],
    key: impl Fn(&EventRecord) -> K,
    reducer: &R,
    top_n: Option<usize>,
) -> Rollup<K, R::Output>
where
    K: Ord + Clone,
    R: Reducer,
{
    if records.is_empty() {
        return Rollup::NoData;
    }
    let mut entries = group_by(records, key, reducer);
    rank(&mut entries);
    if let Some(n) = top_n {
        entries.truncate(n);
    }
    Rollup::Ranked(entries)
}

pub fn by_country(record: &EventRecord) -> String {
    record.country.clone()
}

pub fn by_type(record: &EventRecord) -> String {
    record.disaster_type.clone()
}

pub fn by_display_name(record: &EventRecord) -> String {
    record.display_name.clone()
}

pub fn by_year(record: &EventRecord) -> i32 {
    record.year
}

#[cfg(test)]
mod tests {
    use super::{Count, Mean, Rollup, RollupEntry, Sum, by_country, by_type, group_by, rollup};
    use dataset::EventRecord;
    use foundation::math::LonLat;
    use pretty_assertions::assert_eq;
    use time::macros::date;

    fn record(country: &str, ty: &str, loss: f64) -> EventRecord {
        let mut r = EventRecord::new(date!(2020 - 01 - 01), country, ty, LonLat::new(0.0, 0.0));
        r.economic_loss = loss;
        r
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let data = [record("B", "x", 1.0), record("A", "x", 2.0), record("B", "y", 3.0)];
        let refs: Vec<&EventRecord> = data.iter().collect();
        let groups = group_by(&refs, by_country, &Count);
        assert_eq!(
            groups,
            vec![
                RollupEntry { key: "B".to_string(), value: 2 },
                RollupEntry { key: "A".to_string(), value: 1 },
            ]
        );
    }

    #[test]
    fn ranked_descending_with_stable_ties_and_truncation() {
        let data = [
            record("A", "x", 5.0),
            record("B", "x", 9.0),
            record("C", "x", 5.0),
            record("D", "x", 1.0),
        ];
        let refs: Vec<&EventRecord> = data.iter().collect();
        let ranked = rollup(&refs, by_country, &Sum::of(|r| r.economic_loss), Some(3));
        let keys: Vec<&String> = ranked.keys().collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        assert_eq!(ranked.max_value(), Some(9.0));
    }

    #[test]
    fn empty_input_is_no_data() {
        let empty: Vec<&EventRecord> = Vec::new();
        let ranked = rollup(&empty, by_type, &Count, Some(5));
        assert_eq!(ranked, Rollup::NoData);
        assert!(ranked.is_no_data());
        assert_eq!(ranked.max_value(), None);
        assert_eq!(ranked.domain().hi, 1.0);
    }

    #[test]
    fn per_key_sums_add_up_to_total() {
        let data = [
            record("A", "x", 5.5),
            record("B", "y", 9.0),
            record("A", "y", f64::NAN),
            record("C", "x", 0.25),
        ];
        let refs: Vec<&EventRecord> = data.iter().collect();
        let ranked = rollup(&refs, by_country, &Sum::of(|r| r.economic_loss), None);
        let per_key: f64 = ranked.entries().iter().map(|e| e.value).sum();
        assert_eq!(per_key, 14.75);
    }

    #[test]
    fn mean_without_values_ranks_last() {
        let data = [record("A", "x", f64::NAN), record("B", "x", 3.0)];
        let refs: Vec<&EventRecord> = data.iter().collect();
        let ranked = rollup(&refs, by_country, &Mean::of(|r| r.economic_loss), None);
        assert_eq!(ranked.entries()[0].key, "B");
        assert_eq!(ranked.entries()[1].value, None);
    }

    #[test]
    fn all_zero_sums_get_a_unit_domain() {
        let data = [record("Chile", "Flood", 0.0), record("Peru", "Storm", 0.0)];
        let refs: Vec<&EventRecord> = data.iter().collect();
        let ranked = rollup(&refs, by_country, &Sum::of(|r| r.economic_loss), None);
        assert_eq!(ranked.max_value(), Some(0.0));
        assert_eq!((ranked.domain().lo, ranked.domain().hi), (0.0, 1.0));
    }
}
