use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::record::EventRecord;

/// Inclusive year interval. Always ordered `lo <= hi`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct YearRange {
    lo: i32,
    hi: i32,
}

impl YearRange {
    /// Builds the range from either endpoint order.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.lo && year <= self.hi
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(i32::MIN, i32::MAX)
    }
}

/// Raw user selection. An empty country or type set means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub years: YearRange,
}

impl FilterSelection {
    pub fn matches(&self, record: &EventRecord) -> bool {
        (self.countries.is_empty() || self.countries.contains(&record.country))
            && (self.types.is_empty() || self.types.contains(&record.disaster_type))
            && self.years.contains(record.year)
    }

    /// The selected country when exactly one is selected.
    pub fn single_country(&self) -> Option<&str> {
        if self.countries.len() != 1 {
            return None;
        }
        self.countries.iter().next().map(String::as_str)
    }
}

/// Immutable snapshot of a selection, with axes that select everything
/// collapsed to "no constraint". Reusable across any number of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    countries: Option<BTreeSet<String>>,
    types: Option<BTreeSet<String>>,
    years: YearRange,
}

impl FilterPredicate {
    pub fn matches(&self, record: &EventRecord) -> bool {
        self.countries
            .as_ref()
            .is_none_or(|set| set.contains(&record.country))
            && self
                .types
                .as_ref()
                .is_none_or(|set| set.contains(&record.disaster_type))
            && self.years.contains(record.year)
    }

    pub fn constrains_countries(&self) -> bool {
        self.countries.is_some()
    }

    pub fn constrains_types(&self) -> bool {
        self.types.is_some()
    }
}

/// Current filter selection plus the catalog it is interpreted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    catalog: Catalog,
    selection: FilterSelection,
}

impl FilterState {
    /// Starts with every country and type selected.
    pub fn new(catalog: Catalog, years: YearRange) -> Self {
        let selection = FilterSelection {
            countries: catalog.countries.clone(),
            types: catalog.types.clone(),
            years,
        };
        Self { catalog, selection }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Replaces the country selection. Labels outside the catalog are dropped.
    pub fn set_countries<S: AsRef<str>>(&mut self, labels: impl IntoIterator<Item = S>) {
        self.selection.countries = retain_known(labels, &self.catalog.countries, "country");
    }

    /// Replaces the type selection. Labels outside the catalog are dropped.
    pub fn set_types<S: AsRef<str>>(&mut self, labels: impl IntoIterator<Item = S>) {
        self.selection.types = retain_known(labels, &self.catalog.types, "type");
    }

    pub fn set_year_range(&mut self, lo: i32, hi: i32) {
        self.selection.years = YearRange::new(lo, hi);
    }

    pub fn select_all_countries(&mut self) {
        self.selection.countries = self.catalog.countries.clone();
    }

    pub fn select_all_types(&mut self) {
        self.selection.types = self.catalog.types.clone();
    }

    pub fn select_only_country(&mut self, label: &str) {
        self.set_countries([label]);
    }

    pub fn is_country_global(&self) -> bool {
        axis_is_global(&self.selection.countries, &self.catalog.countries)
    }

    pub fn is_type_global(&self) -> bool {
        axis_is_global(&self.selection.types, &self.catalog.types)
    }

    /// No effective country or type filtering (each axis empty or full).
    pub fn is_global(&self) -> bool {
        self.is_country_global() && self.is_type_global()
    }

    pub fn selected_country_count(&self) -> usize {
        self.selection.countries.len()
    }

    pub fn single_country(&self) -> Option<&str> {
        self.selection.single_country()
    }

    pub fn predicate(&self) -> FilterPredicate {
        FilterPredicate {
            countries: (!self.is_country_global()).then(|| self.selection.countries.clone()),
            types: (!self.is_type_global()).then(|| self.selection.types.clone()),
            years: self.selection.years,
        }
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        self.selection.matches(record)
    }
}

fn axis_is_global(selected: &BTreeSet<String>, catalog: &BTreeSet<String>) -> bool {
    selected.is_empty() || selected == catalog
}

fn retain_known<S: AsRef<str>>(
    labels: impl IntoIterator<Item = S>,
    known: &BTreeSet<String>,
    axis: &str,
) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for label in labels {
        let label = label.as_ref();
        if known.contains(label) {
            out.insert(label.to_string());
        } else {
            debug!(axis, label, "ignoring label outside the catalog");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{FilterState, YearRange};
    use crate::catalog::Catalog;
    use crate::record::EventRecord;
    use foundation::math::LonLat;
    use time::macros::date;

    fn records() -> Vec<EventRecord> {
        let at = LonLat::new(0.0, 0.0);
        vec![
            EventRecord::new(date!(2019 - 05 - 01), "Chile", "Earthquake", at),
            EventRecord::new(date!(2020 - 05 - 01), "Chile", "Flood", at),
            EventRecord::new(date!(2021 - 05 - 01), "Japan", "Storm", at),
            EventRecord::new(date!(2017 - 05 - 01), "Japan", "Flood", at),
        ]
    }

    fn state() -> (Vec<EventRecord>, FilterState) {
        let rs = records();
        let st = FilterState::new(Catalog::from_records(&rs), YearRange::new(2018, 2024));
        (rs, st)
    }

    #[test]
    fn year_range_orders_endpoints() {
        let r = YearRange::new(2024, 2018);
        assert_eq!((r.lo(), r.hi()), (2018, 2024));
        assert!(r.contains(2018) && r.contains(2024));
        assert!(!r.contains(2025));
    }

    #[test]
    fn starts_global_with_everything_selected() {
        let (_, st) = state();
        assert!(st.is_global());
        assert_eq!(st.selected_country_count(), 2);
        assert!(!st.predicate().constrains_countries());
    }

    #[test]
    fn full_and_empty_country_sets_behave_identically() {
        let (rs, mut full) = state();
        full.set_countries(["Chile", "Japan"]);
        let (_, mut empty) = state();
        empty.set_countries(Vec::<String>::new());

        assert!(full.is_global());
        assert!(empty.is_global());
        assert_eq!(full.predicate(), empty.predicate());
        for r in &rs {
            assert_eq!(full.matches(r), empty.matches(r));
            assert_eq!(full.predicate().matches(r), full.matches(r));
        }
    }

    #[test]
    fn scoped_selection_filters_by_every_axis() {
        let (rs, mut st) = state();
        st.set_countries(["Chile"]);
        assert!(!st.is_global());
        assert_eq!(st.single_country(), Some("Chile"));

        let p = st.predicate();
        let kept: Vec<_> = rs.iter().filter(|r| p.matches(r)).map(|r| r.year).collect();
        assert_eq!(kept, vec![2019, 2020]);

        st.set_types(["Flood"]);
        st.set_year_range(2020, 2020);
        let p = st.predicate();
        assert_eq!(rs.iter().filter(|r| p.matches(r)).count(), 1);
    }

    #[test]
    fn year_range_excludes_out_of_bounds_records() {
        let (rs, st) = state();
        let p = st.predicate();
        assert!(!p.matches(&rs[3]));
    }

    #[test]
    fn unknown_labels_are_dropped() {
        let (_, mut st) = state();
        st.set_countries(["Chile", "Atlantis"]);
        assert_eq!(st.selected_country_count(), 1);
    }

    #[test]
    fn reselecting_down_to_one_country_is_single_again() {
        let (_, mut st) = state();
        st.set_countries(["Chile"]);
        st.set_countries(["Chile", "Japan"]);
        assert_eq!(st.single_country(), None);
        st.set_countries(["Japan"]);
        assert_eq!(st.single_country(), Some("Japan"));
        st.select_all_countries();
        assert!(st.is_country_global());
        assert_eq!(st.single_country(), None);
    }
}
