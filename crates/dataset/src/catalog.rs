use std::collections::BTreeSet;

use crate::record::EventRecord;

/// Distinct countries and disaster types present in the loaded records,
/// in ascending order. Seeds the filter checkbox lists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    pub countries: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

impl Catalog {
    pub fn from_records(records: &[EventRecord]) -> Self {
        let mut out = Self::default();
        for r in records {
            if !out.countries.contains(&r.country) {
                out.countries.insert(r.country.clone());
            }
            if !out.types.contains(&r.disaster_type) {
                out.types.insert(r.disaster_type.clone());
            }
        }
        out
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn country_labels(&self) -> Vec<String> {
        self.countries.iter().cloned().collect()
    }

    pub fn type_labels(&self) -> Vec<String> {
        self.types.iter().cloned().collect()
    }
}
