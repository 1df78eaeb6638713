use std::collections::BTreeMap;

use serde::Deserialize;

/// Country labels from the event table mapped to boundary feature names.
///
/// Labels without an entry fall back to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct DisplayNames {
    by_label: BTreeMap<String, String>,
}

const BUILTIN: [(&str, &str); 20] = [
    ("United States of America", "United States of America"),
    ("China", "China"),
    ("India", "India"),
    ("Indonesia", "Indonesia"),
    ("Philippines", "Philippines"),
    ("Japan", "Japan"),
    ("Mexico", "Mexico"),
    ("Brazil", "Brazil"),
    ("Turkey", "Turkey"),
    ("Chile", "Chile"),
    ("Canada", "Canada"),
    ("Australia", "Australia"),
    ("France", "France"),
    ("Germany", "Germany"),
    ("Italy", "Italy"),
    ("Spain", "Spain"),
    ("Greece", "Greece"),
    ("Nigeria", "Nigeria"),
    ("Bangladesh", "Bangladesh"),
    ("South Africa", "South Africa"),
];

impl DisplayNames {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN)
    }

    pub fn from_pairs<L: Into<String>, D: Into<String>>(
        pairs: impl IntoIterator<Item = (L, D)>,
    ) -> Self {
        Self {
            by_label: pairs
                .into_iter()
                .map(|(l, d)| (l.into(), d.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn display_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.by_label.get(label).map(String::as_str).unwrap_or(label)
    }

    /// Reverse lookup used when a boundary feature is picked on the map.
    pub fn label_for<'a>(&'a self, display_name: &'a str) -> &'a str {
        self.by_label
            .iter()
            .find(|(_, d)| d.as_str() == display_name)
            .map(|(l, _)| l.as_str())
            .unwrap_or(display_name)
    }
}
