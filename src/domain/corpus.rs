// ============================================================
// Layer 3 — Corpus and Label Map
// ============================================================
// A Corpus is an ordered list of cleaned records that share one
// LabelMap. It is only ever narrowed by filtering, and each
// filter produces a new Corpus value.
//
// The LabelMap is built in two passes: collect the distinct
// category names, sort them, then hand out indices 0..n. The
// result depends only on the set of categories, never on the
// order rows arrive in.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::PrepError;
use crate::domain::record::Record;

// ─── LabelMap ─────────────────────────────────────────────────────────────────
/// Bijective mapping between dense labels `0..n` and category names.
///
/// Serialised as a JSON object keyed by label: `{"0": "Business", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "BTreeMap<u32, String>", try_from = "BTreeMap<u32, String>")]
pub struct LabelMap {
    /// Index is the label
    categories: Vec<String>,
}

impl LabelMap {
    /// Build the mapping from any collection of category names.
    /// Duplicates are collapsed; labels follow lexicographic order.
    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = categories.into_iter().collect();
        Self {
            categories: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn label_of(&self, category: &str) -> Option<u32> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
            .map(|i| i as u32)
    }

    pub fn category(&self, label: u32) -> Option<&str> {
        self.categories.get(label as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// `(label, category)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (i as u32, c.as_str()))
    }
}

impl From<LabelMap> for BTreeMap<u32, String> {
    fn from(map: LabelMap) -> Self {
        map.categories
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as u32, c))
            .collect()
    }
}

impl TryFrom<BTreeMap<u32, String>> for LabelMap {
    type Error = PrepError;

    /// Rejects gaps in the label range and duplicated categories,
    /// either of which would break the bijection.
    fn try_from(raw: BTreeMap<u32, String>) -> Result<Self, Self::Error> {
        for (expected, label) in raw.keys().enumerate() {
            if *label != expected as u32 {
                return Err(PrepError::Config(format!(
                    "label map is not contiguous: expected label {expected}, found {label}"
                )));
            }
        }
        let categories: Vec<String> = raw.into_values().collect();
        let mut sorted = categories.clone();
        sorted.sort();
        sorted.dedup();
        if sorted != categories {
            return Err(PrepError::Config(
                "label map categories must be distinct and in sorted label order".to_string(),
            ));
        }
        Ok(Self { categories })
    }
}

// ─── TokenBand ────────────────────────────────────────────────────────────────
/// Inclusive `[min, max]` range of admissible article token lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBand {
    pub min: usize,
    pub max: usize,
}

impl TokenBand {
    pub fn new(min: usize, max: usize) -> Result<Self, PrepError> {
        if min > max {
            return Err(PrepError::Config(format!(
                "min_token ({min}) must not exceed max_token ({max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, tokens: usize) -> bool {
        (self.min..=self.max).contains(&tokens)
    }
}

impl Default for TokenBand {
    fn default() -> Self {
        Self { min: 20, max: 250 }
    }
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
/// Cleaned records sharing one label mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<Record>,
    label_map: LabelMap,
}

impl Corpus {
    pub fn new(records: Vec<Record>, label_map: LabelMap) -> Self {
        Self { records, label_map }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_map
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_sorted_category_order() {
        let map = LabelMap::from_categories(["World", "Business", "Sports", "Business"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.label_of("Business"), Some(0));
        assert_eq!(map.label_of("Sports"), Some(1));
        assert_eq!(map.label_of("World"), Some(2));
        assert_eq!(map.category(1), Some("Sports"));
        assert_eq!(map.label_of("Health"), None);
    }

    #[test]
    fn test_labels_do_not_depend_on_arrival_order() {
        let a = LabelMap::from_categories(["b", "a", "c"]);
        let b = LabelMap::from_categories(["c", "b", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_label_map_json_roundtrip_uses_label_keys() {
        let map = LabelMap::from_categories(["Sci/Tech", "Business"]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0":"Business","1":"Sci/Tech"}"#);
        let back: LabelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_label_map_rejects_gaps() {
        let err = serde_json::from_str::<LabelMap>(r#"{"0":"a","2":"b"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_label_map_rejects_duplicates() {
        let err = serde_json::from_str::<LabelMap>(r#"{"0":"a","1":"a"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_token_band_is_inclusive() {
        let band = TokenBand::new(20, 250).unwrap();
        assert!(band.contains(20));
        assert!(band.contains(250));
        assert!(!band.contains(19));
        assert!(!band.contains(251));
        assert!(TokenBand::new(10, 5).is_err());
    }
}
