// ============================================================
// Layer 4 — Class Frequency Table
// ============================================================
// Absolute and relative size of every class in a set of records.
// The table describes one specific row set: whenever rows are
// dropped it has to be rebuilt, never patched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::record::Record;

/// Size of a single class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassFrequency {
    pub count: usize,
    /// `count / total`, in `[0, 1]`
    pub relative: f64,
}

/// Per-label frequencies, iterated in ascending label order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassFrequencyTable {
    classes: BTreeMap<u32, ClassFrequency>,
    total: usize,
}

impl ClassFrequencyTable {
    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r Record>) -> Self {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for r in records {
            *counts.entry(r.label).or_insert(0) += 1;
        }
        Self::from_counts(counts)
    }

    pub fn from_counts(counts: BTreeMap<u32, usize>) -> Self {
        let total: usize = counts.values().sum();
        let classes = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| {
                let relative = count as f64 / total as f64;
                (label, ClassFrequency { count, relative })
            })
            .collect();
        Self { classes, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn get(&self, label: u32) -> Option<ClassFrequency> {
        self.classes.get(&label).copied()
    }

    pub fn count(&self, label: u32) -> usize {
        self.get(label).map_or(0, |f| f.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, ClassFrequency)> + '_ {
        self.classes.iter().map(|(label, f)| (*label, *f))
    }

    /// Size of the smallest class.
    pub fn min_count(&self) -> Option<usize> {
        self.classes.values().map(|f| f.count).min()
    }

    /// Labels whose relative frequency is strictly below `threshold`.
    pub fn below(&self, threshold: f64) -> Vec<u32> {
        self.iter()
            .filter(|(_, f)| f.relative < threshold)
            .map(|(label, _)| label)
            .collect()
    }
}
