// ============================================================
// Layer 4 — Quota Plan
// ============================================================
// How many rows each class contributes to train, dev and test.
//
//   train  — the same for every class:
//              floor(train_fraction * smallest class size)
//            plus an optional per-class bonus from configuration.
//            Not proportional to class size.
//
//   dev    — proportional to natural class frequency:
//   test       devtest_n = floor(devtest_fraction * total)
//              quota     = floor(devtest_n * count / total)
//            dev and test receive the same quota.
//
// The plan is derived once from the post-prune frequency table
// and never changes during a run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::frequency::ClassFrequencyTable;
use crate::domain::corpus::LabelMap;
use crate::domain::error::PrepError;

/// Absorbs representation error so that e.g. 0.7 * 2000 floors to
/// 1400 rather than 1399.
const FLOOR_EPSILON: f64 = 1e-9;

/// `floor(fraction * n)`, robust to binary rounding of `fraction`.
pub fn floor_fraction(fraction: f64, n: usize) -> usize {
    (fraction * n as f64 + FLOOR_EPSILON).floor() as usize
}

/// Rows one class must supply to each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassQuota {
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl ClassQuota {
    /// Distinct rows the class pool must hold.
    pub fn required(&self) -> usize {
        self.train + self.dev + self.test
    }
}

/// Inputs to quota derivation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuotaPolicy {
    pub train_fraction: f64,
    pub devtest_fraction: f64,
    /// Extra train rows per label, on top of the shared base
    pub train_bonus: BTreeMap<u32, usize>,
}

/// Immutable per-label quotas for one partitioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaPlan {
    base_train: usize,
    devtest_n: usize,
    classes: BTreeMap<u32, ClassQuota>,
}

impl QuotaPlan {
    /// Derive quotas for every class in `table`.
    pub fn derive(table: &ClassFrequencyTable, policy: &QuotaPolicy) -> Result<Self, PrepError> {
        let smallest = table.min_count().ok_or(PrepError::EmptyInput {
            stage: "quota planning",
        })?;
        let total = table.total();

        let base_train = floor_fraction(policy.train_fraction, smallest);
        let devtest_n = floor_fraction(policy.devtest_fraction, total);

        let classes = table
            .iter()
            .map(|(label, freq)| {
                // Integer form of floor(devtest_n * relative_frequency)
                let share = devtest_n * freq.count / total;
                let bonus = policy.train_bonus.get(&label).copied().unwrap_or(0);
                let quota = ClassQuota {
                    train: base_train + bonus,
                    dev: share,
                    test: share,
                };
                (label, quota)
            })
            .collect();

        tracing::debug!(
            "Quota plan: smallest class {}, base train {}, devtest_n {}",
            smallest,
            base_train,
            devtest_n
        );

        Ok(Self {
            base_train,
            devtest_n,
            classes,
        })
    }

    /// A plan with hand-picked quotas.
    #[cfg(test)]
    pub fn from_quotas(
        base_train: usize,
        devtest_n: usize,
        classes: BTreeMap<u32, ClassQuota>,
    ) -> Self {
        Self {
            base_train,
            devtest_n,
            classes,
        }
    }

    /// Train quota shared by every class before bonuses.
    pub fn base_train(&self) -> usize {
        self.base_train
    }

    pub fn devtest_n(&self) -> usize {
        self.devtest_n
    }

    pub fn get(&self, label: u32) -> Option<ClassQuota> {
        self.classes.get(&label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, ClassQuota)> + '_ {
        self.classes.iter().map(|(label, q)| (*label, *q))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Fail on the first class, in ascending label order, whose pool
    /// in `table` cannot cover its quota without replacement.
    pub fn check_feasible(
        &self,
        table: &ClassFrequencyTable,
        label_map: &LabelMap,
    ) -> Result<(), PrepError> {
        for (label, quota) in self.iter() {
            let available = table.count(label);
            let required = quota.required();
            if available < required {
                return Err(PrepError::InsufficientSamples {
                    label,
                    category: label_map.category(label).unwrap_or("<unknown>").to_string(),
                    required,
                    available,
                });
            }
        }
        Ok(())
    }
}
