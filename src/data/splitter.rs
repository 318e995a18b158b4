// ============================================================
// Layer 4 — Stratified Partitioner
// ============================================================
// Cuts a cleaned Corpus into disjoint train / dev / test sets
// with a rebalanced class mix:
//
//   0. optional article token band
//   1. class frequency table
//   2. prune classes below `threshold_minority_class`, then
//      rebuild the table on what is left
//   3. + 4. derive the QuotaPlan from the rebuilt table
//   5. per class, draw train + dev + test distinct rows without
//      replacement; the first `train` draws go to train, the
//      next `dev` to dev, the rest to test
//   6. concatenate classes in ascending label order
//
// Every class draws from its own ChaCha8 stream: same seed,
// stream id = label. Classes can therefore be sampled on rayon
// workers in any order and the output stays bit-identical.
//
// Quota feasibility is checked for all classes before the first
// draw, so a failing run never produces half a split.
//
// Reference: rand::seq::index::sample (sampling without replacement)

use std::collections::BTreeMap;

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::frequency::ClassFrequencyTable;
use crate::data::quota::{ClassQuota, QuotaPlan, QuotaPolicy};
use crate::domain::corpus::{Corpus, LabelMap, TokenBand};
use crate::domain::error::PrepError;
use crate::domain::record::Record;

// ─── Configuration ────────────────────────────────────────────────────────────
/// Knobs for one partitioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Classes with a smaller relative frequency are dropped entirely
    pub threshold_minority_class: f64,
    /// Share of the smallest class used as the common train quota
    pub train_fraction: f64,
    /// Share of the corpus reserved for dev, and again for test
    pub devtest_fraction: f64,
    pub seed: u64,
    /// Article length band applied before counting classes
    pub token_band: Option<TokenBand>,
    /// Category name → extra train rows for that class
    pub quota_overrides: BTreeMap<String, usize>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            threshold_minority_class: 0.01,
            train_fraction: 0.7,
            devtest_fraction: 0.15,
            seed: 42,
            token_band: Some(TokenBand::default()),
            quota_overrides: BTreeMap::new(),
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), PrepError> {
        if !(0.0..1.0).contains(&self.threshold_minority_class) {
            return Err(PrepError::Config(format!(
                "threshold_minority_class must be in [0, 1), got {}",
                self.threshold_minority_class
            )));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction <= 1.0) {
            return Err(PrepError::Config(format!(
                "train_fraction must be in (0, 1], got {}",
                self.train_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.devtest_fraction) {
            return Err(PrepError::Config(format!(
                "devtest_fraction must be in [0, 1], got {}",
                self.devtest_fraction
            )));
        }
        if let Some(band) = self.token_band {
            TokenBand::new(band.min, band.max)?;
        }
        Ok(())
    }
}

// ─── Output types ─────────────────────────────────────────────────────────────
/// The three output partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Dev,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Dev, Partition::Test];

    pub fn name(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Dev => "dev",
            Partition::Test => "test",
        }
    }
}

/// Records assigned to each partition, classes in ascending label order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partitions {
    pub train: Vec<Record>,
    pub dev: Vec<Record>,
    pub test: Vec<Record>,
}

impl Partitions {
    pub fn get(&self, partition: Partition) -> &[Record] {
        match partition {
            Partition::Train => &self.train,
            Partition::Dev => &self.dev,
            Partition::Test => &self.test,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Partition, &[Record])> + '_ {
        Partition::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len()
    }
}

/// Everything a successful split produced.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub partitions: Partitions,
    pub plan: QuotaPlan,
    /// Frequencies after pruning; the plan was derived from these
    pub frequencies: ClassFrequencyTable,
    /// Labels removed as underrepresented, ascending
    pub pruned: Vec<u32>,
}

// ─── Partitioner ──────────────────────────────────────────────────────────────
pub struct Partitioner {
    config: SplitConfig,
}

impl Partitioner {
    pub fn new(config: SplitConfig) -> Result<Self, PrepError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split `corpus`; deterministic for a given corpus and config.
    pub fn split(&self, corpus: &Corpus) -> Result<SplitOutcome, PrepError> {
        let cfg = &self.config;
        let label_map = corpus.label_map();

        // ── Step 0: article band ─────────────────────────────────────────────
        let banded: Vec<&Record> = match cfg.token_band {
            Some(band) => {
                let kept: Vec<&Record> = corpus
                    .records()
                    .iter()
                    .filter(|r| band.contains(r.article_token_length))
                    .collect();
                tracing::info!(
                    "Token band [{}, {}] kept {} of {} records",
                    band.min,
                    band.max,
                    kept.len(),
                    corpus.len()
                );
                kept
            }
            None => corpus.records().iter().collect(),
        };
        if banded.is_empty() {
            return Err(PrepError::EmptyInput { stage: "token band" });
        }

        // ── Steps 1–2: frequencies and pruning ───────────────────────────────
        let before = ClassFrequencyTable::from_records(banded.iter().copied());
        let pruned = before.below(cfg.threshold_minority_class);
        for label in &pruned {
            let freq = before.get(*label).map_or(0.0, |f| f.relative);
            tracing::warn!(
                "Pruning label {} ('{}'): relative frequency {:.5} < {}",
                label,
                label_map.category(*label).unwrap_or("<unknown>"),
                freq,
                cfg.threshold_minority_class
            );
        }

        let kept: Vec<&Record> = banded
            .into_iter()
            .filter(|r| pruned.binary_search(&r.label).is_err())
            .collect();
        if kept.is_empty() {
            return Err(PrepError::EmptyInput {
                stage: "minority class prune",
            });
        }
        // Quotas must come from post-prune sizes
        let frequencies = ClassFrequencyTable::from_records(kept.iter().copied());

        // ── Steps 3–4: quota plan ────────────────────────────────────────────
        let policy = self.policy(label_map, &frequencies)?;
        let plan = QuotaPlan::derive(&frequencies, &policy)?;

        // ── Steps 5–6: sampling and merge ────────────────────────────────────
        let partitions = sample_partitions(&kept, &plan, label_map, cfg.seed)?;

        tracing::info!(
            "Split {} classes: {} train, {} dev, {} test ({} records unused)",
            plan.len(),
            partitions.train.len(),
            partitions.dev.len(),
            partitions.test.len(),
            kept.len() - partitions.total()
        );

        Ok(SplitOutcome {
            partitions,
            plan,
            frequencies,
            pruned,
        })
    }

    /// Resolve category-keyed overrides to labels of surviving classes.
    fn policy(
        &self,
        label_map: &LabelMap,
        frequencies: &ClassFrequencyTable,
    ) -> Result<QuotaPolicy, PrepError> {
        let mut train_bonus = BTreeMap::new();
        for (category, extra) in &self.config.quota_overrides {
            let label = label_map.label_of(category).ok_or_else(|| {
                PrepError::Config(format!("quota override names unknown category '{category}'"))
            })?;
            if frequencies.count(label) == 0 {
                tracing::warn!("Ignoring quota override for pruned category '{}'", category);
                continue;
            }
            train_bonus.insert(label, *extra);
        }
        Ok(QuotaPolicy {
            train_fraction: self.config.train_fraction,
            devtest_fraction: self.config.devtest_fraction,
            train_bonus,
        })
    }
}

// ─── Sampling ─────────────────────────────────────────────────────────────────
/// Random stream for one class.
fn class_rng(seed: u64, label: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(label));
    rng
}

/// One class's share of each partition.
struct ClassDraw<'a> {
    train: Vec<&'a Record>,
    dev: Vec<&'a Record>,
    test: Vec<&'a Record>,
}

fn draw_class<'a>(pool: &[&'a Record], quota: ClassQuota, rng: &mut ChaCha8Rng) -> ClassDraw<'a> {
    let drawn = index::sample(rng, pool.len(), quota.required()).into_vec();
    let (train, rest) = drawn.split_at(quota.train);
    let (dev, test) = rest.split_at(quota.dev);
    let pick = |positions: &[usize]| positions.iter().map(|&i| pool[i]).collect::<Vec<_>>();
    ClassDraw {
        train: pick(train),
        dev: pick(dev),
        test: pick(test),
    }
}

/// Apply `plan` to `records` and merge the per-class draws.
///
/// Each class pool keeps the order of `records`. Fails with
/// `InsufficientSamples` before drawing anything if any class is
/// too small for its quota.
pub fn sample_partitions(
    records: &[&Record],
    plan: &QuotaPlan,
    label_map: &LabelMap,
    seed: u64,
) -> Result<Partitions, PrepError> {
    let frequencies = ClassFrequencyTable::from_records(records.iter().copied());
    plan.check_feasible(&frequencies, label_map)?;

    let mut pools: BTreeMap<u32, Vec<&Record>> = BTreeMap::new();
    for r in records {
        pools.entry(r.label).or_default().push(*r);
    }

    let quotas: Vec<(u32, ClassQuota)> = plan.iter().collect();
    let draws: Vec<ClassDraw<'_>> = quotas
        .into_par_iter()
        .map(|(label, quota)| {
            let pool = pools.get(&label).map(Vec::as_slice).unwrap_or(&[]);
            let mut rng = class_rng(seed, label);
            let draw = draw_class(pool, quota, &mut rng);
            tracing::debug!(
                "Label {}: pool {}, drew {} train / {} dev / {} test",
                label,
                pool.len(),
                draw.train.len(),
                draw.dev.len(),
                draw.test.len()
            );
            draw
        })
        .collect();

    let mut out = Partitions::default();
    for draw in draws {
        out.train.extend(draw.train.into_iter().cloned());
        out.dev.extend(draw.dev.into_iter().cloned());
        out.test.extend(draw.test.into_iter().cloned());
    }
    Ok(out)
}
