// ============================================================
// Layer 5 — Split Report
// ============================================================
// One CSV row per surviving class describing what the split did:
//
//   label,category,pool,train,dev,test
//   0,Business,31204,20412,2380,2380
//   1,Sci/Tech,29170,20412,2225,2225
//   ...
//
// `pool` is the class size after pruning. The train column is
// identical across rows unless a quota override applies; dev and
// test track the natural class frequency.
//
// Output file: output_dir/split_report.csv

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::splitter::SplitOutcome;
use crate::domain::corpus::LabelMap;
use crate::domain::error::PrepError;
use crate::domain::record::Record;
use crate::infra::corpus_store::ArtifactBatch;

pub const REPORT_FILE: &str = "split_report.csv";

/// Counts for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub label: u32,
    pub category: String,
    pub pool: usize,
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl ClassReport {
    /// Pool rows that ended up in no partition.
    pub fn unused(&self) -> usize {
        self.pool - (self.train + self.dev + self.test)
    }
}

/// Per-class summary of a split, ascending by label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitReport {
    pub classes: Vec<ClassReport>,
}

impl SplitReport {
    /// Summarise `outcome` from the records actually placed.
    pub fn from_outcome(outcome: &SplitOutcome, label_map: &LabelMap) -> Self {
        let classes = outcome
            .frequencies
            .iter()
            .map(|(label, freq)| {
                let placed = |records: &[Record]| {
                    records.iter().filter(|r| r.label == label).count()
                };
                ClassReport {
                    label,
                    category: label_map.category(label).unwrap_or("<unknown>").to_string(),
                    pool: freq.count,
                    train: placed(&outcome.partitions.train),
                    dev: placed(&outcome.partitions.dev),
                    test: placed(&outcome.partitions.test),
                }
            })
            .collect();
        Self { classes }
    }

    /// Stage the report as `split_report.csv` in `batch`.
    pub fn stage(&self, batch: &mut ArtifactBatch<'_>) -> Result<PathBuf, PrepError> {
        let path = batch.write(REPORT_FILE, |p| self.write_csv(p))?;

        for row in &self.classes {
            tracing::debug!(
                "{:>3} {:<20} pool={} train={} dev={} test={} unused={}",
                row.label,
                row.category,
                row.pool,
                row.train,
                row.dev,
                row.test,
                row.unused()
            );
        }
        tracing::info!("Staged split report for '{}'", path.display());
        Ok(path)
    }

    fn write_csv(&self, path: &Path) -> Result<(), PrepError> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.classes {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
