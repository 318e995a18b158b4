// ============================================================
// Layer 2 — SplitUseCase
// ============================================================
// Cleaned corpus on disk → train / dev / test on disk:
//
//   Step 1: Validate the split config     (Layer 4 - data)
//   Step 2: Load label map + corpus       (Layer 5 - infra)
//   Step 3: Prune, plan, sample, merge    (Layer 4 - data)
//   Step 4: Stage partitions, report and
//           run config, then commit       (Layer 5 - infra)
//
// Nothing in output_dir changes unless Step 3 succeeded for every
// class and every file of Step 4 was written.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::splitter::{Partitioner, SplitConfig, SplitOutcome};
use crate::domain::corpus::LabelMap;
use crate::infra::corpus_store::{load_corpus, load_label_map, ArtifactBatch, CorpusStore};
use crate::infra::report::SplitReport;

pub const SPLIT_CONFIG_FILE: &str = "split_config.json";

/// Everything a `split` run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRunConfig {
    /// Cleaned corpus CSV written by `clean`
    pub input: String,
    pub label_map: String,
    pub output_dir: String,
    /// Title limit the cleaned corpus was produced with
    pub max_title_tokens: usize,
    pub split: SplitConfig,
}

impl Default for SplitRunConfig {
    fn default() -> Self {
        Self {
            input: "data/clean_data.csv".to_string(),
            label_map: "data/label_map.json".to_string(),
            output_dir: "data".to_string(),
            max_title_tokens: 100,
            split: SplitConfig::default(),
        }
    }
}

pub struct SplitUseCase {
    config: SplitRunConfig,
}

impl SplitUseCase {
    pub fn new(config: SplitRunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SplitOutcome> {
        let cfg = &self.config;
        let partitioner = Partitioner::new(cfg.split.clone())?;

        let label_map = load_label_map(Path::new(&cfg.label_map))
            .with_context(|| format!("Cannot read label map '{}'", cfg.label_map))?;
        let corpus = load_corpus(Path::new(&cfg.input), label_map, cfg.max_title_tokens)
            .with_context(|| format!("Cannot read cleaned corpus '{}'", cfg.input))?;

        let outcome = partitioner
            .split(&corpus)
            .context("Cannot partition the corpus")?;

        let store = CorpusStore::new(&cfg.output_dir)
            .with_context(|| format!("Cannot create output directory '{}'", cfg.output_dir))?;
        let mut batch = store.batch();
        stage_split(&mut batch, &outcome, corpus.label_map())?;
        batch.config(SPLIT_CONFIG_FILE, cfg)?;
        batch.commit().context("Cannot move split artifacts into place")?;
        Ok(outcome)
    }
}

/// Stage the partitions and the per-class report of a finished split.
pub fn stage_split(
    batch: &mut ArtifactBatch<'_>,
    outcome: &SplitOutcome,
    label_map: &LabelMap,
) -> Result<()> {
    batch
        .partitions(&outcome.partitions)
        .context("Cannot save partitions")?;
    SplitReport::from_outcome(outcome, label_map)
        .stage(batch)
        .context("Cannot save split report")?;
    Ok(())
}
