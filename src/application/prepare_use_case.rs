// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// The whole pipeline in one run, raw CSV to partitions:
//
//   Step 1: Validate both configs         (Layer 4 - data)
//   Step 2: Clean the raw CSV             (CleanUseCase)
//   Step 3: Split the cleaned corpus      (Layer 4 - data)
//   Step 4: Stage corpus, label map,
//           partitions, report and run
//           config, then commit           (Layer 5 - infra)
//
// Nothing is written before the split has succeeded, so a failed
// run leaves the artifacts of an earlier run in output_dir intact.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::clean_use_case::{CleanRunConfig, CleanUseCase};
use crate::application::split_use_case::stage_split;
use crate::data::cleaner::CleanConfig;
use crate::data::splitter::{Partitioner, SplitConfig, SplitOutcome};
use crate::infra::corpus_store::CorpusStore;

pub const PREPARE_CONFIG_FILE: &str = "prepare_config.json";

/// Configuration for an end-to-end run.
///
/// Serialisable so the exact settings behind a set of partitions
/// are kept next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    pub input: String,
    pub output_dir: String,
    pub tokenizer: Option<String>,
    pub clean: CleanConfig,
    pub split: SplitConfig,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input: "data/newsspace200.csv".to_string(),
            output_dir: "data".to_string(),
            tokenizer: None,
            clean: CleanConfig::default(),
            split: SplitConfig::default(),
        }
    }
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SplitOutcome> {
        let cfg = &self.config;

        // ── Step 1: fail on bad settings before touching any data ────────────
        cfg.clean.validate()?;
        let partitioner = Partitioner::new(cfg.split.clone())?;

        // ── Step 2: clean ────────────────────────────────────────────────────
        let cleaner = CleanUseCase::new(CleanRunConfig {
            input: cfg.input.clone(),
            output_dir: cfg.output_dir.clone(),
            tokenizer: cfg.tokenizer.clone(),
            clean: cfg.clean.clone(),
        });
        let corpus = cleaner.clean()?;

        // ── Step 3: split ────────────────────────────────────────────────────
        let outcome = partitioner
            .split(&corpus)
            .context("Cannot partition the corpus")?;

        // ── Step 4: write everything or nothing ──────────────────────────────
        let store = CorpusStore::new(&cfg.output_dir)
            .with_context(|| format!("Cannot create output directory '{}'", cfg.output_dir))?;
        let mut batch = store.batch();
        batch.corpus(&corpus).context("Cannot save cleaned corpus")?;
        stage_split(&mut batch, &outcome, corpus.label_map())?;
        batch.config(PREPARE_CONFIG_FILE, cfg)?;
        batch.commit().context("Cannot move artifacts into place")?;
        Ok(outcome)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::splitter::Partition;
    use crate::domain::corpus::TokenBand;
    use crate::infra::corpus_store::{load_corpus, load_label_map, partition_file, LABEL_MAP_FILE};
    use crate::domain::error::PrepError;
    use std::collections::{BTreeMap, HashSet};
    use std::fs;
    use std::path::Path;

    /// Raw CSV with `n` rows for each category; descriptions grow
    /// with the row index so some fall outside a token band.
    fn write_raw(dir: &Path, sizes: &[(&str, usize)]) -> String {
        let mut csv = String::from("source,title,description,category\n");
        for (category, n) in sizes {
            for i in 0..*n {
                let words = 15 + i % 10;
                let description = vec!["word"; words].join(" ");
                csv.push_str(&format!("wire,{category} headline {i},{description},{category}\n"));
            }
        }
        let path = dir.join("raw.csv");
        fs::write(&path, csv).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Every file in `dir` with its contents.
    fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (e.file_name().to_string_lossy().into_owned(), fs::read(e.path()).unwrap())
            })
            .collect()
    }

    fn config(dir: &Path, seed: u64) -> PrepareConfig {
        PrepareConfig {
            input: write_raw(dir, &[("Business", 1200), ("World", 1500), ("Health", 8)]),
            output_dir: dir.join(format!("out-{seed}")).to_string_lossy().into_owned(),
            tokenizer: None,
            clean: CleanConfig {
                min_category_count: 5,
                ..CleanConfig::default()
            },
            split: SplitConfig {
                seed,
                token_band: Some(TokenBand::new(20, 250).unwrap()),
                ..SplitConfig::default()
            },
        }
    }

    #[test]
    fn test_end_to_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 42);
        let outcome = PrepareUseCase::new(cfg.clone()).execute().unwrap();

        let out = Path::new(&cfg.output_dir);
        let map = load_label_map(&out.join(LABEL_MAP_FILE)).unwrap();
        // Health survives the category floor but not the minority prune
        assert_eq!(map.len(), 3);
        assert_eq!(outcome.pruned, vec![map.label_of("Health").unwrap()]);

        let mut ids = HashSet::new();
        for p in Partition::ALL {
            let path = out.join(partition_file(p));
            let part = load_corpus(&path, map.clone(), cfg.clean.max_title_tokens).unwrap();
            for r in part.records() {
                assert!(ids.insert(r.id));
                assert!((20..=250).contains(&r.article_token_length));
                assert_ne!(r.category, "Health");
            }
        }
        assert!(out.join(PREPARE_CONFIG_FILE).exists());
    }

    #[test]
    fn test_same_seed_gives_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = config(dir.path(), 7);
        PrepareUseCase::new(a.clone()).execute().unwrap();
        let b = PrepareConfig {
            output_dir: dir.path().join("again").to_string_lossy().into_owned(),
            ..a.clone()
        };
        PrepareUseCase::new(b.clone()).execute().unwrap();

        for p in Partition::ALL {
            let name = partition_file(p);
            let left = fs::read(Path::new(&a.output_dir).join(&name)).unwrap();
            let right = fs::read(Path::new(&b.output_dir).join(&name)).unwrap();
            assert_eq!(left, right, "{name} differs between runs");
        }
    }

    #[test]
    fn test_invalid_clean_band_fails_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), 1);
        cfg.clean.token_band = Some(TokenBand { min: 50, max: 10 });
        assert!(PrepareUseCase::new(cfg.clone()).execute().is_err());
        assert!(!Path::new(&cfg.output_dir).exists());
    }

    #[test]
    fn test_failed_run_keeps_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let first = config(dir.path(), 3);
        PrepareUseCase::new(first.clone()).execute().unwrap();
        let out = Path::new(&first.output_dir);
        let before = snapshot(out);

        // A new category sorts first and would shift every label;
        // the override makes the split infeasible
        let mut second = PrepareConfig {
            input: write_raw(dir.path(), &[("Aaa", 1300), ("Business", 1200), ("World", 1500)]),
            ..first.clone()
        };
        second.split.quota_overrides.insert("World".to_string(), 10_000);

        let err = PrepareUseCase::new(second).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::InsufficientSamples { .. })
        ));
        assert_eq!(snapshot(out), before);
    }
}
