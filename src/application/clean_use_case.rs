// ============================================================
// Layer 2 — CleanUseCase
// ============================================================
// Raw news CSV → cleaned corpus on disk:
//
//   Step 1: Pick a token counter          (Layer 5 - infra)
//   Step 2: Load and clean the CSV        (Layer 4 - data)
//   Step 3: Stage corpus, label map and
//           run config, then commit       (Layer 5 - infra)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::cleaner::{CleanConfig, Cleaner};
use crate::data::loader::CsvLoader;
use crate::domain::corpus::Corpus;
use crate::infra::corpus_store::CorpusStore;
use crate::infra::tokenizer_store::open_counter;

pub const CLEAN_CONFIG_FILE: &str = "clean_config.json";

/// Everything a `clean` run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRunConfig {
    pub input: String,
    pub output_dir: String,
    /// HuggingFace `tokenizer.json`; whitespace words when absent
    pub tokenizer: Option<String>,
    pub clean: CleanConfig,
}

impl Default for CleanRunConfig {
    fn default() -> Self {
        Self {
            input: "data/newsspace200.csv".to_string(),
            output_dir: "data".to_string(),
            tokenizer: None,
            clean: CleanConfig::default(),
        }
    }
}

pub struct CleanUseCase {
    config: CleanRunConfig,
}

impl CleanUseCase {
    pub fn new(config: CleanRunConfig) -> Self {
        Self { config }
    }

    /// Clean the input and write the corpus artifacts.
    pub fn execute(&self) -> Result<Corpus> {
        let corpus = self.clean()?;

        let store = CorpusStore::new(&self.config.output_dir)
            .with_context(|| format!("Cannot create output directory '{}'", self.config.output_dir))?;
        let mut batch = store.batch();
        batch.corpus(&corpus).context("Cannot save cleaned corpus")?;
        batch.config(CLEAN_CONFIG_FILE, &self.config)?;
        batch.commit().context("Cannot move cleaned corpus into place")?;

        Ok(corpus)
    }

    /// Load and clean the input without writing anything.
    pub fn clean(&self) -> Result<Corpus> {
        let cfg = &self.config;
        cfg.clean.validate()?;

        let counter = open_counter(cfg.tokenizer.as_deref())?;
        let loader = CsvLoader::new(&cfg.input);
        tracing::info!("Cleaning '{}'", cfg.input);

        let corpus = Cleaner::new(cfg.clean.clone(), counter.as_ref())
            .clean(&loader)
            .with_context(|| format!("Cannot clean '{}'", cfg.input))?;
        Ok(corpus)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::PrepError;
    use crate::infra::corpus_store::{CLEAN_DATA_FILE, LABEL_MAP_FILE};
    use std::fs;

    fn write_input(dir: &std::path::Path) -> String {
        let mut csv = String::from("title,description,category\n");
        for i in 0..6 {
            csv.push_str(&format!("Rates {i},Central bank holds rates,Business\n"));
        }
        for i in 0..6 {
            csv.push_str(&format!("Match {i},Home side wins again,Sports\n"));
        }
        csv.push_str("Lonely,Only one of these,Health\n");
        csv.push_str(",No title here,Sports\n");
        let path = dir.join("news.csv");
        fs::write(&path, csv).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config(dir: &std::path::Path) -> CleanRunConfig {
        CleanRunConfig {
            input: write_input(dir),
            output_dir: dir.join("out").to_string_lossy().into_owned(),
            tokenizer: None,
            clean: CleanConfig {
                min_category_count: 2,
                ..CleanConfig::default()
            },
        }
    }

    #[test]
    fn test_execute_writes_corpus_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let corpus = CleanUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(corpus.len(), 12);
        assert_eq!(corpus.label_map().len(), 2);
        let out = std::path::Path::new(&cfg.output_dir);
        assert!(out.join(CLEAN_DATA_FILE).exists());
        assert!(out.join(LABEL_MAP_FILE).exists());
        assert!(out.join(CLEAN_CONFIG_FILE).exists());
    }

    #[test]
    fn test_schema_error_surfaces_through_anyhow() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.csv");
        fs::write(&input, "headline,category\nx,y\n").unwrap();
        let cfg = CleanRunConfig {
            input: input.to_string_lossy().into_owned(),
            ..config(dir.path())
        };

        let err = CleanUseCase::new(cfg).clean().unwrap_err();
        match err.downcast_ref::<PrepError>() {
            Some(PrepError::Schema { missing }) => {
                assert_eq!(missing, &vec!["title".to_string(), "description".to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
