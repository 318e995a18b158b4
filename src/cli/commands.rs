// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `clean`, `split` and `prepare`.
//
// Flags shared between subcommands live in small Args groups that
// are flattened in where needed. Every group converts into the
// application-layer config types; the application layer never
// sees clap types.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::application::clean_use_case::CleanRunConfig;
use crate::application::prepare_use_case::PrepareConfig;
use crate::application::split_use_case::SplitRunConfig;
use crate::data::cleaner::CleanConfig;
use crate::data::splitter::SplitConfig;
use crate::domain::corpus::TokenBand;

/// The top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean a raw news CSV into clean_data.csv and label_map.json
    Clean(CleanArgs),

    /// Split a cleaned corpus into train / dev / test
    Split(SplitArgs),

    /// Clean and split in one run
    Prepare(PrepareArgs),
}

/// Which stage applies the article token band.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthFilterStage {
    /// While cleaning; the band shapes clean_data.csv
    Clean,
    /// While splitting, before class frequencies are counted
    Split,
    /// Never
    Off,
}

/// Inclusive article token band and where it applies
#[derive(Args, Debug, Clone)]
pub struct TokenBandArgs {
    /// Shortest admissible article, in tokens
    #[arg(long, default_value_t = 20)]
    pub min_token: usize,

    /// Longest admissible article, in tokens
    #[arg(long, default_value_t = 250)]
    pub max_token: usize,

    /// Stage that applies the band
    #[arg(long, value_enum, default_value_t = LengthFilterStage::Split)]
    pub length_filter: LengthFilterStage,
}

impl TokenBandArgs {
    /// The band, if `stage` is the one configured to apply it.
    fn band_for(&self, stage: LengthFilterStage) -> Option<TokenBand> {
        (self.length_filter == stage).then_some(TokenBand {
            min: self.min_token,
            max: self.max_token,
        })
    }
}

/// Row filters of the cleaning stage
#[derive(Args, Debug, Clone)]
pub struct CleanerArgs {
    /// Categories need strictly more rows than this to be kept
    #[arg(long, default_value_t = 1000)]
    pub min_category_count: usize,

    /// Rows with longer titles (in tokens) are dropped
    #[arg(long, default_value_t = 100)]
    pub max_title_tokens: usize,

    /// HuggingFace tokenizer.json used to count tokens;
    /// whitespace-separated words are counted when omitted
    #[arg(long)]
    pub tokenizer: Option<String>,
}

impl CleanerArgs {
    fn config(&self, band: &TokenBandArgs) -> CleanConfig {
        CleanConfig {
            min_category_count: self.min_category_count,
            max_title_tokens: self.max_title_tokens,
            token_band: band.band_for(LengthFilterStage::Clean),
        }
    }
}

/// Pruning, quota and seed settings of the split stage
#[derive(Args, Debug, Clone)]
pub struct SamplingArgs {
    /// Classes below this relative frequency are dropped
    #[arg(long, default_value_t = 0.01)]
    pub threshold_minority_class: f64,

    /// Seed for the per-class sampling streams
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of the smallest class used as every class's train quota
    #[arg(long, default_value_t = 0.7)]
    pub train_fraction: f64,

    /// Fraction of the corpus given to dev, and again to test
    #[arg(long, default_value_t = 0.15)]
    pub devtest_fraction: f64,

    /// JSON object of category → extra train rows, e.g. {"Sports": 50}
    #[arg(long)]
    pub quota_overrides: Option<String>,
}

impl SamplingArgs {
    fn config(&self, band: &TokenBandArgs) -> Result<SplitConfig> {
        let quota_overrides = match &self.quota_overrides {
            Some(path) => load_quota_overrides(path)?,
            None => BTreeMap::new(),
        };
        Ok(SplitConfig {
            threshold_minority_class: self.threshold_minority_class,
            train_fraction: self.train_fraction,
            devtest_fraction: self.devtest_fraction,
            seed: self.seed,
            token_band: band.band_for(LengthFilterStage::Split),
            quota_overrides,
        })
    }
}

/// Read a `{"category": extra_train_rows}` JSON file.
pub fn load_quota_overrides(path: &str) -> Result<BTreeMap<String, usize>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read quota overrides '{path}'"))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Quota overrides '{path}' must map category names to row counts"))
}

/// Arguments for the `clean` command
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Raw CSV with title, description and category columns
    #[arg(long, default_value = "data/newsspace200.csv")]
    pub input: String,

    /// Directory for clean_data.csv and label_map.json
    #[arg(long, default_value = "data")]
    pub output_dir: String,

    #[command(flatten)]
    pub cleaner: CleanerArgs,

    #[command(flatten)]
    pub band: TokenBandArgs,
}

impl From<CleanArgs> for CleanRunConfig {
    fn from(a: CleanArgs) -> Self {
        CleanRunConfig {
            clean: a.cleaner.config(&a.band),
            input: a.input,
            output_dir: a.output_dir,
            tokenizer: a.cleaner.tokenizer,
        }
    }
}

/// Arguments for the `split` command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Cleaned corpus written by `clean`
    #[arg(long, default_value = "data/clean_data.csv")]
    pub input: String,

    /// Label map written by `clean`
    #[arg(long, default_value = "data/label_map.json")]
    pub label_map: String,

    /// Directory for the partitions and split_report.csv
    #[arg(long, default_value = "data")]
    pub output_dir: String,

    /// Title limit the corpus was cleaned with; longer titles are rejected on load
    #[arg(long, default_value_t = 100)]
    pub max_title_tokens: usize,

    #[command(flatten)]
    pub band: TokenBandArgs,

    #[command(flatten)]
    pub sampling: SamplingArgs,
}

impl TryFrom<SplitArgs> for SplitRunConfig {
    type Error = anyhow::Error;

    fn try_from(a: SplitArgs) -> Result<Self> {
        Ok(SplitRunConfig {
            split: a.sampling.config(&a.band)?,
            input: a.input,
            label_map: a.label_map,
            output_dir: a.output_dir,
            max_title_tokens: a.max_title_tokens,
        })
    }
}

/// Arguments for the `prepare` command
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Raw CSV with title, description and category columns
    #[arg(long, default_value = "data/newsspace200.csv")]
    pub input: String,

    /// Directory for every artifact of the run
    #[arg(long, default_value = "data")]
    pub output_dir: String,

    #[command(flatten)]
    pub cleaner: CleanerArgs,

    #[command(flatten)]
    pub band: TokenBandArgs,

    #[command(flatten)]
    pub sampling: SamplingArgs,
}

impl TryFrom<PrepareArgs> for PrepareConfig {
    type Error = anyhow::Error;

    fn try_from(a: PrepareArgs) -> Result<Self> {
        Ok(PrepareConfig {
            clean: a.cleaner.config(&a.band),
            split: a.sampling.config(&a.band)?,
            input: a.input,
            output_dir: a.output_dir,
            tokenizer: a.cleaner.tokenizer,
        })
    }
}
