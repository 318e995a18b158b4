// ============================================================
// Layer 4 — Corpus Cleaner
// ============================================================
// Turns raw rows into a labeled Corpus. Stages, in order:
//
//   1. Schema check            (done by the RecordSource)
//   2. Drop rows missing title or description
//   3. Keep categories with more than `min_category_count` rows
//   4. Count title / description tokens         (rayon)
//   5. Drop rows whose title exceeds `max_title_tokens`
//   6. Optional article token band
//   7. Sorted two-pass label assignment
//
// Stage 2 runs before stage 4 so the tokenizer never sees a
// missing value. Any stage that empties the corpus fails the run
// with EmptyInput naming that stage.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::corpus::{Corpus, LabelMap, TokenBand};
use crate::domain::error::PrepError;
use crate::domain::record::{RawRecord, Record};
use crate::domain::traits::{RecordSource, TokenCounter};

/// Filtering policy for the cleaning stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// A category survives only with strictly more rows than this
    pub min_category_count: usize,
    /// Longest admissible title, in tokens
    pub max_title_tokens: usize,
    /// Article length band applied here; `None` leaves it to the splitter
    pub token_band: Option<TokenBand>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            min_category_count: 1000,
            max_title_tokens: 100,
            token_band: None,
        }
    }
}

impl CleanConfig {
    pub fn validate(&self) -> Result<(), PrepError> {
        if let Some(band) = self.token_band {
            TokenBand::new(band.min, band.max)?;
        }
        Ok(())
    }
}

/// A row that has every text field, before tokenisation.
struct Article {
    id: usize,
    title: String,
    description: String,
    category: String,
}

/// Applies a CleanConfig using a TokenCounter.
pub struct Cleaner<'a> {
    config: CleanConfig,
    counter: &'a dyn TokenCounter,
}

impl<'a> Cleaner<'a> {
    pub fn new(config: CleanConfig, counter: &'a dyn TokenCounter) -> Self {
        Self { config, counter }
    }

    /// Load every row from `source` and clean it.
    pub fn clean(&self, source: &dyn RecordSource) -> Result<Corpus, PrepError> {
        let raw = source.load_all()?;
        self.clean_records(raw)
    }

    /// Clean rows that are already in memory.
    pub fn clean_records(&self, raw: Vec<RawRecord>) -> Result<Corpus, PrepError> {
        let cfg = &self.config;
        let total = raw.len();

        // ── Stage 2: missing title / description ─────────────────────────────
        let with_text: Vec<RawRecord> = raw.into_iter().filter(RawRecord::has_text).collect();
        ensure_rows(with_text.len(), "missing-text filter")?;
        tracing::debug!(
            "Dropped {} rows with a missing title or description",
            total - with_text.len()
        );

        // ── Stage 3: category floor ──────────────────────────────────────────
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &with_text {
            if let Some(category) = r.category.as_deref() {
                *counts.entry(category).or_insert(0) += 1;
            }
        }
        let frequent: BTreeSet<String> = counts
            .iter()
            .filter(|(_, n)| **n > cfg.min_category_count)
            .map(|(c, _)| c.to_string())
            .collect();
        let rare: Vec<&str> = counts
            .keys()
            .copied()
            .filter(|c| !frequent.contains(*c))
            .collect();
        if !rare.is_empty() {
            tracing::info!(
                "Dropping {} categories with at most {} rows: {}",
                rare.len(),
                cfg.min_category_count,
                rare.join(", ")
            );
        }

        let articles: Vec<Article> = with_text
            .into_iter()
            .filter_map(|r| match (r.title, r.description, r.category) {
                (Some(title), Some(description), Some(category))
                    if frequent.contains(&category) =>
                {
                    Some(Article {
                        id: r.id,
                        title,
                        description,
                        category,
                    })
                }
                _ => None,
            })
            .collect();
        ensure_rows(articles.len(), "category floor")?;

        // ── Stage 4: token counts ────────────────────────────────────────────
        // Order of `articles` is preserved by the indexed collect
        let counter = self.counter;
        let measured: Vec<(Article, usize, usize)> = articles
            .into_par_iter()
            .map(|a| -> Result<_, PrepError> {
                let title_tokens = counter.count_tokens(&a.title)?;
                let description_tokens = counter.count_tokens(&a.description)?;
                Ok((a, title_tokens, description_tokens))
            })
            .collect::<Result<_, _>>()?;
        tracing::info!("Tokenised {} articles", measured.len());

        // ── Stage 5: title length ────────────────────────────────────────────
        let measured: Vec<_> = measured
            .into_iter()
            .filter(|(_, title_tokens, _)| *title_tokens <= cfg.max_title_tokens)
            .collect();
        ensure_rows(measured.len(), "title length filter")?;

        // ── Stage 6: optional article band ───────────────────────────────────
        let measured: Vec<_> = match cfg.token_band {
            Some(band) => {
                let kept: Vec<_> = measured
                    .into_iter()
                    .filter(|(_, t, d)| band.contains(t + d))
                    .collect();
                ensure_rows(kept.len(), "token band")?;
                kept
            }
            None => measured,
        };

        // ── Stage 7: labels ──────────────────────────────────────────────────
        let label_map =
            LabelMap::from_categories(measured.iter().map(|(a, _, _)| a.category.as_str()));
        let mut records = Vec::with_capacity(measured.len());
        for (a, title_tokens, description_tokens) in measured {
            let label = label_map.label_of(&a.category).ok_or_else(|| {
                PrepError::Config(format!("category '{}' missing from label map", a.category))
            })?;
            records.push(Record::new(
                a.id,
                a.title,
                a.description,
                a.category,
                title_tokens,
                description_tokens,
                label,
            ));
        }

        tracing::info!(
            "Cleaned corpus: {} of {} rows kept across {} classes",
            records.len(),
            total,
            label_map.len()
        );
        Ok(Corpus::new(records, label_map))
    }
}

fn ensure_rows(count: usize, stage: &'static str) -> Result<(), PrepError> {
    if count == 0 {
        return Err(PrepError::EmptyInput { stage });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::WhitespaceTokenCounter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(floor: usize) -> CleanConfig {
        CleanConfig {
            min_category_count: floor,
            ..CleanConfig::default()
        }
    }

    fn raw(id: usize, title: Option<&str>, description: Option<&str>, category: &str) -> RawRecord {
        RawRecord::new(id, title, description, Some(category))
    }

    /// `n` rows of `category` starting at `first_id`
    fn rows(first_id: usize, n: usize, category: &str) -> Vec<RawRecord> {
        (first_id..first_id + n)
            .map(|i| raw(i, Some("short title"), Some("a few words of description"), category))
            .collect()
    }

    struct CountingCounter {
        calls: AtomicUsize,
    }

    impl TokenCounter for CountingCounter {
        fn count_tokens(&self, text: &str) -> Result<usize, PrepError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.split_whitespace().count())
        }
    }

    struct FailingCounter;

    impl TokenCounter for FailingCounter {
        fn count_tokens(&self, _text: &str) -> Result<usize, PrepError> {
            Err(PrepError::Tokenizer("model not loaded".into()))
        }
    }

    #[test]
    fn test_token_lengths_are_counted_per_field() {
        let counter = WhitespaceTokenCounter;
        let corpus = Cleaner::new(config(0), &counter)
            .clean_records(rows(0, 3, "World"))
            .unwrap();
        let r = &corpus.records()[0];
        assert_eq!(r.title_token_length, 2);
        assert_eq!(r.description_token_length, 5);
        assert_eq!(r.article_token_length, 7);
    }

    #[test]
    fn test_missing_text_never_reaches_tokenizer() {
        let counter = CountingCounter {
            calls: AtomicUsize::new(0),
        };
        let input = vec![
            raw(0, Some("t"), Some("d"), "World"),
            raw(1, None, Some("d"), "World"),
            raw(2, Some("t"), None, "World"),
        ];
        let corpus = Cleaner::new(config(0), &counter).clean_records(input).unwrap();
        assert_eq!(corpus.len(), 1);
        // One surviving row, two fields
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_category_floor_is_strict() {
        let counter = WhitespaceTokenCounter;
        let mut input = rows(0, 4, "World");
        input.extend(rows(4, 3, "Sports"));
        // Floor of 3: World (4) survives, Sports (3) does not
        let corpus = Cleaner::new(config(3), &counter).clean_records(input).unwrap();
        assert_eq!(corpus.len(), 4);
        assert_eq!(corpus.label_map().len(), 1);
        assert!(corpus.records().iter().all(|r| r.category == "World"));
    }

    #[test]
    fn test_missing_category_is_dropped() {
        let counter = WhitespaceTokenCounter;
        let mut input = rows(0, 2, "World");
        input.push(RawRecord::new(2, Some("t"), Some("d"), None));
        let corpus = Cleaner::new(config(0), &counter).clean_records(input).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_long_titles_are_dropped() {
        let counter = WhitespaceTokenCounter;
        let long_title = vec!["word"; 101].join(" ");
        let exact_title = vec!["word"; 100].join(" ");
        let input = vec![
            raw(0, Some(&long_title), Some("d"), "World"),
            raw(1, Some(&exact_title), Some("d"), "World"),
        ];
        let corpus = Cleaner::new(config(0), &counter).clean_records(input).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.records()[0].id, 1);
        assert_eq!(corpus.records()[0].title_token_length, 100);
    }

    #[test]
    fn test_token_band_applies_when_configured() {
        let counter = WhitespaceTokenCounter;
        let input = vec![
            raw(0, Some("one"), Some("two"), "World"),
            raw(1, Some("one two"), Some("three four five"), "World"),
        ];
        let cfg = CleanConfig {
            min_category_count: 0,
            max_title_tokens: 100,
            token_band: Some(TokenBand::new(3, 10).unwrap()),
        };
        let corpus = Cleaner::new(cfg, &counter).clean_records(input).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.records()[0].id, 1);
    }

    #[test]
    fn test_labels_are_sorted_and_dense() {
        let counter = WhitespaceTokenCounter;
        let mut input = rows(0, 2, "World");
        input.extend(rows(2, 2, "Business"));
        input.extend(rows(4, 2, "Sports"));
        let corpus = Cleaner::new(config(0), &counter).clean_records(input).unwrap();

        let map = corpus.label_map();
        assert_eq!(map.label_of("Business"), Some(0));
        assert_eq!(map.label_of("Sports"), Some(1));
        assert_eq!(map.label_of("World"), Some(2));
        for r in corpus.records() {
            assert_eq!(map.category(r.label), Some(r.category.as_str()));
        }
        // Row order is preserved
        let ids: Vec<usize> = corpus.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_after_filter_is_an_error() {
        let counter = WhitespaceTokenCounter;
        let input = rows(0, 5, "World");
        match Cleaner::new(config(1000), &counter).clean_records(input) {
            Err(PrepError::EmptyInput { stage }) => assert_eq!(stage, "category floor"),
            other => panic!("expected empty input, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let counter = WhitespaceTokenCounter;
        let result = Cleaner::new(config(0), &counter).clean(&Vec::<RawRecord>::new());
        assert!(matches!(result, Err(PrepError::EmptyInput { .. })));
    }

    #[test]
    fn test_tokenizer_errors_propagate() {
        let result = Cleaner::new(config(0), &FailingCounter).clean_records(rows(0, 2, "World"));
        assert!(matches!(result, Err(PrepError::Tokenizer(_))));
    }
}
