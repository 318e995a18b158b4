// ============================================================
// Layer 5 — Tokenizer Store
// ============================================================
// Token counting for the cleaner.
//
// With a HuggingFace `tokenizer.json` the counts are real model
// tokens. Without one, a whitespace word count stands in; it is
// deterministic and good enough for length filtering on English
// news text, but the counts will differ from any subword model.

use std::path::PathBuf;

use tokenizers::Tokenizer;

use crate::domain::error::PrepError;
use crate::domain::traits::TokenCounter;

/// Locates and loads a serialized tokenizer.
pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the tokenizer JSON from disk.
    pub fn load(&self) -> Result<HfTokenCounter, PrepError> {
        let tokenizer = Tokenizer::from_file(&self.path).map_err(|e| {
            PrepError::Tokenizer(format!(
                "cannot load tokenizer from '{}': {e}",
                self.path.display()
            ))
        })?;
        tracing::info!("Loaded tokenizer from '{}'", self.path.display());
        Ok(HfTokenCounter { tokenizer })
    }
}

/// Counts tokens with a HuggingFace tokenizer, special tokens excluded.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, PrepError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| PrepError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().len())
    }
}

/// Counts whitespace-separated words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenCounter;

impl TokenCounter for WhitespaceTokenCounter {
    fn count_tokens(&self, text: &str) -> Result<usize, PrepError> {
        Ok(text.split_whitespace().count())
    }
}

/// Pick the counter for a run: the tokenizer at `path` if given,
/// whitespace words otherwise.
pub fn open_counter(path: Option<&str>) -> Result<Box<dyn TokenCounter>, PrepError> {
    match path {
        Some(p) => Ok(Box::new(TokenizerStore::new(p).load()?)),
        None => {
            tracing::warn!("No tokenizer given; counting whitespace-separated words");
            Ok(Box::new(WhitespaceTokenCounter))
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Word-level tokenizer JSON in the HuggingFace format
    fn word_level_json() -> serde_json::Value {
        serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "[UNK]": 0, "oil": 1, "prices": 2, "rise": 3 },
                "unk_token": "[UNK]"
            }
        })
    }

    #[test]
    fn test_whitespace_counter() {
        let c = WhitespaceTokenCounter;
        assert_eq!(c.count_tokens("Oil prices  rise\tagain").unwrap(), 4);
        assert_eq!(c.count_tokens("").unwrap(), 0);
    }

    #[test]
    fn test_hf_counter_counts_model_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, serde_json::to_string(&word_level_json()).unwrap()).unwrap();

        let counter = TokenizerStore::new(&path).load().unwrap();
        // Whitespace pre-tokenizer splits punctuation into its own token
        assert_eq!(counter.count_tokens("oil prices rise!").unwrap(), 4);
        assert_eq!(counter.count_tokens("unknown words").unwrap(), 2);
    }

    #[test]
    fn test_missing_tokenizer_file_is_a_tokenizer_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = TokenizerStore::new(dir.path().join("absent.json")).load();
        assert!(matches!(result, Err(PrepError::Tokenizer(_))));
    }

    #[test]
    fn test_open_counter_falls_back_to_whitespace() {
        let counter = open_counter(None).unwrap();
        assert_eq!(counter.count_tokens("a b c").unwrap(), 3);
    }
}
